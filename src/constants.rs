// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const LINK_TRUNCATE_LENGTH: usize = 72;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_FORMAT_LABEL: &str = "mp4";
pub const DEFAULT_FORMAT_CODE: &str = "18";
pub const AUDIO_FORMAT_CODE: &str = "140";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_VALIDITY_WINDOW_SECS: u64 = 43_200;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const REFERER: &str = "https://www.youtube.com/";
pub const ORIGIN: &str = "https://www.youtube.com";
pub const ACCEPT: &str = "application/json, text/plain, */*";

pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["youtube.com", "youtu.be", "youtube-nocookie.com"];

/// 短链域名，路径第一段即为视频 ID
pub const SHORT_LINK_HOSTS: &[&str] = &["youtu.be"];

pub mod synthetic {
    pub const CDN_TEMPLATES: &[&str] = &[
        "https://rr1---sn-oj5hn5-55.googlevideo.com/videoplayback",
        "https://rr2---sn-oj5hn5-55.googlevideo.com/videoplayback",
        "https://rr3---sn-oj5hn5-55.googlevideo.com/videoplayback",
        "https://rr4---sn-oj5hn5-55.googlevideo.com/videoplayback",
    ];
    pub const ID_PREFIX: &str = "o-";
    pub const SESSION_TOKEN_LEN: usize = 20;
    pub const CLIENT_IP: &str = "127.0.0.1";
    pub const SOURCE: &str = "youtube";
    pub const MIME_AUDIO: &str = "audio/mp4";
    pub const MIME_VIDEO: &str = "video/mp4";
    pub const CLEN_RANGE: std::ops::Range<u64> = 5_000_000..15_000_000;
}

pub mod placeholders {
    pub const URL: &str = "{url}";
    pub const VIDEO_ID: &str = "{video_id}";
    pub const FORMAT_CODE: &str = "{format_code}";
    pub const FORMAT: &str = "{format}";
}
