// src/extractor/mod.rs

mod rules;

use crate::{
    error::{AppError, AppResult},
    models::VideoIdentifier,
};
use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static RAW_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*://)?([^/?#:@\s]+)").unwrap()
});

/// 负责域名白名单校验和视频 ID 提取
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    allowed_hosts: Vec<String>,
}

impl IdentifierExtractor {
    pub fn new(allowed_hosts: &[String]) -> Self {
        let allowed_hosts = allowed_hosts
            .iter()
            .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { allowed_hosts }
    }

    fn host_allowed(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed_hosts.iter().any(|h| rules::host_matches(&host, h))
    }

    /// 校验链接是否来自受支持的站点。无法解析的链接退回到正则提取域名。
    pub fn validate(&self, raw: &str) -> AppResult<()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput("链接为空".into()));
        }

        let allowed = match Url::parse(raw) {
            Ok(url) => {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|h| self.host_allowed(h))
            }
            Err(e) => {
                debug!("链接 '{}' 无法解析为 URL ({})，改用宽松匹配", raw, e);
                let decoded = decode(raw);
                RAW_HOST_RE
                    .captures(&decoded)
                    .and_then(|caps| caps.get(1))
                    .is_some_and(|m| self.host_allowed(m.as_str()))
            }
        };

        if allowed {
            Ok(())
        } else {
            warn!("拒绝不受支持的链接: {}", raw);
            Err(AppError::InvalidInput(raw.to_string()))
        }
    }

    /// 依次尝试已知的链接形态，首个匹配的规则胜出
    pub fn extract(&self, raw: &str) -> Option<VideoIdentifier> {
        let raw = raw.trim();
        let id = match Url::parse(raw) {
            Ok(url) => rules::RULES.iter().find_map(|rule| {
                let id = rule.apply(&url)?;
                debug!("规则 {:?} 命中，视频 ID: {}", rule, id);
                Some(id)
            }),
            Err(_) => rules::match_raw(&decode(raw)),
        };
        if id.is_none() {
            debug!("所有规则均未命中: {}", raw);
        }
        id
    }

    /// 校验并提取，供解析服务调用
    pub fn validate_and_extract(&self, raw: &str) -> AppResult<VideoIdentifier> {
        self.validate(raw)?;
        self.extract(raw)
            .ok_or_else(|| AppError::IdentifierNotFound(raw.trim().to_string()))
    }
}

fn decode(raw: &str) -> String {
    percent_encoding::percent_decode_str(raw)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    fn extractor() -> IdentifierExtractor {
        let hosts: Vec<String> = constants::DEFAULT_ALLOWED_HOSTS.iter().map(|s| s.to_string()).collect();
        IdentifierExtractor::new(&hosts)
    }

    #[test]
    fn extracts_every_known_shape() {
        let ex = extractor();
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42", "dQw4w9WgXcQ"),
            ("https://m.youtube.com/shorts/abcDEF_-123", "abcDEF_-123"),
            ("https://www.youtube.com/embed/XyZ987?autoplay=1", "XyZ987"),
            ("https://www.youtube-nocookie.com/embed/XyZ987", "XyZ987"),
            ("http://youtube.com/v/old_style-1", "old_style-1"),
            ("https://youtu.be/dQw4w9WgXcQ", "dQw4w9WgXcQ"),
            ("https://youtu.be/dQw4w9WgXcQ?si=tracking", "dQw4w9WgXcQ"),
        ];
        for (url, expected) in cases {
            ex.validate(url).unwrap_or_else(|e| panic!("{} 应通过校验: {}", url, e));
            assert_eq!(ex.extract(url).map(|id| id.to_string()).as_deref(), Some(expected), "{}", url);
        }
    }

    #[test]
    fn rejects_foreign_and_empty_input() {
        let ex = extractor();
        for url in [
            "",
            "   ",
            "https://example.com/not-a-video",
            "https://youtube.com.evil.org/watch?v=abc",
            "ftp://youtube.com/watch?v=abc",
        ] {
            assert!(matches!(ex.validate(url), Err(AppError::InvalidInput(_))), "{:?}", url);
        }
    }

    #[test]
    fn malformed_urls_fall_back_to_raw_matching() {
        let ex = extractor();
        let raw = "youtube.com/watch?v=abc12345678";
        ex.validate(raw).unwrap();
        assert_eq!(ex.extract(raw).unwrap().as_str(), "abc12345678");

        let encoded = "youtu.be%2FdQw4w9WgXcQ";
        ex.validate(encoded).unwrap();
        assert_eq!(ex.extract(encoded).unwrap().as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn allowed_host_without_video_is_not_found() {
        let ex = extractor();
        let err = ex.validate_and_extract("https://www.youtube.com/feed/trending").unwrap_err();
        assert!(matches!(err, AppError::IdentifierNotFound(_)));
    }
}
