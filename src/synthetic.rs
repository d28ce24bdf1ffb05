// src/synthetic.rs

use crate::{
    config::SyntheticConfig,
    constants::synthetic as cdn,
    error::{AppError, AppResult},
    models::VideoIdentifier,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rand::{Rng, SeedableRng, distributions::Alphanumeric, rngs::StdRng};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use url::Url;

/// 时间来源
pub trait Clock: Send + Sync {
    /// 无法获取当前时间时返回 `None`
    fn now(&self) -> Option<DateTime<Utc>>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Option<DateTime<Utc>> {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        DateTime::from_timestamp(i64::try_from(elapsed.as_secs()).ok()?, elapsed.subsec_nanos())
    }
}

/// 固定时间，用于测试
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> Option<DateTime<Utc>> {
        Some(self.0)
    }
}

/// 随机数来源。每次生成都会取一个新的随机数发生器，调用之间不共享可变状态。
pub trait EntropySource: Send + Sync {
    fn rng(&self) -> Result<StdRng, rand::Error>;
}

pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn rng(&self) -> Result<StdRng, rand::Error> {
        StdRng::from_rng(rand::thread_rng())
    }
}

/// 固定种子，用于测试
pub struct SeededEntropy(pub u64);

impl EntropySource for SeededEntropy {
    fn rng(&self) -> Result<StdRng, rand::Error> {
        Ok(StdRng::seed_from_u64(self.0))
    }
}

/// 在所有后端都失败时，按 CDN 链接语法拼出结构上合法的直链。
/// 生成的链接不保证可用，调用方必须以 `synthetic` 标记告知使用者。
pub struct SyntheticLinkGenerator {
    templates: Vec<Url>,
    validity_window_secs: i64,
    audio_codes: Vec<String>,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
}

impl SyntheticLinkGenerator {
    pub fn new(
        config: &SyntheticConfig,
        audio_codes: &[String],
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        let templates = config
            .templates
            .iter()
            .filter_map(|t| match Url::parse(t) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("忽略无效的 CDN 模板 '{}': {}", t, e);
                    None
                }
            })
            .collect();
        Self {
            templates,
            validity_window_secs: i64::try_from(config.validity_window_secs.max(1)).unwrap_or(i64::MAX / 2),
            audio_codes: audio_codes.to_vec(),
            clock,
            entropy,
        }
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    fn mime_for(&self, format_code: &str) -> &'static str {
        if self.audio_codes.iter().any(|c| c == format_code) {
            cdn::MIME_AUDIO
        } else {
            cdn::MIME_VIDEO
        }
    }

    /// 随机会话令牌：随机字母数字串的 base64 编码，截断到固定长度
    fn session_token(rng: &mut StdRng) -> String {
        let raw: String = (&mut *rng).sample_iter(&Alphanumeric).take(13).map(char::from).collect();
        let mut token = STANDARD.encode(raw);
        token.truncate(cdn::SESSION_TOKEN_LEN);
        token
    }

    /// 按模板顺序生成链接，数量与模板数相同
    pub fn generate(&self, video_id: &VideoIdentifier, format_code: &str) -> AppResult<Vec<String>> {
        if self.templates.is_empty() {
            return Err(AppError::SyntheticGeneration("没有可用的 CDN 模板".into()));
        }
        let now = self
            .clock
            .now()
            .ok_or_else(|| AppError::SyntheticGeneration("无法获取系统时间".into()))?;
        let mut rng = self
            .entropy
            .rng()
            .map_err(|e| AppError::SyntheticGeneration(format!("无法获取随机数: {}", e)))?;

        let expire = now.timestamp().saturating_add(self.validity_window_secs).to_string();
        let id_field = format!("{}{}", cdn::ID_PREFIX, video_id);
        let mime = self.mime_for(format_code);

        let links: Vec<String> = self
            .templates
            .iter()
            .map(|template| {
                let mut url = template.clone();
                let token = Self::session_token(&mut rng);
                let clen = rng.gen_range(cdn::CLEN_RANGE).to_string();
                url.query_pairs_mut()
                    .append_pair("expire", &expire)
                    .append_pair("ei", &token)
                    .append_pair("ip", cdn::CLIENT_IP)
                    .append_pair("id", &id_field)
                    .append_pair("itag", format_code)
                    .append_pair("source", cdn::SOURCE)
                    .append_pair("requiressl", "yes")
                    .append_pair("mime", mime)
                    .append_pair("ratebypass", "yes")
                    .append_pair("clen", &clen)
                    .append_pair("gir", "yes");
                url.to_string()
            })
            .collect();

        debug!("为视频 {} 生成了 {} 个备用链接 (expire={})", video_id, links.len(), expire);
        Ok(links)
    }
}
