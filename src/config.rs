// src/config.rs

pub mod file;

use self::file::load_or_create_external_config;
use crate::{
    backend::BackendDescriptor,
    cli::Cli,
    constants,
    error::{AppError, AppResult},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub table: BTreeMap<String, String>,
    pub default_code: String,
    pub audio_codes: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            table: BTreeMap::from([
                ("mp3".into(), "140".into()),
                ("mp4".into(), "18".into()),
                ("720p".into(), "22".into()),
                ("1080p".into(), "37".into()),
            ]),
            default_code: constants::DEFAULT_FORMAT_CODE.into(),
            audio_codes: vec![constants::AUDIO_FORMAT_CODE.into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    /// 同时竞速的高优先级后端数量，1 表示严格串行
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub templates: Vec<String>,
    /// 备用链接的有效期，必须大于 0
    pub validity_window_secs: u64,
    pub append_on_backend_success: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            templates: constants::synthetic::CDN_TEMPLATES.iter().map(|s| s.to_string()).collect(),
            validity_window_secs: constants::DEFAULT_VALIDITY_WINDOW_SECS,
            append_on_backend_success: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
    #[serde(default)]
    pub formats: FormatConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default = "BackendDescriptor::defaults")]
    pub backends: Vec<BackendDescriptor>,
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

fn default_allowed_hosts() -> Vec<String> {
    constants::DEFAULT_ALLOWED_HOSTS.iter().map(|s| s.to_string()).collect()
}

impl ExternalConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.synthetic.validity_window_secs == 0 {
            return Err(AppError::Config("synthetic.validity_window_secs 必须大于 0".into()));
        }
        Ok(())
    }

    pub(crate) fn default_app_config() -> Self {
        // 为 NetworkConfig 提供一组稳健的默认值
        let network_config = NetworkConfig {
            connect_timeout_secs: Some(10),
            max_retries: Some(1),
            concurrency: Some(1),
        };

        Self {
            allowed_hosts: default_allowed_hosts(),
            formats: FormatConfig::default(),
            network: network_config,
            backends: BackendDescriptor::defaults(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub allowed_hosts: Vec<String>,
    pub formats: FormatConfig,
    pub backends: Vec<BackendDescriptor>,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub max_retries: u32,
    pub concurrency: usize,
    pub synthetic: SyntheticConfig,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config(args.config.as_deref())?;
        external_config.validate()?;
        let mut config = Self::from_external(external_config);

        if args.no_backends {
            config.backends.clear();
        } else if let Some(secs) = args.timeout {
            for backend in &mut config.backends {
                backend.timeout_secs = secs;
            }
        }
        Ok(config)
    }

    pub fn from_external(external: ExternalConfig) -> Self {
        Self {
            allowed_hosts: external.allowed_hosts,
            formats: external.formats,
            backends: external.backends.into_iter().filter(|b| b.enabled).collect(),
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(external.network.connect_timeout_secs.unwrap_or(10)),
            max_retries: external.network.max_retries.unwrap_or(1),
            concurrency: external.network.concurrency.unwrap_or(1).max(1),
            synthetic: external.synthetic,
        }
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            formats: FormatConfig::default(),
            backends: Vec::new(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(2),
            max_retries: 0,
            concurrency: 1,
            synthetic: SyntheticConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_file_falls_back_to_defaults() {
        let config: ExternalConfig = serde_json::from_str(r#"{ "allowed_hosts": ["youtube.com"] }"#).unwrap();
        assert_eq!(config.allowed_hosts, ["youtube.com"]);
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.formats.default_code, "18");
        assert_eq!(config.synthetic.templates.len(), 4);
    }

    #[test]
    fn disabled_backends_are_dropped() {
        let mut external = ExternalConfig::default_app_config();
        external.backends[1].enabled = false;
        let config = AppConfig::from_external(external);
        let names: Vec<_> = config.backends.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["y2mate-v1", "yt1s-v1"]);
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let mut external = ExternalConfig::default_app_config();
        external.network.concurrency = Some(0);
        assert_eq!(AppConfig::from_external(external).concurrency, 1);
    }

    #[test]
    fn partial_nested_sections_keep_remaining_defaults() {
        let config: ExternalConfig = serde_json::from_str(
            r#"{ "formats": { "table": { "mp4": "18", "4k": "313" } }, "synthetic": { "append_on_backend_success": true } }"#,
        )
        .unwrap();
        assert_eq!(config.formats.table["4k"], "313");
        assert_eq!(config.formats.default_code, "18");
        assert_eq!(config.formats.audio_codes, ["140"]);
        assert!(config.synthetic.append_on_backend_success);
        assert_eq!(config.synthetic.templates.len(), 4);
        assert_eq!(config.synthetic.validity_window_secs, 43_200);
    }

    #[test]
    fn zero_validity_window_is_rejected() {
        let config: ExternalConfig =
            serde_json::from_str(r#"{ "synthetic": { "validity_window_secs": 0 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
        assert!(ExternalConfig::default_app_config().validate().is_ok());
    }
}
