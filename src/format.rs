// src/format.rs

use crate::{config::FormatConfig, constants, models::FormatRequest};
use log::debug;
use std::collections::HashMap;

/// 格式标签到后端格式代码的映射表，进程内只读
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    table: HashMap<String, String>,
    default_code: String,
    audio_codes: Vec<String>,
}

impl FormatCatalog {
    pub fn new(config: &FormatConfig) -> Self {
        let table = config
            .table
            .iter()
            .map(|(label, code)| (label.trim().to_lowercase(), code.clone()))
            .collect();
        let default_code = if config.default_code.trim().is_empty() {
            constants::DEFAULT_FORMAT_CODE.to_string()
        } else {
            config.default_code.clone()
        };
        Self { table, default_code, audio_codes: config.audio_codes.clone() }
    }

    /// 查表不区分大小写；未知或缺失的标签一律返回默认代码
    pub fn resolve(&self, label: &str) -> String {
        let key = label.trim().to_lowercase();
        match self.table.get(&key) {
            Some(code) => code.clone(),
            None => {
                debug!("未知格式 '{}'，使用默认代码 {}", label, self.default_code);
                self.default_code.clone()
            }
        }
    }

    pub fn is_audio(&self, code: &str) -> bool {
        self.audio_codes.iter().any(|c| c == code)
    }

    pub fn request(&self, label: Option<&str>) -> FormatRequest {
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(constants::DEFAULT_FORMAT_LABEL)
            .to_lowercase();
        let code = self.resolve(&label);
        let is_audio = self.is_audio(&code);
        FormatRequest { label, code, is_audio }
    }
}
