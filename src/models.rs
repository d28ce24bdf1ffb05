// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 从链接中提取出的视频 ID，非空且只含 `[A-Za-z0-9_-]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoIdentifier(String);

impl VideoIdentifier {
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 用户输入的格式标签及其映射出的后端格式代码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRequest {
    pub label: String,
    pub code: String,
    pub is_audio: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLinkResult {
    pub primary_link: String,
    pub alternative_links: Vec<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl NormalizedLinkResult {
    pub fn is_usable(&self) -> bool {
        !self.primary_link.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Backend,
    Synthetic,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Backend => write!(f, "backend"),
            Provenance::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// 一次解析调用的最终结果，构造后不再修改
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub video_id: VideoIdentifier,
    pub format: FormatRequest,
    pub primary_link: String,
    pub alternative_links: Vec<String>,
    pub provenance: Provenance,
    pub backend: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

/// 调用方输入
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub url: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// 对外输出的结构，成功与失败共用一个外形
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ResolutionOutcome> for ResolveResponse {
    fn from(outcome: &ResolutionOutcome) -> Self {
        Self {
            status: ResponseStatus::Success,
            video_id: Some(outcome.video_id.to_string()),
            format_code: Some(outcome.format.code.clone()),
            primary_link: Some(outcome.primary_link.clone()),
            alternative_links: Some(outcome.alternative_links.clone()),
            provenance: Some(outcome.provenance),
            reason: None,
        }
    }
}

impl ResolveResponse {
    pub fn error(reason: &str) -> Self {
        Self {
            status: ResponseStatus::Error,
            video_id: None,
            format_code: None,
            primary_link: None,
            alternative_links: None,
            provenance: None,
            reason: Some(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rejects_foreign_characters() {
        assert!(VideoIdentifier::parse("dQw4w9WgXcQ").is_some());
        assert!(VideoIdentifier::parse("a_b-c").is_some());
        assert!(VideoIdentifier::parse("").is_none());
        assert!(VideoIdentifier::parse("abc def").is_none());
        assert!(VideoIdentifier::parse("abc?x").is_none());
    }

    #[test]
    fn error_response_serializes_only_status_and_reason() {
        let json = serde_json::to_value(ResolveResponse::error("invalid_url")).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "reason": "invalid_url" }));
    }
}
