// src/backend/descriptor.rs

use crate::constants::{self, placeholders};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

/// 请求体编码方式，由后端身份决定，而不是根据响应推断
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    Form,
    Json,
}

impl BodyEncoding {
    pub fn content_type(&self) -> &'static str {
        match self {
            BodyEncoding::Form => "application/x-www-form-urlencoded; charset=UTF-8",
            BodyEncoding::Json => "application/json",
        }
    }
}

/// 后端响应中直链所在位置的几种已知形态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// `links.mp4.<quality>.k` / `links.mp3.<quality>.k`
    LinkGroups,
    /// `response.direct_link`
    DirectLink,
    /// `links[0].url`
    LinkList,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BodyField {
    pub name: String,
    /// 可包含 `{url}`、`{video_id}`、`{format_code}`、`{format}` 占位符
    pub value: String,
}

impl BodyField {
    pub fn new(name: &str, value: &str) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub name: String,
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub encoding: BodyEncoding,
    #[serde(default)]
    pub body: Vec<BodyField>,
    /// 额外请求头，会覆盖默认的浏览器伪装头
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub response: ResponseShape,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout_secs() -> u64 {
    constants::DEFAULT_BACKEND_TIMEOUT_SECS
}

fn default_enabled() -> bool {
    true
}

impl BackendDescriptor {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 内置的后端列表，顺序即回退优先级
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: "y2mate-v1".into(),
                endpoint: "https://www.y2mate.com/mates/analyzeV2/ajax".into(),
                method: HttpMethod::Post,
                encoding: BodyEncoding::Form,
                body: vec![
                    BodyField::new("k_query", placeholders::URL),
                    BodyField::new("k_page", "home"),
                    BodyField::new("hl", "en"),
                    BodyField::new("q_auto", "0"),
                ],
                headers: Vec::new(),
                timeout_secs: constants::DEFAULT_BACKEND_TIMEOUT_SECS,
                response: ResponseShape::LinkGroups,
                enabled: true,
            },
            Self {
                name: "sfrom-v1".into(),
                endpoint: "https://sfrom.net/mates/en/analyze/ajax".into(),
                method: HttpMethod::Post,
                encoding: BodyEncoding::Form,
                body: vec![BodyField::new("url", placeholders::URL)],
                headers: Vec::new(),
                timeout_secs: constants::DEFAULT_BACKEND_TIMEOUT_SECS,
                response: ResponseShape::LinkGroups,
                enabled: true,
            },
            Self {
                name: "yt1s-v1".into(),
                endpoint: "https://yt1s.com/api/ajaxSearch/index".into(),
                method: HttpMethod::Post,
                encoding: BodyEncoding::Json,
                body: vec![
                    BodyField::new("q", placeholders::URL),
                    BodyField::new("vt", "home"),
                ],
                headers: Vec::new(),
                timeout_secs: constants::DEFAULT_BACKEND_TIMEOUT_SECS,
                response: ResponseShape::LinkGroups,
                enabled: true,
            },
        ]
    }
}
