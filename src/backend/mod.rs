// src/backend/mod.rs

mod descriptor;
mod http;
mod parse;

pub use descriptor::{BackendDescriptor, BodyEncoding, BodyField, HttpMethod, ResponseShape};
pub use http::HttpBackend;
pub use parse::normalize;

use crate::{
    client::RobustClient,
    error::BackendError,
    models::{FormatRequest, NormalizedLinkResult, VideoIdentifier},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use url::Url;

/// 一次后端调用所需的全部输入
#[derive(Debug, Clone, Copy)]
pub struct BackendQuery<'a> {
    pub original_url: &'a str,
    pub video_id: &'a VideoIdentifier,
    pub format: &'a FormatRequest,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Encoded {
        content_type: &'static str,
        payload: String,
    },
}

/// 已经填好占位符、可以直接发送的请求
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

#[async_trait]
pub trait LinkBackend: Send + Sync {
    /// 后端名称 (用于日志)
    fn name(&self) -> &str;

    fn timeout(&self) -> Duration;

    /// 调用后端并把响应规整为统一结果。超时同样以 `BackendError` 返回，不在内部重试。
    async fn call(&self, query: &BackendQuery<'_>) -> Result<NormalizedLinkResult, BackendError>;
}

/// 按配置顺序为每个描述符创建 HTTP 后端
pub fn build_backends(
    descriptors: &[BackendDescriptor],
    client: Arc<RobustClient>,
) -> Vec<Arc<dyn LinkBackend>> {
    descriptors
        .iter()
        .cloned()
        .map(|d| Arc::new(HttpBackend::new(d, client.clone())) as Arc<dyn LinkBackend>)
        .collect()
}
