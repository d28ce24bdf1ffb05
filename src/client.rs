// src/client.rs

use crate::{
    backend::{BackendRequest, RequestBody},
    config::AppConfig,
    error::*,
};
use anyhow::anyhow;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;

#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
}

impl RobustClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AppError::Other(anyhow!("HTTP 客户端初始化失败: {}", e)))?;
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }

    /// 发送后端请求并把响应体解析为松散的 JSON 文档。
    /// 超时由调用方控制，这里只区分网络、状态码和格式错误。
    pub async fn execute(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        let mut builder = self.client.request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Encoded { content_type, payload } => builder
                .header(CONTENT_TYPE, *content_type)
                .body(payload.clone()),
        };

        let res = builder.send().await?;
        let status = res.status();
        debug!("{} {} -> {}", request.method, request.url, status);
        if !status.is_success() {
            return Err(BackendError::HttpStatus(status));
        }

        let bytes = res.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            BackendError::Malformed(format!("响应不是合法的 JSON ({})", e))
        })
    }
}
