// src/backend/http.rs

use super::{
    BackendDescriptor, BackendQuery, BackendRequest, BodyEncoding, HttpMethod, LinkBackend,
    RequestBody, parse,
};
use crate::{
    client::RobustClient,
    constants::{self, placeholders},
    error::BackendError,
    models::NormalizedLinkResult,
};
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use std::{sync::Arc, time::Duration};
use url::Url;

pub struct HttpBackend {
    descriptor: BackendDescriptor,
    client: Arc<RobustClient>,
}

impl HttpBackend {
    pub fn new(descriptor: BackendDescriptor, client: Arc<RobustClient>) -> Self {
        Self { descriptor, client }
    }

    pub fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn fill(template: &str, query: &BackendQuery<'_>) -> String {
        template
            .replace(placeholders::URL, query.original_url)
            .replace(placeholders::VIDEO_ID, query.video_id.as_str())
            .replace(placeholders::FORMAT_CODE, &query.format.code)
            .replace(placeholders::FORMAT, &query.format.label)
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = [
            ("Accept", constants::ACCEPT),
            ("User-Agent", constants::USER_AGENT),
            ("Referer", constants::REFERER),
            ("Origin", constants::ORIGIN),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for (name, value) in &self.descriptor.headers {
            headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }
        headers
    }

    /// 根据描述符构造请求：GET 把字段放进查询串，POST 按后端要求的编码写入请求体
    pub fn build_request(&self, query: &BackendQuery<'_>) -> Result<BackendRequest, BackendError> {
        let fields: Vec<(String, String)> = self
            .descriptor
            .body
            .iter()
            .map(|f| (f.name.clone(), Self::fill(&f.value, query)))
            .collect();

        let mut url = Url::parse(&Self::fill(&self.descriptor.endpoint, query)).map_err(|e| {
            BackendError::Request(format!("无效的后端地址 '{}': {}", self.descriptor.endpoint, e))
        })?;

        let (method, body) = match self.descriptor.method {
            HttpMethod::Get => {
                if !fields.is_empty() {
                    url.query_pairs_mut().extend_pairs(&fields);
                }
                (reqwest::Method::GET, RequestBody::Empty)
            }
            HttpMethod::Post => {
                let encoding = self.descriptor.encoding;
                let payload = match encoding {
                    BodyEncoding::Form => url::form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(&fields)
                        .finish(),
                    BodyEncoding::Json => {
                        let map: Map<String, Value> =
                            fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
                        Value::Object(map).to_string()
                    }
                };
                (
                    reqwest::Method::POST,
                    RequestBody::Encoded { content_type: encoding.content_type(), payload },
                )
            }
        };

        Ok(BackendRequest { method, url, headers: self.headers(), body })
    }
}

#[async_trait]
impl LinkBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn timeout(&self) -> Duration {
        self.descriptor.timeout()
    }

    async fn call(&self, query: &BackendQuery<'_>) -> Result<NormalizedLinkResult, BackendError> {
        let request = self.build_request(query)?;
        debug!("[{}] 请求 {} {}", self.descriptor.name, request.method, request.url);

        let limit = self.timeout();
        let doc = tokio::time::timeout(limit, self.client.execute(&request))
            .await
            .map_err(|_| BackendError::Timeout(limit))??;

        parse::normalize(self.descriptor.response, &doc, query.format)
    }
}
