// src/service.rs

use crate::{
    backend::{self, BackendQuery, LinkBackend},
    client::RobustClient,
    config::AppConfig,
    error::{AppError, AppResult},
    extractor::IdentifierExtractor,
    format::FormatCatalog,
    models::{Provenance, ResolutionOutcome, ResolveRequest, ResolveResponse},
    orchestrator::FallbackOrchestrator,
    synthetic::{Clock, EntropySource, OsEntropy, SyntheticLinkGenerator, SystemClock},
};
use chrono::Utc;
use itertools::Itertools;
use log::{info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 唯一的对外入口：链接 + 格式标签 -> 解析结果
pub struct ResolutionService {
    extractor: IdentifierExtractor,
    catalog: FormatCatalog,
    orchestrator: FallbackOrchestrator,
    generator: SyntheticLinkGenerator,
    clock: Arc<dyn Clock>,
    append_synthetic: bool,
}

impl ResolutionService {
    pub fn new(config: &AppConfig, client: Arc<RobustClient>) -> Self {
        let backends = backend::build_backends(&config.backends, client);
        Self::with_components(config, backends, Arc::new(SystemClock), Arc::new(OsEntropy))
    }

    /// 可注入后端、时钟与随机源的构造方式
    pub fn with_components(
        config: &AppConfig,
        backends: Vec<Arc<dyn LinkBackend>>,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            extractor: IdentifierExtractor::new(&config.allowed_hosts),
            catalog: FormatCatalog::new(&config.formats),
            orchestrator: FallbackOrchestrator::new(backends, config.concurrency),
            generator: SyntheticLinkGenerator::new(
                &config.synthetic,
                &config.formats.audio_codes,
                clock.clone(),
                entropy,
            ),
            clock,
            append_synthetic: config.synthetic.append_on_backend_success,
        }
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.orchestrator.backend_names()
    }

    pub async fn resolve(&self, raw_url: &str, format_label: Option<&str>) -> AppResult<ResolutionOutcome> {
        self.resolve_with_cancel(raw_url, format_label, &CancellationToken::new()).await
    }

    pub async fn resolve_with_cancel(
        &self,
        raw_url: &str,
        format_label: Option<&str>,
        cancel: &CancellationToken,
    ) -> AppResult<ResolutionOutcome> {
        let raw_url = raw_url.trim();
        let video_id = self.extractor.validate_and_extract(raw_url)?;
        let format = self.catalog.request(format_label);
        info!("解析视频 {} (格式 '{}' -> {})", video_id, format.label, format.code);

        let query = BackendQuery { original_url: raw_url, video_id: &video_id, format: &format };
        let win = self.orchestrator.resolve_with_cancel(&query, cancel).await?;

        let outcome = match win {
            Some(win) => {
                let mut alternative_links = win.result.alternative_links;
                if self.append_synthetic {
                    match self.generator.generate(&video_id, &format.code) {
                        Ok(links) => alternative_links.extend(links),
                        Err(e) => warn!("附加备用链接失败，仅返回后端结果: {}", e),
                    }
                }
                let primary_link = win.result.primary_link;
                let alternative_links = alternative_links
                    .into_iter()
                    .filter(|l| *l != primary_link)
                    .unique()
                    .collect();
                ResolutionOutcome {
                    video_id,
                    format,
                    primary_link,
                    alternative_links,
                    provenance: Provenance::Backend,
                    backend: Some(win.backend),
                    title: win.result.title,
                    author: win.result.author,
                    resolved_at: self.clock.now().unwrap_or_else(Utc::now),
                }
            }
            None => {
                info!("没有后端给出可用链接，生成备用链接");
                let mut links = self.generator.generate(&video_id, &format.code)?.into_iter();
                let primary_link = links.next().ok_or_else(|| {
                    AppError::SyntheticGeneration("未生成任何链接".into())
                })?;
                ResolutionOutcome {
                    video_id,
                    format,
                    primary_link,
                    alternative_links: links.collect(),
                    provenance: Provenance::Synthetic,
                    backend: None,
                    title: None,
                    author: None,
                    resolved_at: self.clock.now().unwrap_or_else(Utc::now),
                }
            }
        };
        Ok(outcome)
    }

    /// 按对外结构返回结果，输入错误转为 `status: error`
    pub async fn respond(&self, request: &ResolveRequest, cancel: &CancellationToken) -> ResolveResponse {
        match self.resolve_with_cancel(&request.url, request.format.as_deref(), cancel).await {
            Ok(outcome) => ResolveResponse::from(&outcome),
            Err(e) => {
                warn!("解析 '{}' 失败: {}", request.url, e);
                ResolveResponse::error(e.reason())
            }
        }
    }
}
