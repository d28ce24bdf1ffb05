// src/orchestrator.rs

use crate::{
    backend::{BackendQuery, LinkBackend},
    error::{AppError, AppResult, BackendError},
    models::NormalizedLinkResult,
};
use futures::StreamExt;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 胜出的后端及其结果
#[derive(Debug, Clone)]
pub struct BackendWin {
    pub backend: String,
    pub result: NormalizedLinkResult,
}

/// 按优先级依次调用后端，第一个给出可用主链接的后端胜出
pub struct FallbackOrchestrator {
    backends: Vec<Arc<dyn LinkBackend>>,
    concurrency: usize,
}

impl FallbackOrchestrator {
    pub fn new(backends: Vec<Arc<dyn LinkBackend>>, concurrency: usize) -> Self {
        Self { backends, concurrency: concurrency.max(1) }
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// 所有后端都失败 (或未配置任何后端) 时返回 `None`，这不是错误。
    ///
    /// `concurrency > 1` 时最多同时调用这么多个后端，但结果仍按优先级顺序取用：
    /// 只有排在前面的后端全部失败后，后面的成功结果才会被采纳。
    pub async fn resolve(&self, query: &BackendQuery<'_>) -> Option<BackendWin> {
        if self.backends.is_empty() {
            debug!("未配置任何后端，直接跳过");
            return None;
        }

        let mut attempts = futures::stream::iter(self.backends.iter())
            .map(|backend| async move {
                let limit = backend.timeout();
                let result = match tokio::time::timeout(limit, backend.call(query)).await {
                    Ok(result) => result,
                    Err(_) => Err(BackendError::Timeout(limit)),
                };
                (backend, result)
            })
            .buffered(self.concurrency);

        while let Some((backend, result)) = attempts.next().await {
            match result {
                Ok(result) if result.is_usable() => {
                    info!("后端 [{}] 成功解析视频 {}", backend.name(), query.video_id);
                    return Some(BackendWin { backend: backend.name().to_string(), result });
                }
                Ok(_) => warn!("后端 [{}] 返回的主链接为空，尝试下一个", backend.name()),
                Err(e) => warn!("后端 [{}] 调用失败: {}，尝试下一个", backend.name(), e),
            }
        }

        info!("全部 {} 个后端均未能解析视频 {}", self.backends.len(), query.video_id);
        None
    }

    /// 与 `resolve` 相同，但在调用方取消时立即中止所有进行中的请求
    pub async fn resolve_with_cancel(
        &self,
        query: &BackendQuery<'_>,
        cancel: &CancellationToken,
    ) -> AppResult<Option<BackendWin>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("解析视频 {} 时收到取消信号，放弃进行中的后端请求", query.video_id);
                Err(AppError::UserInterrupt)
            }
            win = self.resolve(query) => Ok(win),
        }
    }
}
