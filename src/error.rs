// src/error.rs

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("无效的链接: {0}")]
    InvalidInput(String),
    #[error("无法从链接 '{0}' 中提取视频 ID")]
    IdentifierNotFound(String),
    #[error("备用链接生成失败: {0}")]
    SyntheticGeneration(String),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("用户中断")]
    UserInterrupt,
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 对外暴露的错误原因，仅输入校验类错误有对应值
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_url",
            AppError::IdentifierNotFound(_) => "identifier_not_found",
            AppError::UserInterrupt => "cancelled",
            _ => "internal_error",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 单个解析后端的失败原因。只在编排器内部流转，不会直接返回给调用方。
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest_middleware::Error),
    #[error("请求构造失败: {0}")]
    Request(String),
    #[error("请求超时 ({0:?})")]
    Timeout(Duration),
    #[error("服务器返回状态码 {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("响应格式无法识别: {0}")]
    Malformed(String),
    #[error("后端报告错误: {0}")]
    Reported(String),
    #[error("请求已取消")]
    Cancelled,
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest 自身的超时没有携带时长
            BackendError::Timeout(Duration::ZERO)
        } else {
            BackendError::Network(reqwest_middleware::Error::Reqwest(e))
        }
    }
}
