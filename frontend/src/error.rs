//! 错误类型
//!
//! 页面层对三类错误一视同仁：网络失败、服务端报告的错误、以及提交前的本地校验失败。
//! 它们都被转换成一段可读文本显示在横幅中，不做自动重试。

use garage_shared::{ErrorBody, PlateError};
use thiserror::Error;

/// 传输层错误（没有拿到 HTTP 响应）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("request build failed: {0}")]
    RequestBuild(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// 错误信息优先读取的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    Error,
    Message,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 服务端返回非 2xx
    #[error("server responded with {status}")]
    Server { status: u16, body: ErrorBody },

    #[error("failed to encode request: {0}")]
    Encode(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// 提交前的本地前置条件不满足
    #[error("{0}")]
    Precondition(String),
}

impl ApiError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 转换为显示给用户的文本
    ///
    /// 优先使用服务端在 `field` 中给出的信息，否则使用 `fallback`。
    /// 本地前置条件错误直接显示自身信息。
    pub fn user_message(&self, field: MessageField, fallback: &str) -> String {
        match self {
            ApiError::Server { body, .. } => {
                let text = match field {
                    MessageField::Error => body.error.as_deref(),
                    MessageField::Message => body.message.as_deref(),
                };
                text.filter(|t| !t.trim().is_empty())
                    .unwrap_or(fallback)
                    .to_string()
            }
            ApiError::Precondition(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<PlateError> for ApiError {
    fn from(e: PlateError) -> Self {
        Self::Precondition(e.to_string())
    }
}
