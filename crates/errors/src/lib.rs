//! clima-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problem Details 的媒体类型
pub const PROBLEM_JSON: &str = "application/problem+json";

/// 应用错误类型
///
/// 每个变体对应一个对外可见的 HTTP 状态码，消息即响应体中的 `detail`。
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::UnprocessableEntity(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed(_) => 405,
            Self::BadRequest(_) => 400,
            Self::UnprocessableEntity(_) => 422,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// 用于日志与指标的简短分类名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::BadRequest(_) => "bad_request",
            Self::UnprocessableEntity(_) => "unprocessable_entity",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: format!("https://api.clima.dev/problems/{}", self.kind().replace('_', "-")),
            title: self.problem_title().to_string(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
        }
    }

    fn problem_title(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => "Method Not Allowed",
            Self::BadRequest(_) => "Bad Request",
            Self::UnprocessableEntity(_) => "Unprocessable Entity",
            Self::NotFound(_) => "Not Found",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let problem = self.to_problem_details();
        // ProblemDetails 只有字符串和数字字段，序列化不会失败
        let body = serde_json::to_vec(&problem).unwrap_or_default();
        (status, [(header::CONTENT_TYPE, PROBLEM_JSON)], body).into_response()
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
