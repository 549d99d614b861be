//! 统一错误处理
//!
//! - `DeployError`：部署流水线中每个失败路径产生的唯一分类错误
//! - `ApiError`：实现 `IntoResponse`，把失败统一转换为 JSON 响应

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 部署错误分类
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DeployErrorKind {
    /// 缺少必需的请求字段
    InvalidRequest,
    /// 所需的外部工具不可用
    ToolUnavailable,
    /// 仓库不存在
    RepositoryNotFound,
    /// 认证或权限失败
    AccessDenied,
    /// 其他拉取失败
    FetchFailed,
    /// 仓库根目录没有可识别的 manifest
    NoDeploymentManifest,
    /// 构建或启动失败
    DeploymentFailed,
}

impl DeployErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployErrorKind::InvalidRequest => "InvalidRequest",
            DeployErrorKind::ToolUnavailable => "ToolUnavailable",
            DeployErrorKind::RepositoryNotFound => "RepositoryNotFound",
            DeployErrorKind::AccessDenied => "AccessDenied",
            DeployErrorKind::FetchFailed => "FetchFailed",
            DeployErrorKind::NoDeploymentManifest => "NoDeploymentManifest",
            DeployErrorKind::DeploymentFailed => "DeploymentFailed",
        }
    }

    /// 面向调用方的概要描述
    pub fn summary(&self) -> &'static str {
        match self {
            DeployErrorKind::InvalidRequest => "Invalid request",
            DeployErrorKind::ToolUnavailable => "Required tool is not available",
            DeployErrorKind::RepositoryNotFound => "Repository not found or does not exist",
            DeployErrorKind::AccessDenied => "Permission denied or authentication failed",
            DeployErrorKind::FetchFailed => "Failed to clone repository",
            DeployErrorKind::NoDeploymentManifest => {
                "Neither Dockerfile nor docker-compose.yml found in repository"
            }
            DeployErrorKind::DeploymentFailed => "Deployment failed",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DeployErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            DeployErrorKind::ToolUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for DeployErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 部署错误
#[derive(Debug, Clone, Error)]
#[error("{kind}: {detail}")]
pub struct DeployError {
    pub kind: DeployErrorKind,
    /// 原始诊断信息（包括构建输出）
    pub detail: String,
}

impl DeployError {
    pub fn new(kind: DeployErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::InvalidRequest, detail)
    }

    pub fn tool_unavailable(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::ToolUnavailable, detail)
    }

    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::FetchFailed, detail)
    }

    pub fn no_manifest(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::NoDeploymentManifest, detail)
    }

    pub fn deployment_failed(detail: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::DeploymentFailed, detail)
    }
}

/// 失败的动作请求，携带关联 ID 与原始输入
#[derive(Debug)]
pub struct ActionFailure {
    pub request_id: String,
    pub action: Option<String>,
    pub link: Option<String>,
    pub error: DeployError,
}

/// API 错误响应结构
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            request_id: None,
            action: None,
            link: None,
        }
    }
}

impl From<&ActionFailure> for ErrorResponse {
    fn from(failure: &ActionFailure) -> Self {
        Self {
            error: failure.error.kind.as_str().to_string(),
            message: failure.error.kind.summary().to_string(),
            details: Some(failure.error.detail.clone()),
            request_id: Some(failure.request_id.clone()),
            action: failure.action.clone(),
            link: failure.link.clone(),
        }
    }
}

/// 统一 API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 404 - 路由不存在
    RouteNotFound { method: String, url: String },
    /// 动作处理失败，状态码由错误分类决定
    Action(Box<ActionFailure>),
}

impl ApiError {
    pub fn route_not_found(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self::RouteNotFound {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn action(failure: ActionFailure) -> Self {
        Self::Action(Box::new(failure))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Action(failure) => failure.error.kind.status_code(),
        }
    }
}

impl From<ActionFailure> for ApiError {
    fn from(failure: ActionFailure) -> Self {
        Self::action(failure)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::RouteNotFound { method, url } => {
                ErrorResponse::new("Route not found", format!("{} {} not found", method, url))
            }
            ApiError::Action(failure) => ErrorResponse::from(failure.as_ref()),
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RouteNotFound { method, url } => {
                write!(f, "Route not found: {} {}", method, url)
            }
            ApiError::Action(failure) => {
                write!(f, "Request {} failed: {}", failure.request_id, failure.error)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// 便捷类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_new() {
        let resp = ErrorResponse::new("test_error", "Test message");
        assert_eq!(resp.error, "test_error");
        assert_eq!(resp.message, "Test message");
        assert!(resp.details.is_none());
    }

    #[test]
    fn test_status_codes_by_kind() {
        assert_eq!(
            DeployErrorKind::InvalidRequest.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DeployErrorKind::ToolUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            DeployErrorKind::DeploymentFailed.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DeployErrorKind::RepositoryNotFound.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_failure_body_carries_kind_and_context() {
        let failure = ActionFailure {
            request_id: "req-1".to_string(),
            action: Some("deploy".to_string()),
            link: Some("https://example.test/r.git".to_string()),
            error: DeployError::tool_unavailable("docker is not available"),
        };
        let body = serde_json::to_value(ErrorResponse::from(&failure)).unwrap();

        assert_eq!(body["error"], "ToolUnavailable");
        assert_eq!(body["details"], "docker is not available");
        assert_eq!(body["requestId"], "req-1");
        assert_eq!(body["link"], "https://example.test/r.git");
    }

    #[test]
    fn test_deploy_error_display() {
        let err = DeployError::fetch_failed("exit 128");
        assert_eq!(err.to_string(), "FetchFailed: exit 128");
    }
}
