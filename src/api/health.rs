//! 健康检查和服务信息 API
//!
//! 包含 /, /health 端点

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::config::env::constants::VERSION;
use crate::services::deploy::resolve::{COMPOSE_FILES, DOCKERFILE};
use crate::state::AppState;

/// 工具可用性摘要
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CapabilitySummary {
    version_control_available: bool,
    container_engine_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    compose_command: Option<&'static str>,
}

/// 部署动作说明
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployInfo {
    endpoint: &'static str,
    required_fields: [&'static str; 2],
    supported_files: Vec<&'static str>,
}

/// 服务信息响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    timestamp: String,
    uptime_secs: i64,
    active_deployments: usize,
    repos_dir: String,
    capabilities: CapabilitySummary,
    deploy: DeployInfo,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(service_info))
}

/// 服务信息 - 返回可用工具、版本、运行时间和部署方式说明
///
/// GET /, GET /health
async fn service_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let caps = &state.capabilities;

    let mut supported_files = vec![DOCKERFILE];
    supported_files.extend_from_slice(COMPOSE_FILES);

    Json(InfoResponse {
        status: "ok",
        message: "Zeph infrastructure deploy agent is running",
        version: VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.uptime_secs(),
        active_deployments: state.orchestrator.active_deployments().await,
        repos_dir: state.config.repos_dir.display().to_string(),
        capabilities: CapabilitySummary {
            version_control_available: caps.version_control_available,
            container_engine_available: caps.container_engine_available,
            compose_command: caps.compose_tool.map(|t| t.command()),
        },
        deploy: DeployInfo {
            endpoint: "POST /api/action",
            required_fields: ["action", "link"],
            supported_files,
        },
    })
}
