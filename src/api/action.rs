//! 动作 API
//!
//! POST /api/action：`deploy` 触发完整部署流水线，其他动作原样回显

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::domain::action::{ActionRequest, ActionResponse};
use crate::error::{ActionFailure, ApiResult, DeployError};
use crate::services::deploy::naming;
use crate::state::AppState;

/// 创建动作路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/action", post(handle_action))
}

/// 处理动作请求
///
/// 请求体无法解析时同样按 `InvalidRequest` 返回统一错误结构
async fn handle_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> ApiResult<Json<ActionResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        let request_id = naming::request_id();
        tracing::warn!(request_id = %request_id, error = %rejection.body_text(), "Rejected malformed request body");
        ActionFailure {
            request_id,
            action: None,
            link: None,
            error: DeployError::invalid_request(rejection.body_text()),
        }
    })?;

    let response = state.orchestrator.dispatch(request).await?;
    Ok(Json(response))
}
