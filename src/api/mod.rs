//! API 模块
//!
//! HTTP handlers 和路由组装

pub mod action;
pub mod health;

use axum::{http::Method, http::Uri, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;

/// 构建完整的 API 路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & Info
        .merge(health::router())
        // Actions
        .merge(action::router())
        .fallback(route_not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    tracing::debug!(method = %method, url = %uri, "Route not found");
    ApiError::route_not_found(method.as_str(), uri.to_string())
}
