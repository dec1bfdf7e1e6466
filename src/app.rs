use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ApiConfig;
use crate::cors::build_cors_layer;
use crate::features::{health::health_check, qr::create_qr_router};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整的 HTTP 应用：业务路由 + 健康检查 + 文档 + 全局中间件
pub fn build_app(state: AppState, api: &ApiConfig) -> Router {
    let prefix = api.prefix.trim().trim_matches('/');

    let mut router = Router::<AppState>::new().route("/health", get(health_check));
    // axum 不允许在根路径 nest，空前缀时直接 merge
    router = if prefix.is_empty() {
        router.merge(create_qr_router())
    } else {
        router.nest(&format!("/{prefix}"), create_qr_router())
    };

    router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
