use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::request_id::REQUEST_ID_HEADER;
use crate::response::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS};

/// 构建 CORS 中间件，主要用于应答 OPTIONS 预检。
///
/// 策略与响应信封中的固定响应头一致：任意来源，GET/POST/OPTIONS，固定的请求头白名单。
pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(parse_methods(CORS_ALLOW_METHODS))
        .allow_headers(parse_header_names(CORS_ALLOW_HEADERS))
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn parse_methods(list: &str) -> Vec<Method> {
    let mut methods = Vec::new();
    for raw in list.split(',') {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        match Method::from_bytes(value.to_ascii_uppercase().as_bytes()) {
            Ok(m) => methods.push(m),
            Err(_) => tracing::warn!("CORS 方法列表含无效值: {}", value),
        }
    }
    methods
}

fn parse_header_names(list: &str) -> Vec<HeaderName> {
    let mut headers = Vec::new();
    for raw in list.split(',') {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        match HeaderName::from_bytes(value.to_ascii_lowercase().as_bytes()) {
            Ok(h) => headers.push(h),
            Err(_) => tracing::warn!("CORS 请求头列表含无效值: {}", value),
        }
    }
    headers
}
