//! 统一响应信封
//!
//! 所有业务接口都经由 [`build_response`] 输出：状态码 + 固定响应头 + JSON 文本响应体。

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 允许的跨域请求头
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,X-Amz-Date,Authorization,X-Api-Key";
/// 允许的跨域方法
pub const CORS_ALLOW_METHODS: &str = "GET,POST,OPTIONS";
/// 允许的来源
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// 每个响应都会附带的固定响应头
pub const FIXED_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN),
    ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
    ("Access-Control-Allow-Methods", CORS_ALLOW_METHODS),
];

/// HTTP 风格的响应信封。
///
/// 序列化形态与函数计算平台的代理集成一致：`{"statusCode", "headers", "body"}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub headers: BTreeMap<&'static str, &'static str>,
    /// JSON 文本（非 ASCII 字符保持原样，不做 `\u` 转义）
    pub body: String,
}

/// 组装响应信封：纯函数，不会失败。
pub fn build_response(status: StatusCode, payload: serde_json::Value) -> Envelope {
    Envelope {
        status_code: status.as_u16(),
        headers: FIXED_HEADERS.into_iter().collect(),
        body: payload.to_string(),
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let mut res = Response::new(Body::from(self.body));
        *res.status_mut() =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            // from_bytes 会把名称规范化为小写
            match HeaderName::from_bytes(name.as_bytes()) {
                Ok(name) => {
                    headers.insert(name, HeaderValue::from_static(value));
                }
                Err(_) => tracing::warn!("忽略无效响应头: {}", name),
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::{FIXED_HEADERS, build_response};
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use serde_json::json;

    #[test]
    fn envelope_carries_fixed_headers() {
        let env = build_response(StatusCode::OK, json!({ "success": true }));
        assert_eq!(env.status_code, 200);
        for (name, value) in FIXED_HEADERS {
            assert_eq!(env.headers.get(name), Some(&value));
        }
    }

    #[test]
    fn body_keeps_non_ascii_verbatim() {
        let env = build_response(
            StatusCode::BAD_REQUEST,
            json!({ "error": "El parámetro \"text\" es requerido" }),
        );
        assert!(env.body.contains("parámetro"));
        assert!(!env.body.contains("\\u00e1"));
    }

    #[test]
    fn serializes_as_proxy_integration_shape() {
        let env = build_response(StatusCode::NOT_FOUND, json!({ "error": "QR no encontrado" }));
        let v = serde_json::to_value(&env).expect("serialize envelope");
        assert_eq!(v["statusCode"], 404);
        assert_eq!(v["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(v["body"], "{\"error\":\"QR no encontrado\"}");
    }

    #[test]
    fn into_response_sets_status_and_headers() {
        let resp = build_response(StatusCode::CREATED, json!({})).into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .map(|v| v.as_bytes()),
            Some(&b"GET,POST,OPTIONS"[..])
        );
    }
}
