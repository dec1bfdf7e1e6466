use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::features::qr::encoder::EncodingError;
use crate::features::qr::models::MSG_QR_NOT_FOUND;
use crate::features::qr::storage::StorageError;
use crate::response::{Envelope, build_response};

/// 500 响应中固定的 `error` 文案（对外契约，保持不变）
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数校验错误（缺失/为空的必填字段、无法解析的请求体）
    #[error("{0}")]
    Validation(String),

    /// 资源不存在
    #[error("{0}")]
    NotFound(String),

    /// 二维码编码错误
    #[error("{0}")]
    Encoding(#[from] EncodingError),

    /// 对象存储错误
    #[error("{0}")]
    Storage(StorageError),

    /// 内部服务器错误
    #[error("{0}")]
    Internal(String),
}

/// 对外错误响应体（400/404 仅包含 error，500 额外携带 message）
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Error interno del servidor")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AppError {
    /// 错误类型到 HTTP 状态码的分派表
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 稳定的错误码，仅用于日志检索
    pub fn stable_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Encoding(_) => "ENCODING_FAILED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 转为统一响应信封。
    ///
    /// 客户端错误直接回显错误文案；服务端错误沿用固定 `error` 文案，
    /// 并在 `message` 中附带底层错误描述。
    pub fn into_envelope(self) -> Envelope {
        let status = self.status_code();
        let payload = if status.is_client_error() {
            json!({ "error": self.to_string() })
        } else {
            json!({ "error": INTERNAL_ERROR_MESSAGE, "message": self.to_string() })
        };
        build_response(status, payload)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound(MSG_QR_NOT_FOUND.to_string()),
            other => AppError::Storage(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_envelope().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use crate::features::qr::encoder::EncodingError;
    use crate::features::qr::storage::StorageError;
    use axum::http::StatusCode;

    #[test]
    fn dispatch_table_maps_each_kind() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(EncodingError::UnsupportedFormat("XYZ".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(StorageError::Backend("denied".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_not_found_becomes_not_found() {
        let err = AppError::from(StorageError::NotFound("qr_missing.png".into()));
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "QR no encontrado");
    }

    #[test]
    fn client_error_envelope_has_only_error_field() {
        let env = AppError::Validation("Filename requerido".into()).into_envelope();
        assert_eq!(env.status_code, 400);
        let v: serde_json::Value = serde_json::from_str(&env.body).expect("parse body");
        assert_eq!(v["error"], "Filename requerido");
        assert!(v.get("message").is_none());
    }

    #[test]
    fn server_error_envelope_exposes_description() {
        let env = AppError::from(StorageError::Backend("AccessDenied".into())).into_envelope();
        assert_eq!(env.status_code, 500);
        let v: serde_json::Value = serde_json::from_str(&env.body).expect("parse body");
        assert_eq!(v["error"], super::INTERNAL_ERROR_MESSAGE);
        assert!(
            v["message"].as_str().unwrap_or("").contains("AccessDenied"),
            "unexpected body: {v}"
        );
    }
}
