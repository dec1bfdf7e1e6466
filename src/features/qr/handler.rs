use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{BytesRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, ErrorBody};
use crate::response::{Envelope, build_response};
use crate::state::AppState;

use super::encoder::{EncodedImage, EncodingError};
use super::key::derive_key;
use super::models::{
    DEFAULT_LIST_LIMIT, DEFAULT_LIST_PREFIX, GenerateResponse, GenerationRequest, ListQuery,
    MSG_BODY_REQUIRED, MSG_FILENAME_REQUIRED, MSG_GENERATED, MSG_TEXT_REQUIRED, QrInfoResponse,
    QrListItem, QrListResponse,
};
use super::storage::iso8601;

/// 日志中最多记录的文本字符数
const LOG_TEXT_PREVIEW_CHARS: usize = 50;

/// 无法从存储读取到类型时的兜底 Content-Type
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 解析并校验生成请求体。
///
/// 顺序：请求体缺失 → text 缺失/为空 → 其余字段类型。
fn parse_generation_request(body: &[u8]) -> Result<GenerationRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation(MSG_BODY_REQUIRED.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Body inválido: {e}")))?;
    if value.is_null() {
        return Err(AppError::Validation(MSG_BODY_REQUIRED.to_string()));
    }

    let text_missing = match value.get("text") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if text_missing {
        return Err(AppError::Validation(MSG_TEXT_REQUIRED.to_string()));
    }

    serde_json::from_value(value).map_err(|e| AppError::Validation(format!("Body inválido: {e}")))
}

fn text_preview(text: &str) -> String {
    text.chars().take(LOG_TEXT_PREVIEW_CHARS).collect()
}

/// 在阻塞线程池中编码，并发数受信号量限制
async fn encode_blocking(
    state: &AppState,
    req: &GenerationRequest,
) -> Result<EncodedImage, AppError> {
    let _permit = Arc::clone(&state.encode_semaphore)
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("获取编码许可失败: {e}")))?;

    let encoder = Arc::clone(&state.encoder);
    let req = req.clone();
    let encoded = tokio::task::spawn_blocking(move || {
        encoder.encode(
            &req.text,
            req.size,
            req.border,
            &req.fill_color,
            &req.back_color,
            &req.format,
        )
    })
    .await
    .map_err(|e| EncodingError::Task(e.to_string()))??;
    Ok(encoded)
}

/// 生成二维码：校验 → 编码 → 派生存储键 → 写入存储 → 返回公开地址
pub async fn generate_qr(state: &AppState, body: &[u8]) -> Result<GenerateResponse, AppError> {
    let req = parse_generation_request(body)?;
    tracing::info!("生成二维码: {}...", text_preview(&req.text));

    let encoded = encode_blocking(state, &req).await?;
    let key = derive_key(Utc::now(), &encoded.extension);
    let content_type = encoded.content_type();
    let qr_url = state
        .storage
        .put(&key.filename, encoded.bytes, content_type)
        .await?;

    tracing::info!("二维码生成成功: {}", qr_url);

    Ok(GenerateResponse {
        success: true,
        message: MSG_GENERATED.to_string(),
        qr_url,
        filename: key.filename,
        text: req.text,
        timestamp: key.timestamp,
    })
}

/// 查询单个二维码的元信息
pub async fn get_qr_info(
    state: &AppState,
    filename: Option<&str>,
) -> Result<QrInfoResponse, AppError> {
    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::Validation(MSG_FILENAME_REQUIRED.to_string()))?;

    let meta = state.storage.head(filename).await?;

    Ok(QrInfoResponse {
        success: true,
        filename: filename.to_string(),
        qr_url: state.storage.public_url(filename),
        size: meta.size,
        last_modified: meta.last_modified.as_ref().map(iso8601),
        content_type: meta
            .content_type
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
    })
}

/// 按前缀列出二维码，单页最多 100 条
pub async fn list_qrs(state: &AppState, query: &ListQuery) -> Result<QrListResponse, AppError> {
    let limit = match query.limit.as_deref() {
        None => DEFAULT_LIST_LIMIT,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|e| AppError::Internal(format!("limit 参数无效 ({raw}): {e}")))?,
    };
    let prefix = query.prefix.as_deref().unwrap_or(DEFAULT_LIST_PREFIX);

    let page = state.storage.list(prefix, limit).await?;
    let qrs: Vec<QrListItem> = page
        .entries
        .into_iter()
        .map(|obj| QrListItem {
            qr_url: state.storage.public_url(&obj.key),
            size: obj.size,
            last_modified: obj.last_modified.as_ref().map(iso8601),
            filename: obj.key,
        })
        .collect();

    Ok(QrListResponse {
        success: true,
        count: qrs.len(),
        qrs,
        truncated: page.truncated,
    })
}

/// 将处理结果转为统一响应信封；服务端错误记 error 日志
fn respond<T: Serialize>(context: &str, result: Result<T, AppError>) -> Envelope {
    let payload = result.and_then(|v| {
        serde_json::to_value(v).map_err(|e| AppError::Internal(format!("响应序列化失败: {e}")))
    });
    match payload {
        Ok(payload) => build_response(StatusCode::OK, payload),
        Err(err) => {
            if err.status_code().is_server_error() {
                tracing::error!(code = err.stable_code(), "{}: {}", context, err);
            } else {
                tracing::debug!(code = err.stable_code(), "{}: {}", context, err);
            }
            err.into_envelope()
        }
    }
}

#[utoipa::path(
    post,
    path = "/generate",
    summary = "生成二维码",
    description = "将 text 编码为二维码图片（纠错等级 L，版本自动适配），写入对象存储（公开可读）并返回公开地址。",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "生成成功", body = GenerateResponse),
        (status = 400, description = "请求体缺失或 text 为空", body = ErrorBody),
        (status = 500, description = "编码或存储失败", body = ErrorBody)
    ),
    tag = "QR"
)]
pub async fn post_generate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Envelope {
    let result = match body {
        Ok(body) => generate_qr(&state, &body).await,
        Err(rejection) => Err(AppError::Validation(format!(
            "Body inválido: {}",
            rejection.body_text()
        ))),
    };
    respond("生成二维码失败", result)
}

#[utoipa::path(
    get,
    path = "/info/{filename}",
    summary = "查询二维码信息",
    description = "按存储键查询对象元信息（大小、最后修改时间、Content-Type）。",
    params(("filename" = String, Path, description = "存储键，如 qr_20240101_120000_1a2b3c4d.png")),
    responses(
        (status = 200, description = "查询成功", body = QrInfoResponse),
        (status = 400, description = "缺少 filename", body = ErrorBody),
        (status = 404, description = "对象不存在", body = ErrorBody),
        (status = 500, description = "存储错误", body = ErrorBody)
    ),
    tag = "QR"
)]
pub async fn get_info(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>,
) -> Envelope {
    let result = match filename {
        Ok(Path(filename)) => get_qr_info(&state, Some(&filename)).await,
        Err(rejection) => Err(AppError::Validation(format!(
            "Filename inválido: {}",
            rejection.body_text()
        ))),
    };
    respond("获取二维码信息失败", result)
}

/// `/info` 未携带 filename 时的兜底路由
pub async fn get_info_missing(State(state): State<AppState>) -> Envelope {
    respond("获取二维码信息失败", get_qr_info(&state, None).await)
}

#[utoipa::path(
    get,
    path = "/list",
    summary = "列出二维码",
    description = "按前缀（默认 qr_）列出已生成的二维码；limit 默认 20，超过 100 按 100 处理。",
    params(ListQuery),
    responses(
        (status = 200, description = "列表", body = QrListResponse),
        (status = 500, description = "存储错误或参数无效", body = ErrorBody)
    ),
    tag = "QR"
)]
pub async fn get_list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Envelope {
    // 列表接口的任何失败都按 500 处理，查询串解析失败也不例外
    let result = match query {
        Ok(Query(query)) => list_qrs(&state, &query).await,
        Err(rejection) => Err(AppError::Internal(format!(
            "查询参数无效: {}",
            rejection.body_text()
        ))),
    };
    respond("列出二维码失败", result)
}

pub fn create_qr_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/generate", post(post_generate))
        .route("/info", get(get_info_missing))
        .route("/info/", get(get_info_missing))
        .route("/info/:filename", get(get_info))
        .route("/list", get(get_list))
}
