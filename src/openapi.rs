use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

/// 为 Swagger UI 提供正确的“业务接口前缀”Servers 配置。
///
/// - 业务接口前缀对应 `config.api.prefix` / `APP_API__PREFIX`，默认为空（挂载在根路径）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/")
                    .description(Some(
                        "业务接口前缀：对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::qr::handler::post_generate,
        crate::features::qr::handler::get_info,
        crate::features::qr::handler::get_list,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::features::health::handler::HealthResponse,
            crate::features::qr::models::GenerationRequest,
            crate::features::qr::models::GenerateResponse,
            crate::features::qr::models::QrInfoResponse,
            crate::features::qr::models::QrListItem,
            crate::features::qr::models::QrListResponse,
        )
    ),
    modifiers(&ApiServers),
    tags(
        (
            name = "QR",
            description = "二维码：生成并写入对象存储、按键查询元信息、按前缀列出。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "QR Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "二维码生成服务 API（Axum + utoipa）。所有业务响应均携带固定的 JSON/CORS 响应头。"
    )
)]
pub struct ApiDoc;
