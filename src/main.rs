use std::future::IntoFuture;

use qr_backend::config::{AppConfig, LoggingConfig};
use qr_backend::features::qr::StorageGateway;
use qr_backend::shutdown::wait_for_signal;
use qr_backend::{AppState, build_app};
use tracing_subscriber::EnvFilter;

/// 初始化日志：RUST_LOG 优先，其次使用配置中的级别
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "qr_backend={level},tower_http={level}",
            level = logging.level
        ))
    });

    if logging.format.eq_ignore_ascii_case("compact") {
        tracing_subscriber::fmt().compact().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            tracing::error!("配置加载失败: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging);
    tracing::info!(
        "配置加载完成: backend = {}, bucket = {:?}, region = {:?}, max_image_side = {}",
        config.storage.backend.as_str(),
        config.storage.bucket,
        config.storage.region,
        config.image.max_image_side
    );

    let storage = StorageGateway::from_config(&config.storage).await;
    let state = AppState::new(storage, &config.image);
    let app = build_app(state, &config.api);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    let prefix = config.api.prefix.trim().trim_matches('/');
    let api_root = if prefix.is_empty() {
        String::new()
    } else {
        format!("/{prefix}")
    };
    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("QR API: http://{}{}/generate", addr, api_root);

    let shutdown_timeout = config.shutdown.timeout_duration();
    let timeout_secs = config.shutdown.timeout_secs;
    let (signal_tx, mut signal_rx) = tokio::sync::watch::channel(false);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let reason = wait_for_signal().await;
            tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);
            let _ = signal_tx.send(true);
        })
        .into_future();

    // 收到信号后开始计时，超时则放弃未完成的请求
    let drain_deadline = async move {
        if signal_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::info!("优雅退出超时时间: {}秒", timeout_secs);
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            tracing::info!("服务器已优雅关闭");
        }
        _ = drain_deadline => {
            tracing::warn!("优雅退出超时，强制退出");
        }
    }
}
