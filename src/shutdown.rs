//! 优雅退出信号
//!
//! Unix 下监听 SIGINT/SIGTERM，其他平台监听 Ctrl+C。

use tracing::{error, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 信号监听失败，按立即退出处理
    SignalError,
}

/// 等待退出信号
pub async fn wait_for_signal() -> ShutdownReason {
    #[cfg(unix)]
    {
        wait_for_unix_signal().await
    }

    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await
    }
}

#[cfg(unix)]
async fn wait_for_unix_signal() -> ShutdownReason {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("注册 SIGINT 处理器失败: {}", e);
            return ShutdownReason::SignalError;
        }
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("注册 SIGTERM 处理器失败: {}", e);
            return ShutdownReason::SignalError;
        }
    };

    tokio::select! {
        _ = sigint.recv() => {
            info!("接收到 SIGINT 信号");
            ShutdownReason::Interrupt
        }
        _ = sigterm.recv() => {
            info!("接收到 SIGTERM 信号");
            ShutdownReason::Terminate
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_ctrl_c() -> ShutdownReason {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("接收到 Ctrl+C 信号");
            ShutdownReason::Interrupt
        }
        Err(e) => {
            error!("监听 Ctrl+C 信号失败: {}", e);
            ShutdownReason::SignalError
        }
    }
}
