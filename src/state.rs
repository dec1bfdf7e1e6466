use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::ImageConfig;
use crate::features::qr::{encoder::QrEncoder, storage::StorageGateway};

/// 聚合的应用共享状态（只读，克隆开销为若干 Arc）
#[derive(Clone)]
pub struct AppState {
    /// 对象存储网关（进程内唯一的存储客户端）
    pub storage: Arc<StorageGateway>,
    pub encoder: Arc<QrEncoder>,
    /// 控制并发编码的信号量（限制 CPU 密集型任务数量）
    pub encode_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(storage: StorageGateway, image: &ImageConfig) -> Self {
        Self {
            storage: Arc::new(storage),
            encoder: Arc::new(QrEncoder::new(image.max_image_side)),
            encode_semaphore: Arc::new(Semaphore::new(image.effective_parallelism())),
        }
    }
}
