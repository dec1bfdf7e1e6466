mod color;
pub mod encoder;
pub mod handler;
pub mod key;
pub mod models;
pub mod storage;

// 对外导出路由构建函数，便于 main.rs 引用
pub use handler::create_qr_router;
pub use storage::{MemoryStore, ObjectStore, S3Store, StorageGateway};
