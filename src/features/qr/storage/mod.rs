//! 对象存储网关
//!
//! `ObjectStore` 抽象 put/head/list 三个原语；`StorageGateway` 在其上负责公开 URL 拼装
//! 与单页条数上限，处理器只依赖网关。

mod memory;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

pub use memory::MemoryStore;
pub use s3::S3Store;

use super::models::MAX_LIST_KEYS;

/// 对象存储错误
#[derive(Error, Debug)]
pub enum StorageError {
    /// 对象不存在
    #[error("对象不存在: {0}")]
    NotFound(String),

    /// 后端拒绝请求（权限、配额、网络等）
    #[error("存储后端错误: {0}")]
    Backend(String),
}

/// 单个对象的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
}

/// 列表分页结果
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub entries: Vec<ObjectMeta>,
    /// 是否还有更多匹配对象
    pub truncated: bool,
}

/// 对象存储后端
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 写入对象并设置为公开可读
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// 读取对象元信息；不存在时返回 `StorageError::NotFound`
    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StorageError>;

    /// 按前缀列出对象（按键名字典序），最多 `max_keys` 条
    async fn list_objects(&self, prefix: &str, max_keys: i32) -> Result<ObjectPage, StorageError>;

    /// 后端名称（用于日志与健康检查）
    fn backend_name(&self) -> &'static str;
}

/// 存储网关：包装存储后端，统一公开 URL 的生成规则
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            region: region.into(),
            public_base_url: None,
        }
    }

    /// 使用自定义公开地址前缀（CDN / S3 兼容端点）
    pub fn with_public_base_url(mut self, base: Option<String>) -> Self {
        self.public_base_url = base
            .map(|b| b.trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty());
        self
    }

    /// 根据配置构建网关；S3 客户端在此处创建一次并在整个进程内复用
    pub async fn from_config(cfg: &StorageConfig) -> Self {
        let store: Arc<dyn ObjectStore> = match cfg.backend {
            StorageBackend::S3 => Arc::new(S3Store::from_config(cfg).await),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        tracing::info!(
            "对象存储已就绪: backend={}, bucket={}, region={}",
            store.backend_name(),
            cfg.bucket,
            cfg.region
        );
        Self::new(store, cfg.bucket.clone(), cfg.region.clone())
            .with_public_base_url(cfg.public_base_url.clone())
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// 对象的公开访问地址；put 与后续读取使用同一规则
    pub fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{key}"),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }

    /// 写入对象（公开可读），返回公开 URL
    pub async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.store.put_object(key, body, content_type).await?;
        Ok(self.public_url(key))
    }

    pub async fn head(&self, key: &str) -> Result<ObjectMeta, StorageError> {
        self.store.head_object(key).await
    }

    /// 列出对象；条数被强制限制在 `[0, 100]`，与调用方请求值无关
    pub async fn list(&self, prefix: &str, max_keys: i64) -> Result<ObjectPage, StorageError> {
        let clamped = clamp_max_keys(max_keys);
        let mut page = self.store.list_objects(prefix, clamped).await?;
        // 后端若未遵守 max_keys，这里兜底截断
        let limit = clamped as usize;
        if page.entries.len() > limit {
            page.entries.truncate(limit);
            page.truncated = true;
        }
        Ok(page)
    }
}

/// 将调用方请求的条数限制在硬上限之内
pub fn clamp_max_keys(requested: i64) -> i32 {
    requested.clamp(0, i64::from(MAX_LIST_KEYS)) as i32
}

/// ISO-8601 时间（带时区偏移，如 `2024-01-01T12:00:00+00:00`）
pub fn iso8601(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, StorageGateway, clamp_max_keys, iso8601};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn gateway() -> StorageGateway {
        StorageGateway::new(Arc::new(MemoryStore::new()), "qr-bucket", "eu-west-1")
    }

    #[test]
    fn public_url_follows_bucket_region_template() {
        assert_eq!(
            gateway().public_url("qr_1.png"),
            "https://qr-bucket.s3.eu-west-1.amazonaws.com/qr_1.png"
        );
    }

    #[test]
    fn public_base_url_overrides_template() {
        let gw = gateway().with_public_base_url(Some("https://cdn.example.com/qr/".into()));
        assert_eq!(gw.public_url("a.png"), "https://cdn.example.com/qr/a.png");

        let gw = gateway().with_public_base_url(Some(String::new()));
        assert!(gw.public_url("a.png").starts_with("https://qr-bucket.s3."));
    }

    #[test]
    fn clamp_enforces_ceiling_and_floor() {
        assert_eq!(clamp_max_keys(500), 100);
        assert_eq!(clamp_max_keys(100), 100);
        assert_eq!(clamp_max_keys(20), 20);
        assert_eq!(clamp_max_keys(-3), 0);
        assert_eq!(clamp_max_keys(i64::MAX), 100);
    }

    #[test]
    fn iso8601_uses_offset_form() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid ts");
        assert_eq!(iso8601(&ts), "2024-01-02T03:04:05+00:00");
    }

    #[tokio::test]
    async fn put_returns_public_url_and_head_sees_object() {
        let gw = gateway();
        let url = gw
            .put("qr_x.png", vec![1, 2, 3], "image/png")
            .await
            .expect("put");
        assert!(url.ends_with("/qr_x.png"));

        let meta = gw.head("qr_x.png").await.expect("head");
        assert_eq!(meta.size, 3);
        assert_eq!(meta.content_type.as_deref(), Some("image/png"));
    }
}
