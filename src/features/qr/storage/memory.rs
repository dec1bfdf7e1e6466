use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ObjectMeta, ObjectPage, ObjectStore, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    body_len: i64,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// 进程内对象存储：键按字典序保存，与 S3 的列举顺序一致
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前对象数量
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let object = StoredObject {
            body_len: body.len() as i64,
            content_type: content_type.to_string(),
            last_modified: Utc::now(),
        };
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StorageError> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMeta {
            key: key.to_string(),
            size: object.body_len,
            last_modified: Some(object.last_modified),
            content_type: Some(object.content_type.clone()),
        })
    }

    async fn list_objects(&self, prefix: &str, max_keys: i32) -> Result<ObjectPage, StorageError> {
        let limit = usize::try_from(max_keys).unwrap_or(0);
        let objects = self.objects.read().await;
        let mut matching = objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix));

        let entries: Vec<ObjectMeta> = matching
            .by_ref()
            .take(limit)
            .map(|(key, object)| ObjectMeta {
                key: key.clone(),
                size: object.body_len,
                last_modified: Some(object.last_modified),
                content_type: None,
            })
            .collect();
        let truncated = matching.next().is_some();

        Ok(ObjectPage { entries, truncated })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
