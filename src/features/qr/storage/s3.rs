use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{Builder as S3ConfigBuilder, Region},
    error::DisplayErrorContext,
    primitives::{ByteStream, DateTime as SmithyDateTime},
    types::ObjectCannedAcl,
};
use chrono::{DateTime, Utc};

use super::{ObjectMeta, ObjectPage, ObjectStore, StorageError};
use crate::config::StorageConfig;

/// 基于 aws-sdk-s3 的对象存储（兼容 MinIO 等 S3 协议实现）
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// 从配置创建客户端：凭证走 AWS 默认凭证链，区域/端点按配置覆盖
    pub async fn from_config(cfg: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()));
        if let Some(endpoint) = cfg.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = S3ConfigBuilder::from(&shared)
            .force_path_style(cfg.force_path_style)
            .build();
        Self::new(Client::from_conf(s3_config), cfg.bucket.clone())
    }
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMeta, StorageError> {
        let out = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(out) => out,
            Err(err) => {
                // HeadObject 没有响应体，缺失对象只能通过 404 状态识别
                if let Some(service_err) = err.as_service_error()
                    && service_err.is_not_found()
                {
                    return Err(StorageError::NotFound(key.to_string()));
                }
                return Err(StorageError::Backend(
                    DisplayErrorContext(&err).to_string(),
                ));
            }
        };

        Ok(ObjectMeta {
            key: key.to_string(),
            size: out.content_length().unwrap_or(0),
            last_modified: out.last_modified().and_then(to_chrono),
            content_type: out.content_type().map(str::to_string),
        })
    }

    async fn list_objects(&self, prefix: &str, max_keys: i32) -> Result<ObjectPage, StorageError> {
        let out = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        let entries = out
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?;
                Some(ObjectMeta {
                    key: key.to_string(),
                    size: obj.size().unwrap_or(0),
                    last_modified: obj.last_modified().and_then(to_chrono),
                    content_type: None,
                })
            })
            .collect();

        Ok(ObjectPage {
            entries,
            truncated: out.is_truncated().unwrap_or(false),
        })
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::to_chrono;
    use aws_sdk_s3::primitives::DateTime as SmithyDateTime;

    #[test]
    fn converts_smithy_timestamp_to_chrono() {
        let ts = SmithyDateTime::from_secs_and_nanos(1_704_067_200, 500);
        let converted = to_chrono(&ts).expect("in range");
        assert_eq!(converted.timestamp(), 1_704_067_200);
        assert_eq!(converted.timestamp_subsec_nanos(), 500);
    }
}
