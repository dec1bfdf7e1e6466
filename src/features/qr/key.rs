use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 生成的存储键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    /// 形如 `qr_20240101_120000_1a2b3c4d.png`
    pub filename: String,
    /// 键中的时间戳部分（`%Y%m%d_%H%M%S`）
    pub timestamp: String,
}

/// 由时间（秒级）+ 8 位随机十六进制后缀 + 扩展名派生唯一存储键。
///
/// 同一秒内的多次请求依靠随机后缀区分（碰撞概率可忽略，但并非数学上不可能）。
pub fn derive_key(now: DateTime<Utc>, extension: &str) -> GeneratedKey {
    let timestamp = now.format("%Y%m%d_%H%M%S").to_string();
    let suffix = Uuid::new_v4().simple().to_string();
    GeneratedKey {
        filename: format!("qr_{timestamp}_{}.{extension}", &suffix[..8]),
        timestamp,
    }
}
