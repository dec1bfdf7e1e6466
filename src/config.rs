use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（RUST_LOG 未设置时生效）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | compact
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// API 路由前缀（为空时直接挂载在根路径）
    #[serde(default)]
    pub prefix: String,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// AWS S3 或兼容实现
    #[default]
    S3,
    /// 进程内存储（本地调试/测试）
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Memory => "memory",
        }
    }
}

/// 对象存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 存储后端
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket 名称（缺省读取环境变量 BUCKET_NAME）
    #[serde(default = "StorageConfig::default_bucket")]
    pub bucket: String,
    /// 区域（缺省读取环境变量 REGION）
    #[serde(default = "StorageConfig::default_region")]
    pub region: String,
    /// 自定义 S3 端点（MinIO 等兼容实现）
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// 对外访问地址前缀；设置后公开 URL 为 `<public_base_url>/<key>`
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// 是否使用 path-style 寻址
    #[serde(default)]
    pub force_path_style: bool,
}

impl StorageConfig {
    fn default_bucket() -> String {
        std::env::var("BUCKET_NAME").unwrap_or_default()
    }
    fn default_region() -> String {
        std::env::var("REGION").unwrap_or_default()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: Self::default_bucket(),
            region: Self::default_region(),
            endpoint_url: None,
            public_base_url: None,
            force_path_style: false,
        }
    }
}

/// `image.max_image_side` 允许配置的最大值（单张 RGB 图约 768 MiB）
pub const MAX_IMAGE_SIDE_LIMIT: u32 = 16384;

/// 二维码图片编码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// 并发编码许可数（0=自动，取 CPU 核心数）
    #[serde(default)]
    pub max_parallel: u32,
    /// 输出图片边长上限（像素）
    #[serde(default = "ImageConfig::default_max_image_side")]
    pub max_image_side: u32,
}

impl ImageConfig {
    fn default_max_image_side() -> u32 {
        4096
    }

    /// 实际生效的并发许可数
    pub fn effective_parallelism(&self) -> usize {
        match self.max_parallel as usize {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            max_image_side: Self::default_max_image_side(),
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// 对象存储配置
    #[serde(default)]
    pub storage: StorageConfig,
    /// 图片编码配置
    #[serde(default)]
    pub image: ImageConfig,
    /// 优雅退出配置
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    ///
    /// 配置文件可缺省：仅靠环境变量（如 `APP_STORAGE__BUCKET`）也能启动。
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.toml")
    }

    /// 从指定路径加载配置
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::with_name(path).required(false))
            // 支持环境变量覆盖，例如：APP_STORAGE__BUCKET
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验跨字段约束
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::S3 {
            if self.storage.bucket.trim().is_empty() {
                return Err(ConfigError::Message(
                    "storage.bucket 未配置（可通过 BUCKET_NAME 或 APP_STORAGE__BUCKET 设置）"
                        .to_string(),
                ));
            }
            if self.storage.region.trim().is_empty() {
                return Err(ConfigError::Message(
                    "storage.region 未配置（可通过 REGION 或 APP_STORAGE__REGION 设置）"
                        .to_string(),
                ));
            }
        }
        if self.image.max_image_side == 0 || self.image.max_image_side > MAX_IMAGE_SIDE_LIMIT {
            return Err(ConfigError::Message(format!(
                "image.max_image_side 必须在 1..={MAX_IMAGE_SIDE_LIMIT} 之间（当前 {}）",
                self.image.max_image_side
            )));
        }
        Ok(())
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
