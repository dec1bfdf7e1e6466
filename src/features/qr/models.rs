use serde::{Deserialize, Serialize};

/// 请求体缺失
pub const MSG_BODY_REQUIRED: &str = "Body requerido";
/// 缺少 text 参数
pub const MSG_TEXT_REQUIRED: &str = "El parámetro \"text\" es requerido";
/// 缺少 filename 路径参数
pub const MSG_FILENAME_REQUIRED: &str = "Filename requerido";
/// 对象不存在
pub const MSG_QR_NOT_FOUND: &str = "QR no encontrado";
/// 生成成功提示
pub const MSG_GENERATED: &str = "Código QR generado exitosamente";

/// 列表接口默认前缀
pub const DEFAULT_LIST_PREFIX: &str = "qr_";
/// 列表接口默认条数
pub const DEFAULT_LIST_LIMIT: i64 = 20;
/// 单页条数硬上限（与 S3 ListObjectsV2 的调用约定一致）
pub const MAX_LIST_KEYS: i32 = 100;

/// 二维码生成请求体
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerationRequest {
    /// 待编码文本（必填且不能为空）
    #[schema(example = "https://example.com")]
    pub text: String,
    /// 每个模块的像素边长（默认 10）
    #[serde(default = "GenerationRequest::default_size")]
    #[schema(example = 10)]
    pub size: u32,
    /// 静区宽度（模块数，默认 4）
    #[serde(default = "GenerationRequest::default_border")]
    #[schema(example = 4)]
    pub border: u32,
    /// 前景色（默认 black）
    #[serde(default = "GenerationRequest::default_fill_color")]
    #[schema(example = "black")]
    pub fill_color: String,
    /// 背景色（默认 white）
    #[serde(default = "GenerationRequest::default_back_color")]
    #[schema(example = "white")]
    pub back_color: String,
    /// 输出格式（大小写不敏感，默认 PNG）
    #[serde(default = "GenerationRequest::default_format")]
    #[schema(example = "PNG")]
    pub format: String,
}

impl GenerationRequest {
    fn default_size() -> u32 {
        10
    }
    fn default_border() -> u32 {
        4
    }
    fn default_fill_color() -> String {
        "black".to_string()
    }
    fn default_back_color() -> String {
        "white".to_string()
    }
    fn default_format() -> String {
        "PNG".to_string()
    }

    /// 以默认渲染参数构造请求
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: Self::default_size(),
            border: Self::default_border(),
            fill_color: Self::default_fill_color(),
            back_color: Self::default_back_color(),
            format: Self::default_format(),
        }
    }
}

/// 生成成功响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GenerateResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Código QR generado exitosamente")]
    pub message: String,
    /// 公开访问地址
    #[schema(example = "https://my-bucket.s3.us-east-1.amazonaws.com/qr_20240101_120000_1a2b3c4d.png")]
    pub qr_url: String,
    /// 存储键
    #[schema(example = "qr_20240101_120000_1a2b3c4d.png")]
    pub filename: String,
    /// 原样回显的文本
    pub text: String,
    /// 存储键中的时间戳部分
    #[schema(example = "20240101_120000")]
    pub timestamp: String,
}

/// 单个二维码元信息响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QrInfoResponse {
    pub success: bool,
    pub filename: String,
    pub qr_url: String,
    /// 字节数
    pub size: i64,
    /// ISO-8601 时间
    #[schema(example = "2024-01-01T12:00:00+00:00")]
    pub last_modified: Option<String>,
    #[schema(example = "image/png")]
    pub content_type: String,
}

/// 列表项
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QrListItem {
    pub filename: String,
    pub qr_url: String,
    pub size: i64,
    pub last_modified: Option<String>,
}

/// 列表响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QrListResponse {
    pub success: bool,
    pub qrs: Vec<QrListItem>,
    pub count: usize,
    /// 是否还有更多匹配对象未返回
    pub truncated: bool,
}

/// 列表查询参数（均以字符串接收，便于与默认值/错误处理统一）
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 返回条数（默认 20，最大 100）
    pub limit: Option<String>,
    /// 键前缀（默认 qr_）
    pub prefix: Option<String>,
}
