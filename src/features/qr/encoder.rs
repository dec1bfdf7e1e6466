use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode, types::QrError};
use thiserror::Error;

use super::color::parse_color;

/// 二维码编码错误
#[derive(Error, Debug)]
pub enum EncodingError {
    /// 文本超出最大版本容量等符号层错误
    #[error("文本无法编码为二维码: {0}")]
    Symbol(#[from] QrError),

    /// 输出格式不受支持
    #[error("不支持的图片格式: {0}")]
    UnsupportedFormat(String),

    /// 颜色无法解析
    #[error("无效的颜色值: {0}")]
    InvalidColor(String),

    /// 像素尺寸非法（为 0、溢出或超出上限）
    #[error("无效的尺寸参数: {0}")]
    InvalidDimensions(String),

    /// 图片编码器错误
    #[error("图片编码失败: {0}")]
    Image(#[from] image::ImageError),

    /// 阻塞任务执行失败
    #[error("编码任务执行失败: {0}")]
    Task(String),
}

/// 支持的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    /// 无损 WebP
    Webp,
}

impl OutputFormat {
    /// 大小写不敏感地解析格式名称
    pub fn parse(raw: &str) -> Result<Self, EncodingError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PNG" => Ok(OutputFormat::Png),
            "JPEG" | "JPG" => Ok(OutputFormat::Jpeg),
            "GIF" => Ok(OutputFormat::Gif),
            "BMP" => Ok(OutputFormat::Bmp),
            "TIFF" | "TIF" => Ok(OutputFormat::Tiff),
            "WEBP" => Ok(OutputFormat::Webp),
            _ => Err(EncodingError::UnsupportedFormat(raw.to_string())),
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Webp => "image/webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// 编码结果
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// 文件扩展名：请求格式名的小写形式（如 `jpg`/`jpeg` 原样保留）
    pub extension: String,
}

impl EncodedImage {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// 二维码图片编码器。
///
/// 纠错等级固定为 L（约 7% 容错），版本按文本长度自动增长到最小可容纳版本。
#[derive(Debug, Clone)]
pub struct QrEncoder {
    max_image_side: u32,
}

impl QrEncoder {
    pub fn new(max_image_side: u32) -> Self {
        Self { max_image_side }
    }

    /// 将文本编码为指定格式的图片字节。
    ///
    /// - size: 每个模块的像素边长
    /// - border: 静区宽度（模块数）
    pub fn encode(
        &self,
        text: &str,
        size: u32,
        border: u32,
        fill_color: &str,
        back_color: &str,
        format: &str,
    ) -> Result<EncodedImage, EncodingError> {
        let output = OutputFormat::parse(format)?;
        let fill = parse_color(fill_color)
            .ok_or_else(|| EncodingError::InvalidColor(fill_color.to_string()))?;
        let back = parse_color(back_color)
            .ok_or_else(|| EncodingError::InvalidColor(back_color.to_string()))?;
        if size == 0 {
            return Err(EncodingError::InvalidDimensions(
                "size 必须大于 0".to_string(),
            ));
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)?;
        let raster = self.rasterize(&code, size, border, fill, back)?;

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(raster).write_to(&mut out, output.image_format())?;

        Ok(EncodedImage {
            bytes: out.into_inner(),
            format: output,
            extension: format.trim().to_ascii_lowercase(),
        })
    }

    fn rasterize(
        &self,
        code: &QrCode,
        size: u32,
        border: u32,
        fill: Rgb<u8>,
        back: Rgb<u8>,
    ) -> Result<RgbImage, EncodingError> {
        let width = code.width();
        let modules = u32::try_from(width)
            .map_err(|_| EncodingError::InvalidDimensions("模块数溢出".to_string()))?;
        let side = border
            .checked_mul(2)
            .and_then(|b| b.checked_add(modules))
            .and_then(|m| m.checked_mul(size))
            .ok_or_else(|| EncodingError::InvalidDimensions("图片尺寸溢出".to_string()))?;
        if side > self.max_image_side {
            return Err(EncodingError::InvalidDimensions(format!(
                "图片边长 {side}px 超出上限 {}px",
                self.max_image_side
            )));
        }

        let mut img = RgbImage::from_pixel(side, side, back);
        for (idx, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            // idx < width * width，且 width 已确认可放入 u32
            let x0 = ((idx % width) as u32 + border) * size;
            let y0 = ((idx / width) as u32 + border) * size;
            for dy in 0..size {
                for dx in 0..size {
                    img.put_pixel(x0 + dx, y0 + dy, fill);
                }
            }
        }
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::{EncodingError, OutputFormat, QrEncoder};
    use image::{GenericImageView, ImageFormat, Rgba};

    fn encoder() -> QrEncoder {
        QrEncoder::new(4096)
    }

    #[test]
    fn default_png_has_expected_geometry() {
        let img = encoder()
            .encode("hello", 10, 4, "black", "white", "PNG")
            .expect("encode");
        assert_eq!(img.content_type(), "image/png");
        assert_eq!(img.extension, "png");

        let decoded = image::load_from_memory_with_format(&img.bytes, ImageFormat::Png)
            .expect("decode png");
        // 版本 1 = 21 模块，加两侧各 4 模块静区
        assert_eq!(decoded.dimensions(), (290, 290));
        assert_eq!(decoded.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        // 左上角定位图案起点
        assert_eq!(decoded.get_pixel(40, 40), Rgba([0, 0, 0, 255]));
    }

    fn decode_text(bytes: &[u8]) -> String {
        let gray = image::load_from_memory(bytes).expect("decode image").to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
        let (_, content) = grids[0].decode().expect("decode qr");
        content
    }

    #[test]
    fn png_output_decodes_back_to_text() {
        let img = encoder()
            .encode("hello", 4, 4, "black", "white", "PNG")
            .expect("encode");
        assert_eq!(decode_text(&img.bytes), "hello");
    }

    #[test]
    fn larger_version_decodes_back_to_text() {
        let text: String = (0..300).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let img = encoder()
            .encode(&text, 4, 4, "black", "white", "png")
            .expect("encode");
        assert_eq!(decode_text(&img.bytes), text);
    }

    #[test]
    fn jpeg_output_decodes_back_to_text() {
        let img = encoder()
            .encode("hola ñ", 4, 4, "black", "white", "JPEG")
            .expect("encode");
        assert_eq!(decode_text(&img.bytes), "hola ñ");
    }

    #[test]
    fn colored_output_decodes_back_to_text() {
        let img = encoder()
            .encode("colores", 4, 4, "darkblue", "#fffff0", "png")
            .expect("encode");
        assert_eq!(decode_text(&img.bytes), "colores");
    }

    #[test]
    fn version_grows_to_fit_longer_text() {
        let text = "x".repeat(200);
        let img = encoder()
            .encode(&text, 1, 0, "black", "white", "png")
            .expect("encode");
        let decoded = image::load_from_memory(&img.bytes).expect("decode");
        assert!(decoded.width() > 21);
    }

    #[test]
    fn same_input_yields_identical_bytes() {
        let a = encoder()
            .encode("same", 5, 2, "#112233", "ivory", "png")
            .expect("encode a");
        let b = encoder()
            .encode("same", 5, 2, "#112233", "ivory", "png")
            .expect("encode b");
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn format_is_case_insensitive_and_keeps_alias_extension() {
        let img = encoder()
            .encode("hi", 2, 1, "black", "white", "Jpg")
            .expect("encode");
        assert_eq!(img.format, OutputFormat::Jpeg);
        assert_eq!(img.content_type(), "image/jpeg");
        assert_eq!(img.extension, "jpg");
        assert!(image::load_from_memory(&img.bytes).is_ok());
    }

    #[test]
    fn other_formats_encode() {
        for fmt in ["gif", "BMP", "tiff", "webp"] {
            let img = encoder()
                .encode("fmt", 2, 1, "black", "white", fmt)
                .unwrap_or_else(|e| panic!("encode {fmt}: {e}"));
            assert!(!img.bytes.is_empty(), "{fmt} produced no bytes");
        }
    }

    #[test]
    fn rejects_unsupported_format() {
        let err = encoder()
            .encode("hi", 10, 4, "black", "white", "XYZ")
            .expect_err("should fail");
        assert!(matches!(err, EncodingError::UnsupportedFormat(_)));
    }

    #[test]
    fn rejects_invalid_colors() {
        let err = encoder()
            .encode("hi", 10, 4, "blurple", "white", "PNG")
            .expect_err("should fail");
        assert!(matches!(err, EncodingError::InvalidColor(ref c) if c == "blurple"));
    }

    #[test]
    fn rejects_text_beyond_capacity() {
        let text = "a".repeat(3000);
        let err = encoder()
            .encode(&text, 1, 0, "black", "white", "PNG")
            .expect_err("should fail");
        assert!(matches!(err, EncodingError::Symbol(_)));
    }

    #[test]
    fn rejects_zero_and_oversized_dimensions() {
        let err = encoder()
            .encode("hi", 0, 4, "black", "white", "PNG")
            .expect_err("size 0");
        assert!(matches!(err, EncodingError::InvalidDimensions(_)));

        let err = QrEncoder::new(100)
            .encode("hi", 10, 4, "black", "white", "PNG")
            .expect_err("too large");
        assert!(matches!(err, EncodingError::InvalidDimensions(_)));

        let err = encoder()
            .encode("hi", u32::MAX, 4, "black", "white", "PNG")
            .expect_err("overflow");
        assert!(matches!(err, EncodingError::InvalidDimensions(_)));
    }
}
