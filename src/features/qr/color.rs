use image::Rgb;

/// 解析颜色：CSS 颜色名、`#rgb`/`#rgba`/`#rrggbb`/`#rrggbbaa`、`rgb()`/`rgba()`、
/// `hsl()`/`hsla()`、`hwb()` 等。无法识别时返回 None。
///
/// 输出图片为 RGB，alpha 通道直接丢弃；`transparent` 没有可渲染的颜色，视为无效。
pub fn parse_color(input: &str) -> Option<Rgb<u8>> {
    let value = input.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        return None;
    }

    let color = csscolorparser::parse(value).ok()?;
    let [r, g, b, _] = color.to_rgba8();
    Some(Rgb([r, g, b]))
}
