use crate::graphics::Color;

/// Bézier control-point distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_749_8;

/// Append-only buffer of content stream operators for one page.
///
/// Every method writes one or more operators followed by a newline and
/// returns `&mut Self` so calls can be chained.
#[derive(Debug, Default, Clone)]
pub struct ContentContext {
    ops: Vec<u8>,
}

impl ContentContext {
    pub fn new() -> Self {
        ContentContext::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.ops
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.ops
    }

    fn push(&mut self, line: String) -> &mut Self {
        self.ops.extend_from_slice(line.as_bytes());
        self.ops.push(b'\n');
        self
    }

    /// Save the graphics state (`q`).
    pub fn save_state(&mut self) -> &mut Self {
        self.push("q".to_string())
    }

    /// Restore the graphics state (`Q`).
    pub fn restore_state(&mut self) -> &mut Self {
        self.push("Q".to_string())
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        self.push(format!(
            "{} {} {} rg",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b)
        ))
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.push(format!(
            "{} {} {} RG",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b)
        ))
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.push(format!("{} w", format_coord(width)))
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(format!("{} {} m", format_coord(x), format_coord(y)))
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.push(format!("{} {} l", format_coord(x), format_coord(y)))
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) -> &mut Self {
        self.push(format!(
            "{} {} {} {} {} {} c",
            format_coord(x1),
            format_coord(y1),
            format_coord(x2),
            format_coord(y2),
            format_coord(x3),
            format_coord(y3)
        ))
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.push(format!(
            "{} {} {} {} re",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height)
        ))
    }

    pub fn close_path(&mut self) -> &mut Self {
        self.push("h".to_string())
    }

    pub fn fill(&mut self) -> &mut Self {
        self.push("f".to_string())
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.push("S".to_string())
    }

    pub fn fill_stroke(&mut self) -> &mut Self {
        self.push("B".to_string())
    }

    /// Add a closed circle path centred on `(cx, cy)`.
    /// The caller decides whether to fill or stroke it.
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64) -> &mut Self {
        let k = radius * KAPPA;
        self.move_to(cx + radius, cy)
            .curve_to(cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius)
            .curve_to(cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy)
            .curve_to(cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius)
            .curve_to(cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy)
            .close_path()
    }

    /// Add an open path through `points`. Does nothing for an empty slice.
    pub fn polyline(&mut self, points: &[(f64, f64)]) -> &mut Self {
        if let Some((&(x0, y0), rest)) = points.split_first() {
            self.move_to(x0, y0);
            for &(x, y) in rest {
                self.line_to(x, y);
            }
        }
        self
    }

    /// Write one line of text at `(x, y)` with the font resource `font`.
    pub fn show_text(&mut self, font: &str, size: f64, x: f64, y: f64, text: &str) -> &mut Self {
        self.push("BT".to_string());
        self.push(format!("/{} {} Tf", font, format_coord(size)));
        self.push(format!("{} {} Td", format_coord(x), format_coord(y)));
        self.ops.push(b'(');
        self.ops.extend_from_slice(&encode_text(text));
        self.ops.extend_from_slice(b") Tj\n");
        self.push("ET".to_string())
    }

    /// Paint the XObject `name` into the rectangle `(x, y, width, height)`.
    pub fn draw_xobject(&mut self, name: &str, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.save_state();
        self.push(format!(
            "{} 0 0 {} {} {} cm",
            format_coord(width),
            format_coord(height),
            format_coord(x),
            format_coord(y)
        ));
        self.push(format!("/{} Do", name));
        self.restore_state()
    }
}

/// Format a coordinate value for PDF content streams.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

/// Encode text as single-byte string content for a standard font.
///
/// Latin-1 characters map to their code point; anything wider becomes `?`.
/// Delimiters and backslash are escaped, other control bytes use octal.
pub(crate) fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let byte = u8::try_from(u32::from(c)).unwrap_or(b'?');
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x00..=0x1F | 0x7F => {
                out.extend_from_slice(format!("\\{:03o}", byte).as_bytes());
            }
            _ => out.push(byte),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(ctx: &ContentContext) -> String {
        String::from_utf8_lossy(ctx.as_bytes()).into_owned()
    }

    #[test]
    fn format_coord_values() {
        assert_eq!(format_coord(612.0), "612");
        assert_eq!(format_coord(0.5), "0.5");
        assert_eq!(format_coord(1.0 / 3.0), "0.3333");
        assert_eq!(format_coord(-2.25), "-2.25");
        assert_eq!(format_coord(-0.00001), "0");
    }

    #[test]
    fn color_operators() {
        let mut ctx = ContentContext::new();
        ctx.set_fill_color(Color::rgb(0.0, 0.5, 1.0))
            .set_stroke_color(Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(text(&ctx), "0 0.5 1 rg\n1 0 0 RG\n");
    }

    #[test]
    fn rect_and_fill() {
        let mut ctx = ContentContext::new();
        ctx.rect(50.0, 50.0, 200.0, 100.0).fill();
        assert_eq!(text(&ctx), "50 50 200 100 re\nf\n");
    }

    #[test]
    fn circle_is_four_curves() {
        let mut ctx = ContentContext::new();
        ctx.circle(100.0, 100.0, 10.0).fill();
        let out = text(&ctx);
        assert!(out.starts_with("110 100 m\n"));
        assert_eq!(out.matches(" c\n").count(), 4);
        assert!(out.ends_with("h\nf\n"));
    }

    #[test]
    fn polyline_moves_then_lines() {
        let mut ctx = ContentContext::new();
        ctx.polyline(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]).stroke();
        assert_eq!(text(&ctx), "0 0 m\n10 10 l\n20 0 l\nS\n");
    }

    #[test]
    fn polyline_empty_is_noop() {
        let mut ctx = ContentContext::new();
        ctx.polyline(&[]);
        assert!(ctx.is_empty());
    }

    #[test]
    fn show_text_block() {
        let mut ctx = ContentContext::new();
        ctx.show_text("F1", 12.0, 20.0, 30.0, "Hello");
        assert_eq!(text(&ctx), "BT\n/F1 12 Tf\n20 30 Td\n(Hello) Tj\nET\n");
    }

    #[test]
    fn text_escaping() {
        assert_eq!(encode_text("a(b)c\\d"), b"a\\(b\\)c\\\\d".to_vec());
        assert_eq!(encode_text("tab\there"), b"tab\\011here".to_vec());
        assert_eq!(encode_text("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_text("\u{4e2d}"), b"?".to_vec());
    }

    #[test]
    fn xobject_placement() {
        let mut ctx = ContentContext::new();
        ctx.draw_xobject("Im1", 10.0, 20.0, 100.0, 50.0);
        assert_eq!(text(&ctx), "q\n100 0 0 50 10 20 cm\n/Im1 Do\nQ\n");
    }
}
