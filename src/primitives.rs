use crate::canvas::Canvas;
use crate::font::{FontFace, line_height, measure_text_width, wrap_text};
use crate::types::{Color, Pt, Rect, Size};

pub const INK: Color = Color::rgb8(0x11, 0x18, 0x27);
pub const MUTED: Color = Color::rgb8(0x6B, 0x72, 0x80);
pub const RULE: Color = Color::rgb8(0xD1, 0xD5, 0xDB);
pub const HEADER_FILL: Color = Color::rgb8(0x1F, 0x29, 0x37);
pub const SUBTLE_FILL: Color = Color::rgb8(0xF3, 0xF4, 0xF6);
pub const ACCENT: Color = Color::rgb8(0xF9, 0x73, 0x16);

// Bezier control distance for a quarter circle.
const KAPPA_NUM: i32 = 5523;
const KAPPA_DEN: i32 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: Pt,
    pub color: Color,
    pub align: Align,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f32, color: Color) -> Self {
        Self {
            face,
            size: Pt::from_f32(size),
            color,
            align: Align::Left,
        }
    }

    pub fn body() -> Self {
        Self::new(FontFace::Regular, 8.0, INK)
    }

    pub fn label() -> Self {
        Self::new(FontFace::Bold, 8.0, INK)
    }

    pub fn placeholder() -> Self {
        Self::new(FontFace::Oblique, 8.0, MUTED)
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sized(mut self, size: f32) -> Self {
        self.size = Pt::from_f32(size);
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn line_height(&self) -> Pt {
        line_height(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub line_width: Pt,
    pub radius: Pt,
}

impl BoxStyle {
    pub fn outlined(stroke: Color) -> Self {
        Self {
            fill: None,
            stroke: Some(stroke),
            line_width: Pt::from_f32(0.75),
            radius: Pt::ZERO,
        }
    }

    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            stroke: None,
            line_width: Pt::from_f32(0.75),
            radius: Pt::ZERO,
        }
    }

    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn rounded(mut self, radius: f32) -> Self {
        self.radius = Pt::from_f32(radius);
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = Pt::from_f32(width);
        self
    }
}

fn rounded_path(canvas: &mut Canvas, rect: Rect, radius: Pt) {
    let max_radius = rect.width.min(rect.height) / 2;
    let r = radius.min(max_radius).max(Pt::ZERO);
    let k = r.mul_ratio(KAPPA_NUM, KAPPA_DEN);
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.right(), rect.bottom());

    canvas.move_to(x0 + r, y0);
    canvas.line_to(x1 - r, y0);
    canvas.curve_to(x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r);
    canvas.line_to(x1, y1 - r);
    canvas.curve_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
    canvas.line_to(x0 + r, y1);
    canvas.curve_to(x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r);
    canvas.line_to(x0, y0 + r);
    canvas.curve_to(x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0);
    canvas.close_path();
}

fn rect_path(canvas: &mut Canvas, rect: Rect) {
    canvas.move_to(rect.x, rect.y);
    canvas.line_to(rect.right(), rect.y);
    canvas.line_to(rect.right(), rect.bottom());
    canvas.line_to(rect.x, rect.bottom());
    canvas.close_path();
}

pub fn draw_box(canvas: &mut Canvas, rect: Rect, style: BoxStyle) {
    if rect.width <= Pt::ZERO || rect.height <= Pt::ZERO {
        return;
    }
    if style.radius <= Pt::ZERO && style.stroke.is_none() {
        if let Some(fill) = style.fill {
            canvas.set_fill_color(fill);
            canvas.draw_rect(rect.x, rect.y, rect.width, rect.height);
        }
        return;
    }
    if let Some(fill) = style.fill {
        canvas.set_fill_color(fill);
    }
    if let Some(stroke) = style.stroke {
        canvas.set_stroke_color(stroke);
        canvas.set_line_width(style.line_width);
    }
    if style.radius > Pt::ZERO {
        rounded_path(canvas, rect, style.radius);
    } else {
        rect_path(canvas, rect);
    }
    match (style.fill.is_some(), style.stroke.is_some()) {
        (true, true) => canvas.fill_stroke(),
        (true, false) => canvas.fill(),
        (false, true) => canvas.stroke(),
        (false, false) => {}
    }
}

pub fn draw_hline(canvas: &mut Canvas, x0: Pt, x1: Pt, y: Pt, color: Color, width: f32) {
    canvas.set_stroke_color(color);
    canvas.set_line_width(Pt::from_f32(width));
    canvas.move_to(x0, y);
    canvas.line_to(x1, y);
    canvas.stroke();
}

pub fn draw_vline(canvas: &mut Canvas, x: Pt, y0: Pt, y1: Pt, color: Color, width: f32) {
    canvas.set_stroke_color(color);
    canvas.set_line_width(Pt::from_f32(width));
    canvas.move_to(x, y0);
    canvas.line_to(x, y1);
    canvas.stroke();
}

pub fn draw_line(canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, text: &str, style: &TextStyle) {
    if text.is_empty() {
        return;
    }
    let text_width = measure_text_width(style.face, style.size, text);
    let left = match style.align {
        Align::Left => x,
        Align::Center => x + ((width - text_width) / 2).max(Pt::ZERO),
        Align::Right => x + (width - text_width).max(Pt::ZERO),
    };
    canvas.set_fill_color(style.color);
    canvas.set_font_name(style.face.pdf_name());
    canvas.set_font_size(style.size);
    canvas.draw_string(left, y, text);
}

pub fn measure_text_box(width: Pt, text: &str, style: &TextStyle) -> Pt {
    let lines = wrap_text(style.face, style.size, text, width);
    style.line_height() * lines.len() as i32
}

/// Wraps `text` to `width` and draws it from `y` downwards. Returns the y just
/// below the last line.
pub fn draw_text_box(canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, text: &str, style: &TextStyle) -> Pt {
    let lines = wrap_text(style.face, style.size, text, width);
    let lh = style.line_height();
    let mut cursor = y;
    for line in &lines {
        draw_line(canvas, x, cursor, width, line, style);
        cursor += lh;
    }
    cursor
}

pub fn draw_value(
    canvas: &mut Canvas,
    x: Pt,
    y: Pt,
    width: Pt,
    value: Option<&str>,
    style: &TextStyle,
) -> Pt {
    match value {
        Some(text) => draw_text_box(canvas, x, y, width, text, style),
        None => draw_text_box(
            canvas,
            x,
            y,
            width,
            crate::model::PLACEHOLDER_TEXT,
            &TextStyle::placeholder().sized(style.size.to_f32()).aligned(style.align),
        ),
    }
}

pub fn measure_value(width: Pt, value: Option<&str>, style: &TextStyle) -> Pt {
    measure_text_box(width, value.unwrap_or(crate::model::PLACEHOLDER_TEXT), style)
}

fn bullet_indent(style: &TextStyle) -> Pt {
    style.size
}

pub fn measure_bullets(width: Pt, items: &[&str], style: &TextStyle) -> Pt {
    if items.is_empty() {
        return style.line_height();
    }
    let text_width = (width - bullet_indent(style)).max(Pt::from_f32(1.0));
    items
        .iter()
        .map(|item| measure_text_box(text_width, item, style))
        .sum()
}

pub fn draw_bullets(
    canvas: &mut Canvas,
    x: Pt,
    y: Pt,
    width: Pt,
    items: &[&str],
    style: &TextStyle,
) -> Pt {
    if items.is_empty() {
        return draw_value(canvas, x, y, width, None, style);
    }
    let indent = bullet_indent(style);
    let text_width = (width - indent).max(Pt::from_f32(1.0));
    let mut cursor = y;
    for item in items {
        draw_line(canvas, x, cursor, indent, "\u{2022}", &style.aligned(Align::Left));
        cursor = draw_text_box(canvas, x + indent, cursor, text_width, item, &style.aligned(Align::Left));
    }
    cursor
}

pub const BADGE_HEIGHT: f32 = 13.0;
const BADGE_PADDING_X: f32 = 5.0;

pub fn badge_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 7.0, Color::WHITE).aligned(Align::Center)
}

pub fn badge_size(label: &str, max_width: Pt) -> Size {
    let style = badge_style();
    let text = measure_text_width(style.face, style.size, label);
    Size {
        width: (text + Pt::from_f32(BADGE_PADDING_X * 2.0)).min(max_width),
        height: Pt::from_f32(BADGE_HEIGHT),
    }
}

pub fn draw_badge(canvas: &mut Canvas, x: Pt, y: Pt, max_width: Pt, label: &str, fill: Color) -> Size {
    let size = badge_size(label, max_width);
    let rect = Rect::new(x, y, size.width, size.height);
    draw_box(canvas, rect, BoxStyle::filled(fill).rounded(BADGE_HEIGHT / 2.0));
    let style = badge_style();
    // Cap-height centre sits 0.44 em below the line top.
    let text_top = y + size.height / 2 - style.size.mul_ratio(11, 25);
    draw_line(canvas, x, text_top, size.width, label, &style);
    size
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    pub header_fill: Color,
    pub header_text: Color,
    pub border: Color,
    pub body_fill: Option<Color>,
    pub header_size: f32,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            header_fill: HEADER_FILL,
            header_text: Color::WHITE,
            border: RULE,
            body_fill: None,
            header_size: 8.5,
        }
    }
}

const CARD_PADDING: f32 = 5.0;

pub fn card_header_height(width: Pt, title: &str, style: &CardStyle) -> Pt {
    let text_style = TextStyle::new(FontFace::Bold, style.header_size, style.header_text);
    let inner = width - Pt::from_f32(CARD_PADDING * 2.0);
    measure_text_box(inner, title, &text_style) + Pt::from_f32(CARD_PADDING * 2.0)
}

/// Draws a card: coloured header bar with a bold label over a bordered body.
/// Returns the y at which body content may start.
pub fn draw_card(canvas: &mut Canvas, rect: Rect, title: &str, style: &CardStyle) -> Pt {
    let header_height = card_header_height(rect.width, title, style).min(rect.height);
    let body = Rect::new(rect.x, rect.y, rect.width, rect.height);
    let body_style = match style.body_fill {
        Some(fill) => BoxStyle::filled(fill).with_stroke(style.border),
        None => BoxStyle::outlined(style.border),
    };
    draw_box(canvas, body, body_style.rounded(3.0));
    draw_box(
        canvas,
        Rect::new(rect.x, rect.y, rect.width, header_height),
        BoxStyle::filled(style.header_fill).rounded(3.0),
    );
    let pad = Pt::from_f32(CARD_PADDING);
    let text_style = TextStyle::new(FontFace::Bold, style.header_size, style.header_text);
    draw_text_box(
        canvas,
        rect.x + pad,
        rect.y + pad,
        rect.width - pad * 2,
        title,
        &text_style,
    );
    rect.y + header_height + pad
}

pub fn card_padding() -> Pt {
    Pt::from_f32(CARD_PADDING)
}

pub fn draw_header_row(
    canvas: &mut Canvas,
    x: Pt,
    y: Pt,
    widths: &[Pt],
    titles: &[&str],
    fill: Color,
    style: &TextStyle,
    padding: Pt,
) -> Pt {
    let height = header_row_height(widths, titles, style, padding);
    let total: Pt = widths.iter().sum();
    draw_box(canvas, Rect::new(x, y, total, height), BoxStyle::filled(fill));
    let mut cursor_x = x;
    for (width, title) in widths.iter().zip(titles) {
        draw_text_box(
            canvas,
            cursor_x + padding,
            y + padding,
            *width - padding * 2,
            title,
            style,
        );
        cursor_x += *width;
    }
    height
}

pub fn header_row_height(widths: &[Pt], titles: &[&str], style: &TextStyle, padding: Pt) -> Pt {
    let tallest = widths
        .iter()
        .zip(titles)
        .map(|(width, title)| measure_text_box(*width - padding * 2, title, style))
        .fold(Pt::ZERO, Pt::max);
    tallest + padding * 2
}

pub fn draw_field(canvas: &mut Canvas, x: Pt, y: Pt, width: Pt, label: &str, value: Option<&str>) -> Pt {
    let label_style = TextStyle::new(FontFace::Bold, 6.5, MUTED);
    let after_label = draw_text_box(canvas, x, y, width, &label.to_ascii_uppercase(), &label_style);
    draw_value(canvas, x, after_label, width, value, &TextStyle::body().sized(9.0))
}

pub fn measure_field(width: Pt, label: &str, value: Option<&str>) -> Pt {
    let label_style = TextStyle::new(FontFace::Bold, 6.5, MUTED);
    measure_text_box(width, &label.to_ascii_uppercase(), &label_style)
        + measure_value(width, value, &TextStyle::body().sized(9.0))
}
