use crate::canvas::Canvas;
use crate::primitives::{
    ACCENT, Align, BoxStyle, MUTED, RULE, SUBTLE_FILL, TextStyle, draw_box, draw_text_box,
    measure_text_box,
};
use crate::font::{FontFace, wrap_text};
use crate::types::{Pt, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakBefore {
    Auto,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakInside {
    Auto,
    Avoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub break_before: BreakBefore,
    pub break_inside: BreakInside,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            break_before: BreakBefore::Auto,
            break_inside: BreakInside::Auto,
        }
    }
}

impl Pagination {
    pub fn page_start() -> Self {
        Self {
            break_before: BreakBefore::Page,
            break_inside: BreakInside::Avoid,
            ..Self::default()
        }
    }

    pub fn keep_together() -> Self {
        Self {
            break_inside: BreakInside::Avoid,
            ..Self::default()
        }
    }
}

pub trait Flowable: Send + Sync {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size;
    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)>;
    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt);

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait Block: Send + Sync {
    fn measure(&self, width: Pt) -> Pt;
    fn render(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt;
    fn name(&self) -> &'static str;
}

pub struct BlockFlowable<B> {
    block: B,
    pagination: Pagination,
}

impl<B: Block> BlockFlowable<B> {
    pub fn new(block: B) -> Self {
        Self {
            block,
            pagination: Pagination::keep_together(),
        }
    }
}

impl<B: Block> Flowable for BlockFlowable<B> {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.block.measure(avail_width),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        self.block.render(canvas, x, y, avail_width);
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        self.block.name()
    }
}

#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    style: TextStyle,
    space_after: Pt,
    pagination: Pagination,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::body(),
            space_after: Pt::from_f32(6.0),
            pagination: Pagination::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_space_after(mut self, space: f32) -> Self {
        self.space_after = Pt::from_f32(space);
        self
    }

    fn lines(&self, width: Pt) -> Vec<String> {
        wrap_text(self.style.face, self.style.size, &self.text, width)
    }
}

impl Flowable for Paragraph {
    fn wrap(&self, avail_width: Pt, avail_height: Pt) -> Size {
        let lines = self.lines(avail_width);
        let text_height = self.style.line_height() * lines.len() as i32;
        // Trailing space collapses at the bottom of a frame.
        let height = if text_height <= avail_height {
            (text_height + self.space_after).min(avail_height)
        } else {
            text_height + self.space_after
        };
        Size {
            width: avail_width,
            height,
        }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let lines = self.lines(avail_width);
        let lh = self.style.line_height().to_milli_i64();
        let ah = avail_height.to_milli_i64();
        if lh <= 0 || ah <= 0 {
            return None;
        }
        let max_lines = (ah / lh) as usize;
        if max_lines == 0 || max_lines >= lines.len() {
            return None;
        }
        let first = Paragraph {
            text: lines[..max_lines].join("\n"),
            space_after: Pt::ZERO,
            ..self.clone()
        };
        let second = Paragraph {
            text: lines[max_lines..].join("\n"),
            pagination: Pagination::default(),
            ..self.clone()
        };
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        draw_text_box(canvas, x, y, avail_width, &self.text, &self.style);
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    fn debug_name(&self) -> &'static str {
        "paragraph"
    }
}

#[derive(Debug, Clone)]
pub struct SectionHeading {
    key: &'static str,
    title: String,
    subtitle: Option<String>,
}

const HEADING_SIZE: f32 = 13.0;
const HEADING_GAP: f32 = 8.0;

impl SectionHeading {
    pub fn new(key: &'static str, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    fn title_style() -> TextStyle {
        TextStyle::new(FontFace::Bold, HEADING_SIZE, crate::primitives::INK)
    }

    fn subtitle_style() -> TextStyle {
        TextStyle::new(FontFace::Regular, 8.0, MUTED)
    }

    fn text_width(avail_width: Pt) -> Pt {
        avail_width - Pt::from_f32(10.0)
    }
}

impl Flowable for SectionHeading {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let width = Self::text_width(avail_width);
        let mut height = measure_text_box(width, &self.title, &Self::title_style());
        if let Some(subtitle) = &self.subtitle {
            height += Pt::from_f32(2.0) + measure_text_box(width, subtitle, &Self::subtitle_style());
        }
        Size {
            width: avail_width,
            height: height + Pt::from_f32(HEADING_GAP),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, avail_height: Pt) {
        canvas.meta(crate::META_SECTION_KEY, self.key);
        let size = self.wrap(avail_width, avail_height);
        let bar_height = size.height - Pt::from_f32(HEADING_GAP);
        draw_box(
            canvas,
            Rect::new(x, y, Pt::from_f32(4.0), bar_height),
            BoxStyle::filled(ACCENT),
        );
        let text_x = x + Pt::from_f32(10.0);
        let width = Self::text_width(avail_width);
        let mut cursor = draw_text_box(canvas, text_x, y, width, &self.title, &Self::title_style());
        if let Some(subtitle) = &self.subtitle {
            cursor += Pt::from_f32(2.0);
            draw_text_box(canvas, text_x, cursor, width, subtitle, &Self::subtitle_style());
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::page_start()
    }

    fn debug_name(&self) -> &'static str {
        "section_heading"
    }
}

pub const EMPTY_STATE_TEXT: &str = "No data provided";

#[derive(Debug, Clone)]
pub struct EmptyState {
    key: &'static str,
    detail: Option<String>,
}

impl EmptyState {
    pub fn new(key: &'static str) -> Self {
        Self { key, detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

const EMPTY_STATE_HEIGHT: f32 = 44.0;

impl Flowable for EmptyState {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: Pt::from_f32(EMPTY_STATE_HEIGHT),
        }
    }

    fn split(
        &self,
        _avail_width: Pt,
        _avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        None
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        canvas.meta(crate::META_EMPTY_STATE_KEY, self.key);
        let rect = Rect::new(x, y, avail_width, Pt::from_f32(EMPTY_STATE_HEIGHT - 8.0));
        canvas.save_state();
        canvas.set_dash(vec![Pt::from_f32(3.0), Pt::from_f32(2.0)], Pt::ZERO);
        draw_box(canvas, rect, BoxStyle::filled(SUBTLE_FILL).with_stroke(RULE).rounded(3.0));
        canvas.restore_state();
        let style = TextStyle::new(FontFace::Oblique, 9.0, MUTED).aligned(Align::Center);
        let text = match &self.detail {
            Some(detail) => format!("{} - {}", EMPTY_STATE_TEXT, detail),
            None => EMPTY_STATE_TEXT.to_string(),
        };
        let text_y = y + (rect.height - style.line_height()) / 2;
        draw_text_box(canvas, x, text_y, avail_width, &text, &style);
    }

    fn pagination(&self) -> Pagination {
        Pagination::keep_together()
    }

    fn debug_name(&self) -> &'static str {
        "empty_state"
    }
}
