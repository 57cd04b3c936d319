use crate::canvas::Canvas;
use crate::flowable::{Flowable, Pagination};
use crate::font::FontFace;
use crate::model::PpeStatus;
use crate::primitives::{
    Align, BoxStyle, HEADER_FILL, INK, MUTED, TextStyle, draw_box, draw_text_box,
    measure_text_box,
};
use crate::types::{Color, Pt, Rect, Size};
use riskify_catalog::PpeItemDef;
use std::ops::Range;
use std::sync::Arc;

const COLUMNS: usize = 5;
const GAP: f32 = 8.0;
const PADDING: f32 = 7.0;
const MIN_CARD_HEIGHT: f32 = 50.0;

/// Selected PPE as a five-column grid of equal cards. Required items are
/// filled, recommended items outlined. Splits between card rows.
#[derive(Debug, Clone)]
pub struct PpeGrid {
    items: Arc<Vec<(PpeItemDef, PpeStatus)>>,
    range: Range<usize>,
}

fn label_style(status: PpeStatus) -> TextStyle {
    let color = match status {
        PpeStatus::Required => Color::WHITE,
        PpeStatus::Recommended => INK,
    };
    TextStyle::new(FontFace::Bold, 8.5, color).aligned(Align::Center)
}

fn status_style(status: PpeStatus) -> TextStyle {
    let color = match status {
        PpeStatus::Required => Color::rgb8(0xE5, 0xE7, 0xEB),
        PpeStatus::Recommended => MUTED,
    };
    TextStyle::new(FontFace::Bold, 6.0, color).aligned(Align::Center)
}

fn description_style(status: PpeStatus) -> TextStyle {
    let color = match status {
        PpeStatus::Required => Color::rgb8(0xD1, 0xD5, 0xDB),
        PpeStatus::Recommended => MUTED,
    };
    TextStyle::new(FontFace::Regular, 6.5, color).aligned(Align::Center)
}

impl PpeGrid {
    pub fn new(items: Vec<(PpeItemDef, PpeStatus)>) -> Self {
        let len = items.len();
        Self {
            items: Arc::new(items),
            range: 0..len,
        }
    }

    fn card_width(width: Pt) -> Pt {
        (width - Pt::from_f32(GAP) * (COLUMNS as i32 - 1)) / COLUMNS as i32
    }

    fn content_height(item: &PpeItemDef, status: PpeStatus, width: Pt) -> Pt {
        let inner = width - Pt::from_f32(PADDING * 2.0);
        let mut height = measure_text_box(inner, &status.label().to_ascii_uppercase(), &status_style(status))
            + Pt::from_f32(2.0)
            + measure_text_box(inner, &item.label, &label_style(status));
        if let Some(description) = &item.description {
            height += Pt::from_f32(2.0) + measure_text_box(inner, description, &description_style(status));
        }
        height + Pt::from_f32(PADDING * 2.0)
    }

    fn card_height(&self, width: Pt) -> Pt {
        let card_width = Self::card_width(width);
        self.items
            .iter()
            .map(|(item, status)| Self::content_height(item, *status, card_width))
            .fold(Pt::from_f32(MIN_CARD_HEIGHT), Pt::max)
    }

    fn rows(&self) -> usize {
        self.range.len().div_ceil(COLUMNS)
    }

    fn height_for_rows(&self, rows: usize, width: Pt) -> Pt {
        if rows == 0 {
            return Pt::ZERO;
        }
        let rows = rows as i32;
        self.card_height(width) * rows + Pt::from_f32(GAP) * rows
    }

    fn draw_card(canvas: &mut Canvas, rect: Rect, item: &PpeItemDef, status: PpeStatus) {
        let style = match status {
            PpeStatus::Required => BoxStyle::filled(HEADER_FILL).rounded(4.0),
            PpeStatus::Recommended => BoxStyle::outlined(HEADER_FILL).line_width(1.25).rounded(4.0),
        };
        draw_box(canvas, rect, style);
        canvas.meta(crate::META_PPE_ITEM_KEY, format!("{}:{}", item.id, status.label()));

        let pad = Pt::from_f32(PADDING);
        let inner = rect.width - pad * 2;
        let content = Self::content_height(item, status, rect.width) - pad * 2;
        let mut cursor = rect.y + ((rect.height - content) / 2).max(pad);
        cursor = draw_text_box(
            canvas,
            rect.x + pad,
            cursor,
            inner,
            &status.label().to_ascii_uppercase(),
            &status_style(status),
        );
        cursor += Pt::from_f32(2.0);
        cursor = draw_text_box(canvas, rect.x + pad, cursor, inner, &item.label, &label_style(status));
        if let Some(description) = &item.description {
            cursor += Pt::from_f32(2.0);
            draw_text_box(canvas, rect.x + pad, cursor, inner, description, &description_style(status));
        }
    }
}

impl Flowable for PpeGrid {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        Size {
            width: avail_width,
            height: self.height_for_rows(self.rows(), avail_width),
        }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let row = self.height_for_rows(1, avail_width);
        if row <= Pt::ZERO {
            return None;
        }
        let fits = (avail_height.to_milli_i64() / row.to_milli_i64()).max(0) as usize;
        if fits == 0 || fits >= self.rows() {
            return None;
        }
        let split_at = self.range.start + fits * COLUMNS;
        let first = PpeGrid {
            items: self.items.clone(),
            range: self.range.start..split_at,
        };
        let second = PpeGrid {
            items: self.items.clone(),
            range: split_at..self.range.end,
        };
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let card_width = Self::card_width(avail_width);
        let card_height = self.card_height(avail_width);
        let gap = Pt::from_f32(GAP);
        for (offset, index) in self.range.clone().enumerate() {
            let Some((item, status)) = self.items.get(index) else {
                continue;
            };
            let column = (offset % COLUMNS) as i32;
            let row = (offset / COLUMNS) as i32;
            let rect = Rect::new(
                x + (card_width + gap) * column,
                y + (card_height + gap) * row,
                card_width,
                card_height,
            );
            Self::draw_card(canvas, rect, item, *status);
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        "ppe_grid"
    }
}
