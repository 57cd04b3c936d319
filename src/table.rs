use crate::canvas::Canvas;
use crate::flowable::{Flowable, Pagination};
use crate::font::FontFace;
use crate::model::clean_list;
use crate::primitives::{
    BoxStyle, HEADER_FILL, MUTED, RULE, SUBTLE_FILL, TextStyle, badge_size, draw_badge,
    draw_box, draw_bullets, draw_header_row, draw_hline, draw_text_box, draw_value, draw_vline,
    header_row_height, measure_bullets, measure_text_box, measure_value,
};
use crate::types::{Color, Pt, Rect, Size};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value { text: Option<String>, strong: bool },
    Bullets(Vec<String>),
    Badge { label: String, fill: Color },
    // Intentionally empty, e.g. sign-in rows completed by hand.
    Blank,
}

impl Cell {
    pub fn value(text: Option<&str>) -> Self {
        Cell::Value {
            text: text.map(str::to_string),
            strong: false,
        }
    }

    pub fn strong(text: Option<&str>) -> Self {
        Cell::Value {
            text: text.map(str::to_string),
            strong: true,
        }
    }

    pub fn bullets(items: &[String]) -> Self {
        Cell::Bullets(clean_list(items.iter().map(String::as_str)).into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub title: String,
    pub weight: u32,
}

impl Column {
    pub fn new(title: impl Into<String>, weight: u32) -> Self {
        Self {
            title: title.into(),
            weight: weight.max(1),
        }
    }
}

#[derive(Debug)]
struct TableData {
    key: &'static str,
    caption: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
    min_row_height: Pt,
    zebra: bool,
}

#[derive(Debug, Clone)]
pub struct TableFlowable {
    data: Arc<TableData>,
    body_range: Range<usize>,
    continued: bool,
}

const CELL_PADDING: f32 = 4.0;
const CAPTION_GAP: f32 = 4.0;

fn body_style(strong: bool) -> TextStyle {
    if strong {
        TextStyle::label()
    } else {
        TextStyle::body()
    }
}

fn header_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 8.0, Color::WHITE)
}

fn caption_style() -> TextStyle {
    TextStyle::new(FontFace::Oblique, 8.0, MUTED)
}

impl TableFlowable {
    pub fn new(key: &'static str, caption: impl Into<String>, columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Self {
        let len = rows.len();
        Self {
            data: Arc::new(TableData {
                key,
                caption: caption.into(),
                columns,
                rows,
                min_row_height: Pt::ZERO,
                zebra: true,
            }),
            body_range: 0..len,
            continued: false,
        }
    }

    pub fn with_min_row_height(mut self, height: f32) -> Self {
        if let Some(data) = Arc::get_mut(&mut self.data) {
            data.min_row_height = Pt::from_f32(height);
        }
        self
    }

    pub fn with_zebra(mut self, enabled: bool) -> Self {
        if let Some(data) = Arc::get_mut(&mut self.data) {
            data.zebra = enabled;
        }
        self
    }

    pub fn column_widths(&self, avail_width: Pt) -> Vec<Pt> {
        let columns = &self.data.columns;
        let total: u32 = columns.iter().map(|c| c.weight).sum();
        if columns.is_empty() || total == 0 {
            return Vec::new();
        }
        let mut widths: Vec<Pt> = columns
            .iter()
            .map(|c| avail_width.mul_ratio(c.weight as i32, total as i32))
            .collect();
        let used: Pt = widths[..widths.len() - 1].iter().sum();
        if let Some(last) = widths.last_mut() {
            *last = avail_width - used;
        }
        widths
    }

    fn titles(&self) -> Vec<&str> {
        self.data.columns.iter().map(|c| c.title.as_str()).collect()
    }

    fn header_height(&self, widths: &[Pt]) -> Pt {
        header_row_height(widths, &self.titles(), &header_style(), Pt::from_f32(CELL_PADDING))
    }

    fn caption_height(&self, avail_width: Pt) -> Pt {
        if !self.continued {
            return Pt::ZERO;
        }
        measure_text_box(avail_width, &self.caption_text(), &caption_style()) + Pt::from_f32(CAPTION_GAP)
    }

    fn caption_text(&self) -> String {
        format!("{} (continued)", self.data.caption)
    }

    fn cell_height(cell: &Cell, width: Pt) -> Pt {
        match cell {
            Cell::Value { text, strong } => measure_value(width, text.as_deref(), &body_style(*strong)),
            Cell::Bullets(items) => {
                let items: Vec<&str> = items.iter().map(String::as_str).collect();
                measure_bullets(width, &items, &body_style(false))
            }
            Cell::Badge { label, .. } => badge_size(label, width).height,
            Cell::Blank => Pt::ZERO,
        }
    }

    pub fn row_height(&self, index: usize, widths: &[Pt]) -> Pt {
        let pad = Pt::from_f32(CELL_PADDING);
        let Some(row) = self.data.rows.get(index) else {
            return Pt::ZERO;
        };
        let tallest = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| Self::cell_height(cell, *width - pad * 2))
            .fold(Pt::ZERO, Pt::max);
        (tallest + pad * 2).max(self.data.min_row_height)
    }

    fn fixed_height(&self, avail_width: Pt, widths: &[Pt]) -> Pt {
        self.caption_height(avail_width) + self.header_height(widths)
    }

    fn draw_cell(canvas: &mut Canvas, cell: &Cell, x: Pt, y: Pt, width: Pt) {
        match cell {
            Cell::Value { text, strong } => {
                draw_value(canvas, x, y, width, text.as_deref(), &body_style(*strong));
            }
            Cell::Bullets(items) => {
                let items: Vec<&str> = items.iter().map(String::as_str).collect();
                draw_bullets(canvas, x, y, width, &items, &body_style(false));
            }
            Cell::Badge { label, fill } => {
                draw_badge(canvas, x, y, width, label, *fill);
            }
            Cell::Blank => {}
        }
    }
}

impl Flowable for TableFlowable {
    fn wrap(&self, avail_width: Pt, _avail_height: Pt) -> Size {
        let widths = self.column_widths(avail_width);
        let rows: Pt = self
            .body_range
            .clone()
            .map(|index| self.row_height(index, &widths))
            .sum();
        Size {
            width: avail_width,
            height: self.fixed_height(avail_width, &widths) + rows,
        }
    }

    fn split(
        &self,
        avail_width: Pt,
        avail_height: Pt,
    ) -> Option<(Box<dyn Flowable>, Box<dyn Flowable>)> {
        let widths = self.column_widths(avail_width);
        let available = avail_height - self.fixed_height(avail_width, &widths);
        if available <= Pt::ZERO {
            return None;
        }

        let start = self.body_range.start;
        let end = self.body_range.end;
        let mut used = Pt::ZERO;
        let mut split_at = start;
        for index in start..end {
            let height = self.row_height(index, &widths);
            if used + height > available {
                break;
            }
            used += height;
            split_at = index + 1;
        }

        if split_at == start || split_at >= end {
            return None;
        }

        let first = TableFlowable {
            data: self.data.clone(),
            body_range: start..split_at,
            continued: self.continued,
        };
        let second = TableFlowable {
            data: self.data.clone(),
            body_range: split_at..end,
            continued: true,
        };
        Some((Box::new(first), Box::new(second)))
    }

    fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt, _avail_height: Pt) {
        let widths = self.column_widths(avail_width);
        let pad = Pt::from_f32(CELL_PADDING);
        let mut cursor = y;

        if self.continued {
            draw_text_box(canvas, x, cursor, avail_width, &self.caption_text(), &caption_style());
            cursor += self.caption_height(avail_width);
        }

        canvas.meta(crate::META_TABLE_HEADER_KEY, self.data.key);
        let table_top = cursor;
        cursor += draw_header_row(
            canvas,
            x,
            cursor,
            &widths,
            &self.titles(),
            HEADER_FILL,
            &header_style(),
            pad,
        );

        for index in self.body_range.clone() {
            let height = self.row_height(index, &widths);
            canvas.meta(crate::META_TABLE_ROW_KEY, format!("{}:{}", self.data.key, index));
            if self.data.zebra && index % 2 == 1 {
                draw_box(canvas, Rect::new(x, cursor, avail_width, height), BoxStyle::filled(SUBTLE_FILL));
            }
            let mut cell_x = x;
            if let Some(row) = self.data.rows.get(index) {
                for (cell, width) in row.iter().zip(&widths) {
                    Self::draw_cell(canvas, cell, cell_x + pad, cursor + pad, *width - pad * 2);
                    cell_x += *width;
                }
            }
            cursor += height;
            draw_hline(canvas, x, x + avail_width, cursor, RULE, 0.5);
        }

        let mut line_x = x;
        draw_vline(canvas, line_x, table_top, cursor, RULE, 0.5);
        for width in &widths {
            line_x += *width;
            draw_vline(canvas, line_x, table_top, cursor, RULE, 0.5);
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::default()
    }

    fn debug_name(&self) -> &'static str {
        self.data.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size as PageSize;

    fn table(rows: Vec<Vec<Cell>>) -> TableFlowable {
        TableFlowable::new(
            "work_activities",
            "Work Activities",
            vec![Column::new("Activity", 1), Column::new("Hazards", 2)],
            rows,
        )
    }

    fn hazards(n: usize) -> Vec<Cell> {
        let items: Vec<String> = (0..n).map(|i| format!("Hazard number {i}")).collect();
        vec![Cell::value(Some("Task")), Cell::bullets(&items)]
    }

    #[test]
    fn row_height_grows_with_the_longest_list() {
        let t = table(vec![hazards(8), hazards(1)]);
        let widths = t.column_widths(Pt::from_f32(600.0));
        assert!(t.row_height(0, &widths) > t.row_height(1, &widths));
    }

    #[test]
    fn column_widths_fill_the_available_width() {
        let t = TableFlowable::new(
            "t",
            "T",
            vec![Column::new("a", 1), Column::new("b", 1), Column::new("c", 1)],
            Vec::new(),
        );
        let widths = t.column_widths(Pt::from_f32(100.0));
        assert_eq!(widths.iter().copied().sum::<Pt>(), Pt::from_f32(100.0));
    }

    #[test]
    fn split_keeps_every_row_exactly_once() {
        let rows: Vec<Vec<Cell>> = (0..20).map(|_| hazards(4)).collect();
        let t = table(rows);
        let width = Pt::from_f32(500.0);
        let mut pending: Box<dyn Flowable> = Box::new(t);
        let mut canvas = Canvas::new(PageSize::a4_landscape());
        let page_height = Pt::from_f32(200.0);
        loop {
            match pending.split(width, page_height) {
                Some((first, rest)) => {
                    assert!(first.wrap(width, page_height).height <= page_height);
                    first.draw(&mut canvas, Pt::ZERO, Pt::ZERO, width, page_height);
                    canvas.show_page();
                    pending = rest;
                }
                None => {
                    pending.draw(&mut canvas, Pt::ZERO, Pt::ZERO, width, page_height);
                    break;
                }
            }
        }
        let doc = canvas.finish();
        assert!(doc.page_count() > 1);
        let rows: Vec<String> = doc
            .pages
            .iter()
            .flat_map(|p| p.meta_values(crate::META_TABLE_ROW_KEY).map(str::to_string).collect::<Vec<_>>())
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("work_activities:{i}")).collect();
        assert_eq!(rows, expected);
        for (index, page) in doc.pages.iter().enumerate() {
            assert_eq!(page.meta_values(crate::META_TABLE_HEADER_KEY).count(), 1);
            assert!(page.contains_text("Hazards"));
            assert_eq!(page.contains_text("(continued)"), index > 0);
        }
    }

    #[test]
    fn split_refuses_when_no_row_fits() {
        let t = table(vec![hazards(30)]);
        assert!(t.split(Pt::from_f32(300.0), Pt::from_f32(60.0)).is_none());
    }
}
