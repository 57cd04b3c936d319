use crate::canvas::Canvas;
use crate::catalog::Catalogs;
use crate::error::RenderError;
use crate::flowable::Block;
use crate::font::FontFace;
use crate::model::CatalogRef;
use crate::primitives::{
    ACCENT, Align, BADGE_HEIGHT, BoxStyle, INK, MUTED, RULE, TextStyle, badge_size, draw_badge,
    draw_box, draw_line, draw_text_box, measure_text_box,
};
use crate::types::{Color, Pt, Rect};
use riskify_catalog::HrcwCategoryDef;
use std::collections::BTreeSet;

const COLUMNS: usize = 4;
const GAP: f32 = 8.0;
const PADDING: f32 = 6.0;
const MIN_CARD_HEIGHT: f32 = 56.0;
pub const APPLIES_LABEL: &str = "APPLIES";

#[derive(Debug, Clone)]
struct Card {
    category: HrcwCategoryDef,
    selected: bool,
}

#[derive(Debug, Clone)]
pub struct HrcwGrid {
    cards: Vec<Card>,
}

fn title_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 8.0, INK)
}

fn description_style() -> TextStyle {
    TextStyle::new(FontFace::Regular, 6.5, MUTED)
}

fn number_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 6.5, MUTED)
}

// Mixes `color` toward white; `amount` is the share of white.
fn tint(color: Color, amount: f32) -> Color {
    let mix = |c: f32| c + (1.0 - c) * amount;
    Color::rgb(mix(color.r), mix(color.g), mix(color.b))
}

impl Card {
    fn highlight(&self) -> Color {
        self.category
            .color
            .as_deref()
            .and_then(Color::from_hex)
            .unwrap_or(ACCENT)
    }

    fn number(&self) -> String {
        format!("HRCW {}", self.category.id)
    }

    fn content_height(&self, width: Pt) -> Pt {
        let inner = width - Pt::from_f32(PADDING * 2.0);
        let top_line = number_style().line_height().max(Pt::from_f32(BADGE_HEIGHT));
        let mut height = top_line + Pt::from_f32(3.0) + measure_text_box(inner, &self.category.title, &title_style());
        if let Some(description) = &self.category.description {
            height += Pt::from_f32(2.0) + measure_text_box(inner, description, &description_style());
        }
        height + Pt::from_f32(PADDING * 2.0)
    }

    fn draw(&self, canvas: &mut Canvas, rect: Rect) {
        let pad = Pt::from_f32(PADDING);
        let inner = rect.width - pad * 2;
        if self.selected {
            let highlight = self.highlight();
            draw_box(
                canvas,
                rect,
                BoxStyle::filled(tint(highlight, 0.88))
                    .with_stroke(highlight)
                    .line_width(1.5)
                    .rounded(4.0),
            );
            let badge = badge_size(APPLIES_LABEL, inner);
            draw_badge(
                canvas,
                rect.right() - pad - badge.width,
                rect.y + pad,
                inner,
                APPLIES_LABEL,
                highlight,
            );
            canvas.meta(crate::META_HRCW_SELECTED_KEY, self.category.id.to_string());
        } else {
            draw_box(canvas, rect, BoxStyle::outlined(RULE).rounded(4.0));
        }

        let top_line = number_style().line_height().max(Pt::from_f32(BADGE_HEIGHT));
        let number_y = rect.y + pad + (top_line - number_style().line_height()) / 2;
        draw_line(canvas, rect.x + pad, number_y, inner, &self.number(), &number_style());

        let title = if self.selected {
            title_style()
        } else {
            title_style().colored(Color::rgb8(0x37, 0x41, 0x51))
        };
        let mut cursor = rect.y + pad + top_line + Pt::from_f32(3.0);
        cursor = draw_text_box(canvas, rect.x + pad, cursor, inner, &self.category.title, &title.aligned(Align::Left));
        if let Some(description) = &self.category.description {
            cursor += Pt::from_f32(2.0);
            draw_text_box(canvas, rect.x + pad, cursor, inner, description, &description_style());
        }
    }
}

impl HrcwGrid {
    pub fn new(catalogs: &Catalogs, selection: &[CatalogRef]) -> Result<Self, RenderError> {
        let selected: BTreeSet<u8> = catalogs.resolve_hrcw_selection(selection)?;
        let mut categories = catalogs.hrcw_categories().to_vec();
        categories.sort_by_key(|c| c.id);
        let cards = categories
            .into_iter()
            .map(|category| Card {
                selected: selected.contains(&category.id),
                category,
            })
            .collect();
        Ok(Self { cards })
    }

    pub fn selected_count(&self) -> usize {
        self.cards.iter().filter(|c| c.selected).count()
    }

    pub fn summary(&self) -> String {
        match self.selected_count() {
            0 => format!(
                "None of the {} high-risk construction work categories were selected for this work.",
                self.cards.len()
            ),
            count => format!(
                "{} of {} categories apply to this work and are highlighted below.",
                count,
                self.cards.len()
            ),
        }
    }

    fn card_width(width: Pt) -> Pt {
        (width - Pt::from_f32(GAP) * (COLUMNS as i32 - 1)) / COLUMNS as i32
    }

    // Every card shares the height of the tallest one.
    fn card_height(&self, width: Pt) -> Pt {
        let card_width = Self::card_width(width);
        self.cards
            .iter()
            .map(|card| card.content_height(card_width))
            .fold(Pt::from_f32(MIN_CARD_HEIGHT), Pt::max)
    }

    fn row_count(&self) -> usize {
        self.cards.len().div_ceil(COLUMNS)
    }
}

impl Block for HrcwGrid {
    fn measure(&self, width: Pt) -> Pt {
        let rows = self.row_count() as i32;
        if rows == 0 {
            return Pt::ZERO;
        }
        self.card_height(width) * rows + Pt::from_f32(GAP) * (rows - 1)
    }

    fn render(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let card_width = Self::card_width(width);
        let card_height = self.card_height(width);
        let gap = Pt::from_f32(GAP);
        for (index, card) in self.cards.iter().enumerate() {
            let column = (index % COLUMNS) as i32;
            let row = (index / COLUMNS) as i32;
            let rect = Rect::new(
                x + (card_width + gap) * column,
                y + (card_height + gap) * row,
                card_width,
                card_height,
            );
            card.draw(canvas, rect);
        }
        y + self.measure(width)
    }

    fn name(&self) -> &'static str {
        "hrcw_grid"
    }
}
