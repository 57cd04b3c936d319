use crate::canvas::Canvas;
use crate::flowable::Block;
use crate::font::FontFace;
use crate::primitives::{
    Align, BoxStyle, HEADER_FILL, INK, MUTED, RULE, SUBTLE_FILL, TextStyle, draw_box,
    draw_header_row, draw_hline, draw_text_box, header_row_height, measure_text_box,
};
use crate::risk::{RiskScale, RiskTier, classify};
use crate::types::{Color, Pt, Rect};

const LIKELIHOOD: [(&str, &str); 5] = [
    ("Rare", "May occur only in exceptional circumstances"),
    ("Unlikely", "Could occur at some time"),
    ("Possible", "Might occur at some time"),
    ("Likely", "Will probably occur in most circumstances"),
    ("Almost certain", "Expected to occur in most circumstances"),
];

const CONSEQUENCE: [(&str, &str); 5] = [
    ("Insignificant", "No injury; negligible damage"),
    ("Minor", "First aid treatment; minor damage"),
    ("Moderate", "Medical treatment or restricted duties"),
    ("Major", "Serious injury, lost time or hospitalisation"),
    ("Catastrophic", "Fatality or permanent disability"),
];

const COLUMN_GAP: f32 = 16.0;
const TABLE_GAP: f32 = 12.0;
const PADDING: f32 = 4.0;
const CELL_HEIGHT: f32 = 30.0;
const AXIS_WIDTH: f32 = 78.0;
const LEGEND_GAP: f32 = 10.0;
const SWATCH: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct RiskMatrixBlock {
    scale: RiskScale,
}

fn reference_widths(width: Pt) -> [Pt; 3] {
    let level = width.mul_ratio(12, 100);
    let name = width.mul_ratio(28, 100);
    [level, name, width - level - name]
}

fn header_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 8.0, Color::WHITE)
}

fn reference_row_height(widths: &[Pt; 3], name: &str, description: &str) -> Pt {
    let pad = Pt::from_f32(PADDING);
    let body = TextStyle::body();
    let tallest = measure_text_box(widths[1] - pad * 2, name, &TextStyle::label())
        .max(measure_text_box(widths[2] - pad * 2, description, &body))
        .max(body.line_height());
    tallest + pad * 2
}

fn reference_table_height(width: Pt, titles: &[&str; 3], rows: &[(&str, &str); 5]) -> Pt {
    let widths = reference_widths(width);
    let pad = Pt::from_f32(PADDING);
    let header = header_row_height(&widths, titles, &header_style(), pad);
    header
        + rows
            .iter()
            .map(|(name, description)| reference_row_height(&widths, name, description))
            .sum::<Pt>()
}

fn draw_reference_table(
    canvas: &mut Canvas,
    x: Pt,
    y: Pt,
    width: Pt,
    titles: &[&str; 3],
    rows: &[(&str, &str); 5],
) -> Pt {
    let widths = reference_widths(width);
    let pad = Pt::from_f32(PADDING);
    let mut cursor = y + draw_header_row(canvas, x, y, &widths, titles, HEADER_FILL, &header_style(), pad);
    for (index, (name, description)) in rows.iter().enumerate() {
        let height = reference_row_height(&widths, name, description);
        if index % 2 == 1 {
            draw_box(canvas, Rect::new(x, cursor, width, height), BoxStyle::filled(SUBTLE_FILL));
        }
        let level = (index + 1).to_string();
        draw_text_box(
            canvas,
            x + pad,
            cursor + pad,
            widths[0] - pad * 2,
            &level,
            &TextStyle::label().aligned(Align::Center),
        );
        draw_text_box(canvas, x + widths[0] + pad, cursor + pad, widths[1] - pad * 2, name, &TextStyle::label());
        draw_text_box(
            canvas,
            x + widths[0] + widths[1] + pad,
            cursor + pad,
            widths[2] - pad * 2,
            description,
            &TextStyle::body(),
        );
        cursor += height;
        draw_hline(canvas, x, x + width, cursor, RULE, 0.5);
    }
    cursor
}

fn cell_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 7.5, Color::WHITE).aligned(Align::Center)
}

fn axis_style() -> TextStyle {
    TextStyle::new(FontFace::Bold, 7.0, INK)
}

impl RiskMatrixBlock {
    pub fn new(scale: RiskScale) -> Self {
        Self { scale }
    }

    fn split_widths(width: Pt) -> (Pt, Pt) {
        let left = (width - Pt::from_f32(COLUMN_GAP)).mul_ratio(45, 100);
        (left, width - Pt::from_f32(COLUMN_GAP) - left)
    }

    fn left_height(width: Pt) -> Pt {
        reference_table_height(width, &["Level", "Likelihood", "Description"], &LIKELIHOOD)
            + Pt::from_f32(TABLE_GAP)
            + reference_table_height(width, &["Level", "Consequence", "Description"], &CONSEQUENCE)
    }

    fn cell_width(width: Pt) -> Pt {
        (width - Pt::from_f32(AXIS_WIDTH)) / 5
    }

    fn axis_header_height(width: Pt) -> Pt {
        let cell = Self::cell_width(width);
        CONSEQUENCE
            .iter()
            .map(|(name, _)| measure_text_box(cell - Pt::from_f32(PADDING * 2.0), name, &axis_style()))
            .fold(Pt::ZERO, Pt::max)
            + Pt::from_f32(PADDING * 2.0)
    }

    fn legend_height(&self, width: Pt) -> Pt {
        let lines: Pt = RiskTier::ALL
            .iter()
            .map(|tier| measure_text_box(width, &self.legend_text(*tier), &TextStyle::body()))
            .sum();
        lines + TextStyle::body().line_height()
    }

    fn legend_text(&self, tier: RiskTier) -> String {
        let (low, high) = self.scale.band(tier);
        format!("{}: score {} to {}", tier.label(), low, high)
    }

    fn right_height(&self, width: Pt) -> Pt {
        Self::axis_header_height(width)
            + Pt::from_f32(CELL_HEIGHT) * 5
            + Pt::from_f32(LEGEND_GAP)
            + self.legend_height(width)
    }

    fn draw_grid(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let pad = Pt::from_f32(PADDING);
        let cell_width = Self::cell_width(width);
        let cell_height = Pt::from_f32(CELL_HEIGHT);
        let header = Self::axis_header_height(width);
        let axis = Pt::from_f32(AXIS_WIDTH);

        draw_box(canvas, Rect::new(x, y, width, header), BoxStyle::filled(SUBTLE_FILL));
        draw_text_box(
            canvas,
            x + pad,
            y + pad,
            axis - pad * 2,
            "Likelihood / Consequence",
            &TextStyle::new(FontFace::Bold, 6.5, MUTED),
        );
        for (column, (name, _)) in CONSEQUENCE.iter().enumerate() {
            let cell_x = x + axis + cell_width * column as i32;
            draw_text_box(
                canvas,
                cell_x + pad,
                y + pad,
                cell_width - pad * 2,
                name,
                &axis_style().aligned(Align::Center),
            );
        }

        // Most likely row on top.
        let mut cursor = y + header;
        for likelihood in (1..=5usize).rev() {
            let (name, _) = LIKELIHOOD[likelihood - 1];
            let label_y = cursor + (cell_height - axis_style().line_height()) / 2;
            draw_text_box(canvas, x + pad, label_y, axis - pad * 2, name, &axis_style());
            for consequence in 1..=5usize {
                let score = self.scale.matrix_score(likelihood, consequence);
                let rating = classify(self.scale, score);
                let cell = Rect::new(
                    x + axis + cell_width * (consequence as i32 - 1),
                    cursor,
                    cell_width,
                    cell_height,
                );
                draw_box(canvas, cell, BoxStyle::filled(rating.color()).with_stroke(Color::WHITE).line_width(1.0));
                let text_y = cursor + (cell_height - cell_style().line_height()) / 2;
                draw_text_box(canvas, cell.x, text_y, cell_width, &rating.badge_text(), &cell_style());
                canvas.meta(
                    crate::META_RISK_CELL_KEY,
                    format!("{}:{}:{}", likelihood, consequence, rating.badge_text()),
                );
            }
            cursor += cell_height;
        }
        cursor
    }

    fn draw_legend(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let style = TextStyle::body();
        let mut cursor = draw_text_box(canvas, x, y, width, "Legend", &TextStyle::label());
        let swatch = Pt::from_f32(SWATCH);
        for tier in RiskTier::ALL {
            let offset = (style.line_height() - swatch) / 2;
            draw_box(canvas, Rect::new(x, cursor + offset, swatch, swatch), BoxStyle::filled(tier.color()).rounded(2.0));
            let text_x = x + swatch + Pt::from_f32(6.0);
            cursor = draw_text_box(canvas, text_x, cursor, width - (text_x - x), &self.legend_text(tier), &style);
        }
        cursor
    }
}

impl Block for RiskMatrixBlock {
    fn measure(&self, width: Pt) -> Pt {
        let (left, right) = Self::split_widths(width);
        Self::left_height(left).max(self.right_height(right))
    }

    fn render(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let (left, right) = Self::split_widths(width);
        let cursor = draw_reference_table(
            canvas,
            x,
            y,
            left,
            &["Level", "Likelihood", "Description"],
            &LIKELIHOOD,
        );
        draw_reference_table(
            canvas,
            x,
            cursor + Pt::from_f32(TABLE_GAP),
            left,
            &["Level", "Consequence", "Description"],
            &CONSEQUENCE,
        );

        let right_x = x + left + Pt::from_f32(COLUMN_GAP);
        let below_grid = self.draw_grid(canvas, right_x, y, right);
        self.draw_legend(canvas, right_x, below_grid + Pt::from_f32(LEGEND_GAP), right);
        y + self.measure(width)
    }

    fn name(&self) -> &'static str {
        "risk_matrix"
    }
}
