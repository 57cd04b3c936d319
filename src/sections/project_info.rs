use crate::canvas::Canvas;
use crate::flowable::Block;
use crate::font::FontFace;
use crate::model::{SwmsDocument, present};
use crate::primitives::{
    BoxStyle, CardStyle, MUTED, RULE, SUBTLE_FILL, TextStyle, card_header_height, card_padding,
    draw_box, draw_card, draw_field, draw_hline, draw_text_box, measure_field, measure_text_box,
};
use crate::types::{Pt, Rect};

const COLUMN_GAP: f32 = 14.0;
const FIELD_GAP: f32 = 5.0;
const MIN_CARD_HEIGHT: f32 = 200.0;

type Field = (&'static str, Option<String>);

fn field(label: &'static str, value: &Option<String>) -> Field {
    (label, present(value).map(str::to_string))
}

#[derive(Debug, Clone)]
pub struct ProjectInfoBlock {
    project: Vec<Field>,
    company: Vec<Field>,
    authorising: Vec<Field>,
}

impl ProjectInfoBlock {
    pub fn from_document(doc: &SwmsDocument) -> Self {
        let p = &doc.project;
        let people = &doc.personnel;
        Self {
            project: vec![
                field("Project name", &p.project_name),
                field("Job number", &p.job_number),
                field("Project address", &p.project_address),
                field("Start date", &p.start_date),
                field("Duration", &p.duration),
                field("Description of work", &p.project_description),
            ],
            company: vec![
                field("Company name", &p.company_name),
                field("Principal contractor", &people.principal_contractor),
                field("Project manager", &people.project_manager),
                field("Site supervisor", &people.site_supervisor),
            ],
            authorising: vec![
                field("Name", &people.authorised_person),
                field("Position", &people.authorised_position),
            ],
        }
    }

    fn column_width(width: Pt) -> Pt {
        (width - Pt::from_f32(COLUMN_GAP)) / 2
    }

    fn fields_height(fields: &[Field], width: Pt) -> Pt {
        let gap = Pt::from_f32(FIELD_GAP);
        fields
            .iter()
            .map(|(label, value)| measure_field(width, label, value.as_deref()) + gap)
            .sum()
    }

    fn draw_fields(canvas: &mut Canvas, fields: &[Field], x: Pt, y: Pt, width: Pt) -> Pt {
        let gap = Pt::from_f32(FIELD_GAP);
        let mut cursor = y;
        for (label, value) in fields {
            cursor = draw_field(canvas, x, cursor, width, label, value.as_deref()) + gap;
        }
        cursor
    }

    fn sub_title_style() -> TextStyle {
        TextStyle::new(FontFace::Bold, 8.0, MUTED)
    }

    // Signature and date lines under the authorising person's details.
    fn signature_height() -> Pt {
        Pt::from_f32(30.0)
    }

    fn authorising_height(&self, width: Pt) -> Pt {
        let pad = card_padding();
        let inner = width - pad * 2;
        pad * 2
            + measure_text_box(inner, "PERSON AUTHORISING", &Self::sub_title_style())
            + Pt::from_f32(4.0)
            + Self::fields_height(&self.authorising, inner)
            + Self::signature_height()
    }

    fn card_heights(&self, width: Pt) -> (Pt, Pt) {
        let style = CardStyle::default();
        let column = Self::column_width(width);
        let pad = card_padding();
        let inner = column - pad * 2;
        let left = card_header_height(column, "Project Details", &style)
            + pad * 2
            + Self::fields_height(&self.project, inner);
        let right = card_header_height(column, "Company & Personnel", &style)
            + pad * 2
            + Self::fields_height(&self.company, inner)
            + self.authorising_height(inner);
        (left, right)
    }

    fn draw_authorising(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let pad = card_padding();
        let height = self.authorising_height(width);
        draw_box(
            canvas,
            Rect::new(x, y, width, height),
            BoxStyle::filled(SUBTLE_FILL).with_stroke(RULE).rounded(2.0),
        );
        let inner_x = x + pad;
        let inner = width - pad * 2;
        let mut cursor = draw_text_box(canvas, inner_x, y + pad, inner, "PERSON AUTHORISING", &Self::sub_title_style());
        cursor += Pt::from_f32(4.0);
        cursor = Self::draw_fields(canvas, &self.authorising, inner_x, cursor, inner);

        let line_y = cursor + Pt::from_f32(16.0);
        let half = (inner - Pt::from_f32(10.0)) / 2;
        draw_hline(canvas, inner_x, inner_x + half, line_y, MUTED, 0.5);
        draw_hline(canvas, inner_x + half + Pt::from_f32(10.0), inner_x + inner, line_y, MUTED, 0.5);
        let caption = TextStyle::new(FontFace::Regular, 6.5, MUTED);
        draw_text_box(canvas, inner_x, line_y + Pt::from_f32(2.0), half, "Signature", &caption);
        draw_text_box(
            canvas,
            inner_x + half + Pt::from_f32(10.0),
            line_y + Pt::from_f32(2.0),
            half,
            "Date",
            &caption,
        );
        y + height
    }
}

impl Block for ProjectInfoBlock {
    fn measure(&self, width: Pt) -> Pt {
        let (left, right) = self.card_heights(width);
        left.max(right).max(Pt::from_f32(MIN_CARD_HEIGHT))
    }

    fn render(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let height = self.measure(width);
        let column = Self::column_width(width);
        let pad = card_padding();
        let inner = column - pad * 2;
        let style = CardStyle::default();

        let left = Rect::new(x, y, column, height);
        let body_y = draw_card(canvas, left, "Project Details", &style);
        Self::draw_fields(canvas, &self.project, x + pad, body_y, inner);

        let right_x = x + column + Pt::from_f32(COLUMN_GAP);
        let right = Rect::new(right_x, y, column, height);
        let body_y = draw_card(canvas, right, "Company & Personnel", &style);
        let cursor = Self::draw_fields(canvas, &self.company, right_x + pad, body_y, inner);
        self.draw_authorising(canvas, right_x + pad, cursor, inner);

        y + height
    }

    fn name(&self) -> &'static str {
        "project_info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PLACEHOLDER_TEXT;
    use crate::types::Size;

    #[test]
    fn missing_fields_render_the_placeholder() {
        let mut doc = SwmsDocument::default();
        doc.project.company_name = Some("Acme Builders".to_string());
        doc.personnel.authorised_person = Some("   ".to_string());
        let block = ProjectInfoBlock::from_document(&doc);
        let mut canvas = Canvas::new(Size::a4_landscape());
        let width = Pt::from_f32(780.0);
        let end = block.render(&mut canvas, Pt::ZERO, Pt::ZERO, width);
        assert_eq!(end, block.measure(width));
        let page = canvas.finish().pages.remove(0);
        assert!(page.contains_text("Acme Builders"));
        assert!(page.contains_text("PERSON AUTHORISING"));
        // Every field except the company name is missing.
        let placeholders = page.texts().filter(|t| *t == PLACEHOLDER_TEXT).count();
        assert_eq!(placeholders, 6 + 3 + 2);
    }
}
