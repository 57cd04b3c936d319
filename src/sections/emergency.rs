use crate::canvas::Canvas;
use crate::flowable::{Block, EMPTY_STATE_TEXT};
use crate::font::FontFace;
use crate::model::{SwmsDocument, TextOrList, present};
use crate::primitives::{
    Align, BoxStyle, CardStyle, TextStyle, card_header_height, card_padding, draw_bullets,
    draw_box, draw_card, draw_text_box, draw_value, measure_bullets, measure_text_box,
    measure_value,
};
use crate::risk::RiskTier;
use crate::types::{Color, Pt, Rect};

const BAND_HEIGHT: f32 = 28.0;
const BAND_GAP: f32 = 10.0;
const CARD_GAP: f32 = 10.0;
const MIN_CARD_HEIGHT: f32 = 160.0;
const CONTACT_GAP: f32 = 5.0;

pub const EMERGENCY_BANNER: &str = "IN AN EMERGENCY CALL 000";

#[derive(Debug, Clone, PartialEq)]
struct Contact {
    name: Option<String>,
    phone: Option<String>,
}

/// Emergency page: a call-000 banner over three equal boxes for contacts,
/// procedures and monitoring requirements.
#[derive(Debug, Clone)]
pub struct EmergencyBlock {
    contacts: Vec<Contact>,
    procedures: Vec<String>,
    monitoring: Vec<String>,
}

fn entries(block: &Option<TextOrList>) -> Vec<String> {
    block
        .as_ref()
        .map(|b| b.entries().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

fn empty_style() -> TextStyle {
    TextStyle::new(FontFace::Oblique, 8.0, crate::primitives::MUTED)
}

fn name_style() -> TextStyle {
    TextStyle::label().sized(9.0)
}

fn phone_style() -> TextStyle {
    TextStyle::body().sized(9.0)
}

impl EmergencyBlock {
    pub fn from_document(doc: &SwmsDocument) -> Self {
        let contacts = doc
            .emergency
            .emergency_contacts
            .iter()
            .map(|c| Contact {
                name: present(&c.name).map(str::to_string),
                phone: present(&c.phone).map(str::to_string),
            })
            .filter(|c| c.name.is_some() || c.phone.is_some())
            .collect();
        Self {
            contacts,
            procedures: entries(&doc.emergency.emergency_procedures),
            monitoring: entries(&doc.emergency.emergency_monitoring),
        }
    }

    fn card_width(width: Pt) -> Pt {
        (width - Pt::from_f32(CARD_GAP) * 2) / 3
    }

    fn contacts_height(&self, inner: Pt) -> Pt {
        if self.contacts.is_empty() {
            return measure_text_box(inner, EMPTY_STATE_TEXT, &empty_style());
        }
        self.contacts
            .iter()
            .map(|c| {
                measure_value(inner, c.name.as_deref(), &name_style())
                    + measure_value(inner, c.phone.as_deref(), &phone_style())
                    + Pt::from_f32(CONTACT_GAP)
            })
            .sum()
    }

    fn list_height(items: &[String], inner: Pt) -> Pt {
        if items.is_empty() {
            return measure_text_box(inner, EMPTY_STATE_TEXT, &empty_style());
        }
        let items: Vec<&str> = items.iter().map(String::as_str).collect();
        measure_bullets(inner, &items, &TextStyle::body())
    }

    fn cards_height(&self, width: Pt) -> Pt {
        let card = Self::card_width(width);
        let pad = card_padding();
        let inner = card - pad * 2;
        let style = CardStyle::default();
        let header = ["Emergency Contacts", "Emergency Procedures", "Monitoring Requirements"]
            .iter()
            .map(|title| card_header_height(card, title, &style))
            .fold(Pt::ZERO, Pt::max);
        let body = self
            .contacts_height(inner)
            .max(Self::list_height(&self.procedures, inner))
            .max(Self::list_height(&self.monitoring, inner));
        (header + body + pad * 2).max(Pt::from_f32(MIN_CARD_HEIGHT))
    }

    fn draw_contacts(&self, canvas: &mut Canvas, x: Pt, y: Pt, inner: Pt) {
        if self.contacts.is_empty() {
            draw_text_box(canvas, x, y, inner, EMPTY_STATE_TEXT, &empty_style());
            return;
        }
        let mut cursor = y;
        for contact in &self.contacts {
            cursor = draw_value(canvas, x, cursor, inner, contact.name.as_deref(), &name_style());
            cursor = draw_value(canvas, x, cursor, inner, contact.phone.as_deref(), &phone_style());
            cursor += Pt::from_f32(CONTACT_GAP);
        }
    }

    fn draw_list(canvas: &mut Canvas, items: &[String], x: Pt, y: Pt, inner: Pt) {
        if items.is_empty() {
            draw_text_box(canvas, x, y, inner, EMPTY_STATE_TEXT, &empty_style());
            return;
        }
        let items: Vec<&str> = items.iter().map(String::as_str).collect();
        draw_bullets(canvas, x, y, inner, &items, &TextStyle::body());
    }

    fn banner_color() -> Color {
        RiskTier::Extreme.color()
    }
}

impl Block for EmergencyBlock {
    fn measure(&self, width: Pt) -> Pt {
        Pt::from_f32(BAND_HEIGHT + BAND_GAP) + self.cards_height(width)
    }

    fn render(&self, canvas: &mut Canvas, x: Pt, y: Pt, width: Pt) -> Pt {
        let band = Rect::new(x, y, width, Pt::from_f32(BAND_HEIGHT));
        draw_box(canvas, band, BoxStyle::filled(Self::banner_color()).rounded(3.0));
        let banner_style = TextStyle::new(FontFace::Bold, 13.0, Color::WHITE).aligned(Align::Center);
        let text_y = y + (band.height - banner_style.line_height()) / 2;
        draw_text_box(canvas, x, text_y, width, EMERGENCY_BANNER, &banner_style);

        let top = y + Pt::from_f32(BAND_HEIGHT + BAND_GAP);
        let height = self.cards_height(width);
        let card = Self::card_width(width);
        let pad = card_padding();
        let inner = card - pad * 2;
        let style = CardStyle::default();
        let step = card + Pt::from_f32(CARD_GAP);

        let body_y = draw_card(canvas, Rect::new(x, top, card, height), "Emergency Contacts", &style);
        self.draw_contacts(canvas, x + pad, body_y, inner);

        let second = x + step;
        let body_y = draw_card(canvas, Rect::new(second, top, card, height), "Emergency Procedures", &style);
        Self::draw_list(canvas, &self.procedures, second + pad, body_y, inner);

        let third = x + step * 2;
        let body_y = draw_card(
            canvas,
            Rect::new(third, top, width - step * 2, height),
            "Monitoring Requirements",
            &style,
        );
        Self::draw_list(canvas, &self.monitoring, third + pad, body_y, inner);

        top + height
    }

    fn name(&self) -> &'static str {
        "emergency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EmergencyContact, PLACEHOLDER_TEXT};
    use crate::types::Size;

    fn render(doc: &SwmsDocument) -> (crate::canvas::Page, Pt, Pt) {
        let block = EmergencyBlock::from_document(doc);
        let width = Pt::from_f32(780.0);
        let mut canvas = Canvas::new(Size::a4_landscape());
        let end = block.render(&mut canvas, Pt::ZERO, Pt::ZERO, width);
        (canvas.finish().pages.remove(0), end, block.measure(width))
    }

    #[test]
    fn empty_emergency_data_is_called_out() {
        let (page, end, measured) = render(&SwmsDocument::default());
        assert_eq!(end, measured);
        assert!(page.contains_text(EMERGENCY_BANNER));
        assert_eq!(page.texts().filter(|t| *t == EMPTY_STATE_TEXT).count(), 3);
    }

    #[test]
    fn contacts_keep_order_and_flag_missing_phone() {
        let mut doc = SwmsDocument::default();
        doc.emergency.emergency_contacts = vec![
            EmergencyContact {
                name: Some("Site First Aid".into()),
                phone: Some("0400 111 222".into()),
            },
            EmergencyContact {
                name: Some("Site Supervisor".into()),
                phone: None,
            },
            EmergencyContact::default(),
        ];
        doc.emergency.emergency_procedures = Some(TextOrList::Text("Evacuate\nMuster at gate 2".into()));
        let (page, _, _) = render(&doc);
        let texts: Vec<&str> = page.texts().collect();
        let first = texts.iter().position(|t| *t == "Site First Aid").expect("first contact");
        let second = texts.iter().position(|t| *t == "Site Supervisor").expect("second contact");
        assert!(first < second);
        assert!(page.contains_text(PLACEHOLDER_TEXT));
        assert!(page.contains_text("Muster at gate 2"));
    }

    #[test]
    fn boxes_grow_instead_of_clipping() {
        let mut doc = SwmsDocument::default();
        doc.emergency.emergency_monitoring =
            Some(TextOrList::List((0..30).map(|i| format!("Check gas detector reading {}", i)).collect()));
        let block = EmergencyBlock::from_document(&doc);
        let width = Pt::from_f32(780.0);
        assert!(block.measure(width) > Pt::from_f32(BAND_HEIGHT + BAND_GAP + MIN_CARD_HEIGHT));
    }
}
