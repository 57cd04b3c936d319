use crate::flowable::{Flowable, Paragraph};
use crate::primitives::TextStyle;
use crate::table::{Cell, Column, TableFlowable};

pub const SIGN_IN_TABLE_KEY: &str = "sign_in";

pub const SIGN_IN_DECLARATION: &str = "By signing below I confirm that I have read and understood this Safe Work \
Method Statement, that I have been consulted on its content, and that I will follow the control measures it describes.";

const SIGN_IN_ROW_HEIGHT: f32 = 24.0;

pub fn sign_in_table(rows: usize) -> Vec<Box<dyn Flowable>> {
    let columns = vec![
        Column::new("Name", 30),
        Column::new("Contact Number", 22),
        Column::new("Signature", 30),
        Column::new("Date", 18),
    ];
    let body = (0..rows).map(|_| vec![Cell::Blank; columns.len()]).collect();
    vec![
        Box::new(
            Paragraph::new(SIGN_IN_DECLARATION)
                .with_style(TextStyle::body().sized(9.0))
                .with_space_after(10.0),
        ),
        Box::new(
            TableFlowable::new(SIGN_IN_TABLE_KEY, "Sign-In Register", columns, body)
                .with_min_row_height(SIGN_IN_ROW_HEIGHT)
                .with_zebra(false),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::types::{Pt, Size};

    #[test]
    fn blank_rows_are_drawn_without_text() {
        let parts = sign_in_table(3);
        assert_eq!(parts.len(), 2);
        let mut canvas = Canvas::new(Size::a4_landscape());
        parts[1].draw(&mut canvas, Pt::ZERO, Pt::ZERO, Pt::from_f32(780.0), Pt::from_f32(500.0));
        let page = canvas.finish().pages.remove(0);
        assert_eq!(page.meta_values(crate::META_TABLE_ROW_KEY).count(), 3);
        let texts: Vec<&str> = page.texts().collect();
        assert_eq!(texts, vec!["Name", "Contact Number", "Signature", "Date"]);
    }

    #[test]
    fn rows_have_room_to_sign() {
        let parts = sign_in_table(12);
        let height = parts[1].wrap(Pt::from_f32(780.0), Pt::from_f32(1000.0)).height;
        assert!(height >= Pt::from_f32(SIGN_IN_ROW_HEIGHT) * 12);
    }
}
