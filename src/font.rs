use crate::types::Pt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

impl FontFace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Oblique => "Helvetica-Oblique",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Some(FontFace::Regular),
            "helvetica-bold" => Some(FontFace::Bold),
            "helvetica-oblique" => Some(FontFace::Oblique),
            _ => None,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontFace::Bold)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontFace::Oblique)
    }
}

// AFM advance widths (1/1000 em) for U+0020..=U+007E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

fn advance(face: FontFace, ch: char) -> u16 {
    let table = match face {
        FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
        FontFace::Regular | FontFace::Oblique => &HELVETICA_WIDTHS,
    };
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        table[(code - 0x20) as usize]
    } else {
        match ch {
            '\u{2022}' => 350,
            '\u{2013}' => 556,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => 222,
            '\u{201C}' | '\u{201D}' => 333,
            '\u{00A0}' => 278,
            _ => FALLBACK_WIDTH,
        }
    }
}

pub fn measure_text_width(face: FontFace, font_size: Pt, text: &str) -> Pt {
    let units: i64 = text.chars().map(|ch| advance(face, ch) as i64).sum();
    let milli = (font_size.to_milli_i64() as i128 * units as i128 + 500) / 1000;
    Pt::from_milli_i64(milli as i64)
}

pub fn line_height(font_size: Pt) -> Pt {
    font_size.mul_ratio(6, 5)
}

pub fn baseline_offset(font_size: Pt) -> Pt {
    font_size.mul_ratio(4, 5)
}

fn split_long_word_by_width(face: FontFace, font_size: Pt, word: &str, max_width: Pt) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure_text_width(face, font_size, &candidate) > max_width {
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

// Greedy word wrap. Explicit newlines start a new line; words wider than
// `max_width` are broken by character. Never returns an empty vector.
pub fn wrap_text(face: FontFace, font_size: Pt, text: &str, max_width: Pt) -> Vec<String> {
    let max_width = max_width.max(Pt::from_f32(1.0));
    let space = measure_text_width(face, font_size, " ");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = Pt::ZERO;
        for word in paragraph.split_whitespace() {
            let word_width = measure_text_width(face, font_size, word);
            let pieces = if word_width > max_width {
                split_long_word_by_width(face, font_size, word, max_width)
            } else {
                vec![word.to_string()]
            };
            for piece in pieces {
                let piece_width = measure_text_width(face, font_size, &piece);
                if line.is_empty() {
                    line = piece;
                    line_width = piece_width;
                } else if line_width + space + piece_width <= max_width {
                    line.push(' ');
                    line.push_str(&piece);
                    line_width = line_width + space + piece_width;
                } else {
                    lines.push(std::mem::take(&mut line));
                    line = piece;
                    line_width = piece_width;
                }
            }
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths_match_afm() {
        let size = Pt::from_f32(10.0);
        // H=722 e=556 l=222 l=222 o=556 -> 2278 units.
        assert_eq!(measure_text_width(FontFace::Regular, size, "Hello").to_milli_i64(), 22_780);
        assert!(
            measure_text_width(FontFace::Bold, size, "Hello")
                > measure_text_width(FontFace::Regular, size, "Hello")
        );
    }

    #[test]
    fn wrap_respects_width_and_keeps_every_word() {
        let size = Pt::from_f32(8.0);
        let text = "Use exclusion zones around the swing radius of the excavator at all times";
        let lines = wrap_text(FontFace::Regular, size, text, Pt::from_f32(90.0));
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(measure_text_width(FontFace::Regular, size, line) <= Pt::from_f32(90.0));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_breaks_words_longer_than_the_box() {
        let size = Pt::from_f32(8.0);
        let lines = wrap_text(FontFace::Bold, size, "AAAAAAAAAAAAAAAAAAAAAAAAAAAA", Pt::from_f32(30.0));
        assert!(lines.len() > 2);
        assert_eq!(lines.concat(), "AAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn wrap_keeps_explicit_newlines_and_empty_text() {
        let size = Pt::from_f32(8.0);
        let lines = wrap_text(FontFace::Regular, size, "one\ntwo", Pt::from_f32(200.0));
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(wrap_text(FontFace::Regular, size, "", Pt::from_f32(200.0)), vec![String::new()]);
    }

    #[test]
    fn face_names_roundtrip() {
        for face in [FontFace::Regular, FontFace::Bold, FontFace::Oblique] {
            assert_eq!(FontFace::from_name(face.pdf_name()), Some(face));
        }
        assert_eq!(FontFace::from_name("Times-Roman"), None);
    }
}
