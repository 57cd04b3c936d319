use crate::assets::{LOGO_RESOURCE_ID, LogoImage};
use crate::canvas::{Command, Document, Page};
use crate::font::{FontFace, baseline_offset};
use crate::metrics::DocumentMetrics;
use crate::types::{Color, Pt};
use fixed::types::I32F32;

pub const PRODUCER: &str = "Riskify";

const FONT_FACES: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Oblique];
const IMAGE_RESOURCE: &str = "Im1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfOptions {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PdfStats {
    // Characters outside WinAnsi drawn as `?`.
    pub replaced_chars: usize,
    pub fallback_chars: usize,
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Oblique => "F3",
    }
}

pub fn document_to_pdf(document: &Document, logo: Option<&LogoImage>, options: &PdfOptions) -> Vec<u8> {
    document_to_pdf_with_stats(document, logo, options, None).0
}

pub fn document_to_pdf_with_stats(
    document: &Document,
    logo: Option<&LogoImage>,
    options: &PdfOptions,
    metrics: Option<&mut DocumentMetrics>,
) -> (Vec<u8>, PdfStats) {
    let mut stats = PdfStats::default();
    // Fixed object layout: catalog, pages, info, fonts, optional image, then
    // one page object followed by its content stream per page.
    let catalog_id = 1;
    let pages_id = 2;
    let info_id = 3;
    let first_font_id = 4;
    let image_id = logo.map(|_| first_font_id + FONT_FACES.len());
    let first_page_id = first_font_id + FONT_FACES.len() + usize::from(image_id.is_some());

    let page_ids: Vec<usize> = (0..document.pages.len())
        .map(|index| first_page_id + index * 2)
        .collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<String> = Vec::new();
    objects.push(format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id));
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        document.pages.len()
    ));
    objects.push(info_object(options.title.as_deref()));
    for face in FONT_FACES {
        objects.push(font_object(face.pdf_name()));
    }
    if let Some(logo) = logo {
        objects.push(image_object(logo));
    }

    let fonts: Vec<(String, usize)> = FONT_FACES
        .iter()
        .enumerate()
        .map(|(index, face)| (font_resource(*face).to_string(), first_font_id + index))
        .collect();
    let images: Vec<(String, usize)> = image_id
        .map(|id| vec![(IMAGE_RESOURCE.to_string(), id)])
        .unwrap_or_default();
    let mut resources = format!("/Font {}", font_resources(&fonts));
    if !images.is_empty() {
        resources.push_str(&format!(" /XObject {}", xobject_resources(&images)));
    }

    for (index, page) in document.pages.iter().enumerate() {
        let page_id = page_ids[index];
        let content = render_page(page, document.page_size.height, logo.is_some(), &mut stats);
        objects.push(format!(
            "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] /Resources << {} >> /Contents {} 0 R >>",
            pages_id,
            fmt_pt(document.page_size.width),
            fmt_pt(document.page_size.height),
            resources,
            page_id + 1
        ));
        objects.push(stream_object(&content));
    }

    let bytes = build_pdf(objects, catalog_id, info_id);
    if let Some(metrics) = metrics {
        metrics.output_bytes = bytes.len();
    }
    (bytes, stats)
}

fn render_page(page: &Page, page_height: Pt, has_logo: bool, stats: &mut PdfStats) -> String {
    let mut out = String::new();
    let mut font_size = Pt::from_f32(12.0);
    let mut font = FontFace::Regular;

    for cmd in &page.commands {
        match cmd {
            Command::SaveState => out.push_str("q\n"),
            Command::RestoreState => out.push_str("Q\n"),
            Command::Meta { .. } => {}
            Command::SetFillColor(color) => out.push_str(&color_to_pdf_fill(*color)),
            Command::SetStrokeColor(color) => out.push_str(&color_to_pdf_stroke(*color)),
            Command::SetLineWidth(width) => {
                out.push_str(&format!("{} w\n", fmt_pt(*width)));
            }
            Command::SetDash { pattern, phase } => {
                let items = pattern.iter().map(|v| fmt_pt(*v)).collect::<Vec<_>>().join(" ");
                out.push_str(&format!("[{}] {} d\n", items, fmt_pt(*phase)));
            }
            Command::SetFontName(name) => {
                font = FontFace::from_name(name).unwrap_or(FontFace::Regular);
            }
            Command::SetFontSize(size) => font_size = *size,
            Command::MoveTo { x, y } => {
                out.push_str(&format!("{} {} m\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::LineTo { x, y } => {
                out.push_str(&format!("{} {} l\n", fmt_pt(*x), fmt_pt(page_height - *y)));
            }
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} {} {} c\n",
                    fmt_pt(*x1),
                    fmt_pt(page_height - *y1),
                    fmt_pt(*x2),
                    fmt_pt(page_height - *y2),
                    fmt_pt(*x),
                    fmt_pt(page_height - *y),
                ));
            }
            Command::ClosePath => out.push_str("h\n"),
            Command::Fill => out.push_str("f\n"),
            Command::Stroke => out.push_str("S\n"),
            Command::FillStroke => out.push_str("B\n"),
            Command::DrawString { x, y, text } => {
                let encoded = encode_winansi_pdf_string(text);
                stats.replaced_chars += encoded.replaced;
                stats.fallback_chars += encoded.fallbacks;
                out.push_str("BT\n");
                out.push_str(&format!("/{} {} Tf\n", font_resource(font), fmt_pt(font_size)));
                out.push_str(&format!(
                    "{} {} Td\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - baseline_offset(font_size))
                ));
                out.push_str(&format!("({}) Tj\n", encoded.text));
                out.push_str("ET\n");
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                out.push_str(&format!(
                    "{} {} {} {} re\nf\n",
                    fmt_pt(*x),
                    fmt_pt(page_height - *y - *height),
                    fmt_pt(*width),
                    fmt_pt(*height)
                ));
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                if has_logo && resource_id == LOGO_RESOURCE_ID {
                    out.push_str("q\n");
                    out.push_str(&format!(
                        "{} 0 0 {} {} {} cm\n",
                        fmt_pt(*width),
                        fmt_pt(*height),
                        fmt_pt(*x),
                        fmt_pt(page_height - *y - *height)
                    ));
                    out.push_str(&format!("/{} Do\n", IMAGE_RESOURCE));
                    out.push_str("Q\n");
                }
            }
        }
    }
    out
}

fn stream_object(content: &str) -> String {
    let length = content.len();
    format!("<< /Length {} >>\nstream\n{}\nendstream", length, content)
}

fn info_object(title: Option<&str>) -> String {
    let mut entries: Vec<String> = Vec::new();
    if let Some(title) = title {
        entries.push(format!("/Title ({})", encode_winansi_pdf_string(title).text));
    }
    entries.push(format!("/Producer ({})", PRODUCER));
    format!("<< {} >>", entries.join(" "))
}

fn font_object(base_font: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base_font
    )
}

fn font_resources(fonts: &[(String, usize)]) -> String {
    let entries: Vec<String> = fonts
        .iter()
        .map(|(resource, id)| format!("/{} {} 0 R", resource, id))
        .collect();
    format!("<< {} >>", entries.join(" "))
}

fn xobject_resources(images: &[(String, usize)]) -> String {
    let entries: Vec<String> = images
        .iter()
        .map(|(resource, id)| format!("/{} {} 0 R", resource, id))
        .collect();
    format!("<< {} >>", entries.join(" "))
}

fn ascii_hex_encode(data: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 32 + 1);
    for (index, byte) in data.iter().enumerate() {
        let _ = write!(&mut out, "{:02X}", byte);
        if index % 32 == 31 {
            out.push('\n');
        }
    }
    out.push('>');
    out
}

// Image streams stay ASCII so every object is a plain string.
fn image_object(logo: &LogoImage) -> String {
    let data = ascii_hex_encode(&logo.jpeg);
    format!(
        "<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Length {} /Filter [/ASCIIHexDecode /DCTDecode] >>\nstream\n{}\nendstream",
        logo.width,
        logo.height,
        data.len(),
        data
    )
}

fn build_pdf(objects: Vec<String>, catalog_id: usize, info_id: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.7\n");
    out.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(obj.as_bytes());
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    let trailer = format!(
        "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF",
        objects.len() + 1,
        catalog_id,
        info_id,
        xref_start
    );
    out.extend_from_slice(trailer.as_bytes());
    out
}

struct WinAnsiEncoded {
    text: String,
    replaced: usize,
    fallbacks: usize,
}

fn encode_winansi_pdf_string(input: &str) -> WinAnsiEncoded {
    let mut out = String::new();
    let mut replaced = 0usize;
    let mut fallbacks = 0usize;
    for ch in input.chars() {
        let stand_in = match ch {
            '\u{2265}' => Some(">="),
            '\u{2264}' => Some("<="),
            '\u{2212}' => Some("-"),
            _ => None,
        };
        if let Some(stand_in) = stand_in {
            out.push_str(stand_in);
            fallbacks += 1;
            continue;
        }

        let byte = match ch {
            '\u{0000}'..='\u{007F}' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{201A}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201E}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02C6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8A,
            '\u{2039}' => 0x8B,
            '\u{0152}' => 0x8C,
            '\u{017D}' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02DC}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9A,
            '\u{203A}' => 0x9B,
            '\u{0153}' => 0x9C,
            '\u{017E}' => 0x9E,
            '\u{0178}' => 0x9F,
            _ => {
                replaced += 1;
                b'?'
            }
        };

        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if b < 0x20 || b >= 0x7f => out.push_str(&format!("\\{:03o}", b)),
            b => out.push(b as char),
        }
    }

    WinAnsiEncoded {
        text: out,
        replaced,
        fallbacks,
    }
}

fn fmt(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let scaled = (I32F32::from_num(value) * I32F32::from_num(1000)).round();
    format_milli(scaled.to_num())
}

fn format_milli(milli: i64) -> String {
    if milli == 0 {
        return "0".to_string();
    }
    let sign = if milli < 0 { "-" } else { "" };
    let abs = milli.abs();
    let int_part = abs / 1000;
    let frac_part = abs % 1000;
    if frac_part == 0 {
        return format!("{}{}", sign, int_part);
    }
    let mut s = format!("{}{}.{:03}", sign, int_part, frac_part);
    while s.ends_with('0') {
        s.pop();
    }
    s
}

pub(crate) fn fmt_pt(value: Pt) -> String {
    format_milli(value.to_milli_i64())
}

fn color_to_pdf_fill(color: Color) -> String {
    format!("{} {} {} rg\n", fmt(color.r), fmt(color.g), fmt(color.b))
}

fn color_to_pdf_stroke(color: Color) -> String {
    format!("{} {} {} RG\n", fmt(color.r), fmt(color.g), fmt(color.b))
}
