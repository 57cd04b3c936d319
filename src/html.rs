use crate::assets::{LOGO_RESOURCE_ID, LogoImage};
use crate::canvas::{Command, Document, Page};
use crate::font::{FontFace, baseline_offset};
use crate::pdf::fmt_pt;
use crate::types::{Color, Pt, Size};
use std::fmt::Write;

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    pub title: Option<String>,
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone)]
struct SvgState {
    fill: Color,
    stroke: Color,
    line_width: Pt,
    dash: Option<(Vec<Pt>, Pt)>,
    font: FontFace,
    font_size: Pt,
}

impl Default for SvgState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: Pt::from_f32(1.0),
            dash: None,
            font: FontFace::Regular,
            font_size: Pt::from_f32(12.0),
        }
    }
}

impl SvgState {
    fn stroke_attrs(&self) -> String {
        let mut attrs = format!(
            " stroke=\"{}\" stroke-width=\"{}\"",
            self.stroke.to_hex(),
            fmt_pt(self.line_width)
        );
        if let Some((pattern, phase)) = &self.dash {
            if !pattern.is_empty() {
                let items = pattern.iter().map(|v| fmt_pt(*v)).collect::<Vec<_>>().join(" ");
                let _ = write!(
                    attrs,
                    " stroke-dasharray=\"{}\" stroke-dashoffset=\"{}\"",
                    items,
                    fmt_pt(*phase)
                );
            }
        }
        attrs
    }

    fn font_attrs(&self) -> String {
        let weight = if self.font.is_bold() { "bold" } else { "normal" };
        let style = if self.font.is_italic() { "oblique" } else { "normal" };
        format!(
            " font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-style=\"{}\"",
            FONT_FAMILY,
            fmt_pt(self.font_size),
            weight,
            style
        )
    }
}

fn render_page_svg(out: &mut String, page: &Page, size: Size, logo_uri: Option<&str>) {
    let width = fmt_pt(size.width);
    let height = fmt_pt(size.height);
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n",
        w = width,
        h = height
    );

    let mut state = SvgState::default();
    let mut stack: Vec<SvgState> = Vec::new();
    let mut path = String::new();

    for cmd in &page.commands {
        match cmd {
            Command::SaveState => stack.push(state.clone()),
            Command::RestoreState => {
                if let Some(saved) = stack.pop() {
                    state = saved;
                }
            }
            Command::Meta { key, value } => {
                let _ = writeln!(
                    out,
                    "<g class=\"meta\" data-key=\"{}\" data-value=\"{}\"></g>",
                    escape_html(key),
                    escape_html(value)
                );
            }
            Command::SetFillColor(color) => state.fill = *color,
            Command::SetStrokeColor(color) => state.stroke = *color,
            Command::SetLineWidth(width) => state.line_width = *width,
            Command::SetDash { pattern, phase } => state.dash = Some((pattern.clone(), *phase)),
            Command::SetFontName(name) => {
                state.font = FontFace::from_name(name).unwrap_or(FontFace::Regular);
            }
            Command::SetFontSize(size) => state.font_size = *size,
            Command::MoveTo { x, y } => {
                let _ = write!(path, "M{} {} ", fmt_pt(*x), fmt_pt(*y));
            }
            Command::LineTo { x, y } => {
                let _ = write!(path, "L{} {} ", fmt_pt(*x), fmt_pt(*y));
            }
            Command::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let _ = write!(
                    path,
                    "C{} {} {} {} {} {} ",
                    fmt_pt(*x1),
                    fmt_pt(*y1),
                    fmt_pt(*x2),
                    fmt_pt(*y2),
                    fmt_pt(*x),
                    fmt_pt(*y)
                );
            }
            Command::ClosePath => path.push_str("Z "),
            Command::Fill | Command::Stroke | Command::FillStroke => {
                let d = std::mem::take(&mut path);
                let d = d.trim_end();
                if d.is_empty() {
                    continue;
                }
                let fill = match cmd {
                    Command::Stroke => "none".to_string(),
                    _ => state.fill.to_hex(),
                };
                let stroke = match cmd {
                    Command::Fill => " stroke=\"none\"".to_string(),
                    _ => state.stroke_attrs(),
                };
                let _ = writeln!(out, "<path d=\"{}\" fill=\"{}\"{}/>", d, fill, stroke);
            }
            Command::DrawString { x, y, text } => {
                let _ = writeln!(
                    out,
                    "<text x=\"{}\" y=\"{}\" fill=\"{}\"{} xml:space=\"preserve\">{}</text>",
                    fmt_pt(*x),
                    fmt_pt(*y + baseline_offset(state.font_size)),
                    state.fill.to_hex(),
                    state.font_attrs(),
                    escape_html(text)
                );
            }
            Command::DrawRect {
                x,
                y,
                width,
                height,
            } => {
                let _ = writeln!(
                    out,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                    fmt_pt(*x),
                    fmt_pt(*y),
                    fmt_pt(*width),
                    fmt_pt(*height),
                    state.fill.to_hex()
                );
            }
            Command::DrawImage {
                x,
                y,
                width,
                height,
                resource_id,
            } => {
                if let (Some(uri), true) = (logo_uri, resource_id == LOGO_RESOURCE_ID) {
                    let _ = writeln!(
                        out,
                        "<image href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\"/>",
                        uri,
                        fmt_pt(*x),
                        fmt_pt(*y),
                        fmt_pt(*width),
                        fmt_pt(*height)
                    );
                }
            }
        }
    }
    out.push_str("</svg>\n");
}

fn stylesheet(size: Size) -> String {
    format!(
        "@page {{ size: {w}pt {h}pt; margin: 0; }}\n\
body {{ margin: 0; background: #E5E7EB; }}\n\
section.page {{ width: {w}pt; height: {h}pt; margin: 16pt auto; background: #FFFFFF; \
box-shadow: 0 1pt 4pt rgba(0, 0, 0, 0.25); page-break-after: always; break-after: page; }}\n\
section.page svg {{ display: block; }}\n\
@media print {{ body {{ background: none; }} section.page {{ margin: 0; box-shadow: none; }} }}\n",
        w = fmt_pt(size.width),
        h = fmt_pt(size.height)
    )
}

pub fn document_to_html(document: &Document, logo: Option<&LogoImage>, options: &HtmlOptions) -> String {
    let logo_uri = logo.map(LogoImage::data_uri);
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"generator\" content=\"Riskify\">\n");
    if let Some(title) = &options.title {
        let _ = writeln!(out, "<title>{}</title>", escape_html(title));
    }
    let _ = write!(out, "<style>\n{}</style>\n</head>\n<body>\n", stylesheet(document.page_size));
    let total = document.pages.len();
    for (index, page) in document.pages.iter().enumerate() {
        let _ = writeln!(
            out,
            "<section class=\"page\" data-page=\"{}\" data-pages=\"{}\">",
            index + 1,
            total
        );
        render_page_svg(&mut out, page, document.page_size, logo_uri.as_deref());
        out.push_str("</section>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::*;

    fn sample_document() -> Document {
        let first = Page {
            commands: vec![
                Command::Meta {
                    key: crate::META_SECTION_KEY.to_string(),
                    value: "project_info".to_string(),
                },
                Command::SaveState,
                Command::SetFillColor(Color::rgb8(0xDC, 0x26, 0x26)),
                Command::SetFontName("Helvetica-Bold".to_string()),
                Command::SetFontSize(Pt::from_f32(10.0)),
                Command::DrawString {
                    x: Pt::from_f32(10.0),
                    y: Pt::from_f32(10.0),
                    text: "Extreme (16) <hot & sharp>".to_string(),
                },
                Command::RestoreState,
                Command::DrawString {
                    x: Pt::from_f32(10.0),
                    y: Pt::from_f32(40.0),
                    text: "after restore".to_string(),
                },
            ],
        };
        let second = Page {
            commands: vec![
                Command::SetDash {
                    pattern: vec![Pt::from_f32(3.0), Pt::from_f32(2.0)],
                    phase: Pt::ZERO,
                },
                Command::MoveTo {
                    x: Pt::ZERO,
                    y: Pt::ZERO,
                },
                Command::LineTo {
                    x: Pt::from_f32(50.0),
                    y: Pt::ZERO,
                },
                Command::Stroke,
            ],
        };
        Document {
            page_size: Size::a4_landscape(),
            pages: vec![first, second],
        }
    }

    #[test]
    fn one_section_per_page_with_escaped_text() {
        let html = document_to_html(
            &sample_document(),
            None,
            &HtmlOptions {
                title: Some("SWMS <Stage 2>".to_string()),
            },
        );
        let parsed = kuchiki::parse_html().one(html.as_str());
        let pages: Vec<_> = parsed.select("section.page").expect("selector").collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(
            pages[1].attributes.borrow().get("data-page"),
            Some("2")
        );
        assert!(pages[0].as_node().text_contents().contains("Extreme (16) <hot & sharp>"));
        let title = parsed.select_first("title").expect("title");
        assert_eq!(title.as_node().text_contents(), "SWMS <Stage 2>");
        assert!(html.contains("&lt;hot &amp; sharp&gt;"));
    }

    #[test]
    fn state_restore_and_dash_are_respected() {
        let html = document_to_html(&sample_document(), None, &HtmlOptions::default());
        assert!(html.contains("fill=\"#DC2626\" font-family=\"Helvetica, Arial, sans-serif\" font-size=\"10\" font-weight=\"bold\""));
        assert!(html.contains("fill=\"#000000\" font-family=\"Helvetica, Arial, sans-serif\" font-size=\"12\" font-weight=\"normal\""));
        assert!(html.contains("stroke-dasharray=\"3 2\""));
        assert!(html.contains("d=\"M0 0 L50 0\" fill=\"none\""));
    }

    #[test]
    fn meta_markers_and_logo_are_emitted() {
        let logo = LogoImage::decode(&crate::assets::test_png(8, 4, [10, 20, 30, 255])).expect("logo");
        let mut doc = sample_document();
        doc.pages[1].commands.push(Command::DrawImage {
            x: Pt::ZERO,
            y: Pt::ZERO,
            width: Pt::from_f32(40.0),
            height: Pt::from_f32(20.0),
            resource_id: LOGO_RESOURCE_ID.to_string(),
        });
        let html = document_to_html(&doc, Some(&logo), &HtmlOptions::default());
        let parsed = kuchiki::parse_html().one(html.as_str());
        let metas: Vec<String> = parsed
            .select("g.meta")
            .expect("selector")
            .filter_map(|node| node.attributes.borrow().get("data-value").map(str::to_string))
            .collect();
        assert_eq!(metas, vec!["project_info".to_string()]);
        assert_eq!(html.matches("data:image/jpeg;base64,").count(), 1);
    }

    #[test]
    fn output_is_deterministic() {
        let doc = sample_document();
        let options = HtmlOptions::default();
        assert_eq!(
            document_to_html(&doc, None, &options),
            document_to_html(&doc, None, &options)
        );
    }
}
