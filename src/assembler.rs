use crate::assets::{LOGO_RESOURCE_ID, LogoImage, LogoSource};
use crate::canvas::{Canvas, Command, Document};
use crate::catalog::Catalogs;
use crate::debug::DebugLogger;
use crate::doc_context::DocContext;
use crate::doc_template::DocTemplate;
use crate::error::RenderError;
use crate::font::{FontFace, measure_text_width};
use crate::metrics::DocumentMetrics;
use crate::model::{PLACEHOLDER_TEXT, RenderLimits, SwmsDocument, present};
use crate::page_template::PageTemplate;
use crate::primitives::{
    ACCENT, Align, BoxStyle, INK, MUTED, RULE, TextStyle, draw_box, draw_hline, draw_line,
};
use crate::risk::RiskScale;
use crate::sections::{LayoutContext, SectionKind, WARN_LOGO_FALLBACK, build_section};
use crate::types::{Margins, Pt, Rect, Size};
use crate::{RenderWarning, SectionSpan};

pub const DOCUMENT_HEADING: &str = "SAFE WORK METHOD STATEMENT";
pub const FOOTER_PAGE_TEMPLATE: &str = "Page {page} of {pages}";
pub const LOGO_PLACEHOLDER_TEXT: &str = "Logo unavailable";
const DEFAULT_TITLE: &str = "Safe Work Method Statement";
const TEMPLATE_NAME: &str = "swms";

const LOGO_MAX_WIDTH: f32 = 120.0;
const PLACEHOLDER_WIDTH: f32 = 90.0;
const RIGHT_COLUMN_WIDTH: f32 = 250.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyOptions {
    pub page_size: Size,
    pub margins: Margins,
    pub header_height: Pt,
    pub footer_height: Pt,
    pub scale: RiskScale,
    pub sign_in_rows: usize,
    pub limits: RenderLimits,
    pub title: Option<String>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            page_size: Size::a4_landscape(),
            margins: Margins::all(28.0),
            header_height: Pt::from_f32(46.0),
            footer_height: Pt::from_f32(18.0),
            scale: RiskScale::default(),
            sign_in_rows: 12,
            limits: RenderLimits::default(),
            title: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub document: Document,
    pub logo: Option<LogoImage>,
    pub sections: Vec<SectionSpan>,
    pub warnings: Vec<RenderWarning>,
    pub metrics: DocumentMetrics,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LogoSlot {
    Empty,
    Image { aspect: f32 },
    Placeholder,
}

#[derive(Debug, Clone)]
struct PageHeader {
    company: Option<String>,
    project: Option<String>,
    job_number: Option<String>,
    logo: LogoSlot,
}

impl PageHeader {
    fn logo_width(&self, height: Pt) -> Pt {
        match self.logo {
            LogoSlot::Empty => Pt::ZERO,
            LogoSlot::Image { aspect } => (height * aspect).min(Pt::from_f32(LOGO_MAX_WIDTH)),
            LogoSlot::Placeholder => Pt::from_f32(PLACEHOLDER_WIDTH),
        }
    }

    fn draw(&self, canvas: &mut Canvas, ctx: &DocContext) {
        let band = ctx.header_rect;
        let logo_height = band.height - Pt::from_f32(8.0);
        let logo_width = self.logo_width(logo_height);
        match self.logo {
            LogoSlot::Empty => {}
            LogoSlot::Image { .. } => {
                canvas.draw_image(band.x, band.y, logo_width, logo_height, LOGO_RESOURCE_ID);
            }
            LogoSlot::Placeholder => {
                let rect = Rect::new(band.x, band.y, logo_width, logo_height);
                canvas.save_state();
                canvas.set_dash(vec![Pt::from_f32(2.0), Pt::from_f32(2.0)], Pt::ZERO);
                draw_box(canvas, rect, BoxStyle::outlined(RULE).rounded(3.0));
                canvas.restore_state();
                let style = TextStyle::new(FontFace::Oblique, 7.0, MUTED).aligned(Align::Center);
                let text_y = rect.y + (rect.height - style.line_height()) / 2;
                draw_line(canvas, rect.x, text_y, rect.width, LOGO_PLACEHOLDER_TEXT, &style);
            }
        }

        let gap = if logo_width > Pt::ZERO { Pt::from_f32(10.0) } else { Pt::ZERO };
        let text_x = band.x + logo_width + gap;
        let right_width = Pt::from_f32(RIGHT_COLUMN_WIDTH);
        let text_width = (band.width - logo_width - gap - right_width).max(Pt::from_f32(1.0));

        let heading = TextStyle::new(FontFace::Bold, 13.0, INK);
        draw_line(canvas, text_x, band.y + Pt::from_f32(2.0), text_width, DOCUMENT_HEADING, &heading);
        let company_y = band.y + Pt::from_f32(2.0) + heading.line_height();
        match self.company.as_deref() {
            Some(company) => draw_line(canvas, text_x, company_y, text_width, company, &TextStyle::label().sized(9.0)),
            None => draw_line(
                canvas,
                text_x,
                company_y,
                text_width,
                PLACEHOLDER_TEXT,
                &TextStyle::placeholder().sized(9.0),
            ),
        }

        let right_x = band.right() - right_width;
        let value = TextStyle::body().aligned(Align::Right);
        let project = format!("Project: {}", self.project.as_deref().unwrap_or(PLACEHOLDER_TEXT));
        let job = format!("Job No: {}", self.job_number.as_deref().unwrap_or(PLACEHOLDER_TEXT));
        draw_line(canvas, right_x, band.y + Pt::from_f32(4.0), right_width, &project, &value);
        draw_line(
            canvas,
            right_x,
            band.y + Pt::from_f32(4.0) + value.line_height(),
            right_width,
            &job,
            &value,
        );

        draw_hline(canvas, band.x, band.right(), band.bottom(), ACCENT, 1.5);
    }
}

fn page_template(options: &AssemblyOptions, header: PageHeader) -> PageTemplate {
    PageTemplate::new(
        TEMPLATE_NAME,
        options.page_size,
        options.margins,
        options.header_height,
        options.footer_height,
    )
    .set_on_page(move |canvas, ctx| header.draw(canvas, ctx))
}

pub fn substitute_page_tokens(template: &str, page_number: usize, page_count: usize) -> String {
    template
        .replace("{page}", &page_number.to_string())
        .replace("{pages}", &page_count.to_string())
}

fn push_text(commands: &mut Vec<Command>, x: Pt, y: Pt, text: String, face: FontFace, size: Pt) {
    commands.push(Command::SetFontName(face.pdf_name().to_string()));
    commands.push(Command::SetFontSize(size));
    commands.push(Command::DrawString { x, y, text });
}

fn apply_page_footer(document: &mut Document, footer: Rect, left_text: &str) {
    let total_pages = document.pages.len();
    let size = Pt::from_f32(7.5);
    let text_y = footer.bottom() - crate::font::line_height(size);
    for (index, page) in document.pages.iter_mut().enumerate() {
        let label = substitute_page_tokens(FOOTER_PAGE_TEMPLATE, index + 1, total_pages);
        let label_width = measure_text_width(FontFace::Bold, size, &label);
        let commands = &mut page.commands;
        commands.push(Command::SaveState);
        commands.push(Command::SetStrokeColor(RULE));
        commands.push(Command::SetLineWidth(Pt::from_f32(0.5)));
        commands.push(Command::MoveTo { x: footer.x, y: footer.y });
        commands.push(Command::LineTo {
            x: footer.right(),
            y: footer.y,
        });
        commands.push(Command::Stroke);
        commands.push(Command::SetFillColor(MUTED));
        push_text(commands, footer.x, text_y, left_text.to_string(), FontFace::Regular, size);
        commands.push(Command::SetFillColor(INK));
        push_text(commands, footer.right() - label_width, text_y, label, FontFace::Bold, size);
        commands.push(Command::RestoreState);
    }
}

pub fn section_spans(document: &Document) -> Vec<SectionSpan> {
    let mut spans: Vec<SectionSpan> = Vec::new();
    for (index, page) in document.pages.iter().enumerate() {
        let page_number = index + 1;
        for key in page.meta_values(crate::META_SECTION_KEY) {
            if let Some(previous) = spans.last_mut() {
                previous.last_page = page_number.saturating_sub(1).max(previous.first_page);
            }
            let title = SectionKind::from_key(key).map_or_else(|| key.to_string(), |kind| kind.title().to_string());
            spans.push(SectionSpan {
                key: key.to_string(),
                title,
                first_page: page_number,
                last_page: page_number,
            });
        }
    }
    if let Some(last) = spans.last_mut() {
        last.last_page = document.pages.len().max(last.first_page);
    }
    spans
}

fn document_title(options: &AssemblyOptions, doc: &SwmsDocument) -> String {
    options
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .or_else(|| present(&doc.project.project_name))
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

pub fn assemble(
    doc: &SwmsDocument,
    options: &AssemblyOptions,
    catalogs: &Catalogs,
    logo_source: Option<&LogoSource>,
    debug: Option<&DebugLogger>,
) -> Result<Layout, RenderError> {
    catalogs.ensure_complete()?;
    doc.check_limits(&options.limits)?;

    let mut ctx = LayoutContext::new(options.scale, catalogs, options.sign_in_rows, debug);
    let (logo, slot) = match logo_source {
        None => (None, LogoSlot::Empty),
        Some(source) => match LogoImage::load(source) {
            Ok(image) => {
                let aspect = image.aspect_ratio();
                (Some(image), LogoSlot::Image { aspect })
            }
            Err(err) => {
                ctx.warn(
                    WARN_LOGO_FALLBACK,
                    format!("logo {} could not be used ({}); drew a placeholder", source.describe(), err),
                );
                (None, LogoSlot::Placeholder)
            }
        },
    };

    let header = PageHeader {
        company: present(&doc.project.company_name).map(str::to_string),
        project: present(&doc.project.project_name).map(str::to_string),
        job_number: present(&doc.project.job_number).map(str::to_string),
        logo: slot,
    };
    let template = page_template(options, header);
    let footer_rect = template.footer_rect();
    let empty_frame = template.instantiate_frame();
    let frame_height = template.frame_rect().height;

    let mut story = DocTemplate::new(template, options.limits.max_pages).with_debug(debug.cloned());
    for kind in SectionKind::ORDER {
        for flowable in build_section(kind, doc, &mut ctx)? {
            // Content no empty page can hold fails here, before layout starts.
            if let Some(needed) = empty_frame.oversized_part(flowable.as_ref(), options.limits.max_pages) {
                return Err(RenderError::DocumentTooLarge {
                    what: kind.part_label(),
                    count: needed.to_f32().ceil() as usize,
                    limit: frame_height.to_f32().floor() as usize,
                });
            }
            story.add_flowable(flowable);
        }
    }
    let (mut document, metrics) = story.build_with_metrics()?;

    let title = document_title(options, doc);
    let footer_left = format!("{} | Catalogue {}", title, catalogs.version());
    apply_page_footer(&mut document, footer_rect, &footer_left);
    let sections = section_spans(&document);

    Ok(Layout {
        document,
        logo,
        sections,
        warnings: ctx.warnings,
        metrics,
        title,
    })
}
