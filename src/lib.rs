mod assembler;
mod assets;
mod canvas;
mod catalog;
mod debug;
mod doc_context;
mod doc_template;
mod error;
mod flowable;
mod font;
mod frame;
mod html;
mod metrics;
mod model;
mod page_template;
mod pdf;
mod pdfinspect;
mod primitives;
mod risk;
mod sections;
mod table;
mod types;

pub use assembler::{
    AssemblyOptions, DOCUMENT_HEADING, FOOTER_PAGE_TEMPLATE, LOGO_PLACEHOLDER_TEXT, Layout, assemble,
    section_spans, substitute_page_tokens,
};
pub use assets::{LogoImage, LogoSource, MAX_LOGO_BYTES};
pub use canvas::{Canvas, Command, Document, Page};
pub use catalog::Catalogs;
pub use debug::DebugLogger;
pub use error::{RenderError, RenderErrorKind};
pub use flowable::EMPTY_STATE_TEXT;
pub use html::{HtmlOptions, document_to_html};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use model::{
    CatalogRef, EmergencyContact, EmergencyInfo, PLACEHOLDER_TEXT, Personnel, PlantEquipment, PpeSelection,
    PpeStatus, ProjectInfo, RenderLimits, ScoreInput, ScoreOutcome, SwmsDocument, TextOrList, WorkActivity,
    resolve_score,
};
pub use pdf::{PRODUCER, PdfOptions, PdfStats, document_to_pdf, document_to_pdf_with_stats};
pub use pdfinspect::{
    PdfInspectError, PdfInspectErrorCode, PdfInspectReport, inspect_pdf_bytes, inspect_pdf_path, output_issues,
    require_valid_output,
};
pub use risk::{NOT_ASSESSED_COLOR, RiskRating, RiskScale, RiskTier, classify};
pub use riskify_catalog::{HrcwCategoryDef, PpeItemDef};
pub use sections::{
    NOT_ASSESSED_LABEL, SectionKind, WARN_LOGO_FALLBACK, WARN_RESIDUAL_EXCEEDS_INITIAL, WARN_RISK_LEVEL_MALFORMED,
    WARN_RISK_SCORE_CLAMPED, WARN_RISK_SCORE_MALFORMED,
};
pub use types::{Color, Margins, Pt, Rect, Size};

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

// Non-rendered meta keys left in the layout tree. Backends ignore them; the
// assembler and tests read them back.
pub const META_BBOX_KEY: &str = "riskify.bbox";
pub const META_PAGE_TEMPLATE_KEY: &str = "riskify.page_template";
pub const META_SECTION_KEY: &str = "riskify.section";
pub const META_EMPTY_STATE_KEY: &str = "riskify.empty_state";
pub const META_TABLE_HEADER_KEY: &str = "riskify.table_header";
pub const META_TABLE_ROW_KEY: &str = "riskify.table_row";
pub const META_HRCW_SELECTED_KEY: &str = "riskify.hrcw_selected";
pub const META_RISK_CELL_KEY: &str = "riskify.risk_cell";
pub const META_PPE_ITEM_KEY: &str = "riskify.ppe_item";

pub const WARN_UNENCODABLE_TEXT: &str = "UNENCODABLE_TEXT";

pub const MIN_SIGN_IN_ROWS: usize = 1;
pub const MAX_SIGN_IN_ROWS: usize = 30;
const MIN_FRAME_EXTENT: f32 = 144.0;

/// A non-fatal condition noticed while rendering. The output is still complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    pub key: String,
    pub title: String,
    pub first_page: usize,
    pub last_page: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub title: String,
    pub page_count: usize,
    pub sections: Vec<SectionSpan>,
    pub warnings: Vec<RenderWarning>,
    pub metrics: DocumentMetrics,
    pub catalog_version: String,
    pub catalog_fingerprint: String,
    pub output_sha256: String,
}

impl RenderReport {
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code == code)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// The SWMS layout engine. Holds configuration and read-only catalogues only;
/// every render call builds its own layout state, so one engine can serve
/// many documents, including in parallel.
pub struct Riskify {
    options: AssemblyOptions,
    catalogs: Catalogs,
    logo: Option<LogoSource>,
    debug: Option<DebugLogger>,
}

#[derive(Clone)]
pub struct RiskifyBuilder {
    options: AssemblyOptions,
    catalogs: Option<Catalogs>,
    logo: Option<LogoSource>,
    debug_path: Option<std::path::PathBuf>,
}

impl Riskify {
    pub fn builder() -> RiskifyBuilder {
        RiskifyBuilder::new()
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_ref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }

    fn log_start(&self, format: &str, doc: &SwmsDocument) {
        if let Some(logger) = self.debug.as_ref() {
            logger.log_event(
                "render.start",
                json!({
                    "format": format,
                    "activities": doc.work_activities.len(),
                    "equipment": doc.plant_equipment.len(),
                    "hrcw": doc.high_risk_activities.len(),
                    "ppe": doc.ppe_requirements.len(),
                    "scale": self.options.scale.describe(),
                }),
            );
        }
    }

    fn log_finish(&self, format: &str, report: &RenderReport, bytes: usize) {
        if let Some(logger) = self.debug.as_ref() {
            logger.log_event(
                "render.finish",
                json!({
                    "format": format,
                    "pages": report.page_count,
                    "warnings": report.warnings.len(),
                    "bytes": bytes,
                    "sha256": report.output_sha256,
                }),
            );
            logger.increment("render", 1);
        }
    }

    fn log_failure(&self, format: &str, err: &RenderError) {
        if let Some(logger) = self.debug.as_ref() {
            logger.log_event(
                "render.error",
                json!({ "format": format, "kind": err.kind().code(), "message": err.to_string() }),
            );
            logger.increment("render.error", 1);
        }
    }

    pub fn render_layout(&self, doc: &SwmsDocument) -> Result<Layout, RenderError> {
        assemble(
            doc,
            &self.options,
            &self.catalogs,
            self.logo.as_ref(),
            self.debug.as_ref(),
        )
    }

    fn report(&self, layout: Layout, bytes: &[u8]) -> RenderReport {
        RenderReport {
            title: layout.title,
            page_count: layout.document.page_count(),
            sections: layout.sections,
            warnings: layout.warnings,
            metrics: layout.metrics,
            catalog_version: self.catalogs.version().to_string(),
            catalog_fingerprint: self.catalogs.fingerprint().to_string(),
            output_sha256: sha256_hex(bytes),
        }
    }

    fn pdf_from_layout(&self, mut layout: Layout) -> (Vec<u8>, RenderReport) {
        let options = PdfOptions {
            title: Some(layout.title.clone()),
        };
        let (bytes, stats) =
            document_to_pdf_with_stats(&layout.document, layout.logo.as_ref(), &options, Some(&mut layout.metrics));
        if stats.replaced_chars > 0 {
            layout.warnings.push(RenderWarning {
                code: WARN_UNENCODABLE_TEXT,
                message: format!(
                    "{} character(s) have no WinAnsi glyph and were drawn as '?'",
                    stats.replaced_chars
                ),
            });
        }
        let report = self.report(layout, &bytes);
        (bytes, report)
    }

    pub fn render_pdf(&self, doc: &SwmsDocument) -> Result<(Vec<u8>, RenderReport), RenderError> {
        self.log_start("pdf", doc);
        let result = self.render_layout(doc).map(|layout| self.pdf_from_layout(layout));
        match &result {
            Ok((bytes, report)) => self.log_finish("pdf", report, bytes.len()),
            Err(err) => self.log_failure("pdf", err),
        }
        self.emit_debug_summary("render_pdf");
        result
    }

    pub fn render_html(&self, doc: &SwmsDocument) -> Result<(String, RenderReport), RenderError> {
        self.log_start("html", doc);
        let result = self.render_layout(doc).map(|mut layout| {
            let options = HtmlOptions {
                title: Some(layout.title.clone()),
            };
            let html = document_to_html(&layout.document, layout.logo.as_ref(), &options);
            layout.metrics.output_bytes = html.len();
            let report = self.report(layout, html.as_bytes());
            (html, report)
        });
        match &result {
            Ok((html, report)) => self.log_finish("html", report, html.len()),
            Err(err) => self.log_failure("html", err),
        }
        self.emit_debug_summary("render_html");
        result
    }

    pub fn render_pdf_json(&self, json: &str) -> Result<(Vec<u8>, RenderReport), RenderError> {
        let doc = SwmsDocument::from_json(json)?;
        self.render_pdf(&doc)
    }

    pub fn render_pdf_to_file(
        &self,
        doc: &SwmsDocument,
        path: impl AsRef<std::path::Path>,
    ) -> Result<RenderReport, RenderError> {
        let (bytes, report) = self.render_pdf(doc)?;
        std::fs::write(path, bytes)?;
        Ok(report)
    }

    /// Renders each document independently on the rayon pool. Results keep
    /// input order; one failure does not affect the others.
    pub fn render_many_pdf(&self, docs: &[SwmsDocument]) -> Vec<Result<(Vec<u8>, RenderReport), RenderError>> {
        use rayon::prelude::*;

        let mut results: Vec<(usize, Result<(Vec<u8>, RenderReport), RenderError>)> = docs
            .par_iter()
            .enumerate()
            .map(|(idx, doc)| {
                let res = self.render_layout(doc).map(|layout| self.pdf_from_layout(layout));
                (idx, res)
            })
            .collect();
        results.sort_by_key(|(idx, _)| *idx);

        if let Some(logger) = self.debug.as_ref() {
            let failed = results.iter().filter(|(_, res)| res.is_err()).count();
            logger.log_event(
                "render.batch",
                json!({ "documents": docs.len(), "failed": failed }),
            );
        }
        self.emit_debug_summary("render_many_pdf");
        results.into_iter().map(|(_, res)| res).collect()
    }
}

impl RiskifyBuilder {
    pub fn new() -> Self {
        Self {
            options: AssemblyOptions::default(),
            catalogs: None,
            logo: None,
            debug_path: None,
        }
    }

    pub fn page_size(mut self, size: Size) -> Self {
        self.options.page_size = size;
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.options.margins = margins;
        self
    }

    pub fn margin_all(mut self, value: f32) -> Self {
        self.options.margins = Margins::all(value);
        self
    }

    pub fn header_height(mut self, value: f32) -> Self {
        self.options.header_height = Pt::from_f32(value);
        self
    }

    pub fn footer_height(mut self, value: f32) -> Self {
        self.options.footer_height = Pt::from_f32(value);
        self
    }

    pub fn limits(mut self, limits: RenderLimits) -> Self {
        self.options.limits = limits;
        self
    }

    pub fn risk_scale(mut self, scale: RiskScale) -> Self {
        self.options.scale = scale;
        self
    }

    // Replaces the built-in HRCW/PPE catalogues.
    pub fn catalogs(mut self, catalogs: Catalogs) -> Self {
        self.catalogs = Some(catalogs);
        self
    }

    pub fn logo(mut self, source: LogoSource) -> Self {
        self.logo = Some(source);
        self
    }

    pub fn logo_bytes(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.logo(LogoSource::Bytes(bytes.into()))
    }

    pub fn logo_path(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.logo(LogoSource::Path(path.into()))
    }

    pub fn sign_in_rows(mut self, rows: usize) -> Self {
        self.options.sign_in_rows = rows;
        self
    }

    // Overrides the project name as PDF /Title, HTML <title> and footer text.
    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    // Enable debug logging to a JSONL file for layout and warning inspection.
    pub fn debug_log(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    fn validate(&self) -> Result<(), RenderError> {
        let options = &self.options;
        let invalid = |message: String| Err(RenderError::InvalidConfiguration(message));

        if !options.page_size.is_positive() {
            return invalid("page size must be positive".to_string());
        }
        let margins = options.margins;
        if [margins.top, margins.right, margins.bottom, margins.left]
            .iter()
            .any(|m| *m < Pt::ZERO)
        {
            return invalid("margins must not be negative".to_string());
        }
        if options.header_height < Pt::ZERO || options.footer_height < Pt::ZERO {
            return invalid("header and footer heights must not be negative".to_string());
        }
        let min = Pt::from_f32(MIN_FRAME_EXTENT);
        let frame_width = options.page_size.width - margins.left - margins.right;
        let frame_height = options.page_size.height
            - margins.top
            - margins.bottom
            - options.header_height
            - options.footer_height;
        if frame_width < min || frame_height < min {
            return invalid(format!(
                "content area {}x{}pt is smaller than {}pt",
                frame_width.to_f32(),
                frame_height.to_f32(),
                MIN_FRAME_EXTENT
            ));
        }
        if !(MIN_SIGN_IN_ROWS..=MAX_SIGN_IN_ROWS).contains(&options.sign_in_rows) {
            return invalid(format!(
                "sign_in_rows must be between {} and {}, got {}",
                MIN_SIGN_IN_ROWS, MAX_SIGN_IN_ROWS, options.sign_in_rows
            ));
        }
        let limits = &options.limits;
        if limits.max_pages < SectionKind::ORDER.len() {
            return invalid(format!(
                "max_pages must be at least {} (one page per section), got {}",
                SectionKind::ORDER.len(),
                limits.max_pages
            ));
        }
        if limits.max_activities == 0
            || limits.max_equipment == 0
            || limits.max_list_items == 0
            || limits.max_contacts == 0
            || limits.max_text_chars == 0
            || limits.max_field_chars == 0
        {
            return invalid("render limits must be greater than zero".to_string());
        }
        if let Some(title) = &options.title {
            if title.trim().is_empty() {
                return invalid("document_title must not be blank".to_string());
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<Riskify, RenderError> {
        self.validate()?;
        let catalogs = match self.catalogs {
            Some(catalogs) => catalogs,
            None => Catalogs::builtin()?,
        };
        catalogs.ensure_complete()?;
        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };
        Ok(Riskify {
            options: self.options,
            catalogs,
            logo: self.logo,
            debug,
        })
    }
}

impl Default for RiskifyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::*;

    const SAMPLE_JSON: &str = r#"{
        "companyName": "Acme Builders Pty Ltd",
        "projectName": "Riverside Apartments",
        "jobNumber": "J-2291",
        "projectAddress": "12 River Rd, Parramatta NSW",
        "startDate": "2024-03-04",
        "duration": "6 weeks",
        "principalContractor": "Acme Builders",
        "projectManager": "Sam Lee",
        "siteSupervisor": "Alex Kim",
        "authorisedPerson": "Jordan Park",
        "authorisedPosition": "Director",
        "emergencyContacts": [{"name": "Site First Aid", "phone": "0400 000 111"}],
        "emergencyProcedures": "Stop work\nRaise the alarm\nEvacuate to the assembly point",
        "emergencyMonitoring": ["Daily harness inspection"],
        "workActivities": [
            {
                "activity": "Erect scaffold",
                "hazards": ["Fall from height"],
                "controlMeasures": ["Licensed scaffolder", "Edge protection"],
                "legislation": ["WHS Regulation 2017 Part 4.4"],
                "initialRiskScore": 16,
                "residualRiskScore": 4
            }
        ],
        "highRiskActivities": [1, "5"],
        "ppeRequirements": ["hard-hat", {"id": "gloves", "status": "recommended"}],
        "plantEquipment": [
            {
                "name": "Scissor lift",
                "model": "GS-1930",
                "serialNumber": "SL-0042",
                "hazards": ["Tip over"],
                "controlMeasures": ["Pre-start check"],
                "riskLevel": "High",
                "nextInspectionDate": "2024-04-01",
                "certificationRequired": true
            }
        ]
    }"#;

    fn sample() -> SwmsDocument {
        SwmsDocument::from_json(SAMPLE_JSON).expect("sample parses")
    }

    fn engine() -> Riskify {
        Riskify::builder().build().expect("engine builds")
    }

    fn tall_activities(count: usize) -> SwmsDocument {
        let activity = WorkActivity {
            activity: Some("Install formwork".to_string()),
            hazards: (0..6)
                .map(|i| format!("Hazard {} with a fairly long description of the exposure", i))
                .collect(),
            control_measures: (0..6)
                .map(|i| format!("Control {} applied before work starts", i))
                .collect(),
            legislation: vec!["WHS Regulation 2017".to_string()],
            initial_risk_score: Some(ScoreInput::Int(12)),
            residual_risk_score: Some(ScoreInput::Int(6)),
        };
        SwmsDocument {
            work_activities: vec![activity; count],
            ..SwmsDocument::default()
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("riskify_{}_{}", std::process::id(), name))
    }

    #[test]
    fn pdf_is_valid_and_report_matches_output() {
        let (bytes, report) = engine().render_pdf(&sample()).expect("render");
        let inspected = inspect_pdf_bytes(&bytes).expect("inspect");
        require_valid_output(&inspected).expect("valid output");
        assert_eq!(inspected.page_count, report.page_count);
        assert_eq!(inspected.title.as_deref(), Some("Riverside Apartments"));
        assert_eq!(inspected.image_count, 0);
        assert_eq!(report.output_sha256, sha256_hex(&bytes));
        assert_eq!(report.metrics.output_bytes, bytes.len());
        assert_eq!(report.catalog_version, "v1");
        assert!(!report.catalog_fingerprint.is_empty());

        let keys: Vec<&str> = report.sections.iter().map(|s| s.key.as_str()).collect();
        let expected: Vec<&str> = SectionKind::ORDER.iter().map(|k| k.key()).collect();
        assert_eq!(keys, expected);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.to_json().contains("\"output_sha256\""));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let engine = engine();
        let doc = sample();
        let (first, first_report) = engine.render_pdf(&doc).expect("first");
        let (second, second_report) = engine.render_pdf(&doc).expect("second");
        assert_eq!(first, second);
        assert_eq!(first_report.output_sha256, second_report.output_sha256);

        let (html_a, _) = engine.render_html(&doc).expect("html");
        let (html_b, _) = engine.render_html(&doc).expect("html");
        assert_eq!(html_a, html_b);
    }

    #[test]
    fn html_and_pdf_share_pages_and_section_order() {
        let engine = engine();
        let doc = sample();
        let (_, pdf_report) = engine.render_pdf(&doc).expect("pdf");
        let (html, html_report) = engine.render_html(&doc).expect("html");
        assert_eq!(pdf_report.sections, html_report.sections);

        let parsed = kuchiki::parse_html().one(html.as_str());
        let pages = parsed.select("section.page").expect("selector").count();
        assert_eq!(pages, pdf_report.page_count);
        let sections: Vec<String> = parsed
            .select("g.meta")
            .expect("selector")
            .filter(|node| node.attributes.borrow().get("data-key") == Some(META_SECTION_KEY))
            .filter_map(|node| node.attributes.borrow().get("data-value").map(str::to_string))
            .collect();
        let expected: Vec<String> = SectionKind::ORDER.iter().map(|k| k.key().to_string()).collect();
        assert_eq!(sections, expected);
        let text = parsed.text_contents();
        assert!(text.contains("Erect scaffold"));
        assert!(text.contains("Scissor lift"));
    }

    #[test]
    fn initial_and_residual_badges_use_tier_colours() {
        let layout = engine().render_layout(&sample()).expect("layout");
        let page = layout
            .document
            .pages
            .iter()
            .find(|page| page.contains_text("Erect scaffold"))
            .expect("activities page");
        assert!(page.contains_text("Extreme (16)"));
        assert!(page.contains_text("Low (4)"));
        assert!(page.commands.contains(&Command::SetFillColor(RiskTier::Extreme.color())));
        assert!(page.commands.contains(&Command::SetFillColor(RiskTier::Low.color())));
    }

    #[test]
    fn empty_document_renders_empty_states() {
        let (html, report) = engine().render_html(&SwmsDocument::default()).expect("render");
        assert_eq!(report.page_count, SectionKind::ORDER.len());
        let parsed = kuchiki::parse_html().one(html.as_str());
        let text = parsed.text_contents();
        assert!(text.contains(EMPTY_STATE_TEXT));
        assert!(text.contains(PLACEHOLDER_TEXT));
    }

    #[test]
    fn unknown_hrcw_id_is_reported_without_output() {
        let mut doc = sample();
        doc.high_risk_activities.push(CatalogRef::Number(19));
        let err = engine().render_pdf(&doc).expect_err("unknown id");
        assert_eq!(err.kind(), RenderErrorKind::UnknownCatalogId);
        assert!(err.to_string().contains("'19'"));
    }

    #[test]
    fn long_activity_lists_paginate_in_html_and_pdf() {
        let engine = engine();
        let doc = tall_activities(25);
        let (bytes, report) = engine.render_pdf(&doc).expect("pdf");
        let span = report
            .sections
            .iter()
            .find(|s| s.key == SectionKind::WorkActivities.key())
            .expect("activities span");
        assert!(span.last_page > span.first_page);
        assert!(report.page_count > SectionKind::ORDER.len());
        assert_eq!(inspect_pdf_bytes(&bytes).expect("inspect").page_count, report.page_count);

        let (html, _) = engine.render_html(&doc).expect("html");
        let parsed = kuchiki::parse_html().one(html.as_str());
        let rows = parsed
            .select("g.meta")
            .expect("selector")
            .filter(|node| node.attributes.borrow().get("data-key") == Some(META_TABLE_ROW_KEY))
            .filter(|node| {
                node.attributes
                    .borrow()
                    .get("data-value")
                    .is_some_and(|v| v.starts_with("work_activities:"))
            })
            .count();
        assert_eq!(rows, 25);
        assert!(html.contains("(continued)"));
    }

    #[test]
    fn page_cap_rejects_oversized_layouts() {
        let engine = Riskify::builder()
            .limits(RenderLimits {
                max_pages: SectionKind::ORDER.len(),
                ..RenderLimits::default()
            })
            .build()
            .expect("engine");
        let err = engine.render_pdf(&tall_activities(25)).expect_err("too many pages");
        assert_eq!(err.kind(), RenderErrorKind::TooManyPages);
    }

    #[test]
    fn oversized_documents_fail_before_layout() {
        let err = engine()
            .render_pdf(&tall_activities(RenderLimits::default().max_activities + 1))
            .expect_err("too large");
        assert_eq!(err.kind(), RenderErrorKind::DocumentTooLarge);
    }

    #[test]
    fn builder_rejects_invalid_settings() {
        let cases = vec![
            Riskify::builder().sign_in_rows(0),
            Riskify::builder().sign_in_rows(MAX_SIGN_IN_ROWS + 1),
            Riskify::builder().margin_all(-1.0),
            Riskify::builder().margin_all(280.0),
            Riskify::builder().page_size(Size {
                width: Pt::ZERO,
                height: Pt::from_f32(100.0),
            }),
            Riskify::builder().document_title("   "),
            Riskify::builder().limits(RenderLimits {
                max_pages: 3,
                ..RenderLimits::default()
            }),
            Riskify::builder().limits(RenderLimits {
                max_field_chars: 0,
                ..RenderLimits::default()
            }),
        ];
        for builder in cases {
            let err = builder.build().err().expect("invalid configuration");
            assert_eq!(err.kind(), RenderErrorKind::InvalidConfiguration);
        }
        Riskify::builder()
            .sign_in_rows(MAX_SIGN_IN_ROWS)
            .risk_scale(RiskScale::Extended25)
            .page_size(Size::a4())
            .build()
            .expect("valid configuration");
    }

    #[test]
    fn sign_in_rows_follow_configuration() {
        let engine = Riskify::builder().sign_in_rows(5).build().expect("engine");
        let layout = engine.render_layout(&SwmsDocument::default()).expect("layout");
        let rows = layout
            .document
            .pages
            .iter()
            .flat_map(|page| page.meta_values(META_TABLE_ROW_KEY))
            .filter(|value| value.starts_with("sign_in:"))
            .count();
        assert_eq!(rows, 5);
    }

    #[test]
    fn batch_rendering_keeps_order_and_isolates_failures() {
        let engine = engine();
        let good = sample();
        let mut bad = sample();
        bad.high_risk_activities = vec![CatalogRef::Text("0".to_string())];
        let docs = vec![good.clone(), bad, tall_activities(3)];
        let results = engine.render_many_pdf(&docs);
        assert_eq!(results.len(), 3);
        let (first, _) = results[0].as_ref().expect("first renders");
        assert_eq!(first, &engine.render_pdf(&good).expect("single").0);
        assert!(matches!(&results[1], Err(err) if err.kind() == RenderErrorKind::UnknownCatalogId));
        assert!(results[2].is_ok());
    }

    #[test]
    fn warnings_reach_report_and_debug_log() {
        let path = temp_path("debug.jsonl");
        let engine = Riskify::builder().debug_log(&path).build().expect("engine");
        let mut doc = sample();
        doc.work_activities[0].initial_risk_score = Some(ScoreInput::Int(40));
        doc.project.project_name = Some("\u{5de5}\u{5730} Stage 2".to_string());
        let (_, report) = engine.render_pdf(&doc).expect("render");
        assert!(report.has_warning(WARN_RISK_SCORE_CLAMPED));
        assert!(report.has_warning(WARN_UNENCODABLE_TEXT));

        let log = std::fs::read_to_string(&path).expect("debug log");
        let types: Vec<String> = log
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
            .filter_map(|value| value["type"].as_str().map(str::to_string))
            .collect();
        assert_eq!(types.first().map(String::as_str), Some("render.start"));
        assert!(types.iter().any(|t| t == "risk.clamped"));
        assert!(types.iter().any(|t| t == "render.finish"));
        assert_eq!(types.last().map(String::as_str), Some("debug.summary"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn logo_is_embedded_once_and_bad_logo_falls_back() {
        let png = crate::assets::test_png(60, 30, [20, 80, 160, 255]);
        let engine = Riskify::builder().logo_bytes(png).build().expect("engine");
        let (bytes, report) = engine.render_pdf(&sample()).expect("render");
        assert_eq!(inspect_pdf_bytes(&bytes).expect("inspect").image_count, 1);
        assert!(report.warnings.is_empty());

        let engine = Riskify::builder()
            .logo_path(temp_path("missing_logo.png"))
            .build()
            .expect("engine");
        let (bytes, report) = engine.render_pdf(&sample()).expect("render");
        assert!(report.has_warning(WARN_LOGO_FALLBACK));
        assert_eq!(inspect_pdf_bytes(&bytes).expect("inspect").image_count, 0);
    }

    #[test]
    fn json_entry_point_and_file_output() {
        let engine = Riskify::builder()
            .document_title("SWMS 12 Scaffold")
            .build()
            .expect("engine");
        let (bytes, report) = engine.render_pdf_json(SAMPLE_JSON).expect("render");
        assert_eq!(report.title, "SWMS 12 Scaffold");

        let path = temp_path("out.pdf");
        let file_report = engine.render_pdf_to_file(&sample(), &path).expect("write");
        assert_eq!(std::fs::read(&path).expect("read back"), bytes);
        assert_eq!(file_report.output_sha256, report.output_sha256);
        let _ = std::fs::remove_file(&path);

        let err = engine.render_pdf_json("{ not json").expect_err("bad json");
        assert_eq!(err.kind(), RenderErrorKind::InvalidInput);
    }
}
