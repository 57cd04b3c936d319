use lopdf::{Dictionary, Document as LoDocument, Object};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfInspectErrorCode {
    PdfParseFailed,
    PdfEncryptedUnsupported,
    PdfEmptyOrNoPages,
    PdfEmbeddedFont,
    PdfIoError,
}

impl PdfInspectErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfInspectErrorCode::PdfParseFailed => "PDF_PARSE_FAILED",
            PdfInspectErrorCode::PdfEncryptedUnsupported => "PDF_ENCRYPTED_UNSUPPORTED",
            PdfInspectErrorCode::PdfEmptyOrNoPages => "PDF_EMPTY_OR_NO_PAGES",
            PdfInspectErrorCode::PdfEmbeddedFont => "PDF_EMBEDDED_FONT",
            PdfInspectErrorCode::PdfIoError => "PDF_IO_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInspectError {
    pub code: PdfInspectErrorCode,
    pub message: String,
}

impl std::fmt::Display for PdfInspectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for PdfInspectError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInspectReport {
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub file_size_bytes: usize,
    pub title: Option<String>,
    pub producer: Option<String>,
    pub base_fonts: BTreeSet<String>,
    pub embedded_font_programs: usize,
    pub image_count: usize,
}

// Info strings are written WinAnsi; Latin-1 covers everything we emit there
// apart from the 0x80..0x9F punctuation block.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

fn info_string(pdf: &LoDocument, info: Option<&Dictionary>, key: &[u8]) -> Option<String> {
    let value = info?.get(key).ok()?;
    match pdf.dereference(value).ok()?.1 {
        Object::String(bytes, _) => Some(latin1(bytes)),
        _ => None,
    }
}

fn is_font_program_holder(dict: &Dictionary) -> bool {
    dict.has(b"FontFile") || dict.has(b"FontFile2") || dict.has(b"FontFile3")
}

pub fn inspect_pdf_bytes(bytes: &[u8]) -> Result<PdfInspectReport, PdfInspectError> {
    let pdf = LoDocument::load_mem(bytes).map_err(|err| PdfInspectError {
        code: PdfInspectErrorCode::PdfParseFailed,
        message: err.to_string(),
    })?;

    let info = pdf
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| pdf.get_dictionary(id).ok());

    let mut base_fonts = BTreeSet::new();
    let mut embedded_font_programs = 0usize;
    let mut image_count = 0usize;
    for object in pdf.objects.values() {
        match object {
            Object::Dictionary(dict) => {
                if dict.get(b"Type").and_then(Object::as_name).ok() == Some(b"Font".as_slice()) {
                    if let Ok(name) = dict.get(b"BaseFont").and_then(Object::as_name) {
                        base_fonts.insert(latin1(name));
                    }
                }
                if is_font_program_holder(dict) {
                    embedded_font_programs += 1;
                }
            }
            Object::Stream(stream) => {
                if stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice()) {
                    image_count += 1;
                }
            }
            _ => {}
        }
    }

    Ok(PdfInspectReport {
        pdf_version: pdf.version.clone(),
        page_count: pdf.get_pages().len(),
        encrypted: pdf.is_encrypted(),
        file_size_bytes: bytes.len(),
        title: info_string(&pdf, info, b"Title"),
        producer: info_string(&pdf, info, b"Producer"),
        base_fonts,
        embedded_font_programs,
        image_count,
    })
}

pub fn inspect_pdf_path(path: &Path) -> Result<PdfInspectReport, PdfInspectError> {
    let data = std::fs::read(path).map_err(|err| PdfInspectError {
        code: PdfInspectErrorCode::PdfIoError,
        message: err.to_string(),
    })?;
    inspect_pdf_bytes(&data)
}

pub fn output_issues(report: &PdfInspectReport) -> Vec<PdfInspectErrorCode> {
    let mut issues = Vec::new();
    if report.encrypted {
        issues.push(PdfInspectErrorCode::PdfEncryptedUnsupported);
    }
    if report.page_count == 0 {
        issues.push(PdfInspectErrorCode::PdfEmptyOrNoPages);
    }
    if report.embedded_font_programs > 0 {
        issues.push(PdfInspectErrorCode::PdfEmbeddedFont);
    }
    issues
}

pub fn require_valid_output(report: &PdfInspectReport) -> Result<(), PdfInspectError> {
    match output_issues(report).into_iter().next() {
        None => Ok(()),
        Some(code) => {
            let message = match code {
                PdfInspectErrorCode::PdfEncryptedUnsupported => "pdf is encrypted".to_string(),
                PdfInspectErrorCode::PdfEmptyOrNoPages => "pdf has no pages".to_string(),
                PdfInspectErrorCode::PdfEmbeddedFont => format!(
                    "pdf embeds {} font program(s)",
                    report.embedded_font_programs
                ),
                PdfInspectErrorCode::PdfParseFailed | PdfInspectErrorCode::PdfIoError => {
                    code.as_str().to_string()
                }
            };
            Err(PdfInspectError { code, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Command, Document, Page};
    use crate::pdf::{PdfOptions, document_to_pdf};
    use crate::types::{Pt, Size};

    fn statement_bytes(pages: usize, title: &str) -> Vec<u8> {
        let page = Page {
            commands: vec![
                Command::SetFontName("Helvetica-Bold".to_string()),
                Command::DrawString {
                    x: Pt::from_f32(20.0),
                    y: Pt::from_f32(20.0),
                    text: "SAFE WORK METHOD STATEMENT".to_string(),
                },
            ],
        };
        let doc = Document {
            page_size: Size::a4_landscape(),
            pages: vec![page; pages],
        };
        document_to_pdf(
            &doc,
            None,
            &PdfOptions {
                title: Some(title.to_string()),
            },
        )
    }

    fn report(encrypted: bool, page_count: usize, embedded_font_programs: usize) -> PdfInspectReport {
        PdfInspectReport {
            pdf_version: "1.7".to_string(),
            page_count,
            encrypted,
            file_size_bytes: 0,
            title: None,
            producer: None,
            base_fonts: BTreeSet::new(),
            embedded_font_programs,
            image_count: 0,
        }
    }

    #[test]
    fn reads_pages_info_and_fonts_of_rendered_output() {
        let bytes = statement_bytes(3, "Caf\u{e9} refit");
        let report = inspect_pdf_bytes(&bytes).expect("inspect");
        assert_eq!(report.page_count, 3);
        assert_eq!(report.pdf_version, "1.7");
        assert!(!report.encrypted);
        assert_eq!(report.file_size_bytes, bytes.len());
        assert_eq!(report.title.as_deref(), Some("Caf\u{e9} refit"));
        assert_eq!(report.producer.as_deref(), Some("Riskify"));
        assert!(report.base_fonts.contains("Helvetica-Bold"));
        assert_eq!(report.embedded_font_programs, 0);
        assert_eq!(report.image_count, 0);
        require_valid_output(&report).expect("valid");
    }

    #[test]
    fn rejects_malformed_data() {
        let err = inspect_pdf_bytes(b"not a pdf").expect_err("invalid");
        assert_eq!(err.code, PdfInspectErrorCode::PdfParseFailed);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let missing = std::env::temp_dir().join(format!(
            "riskify_pdfinspect_missing_{}.pdf",
            std::process::id()
        ));
        let err = inspect_pdf_path(&missing).expect_err("missing");
        assert_eq!(err.code, PdfInspectErrorCode::PdfIoError);
    }

    #[test]
    fn path_and_bytes_agree() {
        let bytes = statement_bytes(1, "Path");
        let dir = std::env::temp_dir().join(format!("riskify_pdfinspect_path_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("one.pdf");
        std::fs::write(&path, &bytes).expect("write");

        let from_path = inspect_pdf_path(&path).expect("inspect path");
        let from_bytes = inspect_pdf_bytes(&bytes).expect("inspect bytes");
        assert_eq!(from_path, from_bytes);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn output_issues_are_reported_in_order() {
        assert_eq!(
            output_issues(&report(true, 0, 2)),
            vec![
                PdfInspectErrorCode::PdfEncryptedUnsupported,
                PdfInspectErrorCode::PdfEmptyOrNoPages,
                PdfInspectErrorCode::PdfEmbeddedFont,
            ]
        );
        let err = require_valid_output(&report(false, 1, 1)).expect_err("embedded font");
        assert_eq!(err.code, PdfInspectErrorCode::PdfEmbeddedFont);
        assert!(output_issues(&report(false, 4, 0)).is_empty());
    }
}
