use riskify_catalog::CatalogError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderErrorKind {
    InvalidInput,
    UnknownCatalogId,
    CatalogInvalid,
    DocumentTooLarge,
    TooManyPages,
    UnplaceableContent,
    InvalidConfiguration,
    Asset,
    Io,
}

impl RenderErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            RenderErrorKind::InvalidInput => "INVALID_INPUT",
            RenderErrorKind::UnknownCatalogId => "UNKNOWN_CATALOG_ID",
            RenderErrorKind::CatalogInvalid => "CATALOG_INVALID",
            RenderErrorKind::DocumentTooLarge => "DOCUMENT_TOO_LARGE",
            RenderErrorKind::TooManyPages => "TOO_MANY_PAGES",
            RenderErrorKind::UnplaceableContent => "UNPLACEABLE_CONTENT",
            RenderErrorKind::InvalidConfiguration => "INVALID_CONFIGURATION",
            RenderErrorKind::Asset => "ASSET",
            RenderErrorKind::Io => "IO",
        }
    }
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug)]
pub enum RenderError {
    InvalidInput(String),
    UnknownCatalogId { section: &'static str, id: String },
    CatalogInvalid(String),
    DocumentTooLarge {
        what: &'static str,
        count: usize,
        limit: usize,
    },
    TooManyPages { pages: usize, limit: usize },
    UnplaceableContent(String),
    InvalidConfiguration(String),
    Asset(String),
    Io(std::io::Error),
}

impl RenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            RenderError::InvalidInput(_) => RenderErrorKind::InvalidInput,
            RenderError::UnknownCatalogId { .. } => RenderErrorKind::UnknownCatalogId,
            RenderError::CatalogInvalid(_) => RenderErrorKind::CatalogInvalid,
            RenderError::DocumentTooLarge { .. } => RenderErrorKind::DocumentTooLarge,
            RenderError::TooManyPages { .. } => RenderErrorKind::TooManyPages,
            RenderError::UnplaceableContent(_) => RenderErrorKind::UnplaceableContent,
            RenderError::InvalidConfiguration(_) => RenderErrorKind::InvalidConfiguration,
            RenderError::Asset(_) => RenderErrorKind::Asset,
            RenderError::Io(_) => RenderErrorKind::Io,
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            RenderError::UnknownCatalogId { section, id } => {
                write!(f, "unknown catalog id '{}' in section {}", id, section)
            }
            RenderError::CatalogInvalid(message) => write!(f, "catalog invalid: {}", message),
            RenderError::DocumentTooLarge { what, count, limit } => write!(
                f,
                "document too large: {} {} exceeds limit of {}",
                count, what, limit
            ),
            RenderError::TooManyPages { pages, limit } => write!(
                f,
                "document would need at least {} pages, limit is {}",
                pages, limit
            ),
            RenderError::UnplaceableContent(message) => {
                write!(f, "content cannot fit on any page: {}", message)
            }
            RenderError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            RenderError::Asset(message) => write!(f, "asset error: {}", message),
            RenderError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(value: std::io::Error) -> Self {
        RenderError::Io(value)
    }
}

impl From<CatalogError> for RenderError {
    fn from(value: CatalogError) -> Self {
        RenderError::CatalogInvalid(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_catalog_id_names_section_and_id() {
        let err = RenderError::UnknownCatalogId {
            section: "high_risk_activities",
            id: "19".to_string(),
        };
        assert_eq!(err.kind(), RenderErrorKind::UnknownCatalogId);
        let text = err.to_string();
        assert!(text.contains("'19'"));
        assert!(text.contains("high_risk_activities"));
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err: RenderError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind().code(), "IO");
        assert!(err.source().is_some());
    }
}
