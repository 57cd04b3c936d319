use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

pub const CATALOG_ID: &str = "riskify.catalog";
pub const CATALOG_VERSION: &str = "1";

pub const HRCW_CATALOG_ID: &str = "riskify.hrcw_categories.v1";
pub const PPE_CATALOG_ID: &str = "riskify.ppe_items.v1";

/// Number of High-Risk Construction Work categories defined by the WHS regulations.
pub const HRCW_CATEGORY_COUNT: u8 = 18;

// The catalogues are compiled into the binary. Runtime never reads these files
// from disk; callers that need a newer catalogue pass their own JSON through
// `parse_hrcw_categories` / `parse_ppe_items`.
const HRCW_CATEGORIES_V1_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/catalogs/hrcw_categories.v1.json"
));
const PPE_ITEMS_V1_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/catalogs/ppe_items.v1.json"
));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrcwCategoryDef {
    pub id: u8,
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpeItemDef {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse { catalog: String, message: String },
    Invalid { catalog: String, message: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse { catalog, message } => {
                write!(f, "catalog {} is not valid JSON: {}", catalog, message)
            }
            CatalogError::Invalid { catalog, message } => {
                write!(f, "catalog {} is malformed: {}", catalog, message)
            }
        }
    }
}

impl std::error::Error for CatalogError {}

fn invalid(catalog: &str, message: impl Into<String>) -> CatalogError {
    CatalogError::Invalid {
        catalog: catalog.to_string(),
        message: message.into(),
    }
}

fn hex_sha256(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn hash_memoized(cell: &OnceLock<String>, text: &str) -> String {
    cell.get_or_init(|| hex_sha256(text.as_bytes())).clone()
}

static HRCW_CATALOG_HASH: OnceLock<String> = OnceLock::new();
static PPE_CATALOG_HASH: OnceLock<String> = OnceLock::new();
static CATALOG_FINGERPRINT: OnceLock<String> = OnceLock::new();
static BUILTIN_HRCW: OnceLock<Result<Vec<HrcwCategoryDef>, CatalogError>> = OnceLock::new();
static BUILTIN_PPE: OnceLock<Result<Vec<PpeItemDef>, CatalogError>> = OnceLock::new();

pub fn hrcw_categories_v1_json() -> &'static str {
    HRCW_CATEGORIES_V1_JSON
}

pub fn ppe_items_v1_json() -> &'static str {
    PPE_ITEMS_V1_JSON
}

pub fn hrcw_categories_v1_hash_sha256() -> String {
    hash_memoized(&HRCW_CATALOG_HASH, HRCW_CATEGORIES_V1_JSON)
}

pub fn ppe_items_v1_hash_sha256() -> String {
    hash_memoized(&PPE_CATALOG_HASH, PPE_ITEMS_V1_JSON)
}

pub fn fingerprint_sha256(hrcw_json: &str, ppe_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(CATALOG_ID.as_bytes());
    hasher.update(b"\n");
    hasher.update(CATALOG_VERSION.as_bytes());
    hasher.update(b"\n");
    hasher.update(hex_sha256(hrcw_json.as_bytes()).as_bytes());
    hasher.update(b"\n");
    hasher.update(hex_sha256(ppe_json.as_bytes()).as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn catalog_fingerprint_sha256() -> String {
    CATALOG_FINGERPRINT
        .get_or_init(|| fingerprint_sha256(HRCW_CATEGORIES_V1_JSON, PPE_ITEMS_V1_JSON))
        .clone()
}

pub fn catalog_json(name: &str) -> Option<&'static str> {
    match name {
        HRCW_CATALOG_ID => Some(HRCW_CATEGORIES_V1_JSON),
        PPE_CATALOG_ID => Some(PPE_ITEMS_V1_JSON),
        _ => None,
    }
}

fn parse_root(catalog: &str, json: &str) -> Result<Value, CatalogError> {
    serde_json::from_str(json).map_err(|err| CatalogError::Parse {
        catalog: catalog.to_string(),
        message: err.to_string(),
    })
}

fn optional_text(entry: &Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses and validates an HRCW catalogue. The catalogue must define exactly the
/// ids 1..=18, once each, every one with a non-empty title. Categories are
/// returned ordered by id.
pub fn parse_hrcw_categories(json: &str) -> Result<Vec<HrcwCategoryDef>, CatalogError> {
    let catalog = HRCW_CATALOG_ID;
    let root = parse_root(catalog, json)?;
    let entries = root
        .get("categories")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(catalog, "missing `categories` array"))?;

    let mut seen: BTreeSet<u8> = BTreeSet::new();
    let mut out: Vec<HrcwCategoryDef> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let raw_id = entry
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| invalid(catalog, format!("entry {} has no numeric id", index)))?;
        if raw_id == 0 || raw_id > HRCW_CATEGORY_COUNT as u64 {
            return Err(invalid(
                catalog,
                format!("entry {} has id {} outside 1..={}", index, raw_id, HRCW_CATEGORY_COUNT),
            ));
        }
        let id = raw_id as u8;
        if !seen.insert(id) {
            return Err(invalid(catalog, format!("duplicate id {}", id)));
        }
        let title = optional_text(entry, "title")
            .ok_or_else(|| invalid(catalog, format!("id {} has an empty title", id)))?;
        out.push(HrcwCategoryDef {
            id,
            title,
            description: optional_text(entry, "description"),
            color: optional_text(entry, "color"),
        });
    }

    if seen.len() != HRCW_CATEGORY_COUNT as usize {
        let missing: Vec<String> = (1..=HRCW_CATEGORY_COUNT)
            .filter(|id| !seen.contains(id))
            .map(|id| id.to_string())
            .collect();
        return Err(invalid(
            catalog,
            format!("missing ids: {}", missing.join(", ")),
        ));
    }

    out.sort_by_key(|c| c.id);
    Ok(out)
}

/// Parses and validates a PPE catalogue. Ids must be unique and non-empty and
/// every item needs a label. Catalogue order is preserved.
pub fn parse_ppe_items(json: &str) -> Result<Vec<PpeItemDef>, CatalogError> {
    let catalog = PPE_CATALOG_ID;
    let root = parse_root(catalog, json)?;
    let entries = root
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(catalog, "missing `items` array"))?;
    if entries.is_empty() {
        return Err(invalid(catalog, "catalog has no items"));
    }

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let id = optional_text(entry, "id")
            .ok_or_else(|| invalid(catalog, format!("entry {} has an empty id", index)))?;
        if !seen.insert(id.clone()) {
            return Err(invalid(catalog, format!("duplicate id `{}`", id)));
        }
        let label = optional_text(entry, "label")
            .ok_or_else(|| invalid(catalog, format!("id `{}` has an empty label", id)))?;
        out.push(PpeItemDef {
            id,
            label,
            description: optional_text(entry, "description"),
        });
    }
    Ok(out)
}

pub fn builtin_hrcw_categories() -> Result<&'static [HrcwCategoryDef], CatalogError> {
    match BUILTIN_HRCW.get_or_init(|| parse_hrcw_categories(HRCW_CATEGORIES_V1_JSON)) {
        Ok(list) => Ok(list.as_slice()),
        Err(err) => Err(err.clone()),
    }
}

pub fn builtin_ppe_items() -> Result<&'static [PpeItemDef], CatalogError> {
    match BUILTIN_PPE.get_or_init(|| parse_ppe_items(PPE_ITEMS_V1_JSON)) {
        Ok(list) => Ok(list.as_slice()),
        Err(err) => Err(err.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_nonempty() {
        let a = catalog_fingerprint_sha256();
        let b = catalog_fingerprint_sha256();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, fingerprint_sha256(hrcw_categories_v1_json(), ppe_items_v1_json()));
    }

    #[test]
    fn catalog_lookup_returns_known_payloads() {
        assert!(catalog_json(HRCW_CATALOG_ID)
            .unwrap()
            .contains("\"schema\": \"riskify.hrcw_categories.v1\""));
        assert!(catalog_json(PPE_CATALOG_ID)
            .unwrap()
            .contains("\"schema\": \"riskify.ppe_items.v1\""));
        assert!(catalog_json("unknown").is_none());
    }

    #[test]
    fn builtin_hrcw_catalog_has_eighteen_ordered_categories() {
        let categories = builtin_hrcw_categories().expect("embedded hrcw catalog");
        assert_eq!(categories.len(), 18);
        for (index, category) in categories.iter().enumerate() {
            assert_eq!(category.id as usize, index + 1);
            assert!(!category.title.is_empty());
        }
        assert_eq!(categories[17].title, "Diving work");
    }

    #[test]
    fn builtin_ppe_catalog_parses() {
        let items = builtin_ppe_items().expect("embedded ppe catalog");
        assert!(items.iter().any(|item| item.id == "hard-hat"));
        assert!(items.iter().all(|item| !item.label.is_empty()));
    }

    #[test]
    fn hrcw_catalog_missing_ids_is_rejected() {
        let json = r#"{"categories":[{"id":1,"title":"Falls"}]}"#;
        let err = parse_hrcw_categories(json).expect_err("incomplete catalog must fail");
        assert!(matches!(err, CatalogError::Invalid { .. }));
        assert!(err.to_string().contains("missing ids: 2, 3"));
    }

    #[test]
    fn hrcw_catalog_duplicate_and_out_of_range_ids_are_rejected() {
        let dup = r#"{"categories":[{"id":1,"title":"A"},{"id":1,"title":"B"}]}"#;
        assert!(parse_hrcw_categories(dup)
            .expect_err("duplicate id")
            .to_string()
            .contains("duplicate id 1"));

        let out_of_range = r#"{"categories":[{"id":19,"title":"A"}]}"#;
        assert!(parse_hrcw_categories(out_of_range)
            .expect_err("id 19")
            .to_string()
            .contains("outside 1..=18"));
    }

    #[test]
    fn hrcw_catalog_invalid_json_is_a_parse_error() {
        let err = parse_hrcw_categories("{not json").expect_err("bad json");
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn ppe_catalog_requires_unique_labelled_ids() {
        let dup = r#"{"items":[{"id":"a","label":"A"},{"id":"a","label":"B"}]}"#;
        assert!(parse_ppe_items(dup).is_err());
        let unlabeled = r#"{"items":[{"id":"a","label":"  "}]}"#;
        assert!(parse_ppe_items(unlabeled)
            .expect_err("blank label")
            .to_string()
            .contains("empty label"));
        let empty = r#"{"items":[]}"#;
        assert!(parse_ppe_items(empty).is_err());
    }
}
