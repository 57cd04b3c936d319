use crate::error::RenderError;
use crate::model::{CatalogRef, PpeSelection, PpeStatus};
use riskify_catalog::{
    CATALOG_VERSION, HRCW_CATEGORY_COUNT, HrcwCategoryDef, PpeItemDef, builtin_hrcw_categories,
    builtin_ppe_items, catalog_fingerprint_sha256, fingerprint_sha256, parse_hrcw_categories,
    parse_ppe_items,
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Catalogs {
    inner: Arc<CatalogData>,
}

#[derive(Debug)]
struct CatalogData {
    hrcw: Vec<HrcwCategoryDef>,
    ppe: Vec<PpeItemDef>,
    version: String,
    fingerprint: String,
}

impl Catalogs {
    pub fn builtin() -> Result<Self, RenderError> {
        let hrcw = builtin_hrcw_categories()?.to_vec();
        let ppe = builtin_ppe_items()?.to_vec();
        Ok(Self::from_parts(
            hrcw,
            ppe,
            format!("v{}", CATALOG_VERSION),
            catalog_fingerprint_sha256(),
        ))
    }

    pub fn from_json(hrcw_json: &str, ppe_json: &str) -> Result<Self, RenderError> {
        let hrcw = parse_hrcw_categories(hrcw_json)?;
        let ppe = parse_ppe_items(ppe_json)?;
        let fingerprint = fingerprint_sha256(hrcw_json, ppe_json);
        let version = format!("custom-{}", &fingerprint[..8]);
        Ok(Self::from_parts(hrcw, ppe, version, fingerprint))
    }

    fn from_parts(
        hrcw: Vec<HrcwCategoryDef>,
        ppe: Vec<PpeItemDef>,
        version: String,
        fingerprint: String,
    ) -> Self {
        Self {
            inner: Arc::new(CatalogData {
                hrcw,
                ppe,
                version,
                fingerprint,
            }),
        }
    }

    pub fn hrcw_categories(&self) -> &[HrcwCategoryDef] {
        &self.inner.hrcw
    }

    pub fn ppe_items(&self) -> &[PpeItemDef] {
        &self.inner.ppe
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn fingerprint(&self) -> &str {
        &self.inner.fingerprint
    }

    /// Re-checks the invariants the renderer depends on. Catalogues are
    /// validated on load; this guards a render against a catalogue that was
    /// assembled some other way.
    pub fn ensure_complete(&self) -> Result<(), RenderError> {
        let ids: BTreeSet<u8> = self.inner.hrcw.iter().map(|c| c.id).collect();
        if ids.len() != HRCW_CATEGORY_COUNT as usize
            || self.inner.hrcw.len() != HRCW_CATEGORY_COUNT as usize
        {
            return Err(RenderError::CatalogInvalid(format!(
                "HRCW catalog has {} categories, expected {}",
                self.inner.hrcw.len(),
                HRCW_CATEGORY_COUNT
            )));
        }
        if self.inner.ppe.is_empty() {
            return Err(RenderError::CatalogInvalid("PPE catalog is empty".to_string()));
        }
        Ok(())
    }

    pub fn resolve_hrcw_selection(&self, refs: &[CatalogRef]) -> Result<BTreeSet<u8>, RenderError> {
        let mut selected = BTreeSet::new();
        for reference in refs {
            let id = match reference {
                CatalogRef::Number(value) => u8::try_from(*value).ok(),
                CatalogRef::Text(raw) => raw.trim().parse::<u8>().ok(),
            };
            let known = id.filter(|id| self.inner.hrcw.iter().any(|c| c.id == *id));
            match known {
                Some(id) => {
                    selected.insert(id);
                }
                None => {
                    return Err(RenderError::UnknownCatalogId {
                        section: "high_risk_activities",
                        id: reference.display(),
                    });
                }
            }
        }
        Ok(selected)
    }

    /// Resolves PPE selections in document order. Duplicate ids keep their
    /// first occurrence; an id missing from the catalogue fails the render.
    pub fn resolve_ppe_selection(
        &self,
        selections: &[PpeSelection],
    ) -> Result<Vec<(PpeItemDef, PpeStatus)>, RenderError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut out = Vec::new();
        for selection in selections {
            let id = selection.id();
            let item = self
                .inner
                .ppe
                .iter()
                .find(|item| item.id.eq_ignore_ascii_case(id))
                .ok_or_else(|| RenderError::UnknownCatalogId {
                    section: "ppe",
                    id: id.to_string(),
                })?;
            if seen.insert(item.id.as_str()) {
                out.push((item.clone(), selection.status()));
            }
        }
        Ok(out)
    }
}
