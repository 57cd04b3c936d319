use crate::error::RenderError;
use crate::risk::{RiskRating, RiskScale, classify};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PLACEHOLDER_TEXT: &str = "Not specified";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwmsDocument {
    #[serde(flatten)]
    pub project: ProjectInfo,
    #[serde(flatten)]
    pub personnel: Personnel,
    #[serde(flatten)]
    pub emergency: EmergencyInfo,
    #[serde(alias = "activities")]
    pub work_activities: Vec<WorkActivity>,
    #[serde(alias = "hrcwCategories", alias = "selectedHRCWCategories")]
    pub high_risk_activities: Vec<CatalogRef>,
    #[serde(alias = "ppe", alias = "ppeItems")]
    pub ppe_requirements: Vec<PpeSelection>,
    #[serde(alias = "equipment", alias = "plantEquipmentList")]
    pub plant_equipment: Vec<PlantEquipment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub company_name: Option<String>,
    #[serde(alias = "jobName")]
    pub project_name: Option<String>,
    pub job_number: Option<String>,
    pub project_address: Option<String>,
    pub start_date: Option<String>,
    pub duration: Option<String>,
    pub project_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Personnel {
    pub principal_contractor: Option<String>,
    pub project_manager: Option<String>,
    pub site_supervisor: Option<String>,
    pub authorised_person: Option<String>,
    pub authorised_position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkActivity {
    #[serde(alias = "name", alias = "task")]
    pub activity: Option<String>,
    pub hazards: Vec<String>,
    pub control_measures: Vec<String>,
    pub legislation: Vec<String>,
    pub initial_risk_score: Option<ScoreInput>,
    pub residual_risk_score: Option<ScoreInput>,
}

/// A risk score as it arrives on the wire: usually an integer, sometimes a
/// float or a string typed into a free-text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScoreInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreInput::Int(value) => write!(f, "{}", value),
            ScoreInput::Float(value) => write!(f, "{}", value),
            ScoreInput::Text(raw) => write!(f, "\"{}\"", raw),
        }
    }
}

impl From<i64> for ScoreInput {
    fn from(value: i64) -> Self {
        ScoreInput::Int(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    NotAssessed,
    Rated {
        rating: RiskRating,
        malformed: bool,
    },
}

impl ScoreOutcome {
    pub fn rating(&self) -> Option<RiskRating> {
        match self {
            ScoreOutcome::NotAssessed => None,
            ScoreOutcome::Rated { rating, .. } => Some(*rating),
        }
    }
}

impl ScoreInput {
    fn as_number(&self) -> Option<i64> {
        match self {
            ScoreInput::Int(value) => Some(*value),
            ScoreInput::Float(value) if value.is_finite() => Some(value.round() as i64),
            ScoreInput::Float(_) => None,
            ScoreInput::Text(raw) => {
                let raw = raw.trim();
                raw.parse::<i64>().ok().or_else(|| {
                    raw.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v.round() as i64)
                })
            }
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, ScoreInput::Text(raw) if raw.trim().is_empty())
    }
}

pub fn resolve_score(input: Option<&ScoreInput>, scale: RiskScale) -> ScoreOutcome {
    let Some(input) = input.filter(|input| !input.is_blank()) else {
        return ScoreOutcome::NotAssessed;
    };
    match input.as_number() {
        Some(score) => ScoreOutcome::Rated {
            rating: classify(scale, score),
            malformed: false,
        },
        None => ScoreOutcome::Rated {
            rating: classify(scale, scale.max_score()),
            malformed: true,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogRef {
    Number(i64),
    Text(String),
}

impl CatalogRef {
    pub fn display(&self) -> String {
        match self {
            CatalogRef::Number(value) => value.to_string(),
            CatalogRef::Text(raw) => raw.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PpeStatus {
    #[default]
    Required,
    Recommended,
}

impl PpeStatus {
    pub fn label(self) -> &'static str {
        match self {
            PpeStatus::Required => "Required",
            PpeStatus::Recommended => "Recommended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PpeSelection {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        status: PpeStatus,
    },
}

impl PpeSelection {
    pub fn id(&self) -> &str {
        match self {
            PpeSelection::Id(id) => id.trim(),
            PpeSelection::Detailed { id, .. } => id.trim(),
        }
    }

    pub fn status(&self) -> PpeStatus {
        match self {
            PpeSelection::Id(_) => PpeStatus::Required,
            PpeSelection::Detailed { status, .. } => *status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantEquipment {
    #[serde(alias = "equipment")]
    pub name: Option<String>,
    pub model: Option<String>,
    #[serde(alias = "serial")]
    pub serial_number: Option<String>,
    pub hazards: Vec<String>,
    pub control_measures: Vec<String>,
    pub risk_level: Option<String>,
    #[serde(alias = "inspectionDate")]
    pub next_inspection_date: Option<String>,
    pub certification_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    pub fn entries(&self) -> Vec<&str> {
        match self {
            TextOrList::Text(text) => clean_list(text.lines()),
            TextOrList::List(items) => clean_list(items.iter().map(String::as_str)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyInfo {
    pub emergency_contacts: Vec<EmergencyContact>,
    pub emergency_procedures: Option<TextOrList>,
    #[serde(alias = "monitoringRequirements")]
    pub emergency_monitoring: Option<TextOrList>,
}

pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn clean_list<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderLimits {
    pub max_pages: usize,
    pub max_activities: usize,
    pub max_equipment: usize,
    pub max_list_items: usize,
    pub max_contacts: usize,
    pub max_text_chars: usize,
    pub max_field_chars: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_pages: 200,
            max_activities: 250,
            max_equipment: 150,
            max_list_items: 40,
            max_contacts: 12,
            max_text_chars: 2_000,
            max_field_chars: 160,
        }
    }
}

fn check_count(what: &'static str, count: usize, limit: usize) -> Result<(), RenderError> {
    if count > limit {
        return Err(RenderError::DocumentTooLarge { what, count, limit });
    }
    Ok(())
}

fn check_text(field: &'static str, value: &str, limit: usize) -> Result<(), RenderError> {
    check_count(field, value.chars().count(), limit)
}

impl SwmsDocument {
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        serde_json::from_str(json).map_err(|err| RenderError::InvalidInput(err.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self == &SwmsDocument::default()
    }

    /// Rejects documents whose size would make layout unreasonably large.
    pub fn check_limits(&self, limits: &RenderLimits) -> Result<(), RenderError> {
        check_count("work activities", self.work_activities.len(), limits.max_activities)?;
        check_count("plant/equipment entries", self.plant_equipment.len(), limits.max_equipment)?;
        check_count(
            "emergency contacts",
            self.emergency.emergency_contacts.len(),
            limits.max_contacts,
        )?;
        for activity in &self.work_activities {
            check_count("hazards in one activity", activity.hazards.len(), limits.max_list_items)?;
            check_count(
                "control measures in one activity",
                activity.control_measures.len(),
                limits.max_list_items,
            )?;
            check_count(
                "legislation references in one activity",
                activity.legislation.len(),
                limits.max_list_items,
            )?;
            let texts = activity
                .hazards
                .iter()
                .chain(&activity.control_measures)
                .chain(&activity.legislation);
            for text in texts {
                check_text("characters in one activity field", text, limits.max_text_chars)?;
            }
            if let Some(name) = &activity.activity {
                check_text("characters in one activity name", name, limits.max_field_chars)?;
            }
        }
        for equipment in &self.plant_equipment {
            check_count("hazards in one equipment entry", equipment.hazards.len(), limits.max_list_items)?;
            check_count(
                "control measures in one equipment entry",
                equipment.control_measures.len(),
                limits.max_list_items,
            )?;
            for text in equipment.hazards.iter().chain(&equipment.control_measures) {
                check_text("characters in one equipment field", text, limits.max_text_chars)?;
            }
            let labels = [
                &equipment.name,
                &equipment.model,
                &equipment.serial_number,
                &equipment.risk_level,
                &equipment.next_inspection_date,
            ];
            for text in labels.into_iter().flatten() {
                check_text("characters in one equipment label", text, limits.max_field_chars)?;
            }
        }
        for contact in &self.emergency.emergency_contacts {
            for text in [&contact.name, &contact.phone].into_iter().flatten() {
                check_text("characters in one emergency contact field", text, limits.max_field_chars)?;
            }
        }
        for text in [&self.project.project_description, &self.project.project_address]
            .into_iter()
            .flatten()
        {
            check_text("characters in one project field", text, limits.max_text_chars)?;
        }
        let short_fields = [
            &self.project.company_name,
            &self.project.project_name,
            &self.project.job_number,
            &self.project.start_date,
            &self.project.duration,
            &self.personnel.principal_contractor,
            &self.personnel.project_manager,
            &self.personnel.site_supervisor,
            &self.personnel.authorised_person,
            &self.personnel.authorised_position,
        ];
        for text in short_fields.into_iter().flatten() {
            check_text("characters in one project detail", text, limits.max_field_chars)?;
        }
        for block in [&self.emergency.emergency_procedures, &self.emergency.emergency_monitoring]
            .into_iter()
            .flatten()
        {
            let total: usize = block.entries().iter().map(|e| e.chars().count()).sum();
            check_count("characters in an emergency text block", total, limits.max_text_chars)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskTier;

    #[test]
    fn deserializes_web_payload() {
        let json = r#"{
            "companyName": "Acme Builders",
            "jobName": "Riverside Apartments",
            "jobNumber": "J-2041",
            "principalContractor": "Acme Builders Pty Ltd",
            "workActivities": [
                {"activity": "Excavation", "hazards": ["Collapse"], "controlMeasures": ["Shoring"],
                 "legislation": ["WHS Reg 2011 s306"], "initialRiskScore": 16, "residualRiskScore": "4"}
            ],
            "highRiskActivities": [1, "7"],
            "ppeRequirements": ["hard-hat", {"id": "gloves", "status": "recommended"}],
            "emergencyContacts": [{"name": "Site First Aid", "phone": "0400 000 000"}],
            "emergencyProcedures": "Evacuate to assembly point\nCall 000",
            "plantEquipment": [{"name": "Excavator", "riskLevel": "High", "certificationRequired": true}]
        }"#;
        let doc = SwmsDocument::from_json(json).expect("payload parses");
        assert_eq!(present(&doc.project.project_name), Some("Riverside Apartments"));
        assert_eq!(doc.work_activities.len(), 1);
        assert_eq!(doc.high_risk_activities, vec![CatalogRef::Number(1), CatalogRef::Text("7".into())]);
        assert_eq!(doc.ppe_requirements[1].status(), PpeStatus::Recommended);
        assert_eq!(doc.ppe_requirements[0].status(), PpeStatus::Required);
        let procedures = doc.emergency.emergency_procedures.as_ref().expect("procedures");
        assert_eq!(procedures.entries(), vec!["Evacuate to assembly point", "Call 000"]);
        assert!(doc.plant_equipment[0].certification_required);
    }

    #[test]
    fn empty_object_is_an_empty_document() {
        let doc = SwmsDocument::from_json("{}").expect("empty object parses");
        assert!(doc.is_empty());
        assert!(SwmsDocument::from_json("[1,2]").is_err());
    }

    #[test]
    fn score_resolution() {
        let scale = RiskScale::Standard16;
        assert_eq!(resolve_score(None, scale), ScoreOutcome::NotAssessed);
        assert_eq!(
            resolve_score(Some(&ScoreInput::Text("  ".into())), scale),
            ScoreOutcome::NotAssessed
        );
        let text = resolve_score(Some(&ScoreInput::Text("12".into())), scale);
        assert_eq!(text.rating().map(|r| r.score), Some(12));
        let float = resolve_score(Some(&ScoreInput::Float(6.4)), scale);
        assert_eq!(float.rating().map(|r| r.tier), Some(RiskTier::Low));
        match resolve_score(Some(&ScoreInput::Text("high-ish".into())), scale) {
            ScoreOutcome::Rated { rating, malformed } => {
                assert!(malformed);
                assert_eq!(rating.tier, RiskTier::Extreme);
            }
            other => panic!("expected a rating, got {other:?}"),
        }
    }

    #[test]
    fn blank_text_is_missing() {
        assert_eq!(present(&Some("  ".to_string())), None);
        assert_eq!(present(&Some(" Jo ".to_string())), Some("Jo"));
        assert_eq!(clean_list(["a", " ", "b "]), vec!["a", "b"]);
    }

    #[test]
    fn limits_reject_oversized_documents() {
        let limits = RenderLimits {
            max_activities: 2,
            ..RenderLimits::default()
        };
        let doc = SwmsDocument {
            work_activities: vec![WorkActivity::default(); 3],
            ..SwmsDocument::default()
        };
        let err = doc.check_limits(&limits).expect_err("three activities exceed the limit");
        assert!(matches!(
            err,
            RenderError::DocumentTooLarge { count: 3, limit: 2, .. }
        ));

        let long = SwmsDocument {
            work_activities: vec![WorkActivity {
                hazards: vec!["x".repeat(5_000)],
                ..WorkActivity::default()
            }],
            ..SwmsDocument::default()
        };
        assert!(long.check_limits(&RenderLimits::default()).is_err());
    }

    #[test]
    fn short_fields_have_their_own_bound() {
        let limits = RenderLimits::default();
        let mut doc = SwmsDocument::default();
        doc.emergency.emergency_contacts = vec![EmergencyContact {
            name: Some("Site First Aid".to_string()),
            phone: Some("0".repeat(limits.max_field_chars + 1)),
        }];
        let err = doc.check_limits(&limits).expect_err("phone number is too long");
        assert!(matches!(
            err,
            RenderError::DocumentTooLarge { what: "characters in one emergency contact field", .. }
        ));

        let mut equipment = SwmsDocument::default();
        equipment.plant_equipment = vec![PlantEquipment {
            serial_number: Some("S".repeat(limits.max_field_chars + 1)),
            ..PlantEquipment::default()
        }];
        assert!(equipment.check_limits(&limits).is_err());

        let mut fits = SwmsDocument::default();
        fits.project.duration = Some("d".repeat(limits.max_field_chars));
        fits.project.project_description = Some("x".repeat(limits.max_text_chars));
        fits.check_limits(&limits).expect("values at the limit are accepted");
    }
}
