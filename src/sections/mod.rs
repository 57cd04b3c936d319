mod emergency;
mod equipment;
mod hrcw;
mod ppe;
mod project_info;
mod risk_matrix;
mod sign_in;
mod work_activities;

pub use emergency::EmergencyBlock;
pub use equipment::equipment_table;
pub use hrcw::HrcwGrid;
pub use ppe::PpeGrid;
pub use project_info::ProjectInfoBlock;
pub use risk_matrix::RiskMatrixBlock;
pub use sign_in::sign_in_table;
pub use work_activities::activity_table;

use crate::RenderWarning;
use crate::catalog::Catalogs;
use crate::debug::DebugLogger;
use crate::error::RenderError;
use crate::flowable::{BlockFlowable, EmptyState, Flowable, SectionHeading};
use crate::model::{ScoreInput, ScoreOutcome, SwmsDocument, resolve_score};
use crate::risk::{NOT_ASSESSED_COLOR, RiskScale};
use crate::table::Cell;
use serde_json::json;

pub const WARN_RISK_SCORE_CLAMPED: &str = "RISK_SCORE_CLAMPED";
pub const WARN_RISK_SCORE_MALFORMED: &str = "RISK_SCORE_MALFORMED";
pub const WARN_RISK_LEVEL_MALFORMED: &str = "RISK_LEVEL_MALFORMED";
pub const WARN_RESIDUAL_EXCEEDS_INITIAL: &str = "RESIDUAL_EXCEEDS_INITIAL";
pub const WARN_LOGO_FALLBACK: &str = "LOGO_FALLBACK";

pub const NOT_ASSESSED_LABEL: &str = "Not assessed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    ProjectInfo,
    Emergency,
    HighRiskActivities,
    RiskMatrix,
    WorkActivities,
    Ppe,
    PlantEquipment,
    SignIn,
}

impl SectionKind {
    /// Document order. Every section starts on its own page.
    pub const ORDER: [SectionKind; 8] = [
        SectionKind::ProjectInfo,
        SectionKind::Emergency,
        SectionKind::HighRiskActivities,
        SectionKind::RiskMatrix,
        SectionKind::WorkActivities,
        SectionKind::Ppe,
        SectionKind::PlantEquipment,
        SectionKind::SignIn,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SectionKind::ProjectInfo => "project_info",
            SectionKind::Emergency => "emergency",
            SectionKind::HighRiskActivities => "high_risk_activities",
            SectionKind::RiskMatrix => "risk_matrix",
            SectionKind::WorkActivities => "work_activities",
            SectionKind::Ppe => "ppe",
            SectionKind::PlantEquipment => "plant_equipment",
            SectionKind::SignIn => "sign_in",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::ProjectInfo => "Project Information",
            SectionKind::Emergency => "Emergency Information",
            SectionKind::HighRiskActivities => "High-Risk Construction Work",
            SectionKind::RiskMatrix => "Risk Assessment Matrix",
            SectionKind::WorkActivities => "Work Activities & Risk Assessment",
            SectionKind::Ppe => "Personal Protective Equipment",
            SectionKind::PlantEquipment => "Plant & Equipment Register",
            SectionKind::SignIn => "Sign-In Register",
        }
    }

    pub fn part_label(self) -> &'static str {
        match self {
            SectionKind::ProjectInfo => "pt of unsplittable project information content",
            SectionKind::Emergency => "pt of unsplittable emergency information content",
            SectionKind::HighRiskActivities => "pt of unsplittable high-risk work content",
            SectionKind::RiskMatrix => "pt of unsplittable risk matrix content",
            SectionKind::WorkActivities => "pt of unsplittable work activities content",
            SectionKind::Ppe => "pt of unsplittable PPE content",
            SectionKind::PlantEquipment => "pt of unsplittable plant/equipment content",
            SectionKind::SignIn => "pt of unsplittable sign-in content",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|kind| kind.key() == key)
    }

    fn number(self) -> usize {
        Self::ORDER
            .iter()
            .position(|kind| *kind == self)
            .map_or(0, |index| index + 1)
    }

    pub fn heading(self) -> SectionHeading {
        SectionHeading::new(self.key(), format!("{}. {}", self.number(), self.title()))
    }
}

pub struct LayoutContext<'a> {
    pub scale: RiskScale,
    pub catalogs: &'a Catalogs,
    pub sign_in_rows: usize,
    pub warnings: Vec<RenderWarning>,
    debug: Option<&'a DebugLogger>,
}

fn event_name(code: &str) -> &'static str {
    match code {
        WARN_RISK_SCORE_CLAMPED => "risk.clamped",
        WARN_RISK_SCORE_MALFORMED => "risk.malformed",
        WARN_RISK_LEVEL_MALFORMED => "risk.level_malformed",
        WARN_RESIDUAL_EXCEEDS_INITIAL => "risk.residual_exceeds_initial",
        WARN_LOGO_FALLBACK => "asset.logo_fallback",
        _ => "render.warning",
    }
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        scale: RiskScale,
        catalogs: &'a Catalogs,
        sign_in_rows: usize,
        debug: Option<&'a DebugLogger>,
    ) -> Self {
        Self {
            scale,
            catalogs,
            sign_in_rows,
            warnings: Vec::new(),
            debug,
        }
    }

    pub fn warn(&mut self, code: &'static str, message: String) {
        if let Some(logger) = self.debug {
            logger.log_event(event_name(code), json!({ "code": code, "message": message }));
            logger.increment(event_name(code), 1);
        }
        self.warnings.push(RenderWarning { code, message });
    }

    pub fn rate(&mut self, input: Option<&ScoreInput>, subject: &str) -> ScoreOutcome {
        let outcome = resolve_score(input, self.scale);
        if let (ScoreOutcome::Rated { rating, malformed }, Some(raw)) = (outcome, input) {
            if malformed {
                self.warn(
                    WARN_RISK_SCORE_MALFORMED,
                    format!("{}: score {} is not a number; rated {}", subject, raw, rating.badge_text()),
                );
            } else if rating.clamped {
                self.warn(
                    WARN_RISK_SCORE_CLAMPED,
                    format!(
                        "{}: score {} is outside {} and was clamped to {}",
                        subject,
                        raw,
                        self.scale.describe(),
                        rating.score
                    ),
                );
            }
        }
        outcome
    }
}

pub fn score_badge(outcome: ScoreOutcome) -> Cell {
    match outcome.rating() {
        Some(rating) => Cell::Badge {
            label: rating.badge_text(),
            fill: rating.color(),
        },
        None => Cell::Badge {
            label: NOT_ASSESSED_LABEL.to_string(),
            fill: NOT_ASSESSED_COLOR,
        },
    }
}

fn matrix_subtitle(scale: RiskScale) -> String {
    format!("Reference matrix, risk scores {}. {}.", scale.describe(), scale.cell_rule())
}

pub fn build_section(
    kind: SectionKind,
    doc: &SwmsDocument,
    ctx: &mut LayoutContext<'_>,
) -> Result<Vec<Box<dyn Flowable>>, RenderError> {
    let mut out: Vec<Box<dyn Flowable>> = Vec::new();
    match kind {
        SectionKind::ProjectInfo => {
            out.push(Box::new(kind.heading()));
            out.push(Box::new(BlockFlowable::new(ProjectInfoBlock::from_document(doc))));
        }
        SectionKind::Emergency => {
            out.push(Box::new(kind.heading()));
            out.push(Box::new(BlockFlowable::new(EmergencyBlock::from_document(doc))));
        }
        SectionKind::HighRiskActivities => {
            let grid = HrcwGrid::new(ctx.catalogs, &doc.high_risk_activities)?;
            out.push(Box::new(kind.heading().with_subtitle(grid.summary())));
            out.push(Box::new(BlockFlowable::new(grid)));
        }
        SectionKind::RiskMatrix => {
            out.push(Box::new(kind.heading().with_subtitle(matrix_subtitle(ctx.scale))));
            out.push(Box::new(BlockFlowable::new(RiskMatrixBlock::new(ctx.scale))));
        }
        SectionKind::WorkActivities => {
            out.push(Box::new(kind.heading()));
            match activity_table(&doc.work_activities, ctx) {
                Some(table) => out.push(Box::new(table)),
                None => out.push(Box::new(
                    EmptyState::new(kind.key()).with_detail("no work activities were entered"),
                )),
            }
        }
        SectionKind::Ppe => {
            let items = ctx.catalogs.resolve_ppe_selection(&doc.ppe_requirements)?;
            out.push(Box::new(kind.heading().with_subtitle(
                "Filled cards are required at all times; outlined cards are recommended.",
            )));
            if items.is_empty() {
                out.push(Box::new(
                    EmptyState::new(kind.key()).with_detail("no PPE was selected"),
                ));
            } else {
                out.push(Box::new(PpeGrid::new(items)));
            }
        }
        SectionKind::PlantEquipment => {
            out.push(Box::new(kind.heading()));
            match equipment_table(&doc.plant_equipment, ctx) {
                Some(table) => out.push(Box::new(table)),
                None => out.push(Box::new(
                    EmptyState::new(kind.key()).with_detail("no plant or equipment was listed"),
                )),
            }
        }
        SectionKind::SignIn => {
            out.push(Box::new(kind.heading()));
            out.extend(sign_in_table(ctx.sign_in_rows));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskTier;

    #[test]
    fn section_order_is_fixed() {
        let keys: Vec<_> = SectionKind::ORDER.iter().map(|k| k.key()).collect();
        assert_eq!(
            keys,
            vec![
                "project_info",
                "emergency",
                "high_risk_activities",
                "risk_matrix",
                "work_activities",
                "ppe",
                "plant_equipment",
                "sign_in"
            ]
        );
        assert_eq!(SectionKind::from_key("ppe"), Some(SectionKind::Ppe));
    }

    #[test]
    fn rating_out_of_range_scores_warns() {
        let catalogs = Catalogs::builtin().expect("catalogs");
        let mut ctx = LayoutContext::new(RiskScale::Standard16, &catalogs, 12, None);
        let outcome = ctx.rate(Some(&ScoreInput::Int(40)), "Excavation initial risk");
        assert_eq!(outcome.rating().map(|r| (r.tier, r.score)), Some((RiskTier::Extreme, 16)));
        assert_eq!(ctx.warnings.len(), 1);
        assert_eq!(ctx.warnings[0].code, WARN_RISK_SCORE_CLAMPED);
        assert!(ctx.warnings[0].message.contains("Excavation"));

        ctx.rate(Some(&ScoreInput::Int(5)), "fine");
        assert_eq!(ctx.warnings.len(), 1);
        ctx.rate(Some(&ScoreInput::Text("??".into())), "typo");
        assert_eq!(ctx.warnings[1].code, WARN_RISK_SCORE_MALFORMED);
    }

    #[test]
    fn not_assessed_badge_is_grey() {
        assert_eq!(
            score_badge(ScoreOutcome::NotAssessed),
            Cell::Badge {
                label: NOT_ASSESSED_LABEL.to_string(),
                fill: NOT_ASSESSED_COLOR
            }
        );
    }

    #[test]
    fn matrix_subtitle_matches_the_scale() {
        let standard = matrix_subtitle(RiskScale::Standard16);
        assert!(standard.contains("1-16"));
        assert!(standard.contains("lookup table"));
        assert!(!standard.contains("likelihood x consequence"));
        let extended = matrix_subtitle(RiskScale::Extended25);
        assert!(extended.contains("1-25"));
        assert!(extended.contains("Risk = likelihood x consequence"));
    }
}
