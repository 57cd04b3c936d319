use super::{LayoutContext, WARN_RESIDUAL_EXCEEDS_INITIAL, score_badge};
use crate::model::{WorkActivity, present};
use crate::table::{Cell, Column, TableFlowable};

pub const ACTIVITY_TABLE_KEY: &str = "work_activities";

fn columns() -> Vec<Column> {
    vec![
        Column::new("Activity", 14),
        Column::new("Hazards", 22),
        Column::new("Initial Risk", 10),
        Column::new("Control Measures", 28),
        Column::new("Residual Risk", 10),
        Column::new("Legislation", 16),
    ]
}

/// One row per activity, in input order. Returns `None` for an empty list so
/// the caller can show the empty state instead of a bare header.
pub fn activity_table(activities: &[WorkActivity], ctx: &mut LayoutContext<'_>) -> Option<TableFlowable> {
    if activities.is_empty() {
        return None;
    }
    let mut rows = Vec::with_capacity(activities.len());
    for (index, activity) in activities.iter().enumerate() {
        let name = present(&activity.activity);
        let subject = match name {
            Some(name) => format!("Activity {} ({})", index + 1, name),
            None => format!("Activity {}", index + 1),
        };
        let initial = ctx.rate(activity.initial_risk_score.as_ref(), &format!("{} initial risk", subject));
        let residual = ctx.rate(activity.residual_risk_score.as_ref(), &format!("{} residual risk", subject));
        if let (Some(before), Some(after)) = (initial.rating(), residual.rating()) {
            if after.score > before.score {
                ctx.warn(
                    WARN_RESIDUAL_EXCEEDS_INITIAL,
                    format!(
                        "{}: residual risk {} is higher than initial risk {}",
                        subject, after.score, before.score
                    ),
                );
            }
        }
        rows.push(vec![
            Cell::strong(name),
            Cell::bullets(&activity.hazards),
            score_badge(initial),
            Cell::bullets(&activity.control_measures),
            score_badge(residual),
            Cell::bullets(&activity.legislation),
        ]);
    }
    Some(TableFlowable::new(ACTIVITY_TABLE_KEY, "Work Activities & Risk Assessment", columns(), rows))
}
