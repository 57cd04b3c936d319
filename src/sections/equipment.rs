use super::{LayoutContext, NOT_ASSESSED_LABEL, WARN_RISK_LEVEL_MALFORMED};
use crate::model::{PlantEquipment, present};
use crate::risk::{NOT_ASSESSED_COLOR, RiskTier};
use crate::table::{Cell, Column, TableFlowable};
use crate::types::Color;

pub const EQUIPMENT_TABLE_KEY: &str = "plant_equipment";

const CERTIFIED_COLOR: Color = Color::rgb8(0x16, 0xA3, 0x4A);

fn columns() -> Vec<Column> {
    vec![
        Column::new("Equipment", 13),
        Column::new("Model", 9),
        Column::new("Serial No.", 9),
        Column::new("Hazards", 18),
        Column::new("Risk Level", 9),
        Column::new("Control Measures", 22),
        Column::new("Next Inspection", 10),
        Column::new("Cert. Required", 8),
    ]
}

fn risk_badge(entry: &PlantEquipment, subject: &str, ctx: &mut LayoutContext<'_>) -> Cell {
    let Some(raw) = present(&entry.risk_level) else {
        return Cell::Badge {
            label: NOT_ASSESSED_LABEL.to_string(),
            fill: NOT_ASSESSED_COLOR,
        };
    };
    let tier = match RiskTier::parse(raw) {
        Some(tier) => tier,
        None => {
            ctx.warn(
                WARN_RISK_LEVEL_MALFORMED,
                format!("{}: risk level \"{}\" is not recognised; rated Extreme", subject, raw),
            );
            RiskTier::Extreme
        }
    };
    Cell::Badge {
        label: tier.label().to_string(),
        fill: tier.color(),
    }
}

fn certification_badge(required: bool) -> Cell {
    if required {
        Cell::Badge {
            label: "Yes".to_string(),
            fill: CERTIFIED_COLOR,
        }
    } else {
        Cell::Badge {
            label: "No".to_string(),
            fill: NOT_ASSESSED_COLOR,
        }
    }
}

pub fn equipment_table(entries: &[PlantEquipment], ctx: &mut LayoutContext<'_>) -> Option<TableFlowable> {
    if entries.is_empty() {
        return None;
    }
    let rows = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let name = present(&entry.name);
            let subject = match name {
                Some(name) => format!("Equipment {} ({})", index + 1, name),
                None => format!("Equipment {}", index + 1),
            };
            vec![
                Cell::strong(name),
                Cell::value(present(&entry.model)),
                Cell::value(present(&entry.serial_number)),
                Cell::bullets(&entry.hazards),
                risk_badge(entry, &subject, ctx),
                Cell::bullets(&entry.control_measures),
                Cell::value(present(&entry.next_inspection_date)),
                certification_badge(entry.certification_required),
            ]
        })
        .collect();
    Some(TableFlowable::new(EQUIPMENT_TABLE_KEY, "Plant & Equipment Register", columns(), rows))
}
