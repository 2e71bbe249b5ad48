use serde::Serialize;

use super::domain::{mask_phone, MotherId, MotherRecord};
use super::risk::RiskLabel;

/// Dashboard-facing projection of a record.
#[derive(Debug, Clone, Serialize)]
pub struct MotherSummaryView {
    pub id: MotherId,
    pub name: String,
    pub masked_phone: String,
    pub risk_label: RiskLabel,
    pub last_call_status: &'static str,
    pub consecutive_missed_calls: u32,
    pub flagged: bool,
    pub visited: bool,
}

impl MotherSummaryView {
    pub fn from_record(record: &MotherRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            masked_phone: mask_phone(&record.contact.phone),
            risk_label: record.risk_label(),
            last_call_status: record.last_call_status().label(),
            consecutive_missed_calls: record.consecutive_missed_calls(),
            flagged: record.flagged,
            visited: record.visited,
        }
    }
}
