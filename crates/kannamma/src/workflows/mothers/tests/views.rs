use super::common::*;

use crate::workflows::campaign::CallOutcome;
use crate::workflows::mothers::risk::RiskLabel;
use crate::workflows::mothers::views::MotherSummaryView;

#[test]
fn summary_masks_phone_and_reports_call_state() {
    let (service, _) = build_service();
    let record = service.create(high_risk_submission()).expect("created");
    let record = service
        .apply_call_outcome(&record.id, CallOutcome::AlertAcknowledged)
        .expect("alert applied");

    let view = MotherSummaryView::from_record(&record);

    assert_eq!(view.id, record.id);
    assert_eq!(view.masked_phone, "+918***77");
    assert_eq!(view.risk_label, RiskLabel::Red);
    assert_eq!(view.last_call_status, "Missed (1)");
    assert_eq!(view.consecutive_missed_calls, 1);
    assert!(view.flagged);
    assert!(!view.visited);
}
