use chrono::NaiveDate;
use kannamma::workflows::mothers::{
    normalize_phone, ClinicalDetails, ContactDetails, LastCallStatus, MotherId, MotherProfile,
    MotherRecord, MotherRegistryService, MotherRepository, MotherServiceError, MotherSubmission,
    PhoneType,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

struct SampleMother {
    id: &'static str,
    name: &'static str,
    phone: &'static str,
    alternate: &'static str,
    phone_type: PhoneType,
    family: &'static str,
    address: &'static str,
    profile: MotherProfile,
    clinical: ClinicalDetails,
    notes: &'static str,
    last_call_status: LastCallStatus,
    consecutive_missed_calls: u32,
    flagged: bool,
    visited: bool,
}

impl SampleMother {
    fn into_record(self) -> MotherRecord {
        let submission = MotherSubmission {
            name: self.name.to_string(),
            profile: self.profile,
            contact: ContactDetails {
                phone: normalize_phone(self.phone),
                alternate_contact: Some(normalize_phone(self.alternate)),
                phone_type: self.phone_type,
                family_member_details: Some(self.family.to_string()),
                address: Some(self.address.to_string()),
            },
            clinical: self.clinical,
            notes: self.notes.to_string(),
        };

        let mut record = MotherRecord::new(MotherId(self.id.to_string()), submission);
        record.restore_communication(self.last_call_status, self.consecutive_missed_calls);
        record.flagged = self.flagged;
        record.visited = self.visited;
        record
    }
}

fn clinical(lmp: (i32, u32, u32), height_cm: f32, blood_group: &str, note: &str) -> ClinicalDetails {
    ClinicalDetails {
        height_cm: Some(height_cm),
        blood_group: Some(blood_group.to_string()),
        special_notes: Some(note.to_string()),
        last_menstrual_period: NaiveDate::from_ymd_opt(lmp.0, lmp.1, lmp.2),
        expected_delivery: None,
    }
}

/// The dashboard's three sample mothers, one per risk column before any campaign runs.
pub(crate) fn sample_mothers() -> Vec<MotherRecord> {
    vec![
        SampleMother {
            id: "m-1",
            name: "Priya Sharma",
            phone: "9876543210",
            alternate: "9876543211",
            phone_type: PhoneType::Smartphone,
            family: "Husband: Rajesh",
            address: "123 Gandhi St, Anna Nagar, Chennai",
            profile: MotherProfile {
                medical_conditions: String::new(),
                age: 28,
                pregnancy_number: 2,
                weight_kg: 65.0,
                previous_complications: String::new(),
            },
            clinical: clinical((2025, 5, 1), 160.0, "O+", "Happy to walk."),
            notes: "Patient has no major issues. Stable blood pressure.",
            last_call_status: LastCallStatus::Answered,
            consecutive_missed_calls: 0,
            flagged: false,
            visited: true,
        },
        SampleMother {
            id: "m-2",
            name: "Lalita Devi",
            phone: "8888877777",
            alternate: "8888877778",
            phone_type: PhoneType::Basic,
            family: "Mother: Sunita",
            address: "45/A, Nehru Colony, Adyar, Chennai",
            profile: MotherProfile {
                medical_conditions: "High BP, Diabetes".to_string(),
                age: 36,
                pregnancy_number: 3,
                weight_kg: 78.0,
                previous_complications: "Pre-eclampsia in last pregnancy".to_string(),
            },
            clinical: clinical((2025, 4, 10), 155.0, "A-", "Needs frequent check-ups."),
            notes: "Struggling with medication adherence. Needs home visit ASAP.",
            last_call_status: LastCallStatus::MissedMany,
            consecutive_missed_calls: 3,
            flagged: true,
            visited: false,
        },
        SampleMother {
            id: "m-3",
            name: "Geeta Singh",
            phone: "7777766666",
            alternate: "7777766667",
            phone_type: PhoneType::Smartphone,
            family: "Sister: Aarti",
            address: "60, Market Road, T Nagar, Chennai",
            profile: MotherProfile {
                medical_conditions: "None".to_string(),
                age: 22,
                pregnancy_number: 1,
                weight_kg: 42.0,
                previous_complications: String::new(),
            },
            clinical: clinical((2025, 6, 15), 168.0, "B+", "First time mom, anxious."),
            notes: "Weight is low, advised high protein diet.",
            last_call_status: LastCallStatus::Answered,
            consecutive_missed_calls: 0,
            flagged: false,
            visited: true,
        },
    ]
    .into_iter()
    .map(SampleMother::into_record)
    .collect()
}

pub(crate) fn seed_mothers<R>(
    registry: &MotherRegistryService<R>,
) -> Result<Vec<MotherRecord>, MotherServiceError>
where
    R: MotherRepository + 'static,
{
    sample_mothers()
        .into_iter()
        .map(|record| registry.import(record))
        .collect()
}
