use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::risk::{self, RiskLabel};
use crate::workflows::campaign::CallOutcome;

/// Identifier wrapper for registered mothers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotherId(pub String);

impl MotherId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MotherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Medical and demographic inputs consumed by the risk classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotherProfile {
    #[serde(default)]
    pub medical_conditions: String,
    pub age: i32,
    pub pregnancy_number: u32,
    pub weight_kg: f32,
    #[serde(default)]
    pub previous_complications: String,
}

/// Phone capability class used to pick IVR or app reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneType {
    Smartphone,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub phone: String,
    #[serde(default)]
    pub alternate_contact: Option<String>,
    pub phone_type: PhoneType,
    #[serde(default)]
    pub family_member_details: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalDetails {
    #[serde(default)]
    pub height_cm: Option<f32>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub special_notes: Option<String>,
    #[serde(default)]
    pub last_menstrual_period: Option<NaiveDate>,
    #[serde(default)]
    pub expected_delivery: Option<NaiveDate>,
}

/// Outcome of the most recent outreach call as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastCallStatus {
    Answered,
    MissedOnce,
    MissedMany,
    NotYetCalled,
}

impl LastCallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LastCallStatus::Answered => "Answered",
            LastCallStatus::MissedOnce => "Missed (1)",
            LastCallStatus::MissedMany => "Missed (2+)",
            LastCallStatus::NotYetCalled => "N/A",
        }
    }

    fn after_missed(consecutive_missed_calls: u32) -> Self {
        if consecutive_missed_calls >= 2 {
            LastCallStatus::MissedMany
        } else {
            LastCallStatus::MissedOnce
        }
    }
}

/// Registration payload accepted from the health worker's intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotherSubmission {
    pub name: String,
    pub profile: MotherProfile,
    pub contact: ContactDetails,
    #[serde(default)]
    pub clinical: ClinicalDetails,
    #[serde(default)]
    pub notes: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotherUpdate {
    pub name: Option<String>,
    pub medical_conditions: Option<String>,
    pub age: Option<i32>,
    pub pregnancy_number: Option<u32>,
    pub weight_kg: Option<f32>,
    pub previous_complications: Option<String>,
    pub phone: Option<String>,
    pub alternate_contact: Option<String>,
    pub phone_type: Option<PhoneType>,
    pub address: Option<String>,
    pub height_cm: Option<f32>,
    pub blood_group: Option<String>,
    pub special_notes: Option<String>,
    pub last_menstrual_period: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// The unit of work tracked by the dashboard.
///
/// Communication state and the risk label are private: every mutation goes
/// through a method that re-settles the label before returning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotherRecord {
    pub id: MotherId,
    pub name: String,
    pub profile: MotherProfile,
    pub contact: ContactDetails,
    pub clinical: ClinicalDetails,
    pub notes: String,
    pub flagged: bool,
    pub visited: bool,
    last_call_status: LastCallStatus,
    consecutive_missed_calls: u32,
    risk_label: RiskLabel,
}

impl MotherRecord {
    pub fn new(id: MotherId, submission: MotherSubmission) -> Self {
        let MotherSubmission {
            name,
            profile,
            contact,
            mut clinical,
            notes,
        } = submission;

        clinical.expected_delivery = clinical.last_menstrual_period.and_then(expected_delivery);
        let risk_label = risk::classify(&profile, 0);

        Self {
            id,
            name,
            profile,
            contact,
            clinical,
            notes,
            flagged: false,
            visited: false,
            last_call_status: LastCallStatus::NotYetCalled,
            consecutive_missed_calls: 0,
            risk_label,
        }
    }

    pub fn risk_label(&self) -> RiskLabel {
        self.risk_label
    }

    pub fn last_call_status(&self) -> LastCallStatus {
        self.last_call_status
    }

    pub fn consecutive_missed_calls(&self) -> u32 {
        self.consecutive_missed_calls
    }

    /// Fold a terminal call outcome into the communication state.
    pub fn register_call(&mut self, outcome: CallOutcome) {
        match outcome {
            CallOutcome::Answered => {
                self.consecutive_missed_calls = 0;
                self.last_call_status = LastCallStatus::Answered;
            }
            CallOutcome::NoAnswer | CallOutcome::AlertAcknowledged => {
                self.consecutive_missed_calls = self.consecutive_missed_calls.saturating_add(1);
                self.last_call_status = LastCallStatus::after_missed(self.consecutive_missed_calls);
            }
        }

        if outcome.requires_follow_up() {
            self.flagged = true;
        }

        self.settle();
    }

    /// Seed communication history imported from another system.
    pub fn restore_communication(&mut self, status: LastCallStatus, consecutive_missed_calls: u32) {
        self.last_call_status = status;
        self.consecutive_missed_calls = consecutive_missed_calls;
        self.settle();
    }

    pub fn apply_update(&mut self, update: MotherUpdate) {
        let MotherUpdate {
            name,
            medical_conditions,
            age,
            pregnancy_number,
            weight_kg,
            previous_complications,
            phone,
            alternate_contact,
            phone_type,
            address,
            height_cm,
            blood_group,
            special_notes,
            last_menstrual_period,
            notes,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(conditions) = medical_conditions {
            self.profile.medical_conditions = conditions;
        }
        if let Some(age) = age {
            self.profile.age = age;
        }
        if let Some(pregnancy_number) = pregnancy_number {
            self.profile.pregnancy_number = pregnancy_number;
        }
        if let Some(weight_kg) = weight_kg {
            self.profile.weight_kg = weight_kg;
        }
        if let Some(complications) = previous_complications {
            self.profile.previous_complications = complications;
        }
        if let Some(phone) = phone {
            self.contact.phone = phone;
        }
        if let Some(alternate) = alternate_contact {
            self.contact.alternate_contact = Some(alternate);
        }
        if let Some(phone_type) = phone_type {
            self.contact.phone_type = phone_type;
        }
        if let Some(address) = address {
            self.contact.address = Some(address);
        }
        if let Some(height_cm) = height_cm {
            self.clinical.height_cm = Some(height_cm);
        }
        if let Some(blood_group) = blood_group {
            self.clinical.blood_group = Some(blood_group);
        }
        if let Some(special_notes) = special_notes {
            self.clinical.special_notes = Some(special_notes);
        }
        if let Some(lmp) = last_menstrual_period {
            self.clinical.last_menstrual_period = Some(lmp);
            self.clinical.expected_delivery = expected_delivery(lmp);
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }

        self.settle();
    }

    pub fn mark_visited(&mut self) {
        self.visited = true;
        self.flagged = false;
    }

    pub fn toggle_flag(&mut self) {
        self.flagged = !self.flagged;
    }

    fn settle(&mut self) {
        self.risk_label = risk::classify(&self.profile, self.consecutive_missed_calls);
    }
}

/// Naegele's rule: last menstrual period plus seven days plus nine months.
pub fn expected_delivery(last_menstrual_period: NaiveDate) -> Option<NaiveDate> {
    last_menstrual_period
        .checked_add_signed(Duration::days(7))?
        .checked_add_months(Months::new(9))
}

/// Canonical `+91` form used for provider callbacks and logs.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 10 {
        format!("+91{digits}")
    } else if digits.len() == 12 && digits.starts_with("91") {
        format!("+{digits}")
    } else {
        raw.to_string()
    }
}

/// Indian mobile numbers: ten digits, optionally prefixed with the 91 country code.
pub fn is_valid_phone(raw: &str) -> bool {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.len() == 10 || (digits.len() == 12 && digits.starts_with("91"))
}

pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}***{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> MotherSubmission {
        MotherSubmission {
            name: "Lalita Devi".to_string(),
            profile: MotherProfile {
                medical_conditions: "High BP, Diabetes".to_string(),
                age: 36,
                pregnancy_number: 3,
                weight_kg: 78.0,
                previous_complications: "Pre-eclampsia in last pregnancy".to_string(),
            },
            contact: ContactDetails {
                phone: "+918888877777".to_string(),
                alternate_contact: Some("8888877778".to_string()),
                phone_type: PhoneType::Basic,
                family_member_details: None,
                address: None,
            },
            clinical: ClinicalDetails {
                last_menstrual_period: NaiveDate::from_ymd_opt(2025, 4, 10),
                ..ClinicalDetails::default()
            },
            notes: String::new(),
        }
    }

    #[test]
    fn new_record_is_classified_without_call_history() {
        let record = MotherRecord::new(MotherId("m-1".to_string()), submission());
        assert_eq!(record.risk_label(), RiskLabel::Red);
        assert_eq!(record.last_call_status(), LastCallStatus::NotYetCalled);
        assert_eq!(record.consecutive_missed_calls(), 0);
        assert_eq!(
            record.clinical.expected_delivery,
            NaiveDate::from_ymd_opt(2026, 1, 17)
        );
    }

    #[test]
    fn missed_calls_escalate_and_answer_resets() {
        let mut record = MotherRecord::new(
            MotherId("m-2".to_string()),
            MotherSubmission {
                profile: MotherProfile {
                    medical_conditions: String::new(),
                    age: 28,
                    pregnancy_number: 2,
                    weight_kg: 65.0,
                    previous_complications: String::new(),
                },
                ..submission()
            },
        );
        assert_eq!(record.risk_label(), RiskLabel::Green);

        record.register_call(CallOutcome::NoAnswer);
        assert_eq!(record.last_call_status(), LastCallStatus::MissedOnce);
        assert_eq!(record.risk_label(), RiskLabel::Green);

        record.register_call(CallOutcome::NoAnswer);
        assert_eq!(record.last_call_status(), LastCallStatus::MissedMany);
        assert_eq!(record.consecutive_missed_calls(), 2);
        assert_eq!(record.risk_label(), RiskLabel::Yellow);
        assert!(!record.flagged, "no-answer alone does not flag");

        record.register_call(CallOutcome::Answered);
        assert_eq!(record.consecutive_missed_calls(), 0);
        assert_eq!(record.last_call_status(), LastCallStatus::Answered);
        assert_eq!(record.risk_label(), RiskLabel::Green);
    }

    #[test]
    fn alert_acknowledged_flags_and_counts_as_missed() {
        let mut record = MotherRecord::new(MotherId("m-3".to_string()), submission());
        record.register_call(CallOutcome::AlertAcknowledged);
        assert!(record.flagged);
        assert_eq!(record.consecutive_missed_calls(), 1);
    }

    #[test]
    fn update_resettles_label_and_delivery_date() {
        let mut record = MotherRecord::new(MotherId("m-4".to_string()), submission());
        record.apply_update(MotherUpdate {
            medical_conditions: Some(String::new()),
            age: Some(30),
            previous_complications: Some(String::new()),
            last_menstrual_period: NaiveDate::from_ymd_opt(2025, 6, 15),
            ..MotherUpdate::default()
        });
        assert_eq!(record.risk_label(), RiskLabel::Green);
        assert_eq!(
            record.clinical.expected_delivery,
            NaiveDate::from_ymd_opt(2026, 3, 22)
        );
    }

    #[test]
    fn visiting_clears_the_flag() {
        let mut record = MotherRecord::new(MotherId("m-5".to_string()), submission());
        record.toggle_flag();
        assert!(record.flagged);
        record.mark_visited();
        assert!(record.visited);
        assert!(!record.flagged);
    }

    #[test]
    fn phone_helpers_follow_indian_numbering() {
        assert_eq!(normalize_phone("98765 43210"), "+919876543210");
        assert_eq!(normalize_phone("919876543210"), "+919876543210");
        assert_eq!(normalize_phone("12345"), "12345");
        assert!(is_valid_phone("+91 98765-43210"));
        assert!(!is_valid_phone("12345"));
        assert_eq!(mask_phone("9876543210"), "9876***10");
    }
}
