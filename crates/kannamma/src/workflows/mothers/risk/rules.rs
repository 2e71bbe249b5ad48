use super::super::domain::MotherProfile;
use super::{RiskFactor, ScoreComponent};

const CONDITION_TOKENS: [&str; 3] = ["diabetes", "bp", "high pressure"];

const CONDITION_POINTS: u8 = 3;
const AGE_POINTS: u8 = 2;
const HIGH_PARITY_POINTS: u8 = 2;
const FIRST_PREGNANCY_POINTS: u8 = 1;
const COMPLICATIONS_POINTS: u8 = 2;
const WEIGHT_POINTS: u8 = 1;
const REPEATED_MISSES_POINTS: u8 = 2;
const SINGLE_MISS_POINTS: u8 = 1;

const MIN_AGE: i32 = 18;
const MAX_AGE: i32 = 35;
const HIGH_PARITY_ABOVE: u32 = 4;
const COMPLICATIONS_MIN_CHARS: usize = 5;
const MIN_WEIGHT_KG: f32 = 40.0;
const MAX_WEIGHT_KG: f32 = 90.0;

pub(crate) fn score_profile(
    profile: &MotherProfile,
    consecutive_missed_calls: u32,
) -> Vec<ScoreComponent> {
    let mut components = Vec::new();

    let conditions = profile.medical_conditions.to_ascii_lowercase();
    if let Some(token) = CONDITION_TOKENS
        .iter()
        .find(|token| conditions.contains(*token))
    {
        components.push(ScoreComponent {
            factor: RiskFactor::ChronicCondition,
            points: CONDITION_POINTS,
            notes: format!("conditions mention '{token}'"),
        });
    }

    if profile.age < MIN_AGE || profile.age > MAX_AGE {
        components.push(ScoreComponent {
            factor: RiskFactor::MaternalAge,
            points: AGE_POINTS,
            notes: format!("age {} outside {MIN_AGE}-{MAX_AGE}", profile.age),
        });
    }

    if profile.pregnancy_number > HIGH_PARITY_ABOVE {
        components.push(ScoreComponent {
            factor: RiskFactor::Parity,
            points: HIGH_PARITY_POINTS,
            notes: format!("pregnancy number {}", profile.pregnancy_number),
        });
    } else if profile.pregnancy_number == 1 {
        components.push(ScoreComponent {
            factor: RiskFactor::Parity,
            points: FIRST_PREGNANCY_POINTS,
            notes: "first pregnancy".to_string(),
        });
    }

    // Measured in UTF-16 code units.
    if profile.previous_complications.encode_utf16().count() > COMPLICATIONS_MIN_CHARS {
        components.push(ScoreComponent {
            factor: RiskFactor::PriorComplications,
            points: COMPLICATIONS_POINTS,
            notes: "prior complications recorded".to_string(),
        });
    }

    if profile.weight_kg < MIN_WEIGHT_KG || profile.weight_kg > MAX_WEIGHT_KG {
        components.push(ScoreComponent {
            factor: RiskFactor::Weight,
            points: WEIGHT_POINTS,
            notes: format!("weight {:.1} kg outside 40-90 kg", profile.weight_kg),
        });
    }

    if consecutive_missed_calls >= 2 {
        components.push(ScoreComponent {
            factor: RiskFactor::MissedCalls,
            points: REPEATED_MISSES_POINTS,
            notes: format!("{consecutive_missed_calls} consecutive missed calls"),
        });
    } else if consecutive_missed_calls == 1 {
        components.push(ScoreComponent {
            factor: RiskFactor::MissedCalls,
            points: SINGLE_MISS_POINTS,
            notes: "one missed call".to_string(),
        });
    }

    components
}

pub(crate) fn total_score(profile: &MotherProfile, consecutive_missed_calls: u32) -> u8 {
    score_profile(profile, consecutive_missed_calls)
        .iter()
        .map(|component| component.points)
        .sum()
}
