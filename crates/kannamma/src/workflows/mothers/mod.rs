//! Mother registration, risk classification, and the dashboard views built on them.

pub mod domain;
pub(crate) mod intake;
pub mod repository;
pub mod risk;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    expected_delivery, is_valid_phone, mask_phone, normalize_phone, ClinicalDetails,
    ContactDetails, LastCallStatus, MotherId, MotherProfile, MotherRecord, MotherSubmission,
    MotherUpdate, PhoneType,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use repository::{CallLogEntry, InMemoryMotherRepository, MotherRepository, RepositoryError};
pub use risk::{assess, classify, RiskAssessment, RiskFactor, RiskLabel, ScoreComponent};
pub use router::mother_router;
pub use service::{
    CampaignReconciliation, MotherRegistryService, MotherServiceError, RiskGroups, SkippedUpdate,
};
pub use views::MotherSummaryView;
