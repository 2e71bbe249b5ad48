use super::domain::{is_valid_phone, normalize_phone, MotherSubmission, MotherUpdate};

/// Validation collaborator sitting in front of record creation.
#[derive(Debug, Default, Clone)]
pub struct IntakeGuard;

impl IntakeGuard {
    /// Reject incomplete forms and normalise contact numbers.
    pub fn accept(&self, mut submission: MotherSubmission) -> Result<MotherSubmission, IntakeViolation> {
        submission.name = submission.name.trim().to_string();
        if submission.name.is_empty() {
            return Err(IntakeViolation::MissingName);
        }

        submission.contact.phone = checked_phone(submission.contact.phone)?;

        if let Some(alternate) = submission.contact.alternate_contact.take() {
            let alternate = alternate.trim().to_string();
            if !alternate.is_empty() {
                submission.contact.alternate_contact = Some(checked_phone(alternate)?);
            }
        }

        if submission.profile.pregnancy_number == 0 {
            return Err(IntakeViolation::InvalidPregnancyNumber);
        }

        Ok(submission)
    }

    /// Apply the same checks to the fields a partial update carries.
    ///
    /// A blank alternate contact is dropped, leaving the stored one untouched.
    pub fn accept_update(&self, mut update: MotherUpdate) -> Result<MotherUpdate, IntakeViolation> {
        if let Some(name) = update.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(IntakeViolation::MissingName);
            }
            update.name = Some(name);
        }

        if let Some(phone) = update.phone.take() {
            update.phone = Some(checked_phone(phone)?);
        }

        if let Some(alternate) = update.alternate_contact.take() {
            let alternate = alternate.trim().to_string();
            if !alternate.is_empty() {
                update.alternate_contact = Some(checked_phone(alternate)?);
            }
        }

        if update.pregnancy_number == Some(0) {
            return Err(IntakeViolation::InvalidPregnancyNumber);
        }

        Ok(update)
    }
}

fn checked_phone(raw: String) -> Result<String, IntakeViolation> {
    if is_valid_phone(&raw) {
        Ok(normalize_phone(&raw))
    } else {
        Err(IntakeViolation::InvalidPhone(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("mother name is required")]
    MissingName,
    #[error("phone number '{0}' is not a valid 10-digit mobile number")]
    InvalidPhone(String),
    #[error("pregnancy number must be at least 1")]
    InvalidPregnancyNumber,
}
