//! # Per-step Validator
//!
//! Static rules deciding whether a wizard step may be left forward.
//!
//! Each step owns a fixed list of fields. A required field fails when it is
//! empty or whitespace only. Non-empty values are further checked by kind:
//! email against a basic pattern, selects against their options, dates
//! against `YYYY-MM-DD`. Step 5 only checks the agreement flag.

use super::form::{AGREEMENT_KEY, AGREEMENT_MESSAGE, FieldId, FieldKind, RegistrationForm};
use crate::{FieldErrors, PpdbError, primitives::STEP_COUNT};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// =============================================================================
// STEP
// =============================================================================

/// A wizard step number, always within `1..=STEP_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Step(u8);

impl Step {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(STEP_COUNT);

    pub fn new(number: u8) -> Result<Self, PpdbError> {
        if (1..=STEP_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(PpdbError::InvalidStep(number))
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        self.0 == STEP_COUNT
    }

    /// The following step, or `None` on the last one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        (!self.is_last()).then(|| Self(self.0 + 1))
    }

    /// The preceding step, floored at the first.
    #[must_use]
    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }

    #[must_use]
    pub fn spec(self) -> &'static StepSpec {
        &STEPS[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for Step {
    type Error = PpdbError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.0
    }
}

/// Title and owned fields of one step.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepSpec {
    pub number: u8,
    pub title: &'static str,
    pub fields: &'static [FieldId],
}

/// The five wizard steps in order.
pub const STEPS: [StepSpec; STEP_COUNT as usize] = [
    StepSpec {
        number: 1,
        title: "Data Pribadi",
        fields: &[
            FieldId::FullName,
            FieldId::Nickname,
            FieldId::Gender,
            FieldId::BirthPlace,
            FieldId::BirthDate,
            FieldId::Religion,
            FieldId::Nationality,
        ],
    },
    StepSpec {
        number: 2,
        title: "Kontak & Alamat",
        fields: &[FieldId::Address, FieldId::Phone, FieldId::Email],
    },
    StepSpec {
        number: 3,
        title: "Data Sekolah",
        fields: &[FieldId::PreviousSchool, FieldId::GraduationYear, FieldId::Nisn],
    },
    StepSpec {
        number: 4,
        title: "Data Orang Tua",
        fields: &[
            FieldId::FatherName,
            FieldId::FatherJob,
            FieldId::MotherName,
            FieldId::MotherJob,
            FieldId::ParentPhone,
            FieldId::Achievements,
        ],
    },
    StepSpec {
        number: 5,
        title: "Konfirmasi",
        fields: &[],
    },
];

// =============================================================================
// RULES
// =============================================================================

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

/// Basic `local@domain.tld` shape check.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(value))
}

/// Message of a malformed email address.
pub const EMAIL_FORMAT_MESSAGE: &str = "Format email tidak valid";

/// Check one field value; `None` when it passes.
///
/// Emptiness is judged on the trimmed value, the email shape on the value
/// as typed.
fn check_field(field: FieldId, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return field.required_message().map(str::to_string);
    }

    match field.kind() {
        FieldKind::Email if !is_valid_email(value) => Some(EMAIL_FORMAT_MESSAGE.to_string()),
        FieldKind::Select if !field.options().iter().any(|o| o.value == trimmed) => {
            Some(format!("{} tidak valid", field.label()))
        }
        FieldKind::Date if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_err() => {
            Some(format!("{} tidak valid", field.label()))
        }
        _ => None,
    }
}

/// Validate the fields owned by `step`.
///
/// Returns an empty map when the step may be left forward.
#[must_use]
pub fn validate_step(step: Step, form: &RegistrationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for &field in step.spec().fields {
        if let Some(message) = check_field(field, form.get(field)) {
            errors.insert(field.as_str().to_string(), message);
        }
    }

    if step.is_last() && !form.agreement {
        errors.insert(AGREEMENT_KEY.to_string(), AGREEMENT_MESSAGE.to_string());
    }

    errors
}

/// Validate every step at once, as done before submission.
#[must_use]
pub fn validate_all(form: &RegistrationForm) -> FieldErrors {
    STEPS
        .iter()
        .filter_map(|spec| Step::new(spec.number).ok())
        .flat_map(|step| validate_step(step, form))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
