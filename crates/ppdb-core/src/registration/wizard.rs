//! # Step Sequence Controller
//!
//! Drives one registration through its five steps.
//!
//! - `advance` validates the current step and moves forward only on success
//! - `retreat` moves back without validating, never below step 1
//! - Editing a field clears that field's pending error
//! - On the last step, `submit` replaces `advance`

use super::form::{AGREEMENT_KEY, FieldId, RegistrationForm};
use super::validator::{STEPS, Step, validate_all, validate_step};
use crate::{
    EducationLevel, FieldErrors, PpdbError,
    primitives::MAX_OPEN_WIZARDS,
    store::format_id,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// WIZARD
// =============================================================================

/// State of one in-progress registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wizard {
    pub level: Option<EducationLevel>,
    pub step: Step,
    pub form: RegistrationForm,
    /// Inline errors from the last failed `advance` or `submit`.
    pub errors: FieldErrors,
    pub started_at: NaiveDateTime,
}

impl Wizard {
    /// Fresh wizard on step 1 with an empty form.
    #[must_use]
    pub fn new(level: Option<EducationLevel>, started_at: NaiveDateTime) -> Self {
        Self {
            level,
            step: Step::FIRST,
            form: RegistrationForm::new(),
            errors: FieldErrors::new(),
            started_at,
        }
    }

    /// Store a field value and clear its pending error.
    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) -> Result<(), PpdbError> {
        self.form.set(field, value)?;
        self.errors.remove(field.as_str());
        Ok(())
    }

    /// Store several values at once.
    ///
    /// The values are applied to a copy of the form; nothing is written
    /// when any one of them is refused.
    pub fn set_fields<I, V>(&mut self, values: I) -> Result<(), PpdbError>
    where
        I: IntoIterator<Item = (FieldId, V)>,
        V: Into<String>,
    {
        let mut form = self.form.clone();
        let mut touched = Vec::new();
        for (field, value) in values {
            form.set(field, value)?;
            touched.push(field);
        }

        self.form = form;
        for field in touched {
            self.errors.remove(field.as_str());
        }
        Ok(())
    }

    /// Tick or untick the agreement checkbox and clear its pending error.
    pub fn set_agreement(&mut self, agreed: bool) {
        self.form.agreement = agreed;
        self.errors.remove(AGREEMENT_KEY);
    }

    /// Validate the current step and move to the next one.
    ///
    /// On failure the step is unchanged, the error map is stored on the
    /// wizard and returned as `PpdbError::Validation`.
    pub fn advance(&mut self) -> Result<Step, PpdbError> {
        let Some(next) = self.step.next() else {
            return Err(PpdbError::InvalidStep(self.step.number()));
        };

        let errors = validate_step(self.step, &self.form);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(PpdbError::Validation(errors));
        }

        self.errors.clear();
        self.step = next;
        Ok(next)
    }

    /// Move back one step, floored at step 1. Never validates.
    pub fn retreat(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    /// Submission is possible only on the last step with the agreement ticked.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.step.is_last() && self.form.agreement
    }

    /// Final validation before the form is handed over.
    ///
    /// Every step is rechecked since fields of earlier steps may have been
    /// edited after they were left.
    pub fn submit(&mut self) -> Result<RegistrationSummary, PpdbError> {
        if !self.step.is_last() {
            return Err(PpdbError::InvalidStep(self.step.number()));
        }

        let errors = validate_all(&self.form);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(PpdbError::Validation(errors));
        }

        self.errors.clear();
        Ok(self.summary())
    }

    /// Read-only view of everything collected so far.
    #[must_use]
    pub fn summary(&self) -> RegistrationSummary {
        let sections = STEPS
            .iter()
            .filter(|spec| !spec.fields.is_empty())
            .map(|spec| SummarySection {
                title: spec.title.to_string(),
                entries: spec
                    .fields
                    .iter()
                    .map(|&field| SummaryEntry {
                        field,
                        label: field.label().to_string(),
                        value: field.display_value(self.form.get(field).trim()),
                    })
                    .collect(),
            })
            .collect();

        RegistrationSummary {
            level: self.level,
            sections,
            agreement: self.form.agreement,
        }
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// One labelled value on the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub field: FieldId,
    pub label: String,
    pub value: String,
}

/// Values of one step, grouped under its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub title: String,
    pub entries: Vec<SummaryEntry>,
}

/// Read-only rendering of a registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub level: Option<EducationLevel>,
    pub sections: Vec<SummarySection>,
    pub agreement: bool,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Live wizards keyed by `REG-000001` style ids.
#[derive(Debug, Default)]
pub struct WizardRegistry {
    wizards: BTreeMap<u64, Wizard>,
    counter: u64,
}

const WIZARD_PREFIX: &str = "REG-";

impl WizardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new wizard and return its id.
    ///
    /// When `MAX_OPEN_WIZARDS` are live the oldest one is dropped.
    pub fn open(&mut self, level: Option<EducationLevel>, now: NaiveDateTime) -> String {
        if self.wizards.len() >= MAX_OPEN_WIZARDS {
            self.wizards.pop_first();
        }
        self.counter = self.counter.saturating_add(1);
        self.wizards.insert(self.counter, Wizard::new(level, now));
        format_id(WIZARD_PREFIX, self.counter, 6)
    }

    fn key(id: &str) -> Result<u64, PpdbError> {
        id.strip_prefix(WIZARD_PREFIX)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| PpdbError::not_found("Registration", id))
    }

    pub fn get(&self, id: &str) -> Result<&Wizard, PpdbError> {
        self.wizards
            .get(&Self::key(id)?)
            .ok_or_else(|| PpdbError::not_found("Registration", id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Wizard, PpdbError> {
        self.wizards
            .get_mut(&Self::key(id)?)
            .ok_or_else(|| PpdbError::not_found("Registration", id))
    }

    /// Drop a wizard and its form.
    pub fn discard(&mut self, id: &str) -> Result<Wizard, PpdbError> {
        self.wizards
            .remove(&Self::key(id)?)
            .ok_or_else(|| PpdbError::not_found("Registration", id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wizards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wizards.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn fill(wizard: &mut Wizard, values: &[(FieldId, &str)]) {
        for (field, value) in values {
            wizard.set_field(*field, *value).expect("set");
        }
    }

    fn fill_all(wizard: &mut Wizard) {
        fill(
            wizard,
            &[
                (FieldId::FullName, "Maya Sari"),
                (FieldId::Gender, "female"),
                (FieldId::BirthPlace, "Bandung"),
                (FieldId::BirthDate, "2012-07-01"),
                (FieldId::Religion, "islam"),
                (FieldId::Address, "Jl. Menteng No. 34, Jakarta"),
                (FieldId::Phone, "081234567895"),
                (FieldId::Email, "maya.s@email.com"),
                (FieldId::PreviousSchool, "SD Negeri 1"),
                (FieldId::GraduationYear, "2024"),
                (FieldId::Nisn, "0098765432"),
                (FieldId::FatherName, "Sari Indah"),
                (FieldId::FatherJob, "Pegawai Swasta"),
                (FieldId::MotherName, "Dewi Indah"),
                (FieldId::MotherJob, "Ibu Rumah Tangga"),
                (FieldId::ParentPhone, "081298765400"),
            ],
        );
    }

    #[test]
    fn advance_blocked_by_empty_required_field() {
        let mut wizard = Wizard::new(None, now());
        let result = wizard.advance();

        assert!(matches!(result, Err(PpdbError::Validation(_))));
        assert_eq!(wizard.step, Step::FIRST);
        assert_eq!(wizard.errors["full_name"], "Nama lengkap wajib diisi");
    }

    #[test]
    fn every_required_field_blocks_its_step() {
        let mut checked = 0;
        for spec in STEPS.iter().filter(|spec| spec.number < Step::LAST.number()) {
            for &field in spec.fields {
                let Some(message) = field.required_message() else {
                    continue;
                };
                let mut wizard = Wizard::new(None, now());
                fill_all(&mut wizard);
                for _ in 1..spec.number {
                    wizard.advance().expect("advance");
                }
                wizard.set_field(field, "  ").expect("set");

                assert!(
                    matches!(wizard.advance(), Err(PpdbError::Validation(_))),
                    "{} did not block step {}",
                    field.as_str(),
                    spec.number
                );
                assert_eq!(wizard.step.number(), spec.number);
                assert_eq!(wizard.errors[field.as_str()], message);
                checked += 1;
            }
        }
        assert_eq!(checked, 16);
    }

    #[test]
    fn set_fields_is_all_or_nothing() {
        let mut wizard = Wizard::new(None, now());
        let overlong = "9".repeat(crate::primitives::MAX_FIELD_LENGTH + 1);

        let result = wizard.set_fields([
            (FieldId::Nickname, "Fadil".to_string()),
            (FieldId::Phone, overlong),
        ]);
        assert!(matches!(result, Err(PpdbError::Validation(_))));
        assert_eq!(wizard.form.nickname, "");
        assert_eq!(wizard.form.phone, "");

        let _ = wizard.advance();
        assert!(wizard.errors.contains_key("full_name"));
        wizard
            .set_fields([(FieldId::FullName, "Fadil Rahman"), (FieldId::Nickname, "Fadil")])
            .expect("set");
        assert_eq!(wizard.form.nickname, "Fadil");
        assert!(!wizard.errors.contains_key("full_name"));
    }

    #[test]
    fn typing_clears_field_error() {
        let mut wizard = Wizard::new(None, now());
        let _ = wizard.advance();
        assert!(wizard.errors.contains_key("full_name"));

        wizard.set_field(FieldId::FullName, "M").expect("set");
        assert!(!wizard.errors.contains_key("full_name"));
        assert!(wizard.errors.contains_key("gender"));
    }

    #[test]
    fn walk_to_last_step_and_submit() {
        let mut wizard = Wizard::new(Some(EducationLevel::Smp), now());
        fill_all(&mut wizard);

        for expected in 2..=5 {
            let step = wizard.advance().expect("advance");
            assert_eq!(step.number(), expected);
        }
        assert!(!wizard.can_submit());
        assert!(matches!(wizard.advance(), Err(PpdbError::InvalidStep(5))));

        assert!(wizard.submit().is_err());
        assert_eq!(wizard.errors["agreement"], "Anda harus menyetujui pernyataan");

        wizard.set_agreement(true);
        assert!(wizard.errors.is_empty());
        assert!(wizard.can_submit());

        let summary = wizard.submit().expect("submit");
        assert_eq!(summary.level, Some(EducationLevel::Smp));
        assert_eq!(summary.sections.len(), 4);
        assert_eq!(summary.sections[0].title, "Data Pribadi");
        let gender = summary.sections[0]
            .entries
            .iter()
            .find(|e| e.field == FieldId::Gender)
            .expect("gender entry");
        assert_eq!(gender.value, "Perempuan");
    }

    #[test]
    fn submit_rechecks_earlier_steps() {
        let mut wizard = Wizard::new(None, now());
        fill_all(&mut wizard);
        for _ in 0..4 {
            wizard.advance().expect("advance");
        }
        wizard.set_agreement(true);
        wizard.set_field(FieldId::Email, "rusak").expect("set");

        assert!(wizard.submit().is_err());
        assert_eq!(wizard.errors["email"], "Format email tidak valid");
    }

    #[test]
    fn submit_before_last_step_refused() {
        let mut wizard = Wizard::new(None, now());
        assert!(matches!(wizard.submit(), Err(PpdbError::InvalidStep(1))));
    }

    #[test]
    fn retreat_never_validates_and_floors() {
        let mut wizard = Wizard::new(None, now());
        fill(
            &mut wizard,
            &[
                (FieldId::FullName, "Doni Pratama"),
                (FieldId::Gender, "male"),
                (FieldId::BirthPlace, "Jakarta"),
                (FieldId::BirthDate, "2012-01-01"),
                (FieldId::Religion, "kristen"),
            ],
        );
        wizard.advance().expect("advance");
        assert_eq!(wizard.retreat(), Step::FIRST);
        assert_eq!(wizard.retreat(), Step::FIRST);
    }

    #[test]
    fn registry_open_get_discard() {
        let mut registry = WizardRegistry::new();
        let first = registry.open(None, now());
        let second = registry.open(Some(EducationLevel::Sd), now());

        assert_eq!(first, "REG-000001");
        assert_eq!(second, "REG-000002");
        assert_eq!(registry.len(), 2);

        registry
            .get_mut(&first)
            .expect("wizard")
            .set_field(FieldId::Nickname, "Fadil")
            .expect("set");
        assert_eq!(registry.get(&first).expect("wizard").form.nickname, "Fadil");

        registry.discard(&first).expect("discard");
        assert!(registry.get(&first).is_err());
        assert!(registry.get("garbage").is_err());
    }
}
