//! # Registration Module
//!
//! The five-step student registration wizard.
//!
//! ## Components
//!
//! - `form`: typed field set and field metadata (label, type tag, options)
//! - `validator`: static per-step rules and the `Step` type
//! - `wizard`: step sequence controller, confirmation summary, live wizard registry

pub mod form;
pub mod validator;
pub mod wizard;

pub use form::{
    AGREEMENT_KEY, AGREEMENT_MESSAGE, FieldId, FieldKind, RegistrationForm, SelectOption,
};
pub use validator::{
    EMAIL_FORMAT_MESSAGE, STEPS, Step, StepSpec, is_valid_email, validate_all, validate_step,
};
pub use wizard::{RegistrationSummary, SummaryEntry, SummarySection, Wizard, WizardRegistry};
