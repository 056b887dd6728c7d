//! # Registration Form
//!
//! Typed field set of the student registration wizard.

use crate::{PpdbError, primitives::{DEFAULT_NATIONALITY, MAX_FIELD_LENGTH}};
use serde::{Deserialize, Serialize};

// =============================================================================
// FIELD METADATA
// =============================================================================

/// Input widget type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Select,
    Date,
    Textarea,
    Tel,
    Email,
}

/// One choice of a select field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const GENDER_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "male", label: "Laki-laki" },
    SelectOption { value: "female", label: "Perempuan" },
];

const RELIGION_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "islam", label: "Islam" },
    SelectOption { value: "kristen", label: "Kristen" },
    SelectOption { value: "katolik", label: "Katolik" },
    SelectOption { value: "hindu", label: "Hindu" },
    SelectOption { value: "buddha", label: "Buddha" },
    SelectOption { value: "konghucu", label: "Konghucu" },
];

const GRADUATION_YEAR_OPTIONS: &[SelectOption] = &[
    SelectOption { value: "2024", label: "2024" },
    SelectOption { value: "2023", label: "2023" },
    SelectOption { value: "2022", label: "2022" },
];

/// Text fields of the registration form.
///
/// The agreement checkbox is not a text field and lives on
/// [`RegistrationForm::agreement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FullName,
    Nickname,
    Gender,
    BirthPlace,
    BirthDate,
    Religion,
    Nationality,
    Address,
    Phone,
    Email,
    PreviousSchool,
    GraduationYear,
    Nisn,
    FatherName,
    FatherJob,
    MotherName,
    MotherJob,
    ParentPhone,
    Achievements,
}

impl FieldId {
    pub const ALL: [Self; 19] = [
        Self::FullName,
        Self::Nickname,
        Self::Gender,
        Self::BirthPlace,
        Self::BirthDate,
        Self::Religion,
        Self::Nationality,
        Self::Address,
        Self::Phone,
        Self::Email,
        Self::PreviousSchool,
        Self::GraduationYear,
        Self::Nisn,
        Self::FatherName,
        Self::FatherJob,
        Self::MotherName,
        Self::MotherJob,
        Self::ParentPhone,
        Self::Achievements,
    ];

    /// Wire name, also the key used in error maps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Nickname => "nickname",
            Self::Gender => "gender",
            Self::BirthPlace => "birth_place",
            Self::BirthDate => "birth_date",
            Self::Religion => "religion",
            Self::Nationality => "nationality",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::PreviousSchool => "previous_school",
            Self::GraduationYear => "graduation_year",
            Self::Nisn => "nisn",
            Self::FatherName => "father_name",
            Self::FatherJob => "father_job",
            Self::MotherName => "mother_name",
            Self::MotherJob => "mother_job",
            Self::ParentPhone => "parent_phone",
            Self::Achievements => "achievements",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Nama Lengkap",
            Self::Nickname => "Nama Panggilan",
            Self::Gender => "Jenis Kelamin",
            Self::BirthPlace => "Tempat Lahir",
            Self::BirthDate => "Tanggal Lahir",
            Self::Religion => "Agama",
            Self::Nationality => "Kewarganegaraan",
            Self::Address => "Alamat Lengkap",
            Self::Phone => "Nomor HP",
            Self::Email => "Email",
            Self::PreviousSchool => "Asal Sekolah",
            Self::GraduationYear => "Tahun Lulus",
            Self::Nisn => "NISN",
            Self::FatherName => "Nama Ayah",
            Self::FatherJob => "Pekerjaan Ayah",
            Self::MotherName => "Nama Ibu",
            Self::MotherJob => "Pekerjaan Ibu",
            Self::ParentPhone => "Nomor HP Orang Tua",
            Self::Achievements => "Prestasi",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Gender | Self::Religion | Self::GraduationYear => FieldKind::Select,
            Self::BirthDate => FieldKind::Date,
            Self::Address | Self::Achievements => FieldKind::Textarea,
            Self::Phone | Self::ParentPhone => FieldKind::Tel,
            Self::Email => FieldKind::Email,
            _ => FieldKind::Text,
        }
    }

    /// Choices of a select field; empty for every other kind.
    #[must_use]
    pub fn options(self) -> &'static [SelectOption] {
        match self {
            Self::Gender => GENDER_OPTIONS,
            Self::Religion => RELIGION_OPTIONS,
            Self::GraduationYear => GRADUATION_YEAR_OPTIONS,
            _ => &[],
        }
    }

    /// Inline message shown when a required field is left empty.
    ///
    /// `None` marks an optional field.
    #[must_use]
    pub fn required_message(self) -> Option<&'static str> {
        match self {
            Self::FullName => Some("Nama lengkap wajib diisi"),
            Self::Gender => Some("Jenis kelamin wajib dipilih"),
            Self::BirthPlace => Some("Tempat lahir wajib diisi"),
            Self::BirthDate => Some("Tanggal lahir wajib diisi"),
            Self::Religion => Some("Agama wajib dipilih"),
            Self::Address => Some("Alamat wajib diisi"),
            Self::Phone => Some("Nomor HP wajib diisi"),
            Self::Email => Some("Email wajib diisi"),
            Self::PreviousSchool => Some("Asal sekolah wajib diisi"),
            Self::GraduationYear => Some("Tahun lulus wajib dipilih"),
            Self::Nisn => Some("NISN wajib diisi"),
            Self::FatherName => Some("Nama ayah wajib diisi"),
            Self::FatherJob => Some("Pekerjaan ayah wajib diisi"),
            Self::MotherName => Some("Nama ibu wajib diisi"),
            Self::MotherJob => Some("Pekerjaan ibu wajib diisi"),
            Self::ParentPhone => Some("Nomor HP orang tua wajib diisi"),
            Self::Nickname | Self::Nationality | Self::Achievements => None,
        }
    }

    /// Display text of a stored value (select values become their label).
    #[must_use]
    pub fn display_value(self, value: &str) -> String {
        self.options()
            .iter()
            .find(|o| o.value == value)
            .map_or_else(|| value.to_string(), |o| o.label.to_string())
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Error-map key of the agreement checkbox.
pub const AGREEMENT_KEY: &str = "agreement";

/// Inline message of an unchecked agreement.
pub const AGREEMENT_MESSAGE: &str = "Anda harus menyetujui pernyataan";

// =============================================================================
// FORM
// =============================================================================

/// Values collected by the wizard.
///
/// Lives only as long as its wizard; discarded on submit or abandon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub nickname: String,
    pub gender: String,
    pub birth_place: String,
    pub birth_date: String,
    pub religion: String,
    pub nationality: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub previous_school: String,
    pub graduation_year: String,
    pub nisn: String,
    pub father_name: String,
    pub father_job: String,
    pub mother_name: String,
    pub mother_job: String,
    pub parent_phone: String,
    pub achievements: String,
    pub agreement: bool,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            nickname: String::new(),
            gender: String::new(),
            birth_place: String::new(),
            birth_date: String::new(),
            religion: String::new(),
            nationality: DEFAULT_NATIONALITY.to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            previous_school: String::new(),
            graduation_year: String::new(),
            nisn: String::new(),
            father_name: String::new(),
            father_job: String::new(),
            mother_name: String::new(),
            mother_job: String::new(),
            parent_phone: String::new(),
            achievements: String::new(),
            agreement: false,
        }
    }
}

impl RegistrationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::FullName => &self.full_name,
            FieldId::Nickname => &self.nickname,
            FieldId::Gender => &self.gender,
            FieldId::BirthPlace => &self.birth_place,
            FieldId::BirthDate => &self.birth_date,
            FieldId::Religion => &self.religion,
            FieldId::Nationality => &self.nationality,
            FieldId::Address => &self.address,
            FieldId::Phone => &self.phone,
            FieldId::Email => &self.email,
            FieldId::PreviousSchool => &self.previous_school,
            FieldId::GraduationYear => &self.graduation_year,
            FieldId::Nisn => &self.nisn,
            FieldId::FatherName => &self.father_name,
            FieldId::FatherJob => &self.father_job,
            FieldId::MotherName => &self.mother_name,
            FieldId::MotherJob => &self.mother_job,
            FieldId::ParentPhone => &self.parent_phone,
            FieldId::Achievements => &self.achievements,
        }
    }

    fn slot(&mut self, field: FieldId) -> &mut String {
        match field {
            FieldId::FullName => &mut self.full_name,
            FieldId::Nickname => &mut self.nickname,
            FieldId::Gender => &mut self.gender,
            FieldId::BirthPlace => &mut self.birth_place,
            FieldId::BirthDate => &mut self.birth_date,
            FieldId::Religion => &mut self.religion,
            FieldId::Nationality => &mut self.nationality,
            FieldId::Address => &mut self.address,
            FieldId::Phone => &mut self.phone,
            FieldId::Email => &mut self.email,
            FieldId::PreviousSchool => &mut self.previous_school,
            FieldId::GraduationYear => &mut self.graduation_year,
            FieldId::Nisn => &mut self.nisn,
            FieldId::FatherName => &mut self.father_name,
            FieldId::FatherJob => &mut self.father_job,
            FieldId::MotherName => &mut self.mother_name,
            FieldId::MotherJob => &mut self.mother_job,
            FieldId::ParentPhone => &mut self.parent_phone,
            FieldId::Achievements => &mut self.achievements,
        }
    }

    /// Store a value; rejects values longer than `MAX_FIELD_LENGTH`.
    pub fn set(&mut self, field: FieldId, value: impl Into<String>) -> Result<(), PpdbError> {
        let value = value.into();
        if value.len() > MAX_FIELD_LENGTH {
            return Err(PpdbError::field(
                field.as_str(),
                format!("Maksimal {MAX_FIELD_LENGTH} karakter"),
            ));
        }
        *self.slot(field) = value;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_form_defaults() {
        let form = RegistrationForm::new();
        assert_eq!(form.nationality, "Indonesia");
        assert!(form.full_name.is_empty());
        assert!(!form.agreement);
    }

    #[test]
    fn set_and_get_every_field() {
        let mut form = RegistrationForm::new();
        for field in FieldId::ALL {
            form.set(field, field.as_str()).expect("set");
        }
        for field in FieldId::ALL {
            assert_eq!(form.get(field), field.as_str());
        }
    }

    #[test]
    fn overlong_value_rejected() {
        let mut form = RegistrationForm::new();
        let result = form.set(FieldId::Address, "x".repeat(MAX_FIELD_LENGTH + 1));
        assert!(matches!(result, Err(PpdbError::Validation(_))));
        assert!(form.address.is_empty());
    }

    #[test]
    fn field_metadata() {
        assert_eq!(FieldId::Gender.kind(), FieldKind::Select);
        assert_eq!(FieldId::BirthDate.kind(), FieldKind::Date);
        assert_eq!(FieldId::Email.kind(), FieldKind::Email);
        assert!(FieldId::Nickname.required_message().is_none());
        assert_eq!(FieldId::Gender.display_value("female"), "Perempuan");
        assert_eq!(FieldId::FullName.display_value("Siti"), "Siti");
        assert_eq!(FieldId::parse("parent_phone"), Some(FieldId::ParentPhone));
    }
}
