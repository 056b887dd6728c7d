//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the PPDB portal:
//! - Closed status/category/role enums (`ApplicationStatus`, `DocumentStatus`, ...)
//! - The `Variant` trait used to parse and label those enums
//! - User-facing notices (`Notice`, `NoticeKind`, `Outcome`)
//! - Error types (`PpdbError`, `FieldErrors`)
//!
//! ## Closed Variants
//!
//! Every status that used to be a free-form string is a closed enum here.
//! Each enum serializes as its snake_case name and carries an Indonesian
//! badge label for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// VARIANT TRAIT
// =============================================================================

/// A closed set of named values.
///
/// `as_str` is the wire name (identical to the serde representation),
/// `label` the Indonesian text shown on badges.
pub trait Variant: Copy + Eq + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Wire name of this variant.
    fn as_str(self) -> &'static str;

    /// Display label of this variant.
    fn label(self) -> &'static str;

    /// Parse a wire name back into a variant.
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == name)
    }
}

/// Declare a closed enum together with its `Variant` implementation.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Variant for $name {
            const ALL: &'static [Self] = &[ $( Self::$variant ),+ ];

            fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire ),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// =============================================================================
// STATUS ENUMS
// =============================================================================

closed_enum! {
    /// Review state of an application.
    pub enum ApplicationStatus {
        Pending => ("pending", "Menunggu"),
        Approved => ("approved", "Disetujui"),
        Rejected => ("rejected", "Ditolak"),
    }
}

closed_enum! {
    /// Lifecycle of a single required document.
    pub enum DocumentStatus {
        /// Nothing uploaded yet.
        Pending => ("pending", "Belum Upload"),
        /// Uploaded, waiting for an admin.
        Uploaded => ("uploaded", "Menunggu Review"),
        Approved => ("approved", "Disetujui"),
        Rejected => ("rejected", "Ditolak"),
    }
}

closed_enum! {
    /// Required document slots of the student checklist.
    pub enum DocumentKind {
        Ijazah => ("ijazah", "Ijazah/SKHUN"),
        Kk => ("kk", "Kartu Keluarga"),
        Akta => ("akta", "Akta Kelahiran"),
        Foto => ("foto", "Pas Foto"),
        Sehat => ("sehat", "Surat Keterangan Sehat"),
        Rapor => ("rapor", "Rapor Semester 1-5"),
    }
}

closed_enum! {
    pub enum AnnouncementCategory {
        Info => ("info", "Informasi"),
        Important => ("important", "Penting"),
        Urgent => ("urgent", "Mendesak"),
        Schedule => ("schedule", "Jadwal"),
    }
}

closed_enum! {
    pub enum AnnouncementStatus {
        Draft => ("draft", "Draft"),
        Published => ("published", "Dipublikasi"),
        Scheduled => ("scheduled", "Terjadwal"),
    }
}

closed_enum! {
    /// Who an announcement is addressed to.
    pub enum Audience {
        All => ("all", "Semua Pendaftar"),
        Pending => ("pending", "Menunggu Verifikasi"),
        Approved => ("approved", "Diterima"),
        Rejected => ("rejected", "Ditolak"),
    }
}

impl Audience {
    /// Whether an applicant in `status` belongs to this audience.
    #[must_use]
    pub fn includes(self, status: ApplicationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == ApplicationStatus::Pending,
            Self::Approved => status == ApplicationStatus::Approved,
            Self::Rejected => status == ApplicationStatus::Rejected,
        }
    }
}

closed_enum! {
    pub enum EventType {
        Registration => ("registration", "Pendaftaran"),
        Verification => ("verification", "Verifikasi"),
        Announcement => ("announcement", "Pengumuman"),
        Test => ("test", "Tes"),
        Orientation => ("orientation", "Orientasi"),
    }
}

closed_enum! {
    pub enum EventStatus {
        Upcoming => ("upcoming", "Akan Datang"),
        Ongoing => ("ongoing", "Berlangsung"),
        Completed => ("completed", "Selesai"),
    }
}

closed_enum! {
    pub enum UserRole {
        Admin => ("admin", "Administrator"),
        Operator => ("operator", "Operator"),
        Verifikator => ("verifikator", "Verifikator"),
    }
}

closed_enum! {
    pub enum UserStatus {
        Active => ("active", "Aktif"),
        Inactive => ("inactive", "Nonaktif"),
    }
}

closed_enum! {
    pub enum MessageSender {
        Admin => ("admin", "Admin"),
        User => ("user", "Pendaftar"),
    }
}

closed_enum! {
    pub enum MessageStatus {
        Sent => ("sent", "Terkirim"),
        Delivered => ("delivered", "Diterima"),
        Read => ("read", "Dibaca"),
    }
}

closed_enum! {
    pub enum ExportFormat {
        Excel => ("excel", "Excel (.xlsx)"),
        Csv => ("csv", "CSV (.csv)"),
        Pdf => ("pdf", "PDF (.pdf)"),
    }
}

closed_enum! {
    pub enum ExportStatus {
        Processing => ("processing", "Diproses"),
        Completed => ("completed", "Selesai"),
        Failed => ("failed", "Gagal"),
        Cancelled => ("cancelled", "Dibatalkan"),
    }
}

closed_enum! {
    /// Data sets that can be included in an export.
    pub enum ExportDataKind {
        Students => ("students", "Data Calon Siswa"),
        Applications => ("applications", "Data Pendaftaran"),
        Documents => ("documents", "Status Dokumen"),
        Verification => ("verification", "Hasil Verifikasi"),
        Schedule => ("schedule", "Jadwal Kegiatan"),
        Statistics => ("statistics", "Statistik & Laporan"),
    }
}

closed_enum! {
    /// School level an applicant registers for.
    pub enum EducationLevel {
        Sd => ("sd", "SD / MI"),
        Smp => ("smp", "SMP / MTs"),
        Sma => ("sma", "SMA / SMK / MA"),
    }
}

// =============================================================================
// NOTICES
// =============================================================================

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Destructive,
}

/// A short, transient message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    /// Create a success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Success,
        }
    }

    /// Create a destructive (error or removal) notice.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Destructive,
        }
    }
}

/// Result of a successful mutation: the affected value plus its notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub notice: Notice,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn new(value: T, notice: Notice) -> Self {
        Self { value, notice }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Field name to inline error message.
pub type FieldErrors = BTreeMap<String, String>;

/// Errors that can occur in the PPDB portal.
///
/// - Validation failures carry the per-field message map
/// - Use `Result<T, PpdbError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum PpdbError {
    /// One or more fields failed validation.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    /// The uploaded file is not a PDF, JPEG or PNG.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The uploaded file exceeds the size limit.
    #[error("File too large: {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// A bulk action was requested with nothing selected.
    #[error("Empty selection: {0}")]
    EmptySelection(&'static str),

    /// No record with the given id exists.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A rejection was attempted without a reason.
    #[error("Rejection reason is required")]
    MissingRejectionReason,

    /// Approve/reject on a document that has no file.
    #[error("Document {0} has no uploaded file to review")]
    NothingToReview(String),

    /// A step number outside the wizard, or an action not allowed on this step.
    #[error("Invalid step: {0}")]
    InvalidStep(u8),

    /// New registrations are not accepted right now.
    #[error("Registration closed: {0}")]
    RegistrationClosed(String),

    /// Another export job is still running.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// A settings section failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A filter value did not name a known variant.
    #[error("Invalid filter value: {0}")]
    InvalidFilter(String),

    /// The record may no longer be edited.
    #[error("Edit locked: {0}")]
    EditLocked(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PpdbError {
    /// Build a validation error for a single field.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        Self::Validation(errors)
    }

    /// Build a not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// The notice a user sees when this error surfaces.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(_) => Notice::destructive("Error", "Periksa kembali data yang diisi"),
            Self::UnsupportedFileType(_) => Notice::destructive(
                "Format file tidak didukung",
                "Silakan upload file PDF, JPG, atau PNG",
            ),
            Self::FileTooLarge { max, .. } => Notice::destructive(
                "Ukuran file terlalu besar",
                format!("Maksimal ukuran file adalah {}", format_size(*max)),
            ),
            Self::EmptySelection(what) => Notice::destructive(
                "Tidak ada yang dipilih",
                format!("Pilih minimal satu {what} untuk melakukan aksi"),
            ),
            Self::NotFound { id, .. } => {
                Notice::destructive("Tidak ditemukan", format!("Data {id} tidak ditemukan"))
            }
            Self::MissingRejectionReason => {
                Notice::destructive("Error", "Harap masukkan alasan penolakan")
            }
            Self::NothingToReview(_) => {
                Notice::destructive("Error", "Dokumen belum diupload")
            }
            Self::InvalidStep(_) => Notice::destructive("Error", "Langkah tidak valid"),
            Self::RegistrationClosed(_) => Notice::destructive(
                "Pendaftaran Ditutup",
                "Pendaftaran saat ini tidak dibuka",
            ),
            Self::ExportInProgress => {
                Notice::destructive("Error", "Export lain sedang berjalan")
            }
            Self::InvalidSettings(message) => Notice::destructive("Error", message.clone()),
            Self::InvalidFilter(_) => Notice::destructive("Error", "Filter tidak valid"),
            Self::EditLocked(_) => Notice::destructive(
                "Tidak dapat diubah",
                "Dokumen yang sudah disetujui tidak dapat diubah",
            ),
            Self::IoError(_) | Self::ConfigError(_) => {
                Notice::destructive("Error", "Terjadi kesalahan sistem")
            }
        }
    }
}

// =============================================================================
// SIZE FORMATTING
// =============================================================================

/// Render a byte count the way file sizes appear on screen ("850 KB", "2.5 MB").
///
/// Uses integer arithmetic only; megabytes are shown with one decimal.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{} KB", bytes / KB)
    } else {
        let tenths = bytes.saturating_mul(10) / MB;
        if tenths % 10 == 0 {
            format!("{} MB", tenths / 10)
        } else {
            format!("{}.{} MB", tenths / 10, tenths % 10)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_round_trips_through_wire_name() {
        for status in DocumentStatus::ALL {
            assert_eq!(DocumentStatus::parse(status.as_str()), Some(*status));
        }
        assert_eq!(ApplicationStatus::parse("archived"), None);
    }

    #[test]
    fn wire_names_and_labels() {
        assert_eq!(EducationLevel::Smp.as_str(), "smp");
        assert_eq!(EducationLevel::Smp.to_string(), "smp");
        assert_eq!(DocumentKind::Kk.label(), "Kartu Keluarga");
    }

    #[test]
    fn audience_includes() {
        assert!(Audience::All.includes(ApplicationStatus::Rejected));
        assert!(Audience::Pending.includes(ApplicationStatus::Pending));
        assert!(!Audience::Approved.includes(ApplicationStatus::Pending));
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(800 * 1024), "800 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_size(2_621_440), "2.5 MB");
    }

    #[test]
    fn validation_error_lists_fields() {
        let err = PpdbError::field("email", "Email wajib diisi");
        assert_eq!(err.to_string(), "Validation failed: email: Email wajib diisi");
    }

    #[test]
    fn file_errors_map_to_upload_notices() {
        let notice = PpdbError::UnsupportedFileType("text/plain".into()).notice();
        assert_eq!(notice.title, "Format file tidak didukung");
        assert_eq!(notice.kind, NoticeKind::Destructive);

        let notice = PpdbError::FileTooLarge {
            size: 3 * 1024 * 1024,
            max: 2 * 1024 * 1024,
        }
        .notice();
        assert_eq!(notice.title, "Ukuran file terlalu besar");
        assert_eq!(notice.description, "Maksimal ukuran file adalah 2 MB");
    }
}
