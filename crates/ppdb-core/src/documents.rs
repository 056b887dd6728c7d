//! # Documents Module
//!
//! Required-document checklist shared by the student dashboard and the
//! admin verification screen.
//!
//! ## Lifecycle
//!
//! ```text
//! pending ──upload──▶ uploaded ──approve──▶ approved
//!    ▲                   │  ▲                  │
//!    │                reject └──── upload ─────┤
//!    │                   ▼                     │
//!    └──── clear ─── rejected ◀─── reject ─────┘
//! ```
//!
//! `rejection_reason` is present exactly when the status is `rejected`.
//! Uploading again moves any document back to `uploaded`; clearing the file
//! moves it back to `pending`. Both drop the reason.

use crate::{
    DocumentKind, DocumentStatus, PpdbError, Variant,
    listing::{Filter, Searchable},
    primitives::{ALLOWED_CONTENT_TYPES, ID_WIDTH, MAX_UPLOAD_BYTES},
    store::{Record, Store},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const MEGABYTE: u64 = 1024 * 1024;
const MAX_FILE_NAME_LENGTH: usize = 255;

// =============================================================================
// REQUIREMENTS
// =============================================================================

/// One entry of the configurable required-document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub kind: DocumentKind,
    /// Long description shown on the public requirement list.
    pub label: String,
    pub required: bool,
    pub enabled: bool,
    pub max_size_mb: u8,
}

impl DocumentRequirement {
    fn new(kind: DocumentKind, label: &str, max_size_mb: u8) -> Self {
        Self {
            kind,
            label: label.to_string(),
            required: true,
            enabled: true,
            max_size_mb,
        }
    }

    /// Effective upload cap: the configured size, never above `MAX_UPLOAD_BYTES`.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        (u64::from(self.max_size_mb) * MEGABYTE).min(MAX_UPLOAD_BYTES)
    }
}

/// The default required-document list.
#[must_use]
pub fn default_requirements() -> Vec<DocumentRequirement> {
    vec![
        DocumentRequirement::new(
            DocumentKind::Ijazah,
            "Fotokopi Ijazah/SKHUN atau Surat Keterangan Lulus",
            5,
        ),
        DocumentRequirement::new(DocumentKind::Kk, "Fotokopi Kartu Keluarga", 5),
        DocumentRequirement::new(DocumentKind::Akta, "Fotokopi Akta Kelahiran", 5),
        DocumentRequirement::new(DocumentKind::Foto, "Pas Foto terbaru 3x4", 2),
        DocumentRequirement::new(DocumentKind::Sehat, "Surat Keterangan Sehat dari Dokter", 5),
        DocumentRequirement::new(DocumentKind::Rapor, "Fotokopi Rapor Semester 1-5", 10),
    ]
}

// =============================================================================
// UPLOAD VALIDATION
// =============================================================================

/// File as received from the client, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadCandidate {
    pub file_name: String,
    pub content_type: String,
    /// Size claimed by the client; ignored when `bytes` is present.
    pub declared_size: u64,
    /// Optional file content, measured and sniffed when present.
    pub bytes: Option<Vec<u8>>,
}

/// Metadata kept for an accepted file. The content itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

fn normalize_content_type(content_type: &str) -> String {
    let lower = content_type.trim().to_ascii_lowercase();
    if lower == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        lower
    }
}

/// Detect PDF, JPEG or PNG from leading magic bytes.
#[must_use]
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.starts_with(b"%PDF-") {
        Some("application/pdf")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(PNG_SIGNATURE) {
        Some("image/png")
    } else {
        None
    }
}

/// Content type implied by the file extension, if it is an accepted one.
#[must_use]
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Check type and size of an upload against `max_bytes`.
///
/// Type is checked before size, so an oversized text file reports the
/// unsupported type.
pub fn validate_upload(candidate: &UploadCandidate, max_bytes: u64) -> Result<FileMeta, PpdbError> {
    let file_name = candidate
        .file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    if file_name.is_empty() || file_name.len() > MAX_FILE_NAME_LENGTH {
        return Err(PpdbError::field("file_name", "Nama file tidak valid"));
    }

    let content_type = normalize_content_type(&candidate.content_type);
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(PpdbError::UnsupportedFileType(candidate.content_type.clone()));
    }
    if content_type_for(&file_name) != Some(content_type.as_str()) {
        return Err(PpdbError::UnsupportedFileType(file_name));
    }

    let size_bytes = candidate
        .bytes
        .as_ref()
        .map_or(candidate.declared_size, |b| b.len() as u64);
    if size_bytes == 0 {
        return Err(PpdbError::field("file", "File kosong"));
    }
    if size_bytes > max_bytes {
        return Err(PpdbError::FileTooLarge {
            size: size_bytes,
            max: max_bytes,
        });
    }

    if let Some(bytes) = &candidate.bytes {
        match sniff_content_type(bytes) {
            Some(detected) if detected == content_type => {}
            Some(detected) => {
                return Err(PpdbError::UnsupportedFileType(format!(
                    "declared {content_type}, content is {detected}"
                )));
            }
            None => {
                return Err(PpdbError::UnsupportedFileType(format!(
                    "content is not {content_type}"
                )));
            }
        }
    }

    Ok(FileMeta {
        file_name,
        content_type,
        size_bytes,
    })
}

// =============================================================================
// DOCUMENT RECORD
// =============================================================================

/// One required document of one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub kind: DocumentKind,
    pub label: String,
    pub status: DocumentStatus,
    pub required: bool,
    pub file: Option<FileMeta>,
    pub uploaded_at: Option<NaiveDateTime>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub rejection_reason: Option<String>,
}

impl Record for DocumentRecord {
    const KIND: &'static str = "Document";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for DocumentRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.student_name.as_str(), self.student_id.as_str(), self.label.as_str()]
    }
}

impl DocumentRecord {
    /// Empty checklist slot.
    #[must_use]
    pub fn pending(
        id: String,
        student_id: &str,
        student_name: &str,
        kind: DocumentKind,
        required: bool,
    ) -> Self {
        Self {
            id,
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            kind,
            label: kind.label().to_string(),
            status: DocumentStatus::Pending,
            required,
            file: None,
            uploaded_at: None,
            reviewed_at: None,
            rejection_reason: None,
        }
    }

    /// Attach a validated file; the document waits for review again.
    pub fn upload(&mut self, file: FileMeta, now: NaiveDateTime) {
        self.status = DocumentStatus::Uploaded;
        self.file = Some(file);
        self.uploaded_at = Some(now);
        self.reviewed_at = None;
        self.rejection_reason = None;
    }

    /// Remove the file; the slot returns to `pending`.
    pub fn clear(&mut self) {
        self.status = DocumentStatus::Pending;
        self.file = None;
        self.uploaded_at = None;
        self.reviewed_at = None;
        self.rejection_reason = None;
    }

    pub fn approve(&mut self, now: NaiveDateTime) -> Result<(), PpdbError> {
        if self.file.is_none() {
            return Err(PpdbError::NothingToReview(self.id.clone()));
        }
        self.status = DocumentStatus::Approved;
        self.reviewed_at = Some(now);
        self.rejection_reason = None;
        Ok(())
    }

    /// Reject with a mandatory, non-blank reason.
    pub fn reject(&mut self, reason: &str, now: NaiveDateTime) -> Result<(), PpdbError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PpdbError::MissingRejectionReason);
        }
        if self.file.is_none() {
            return Err(PpdbError::NothingToReview(self.id.clone()));
        }
        self.status = DocumentStatus::Rejected;
        self.reviewed_at = Some(now);
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// Counts toward the student's progress.
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(
            self.status,
            DocumentStatus::Uploaded | DocumentStatus::Approved
        )
    }
}

// =============================================================================
// DOCUMENT BOOK
// =============================================================================

/// Search and filters of the verification screen.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub search: String,
    pub status: Filter<DocumentStatus>,
    pub kind: Filter<DocumentKind>,
}

/// Upload progress of one checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    #[must_use]
    pub fn of(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percent: percent(completed, total),
        }
    }
}

/// Integer percentage, 0 for an empty denominator.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (part.min(whole) * 100 / whole) as u8
}

/// Counters shown above the verification list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total: usize,
    pub pending: usize,
    pub uploaded: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// All document slots of all students.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    store: Store<DocumentRecord>,
}

impl Documents {
    #[must_use]
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store<DocumentRecord> {
        &self.store
    }

    pub fn get(&self, id: &str) -> Result<&DocumentRecord, PpdbError> {
        self.store.require(id)
    }

    /// Create the pending checklist of a new student from the enabled requirements.
    pub fn open_checklist(
        &mut self,
        student_id: &str,
        student_name: &str,
        requirements: &[DocumentRequirement],
    ) -> usize {
        let mut created = 0;
        for requirement in requirements.iter().filter(|r| r.enabled) {
            let id = self.store.next_id("DOC", ID_WIDTH);
            self.store.push(DocumentRecord::pending(
                id,
                student_id,
                student_name,
                requirement.kind,
                requirement.required,
            ));
            created += 1;
        }
        created
    }

    /// Checklist of one student in requirement order.
    #[must_use]
    pub fn checklist(&self, student_id: &str) -> Vec<&DocumentRecord> {
        self.store
            .iter()
            .filter(|d| d.student_id == student_id)
            .collect()
    }

    /// The slot of one kind on one student's checklist.
    pub fn slot(&self, student_id: &str, kind: DocumentKind) -> Result<&DocumentRecord, PpdbError> {
        self.store
            .iter()
            .find(|d| d.student_id == student_id && d.kind == kind)
            .ok_or_else(|| {
                PpdbError::not_found("Document", format!("{student_id}/{}", kind.as_str()))
            })
    }

    #[must_use]
    pub fn progress(&self, student_id: &str) -> Progress {
        let checklist = self.checklist(student_id);
        let completed = checklist.iter().filter(|d| d.is_submitted()).count();
        Progress::of(completed, checklist.len())
    }

    /// Apply a transition to one document.
    pub fn update<T>(
        &mut self,
        id: &str,
        edit: impl FnOnce(&mut DocumentRecord) -> Result<T, PpdbError>,
    ) -> Result<T, PpdbError> {
        self.store.update(id, edit)
    }

    /// Submitted documents (those with a file) matching the query.
    #[must_use]
    pub fn review_list(&self, query: &DocumentQuery) -> Vec<&DocumentRecord> {
        self.store
            .iter()
            .filter(|d| d.file.is_some())
            .filter(|d| d.matches(&query.search))
            .filter(|d| query.status.accepts(d.status))
            .filter(|d| query.kind.accepts(d.kind))
            .collect()
    }

    /// Counters over every slot.
    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        self.store
            .iter()
            .fold(DocumentStats::default(), |mut stats, d| {
                stats.total += 1;
                match d.status {
                    DocumentStatus::Pending => stats.pending += 1,
                    DocumentStatus::Uploaded => stats.uploaded += 1,
                    DocumentStatus::Approved => stats.approved += 1,
                    DocumentStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
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
        NaiveDate::from_ymd_opt(2024, 1, 16)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid timestamp")
    }

    fn pdf(size: u64) -> UploadCandidate {
        UploadCandidate {
            file_name: "ijazah_ahmad.pdf".into(),
            content_type: "application/pdf".into(),
            declared_size: size,
            bytes: None,
        }
    }

    fn slot() -> DocumentRecord {
        DocumentRecord::pending(
            "DOC001".into(),
            "PPDB001",
            "Ahmad Fadil Rahman",
            DocumentKind::Ijazah,
            true,
        )
    }

    #[test]
    fn accepts_pdf_within_limit() {
        let meta = validate_upload(&pdf(1_200_000), MAX_UPLOAD_BYTES).expect("valid");
        assert_eq!(meta.size_bytes, 1_200_000);
        assert_eq!(meta.content_type, "application/pdf");
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate_upload(&pdf(MAX_UPLOAD_BYTES), MAX_UPLOAD_BYTES).is_ok());
        let err = validate_upload(&pdf(MAX_UPLOAD_BYTES + 1), MAX_UPLOAD_BYTES);
        assert!(matches!(err, Err(PpdbError::FileTooLarge { .. })));
    }

    #[test]
    fn rejects_plain_text() {
        let candidate = UploadCandidate {
            file_name: "notes.txt".into(),
            content_type: "text/plain".into(),
            declared_size: 10,
            bytes: None,
        };
        assert!(matches!(
            validate_upload(&candidate, MAX_UPLOAD_BYTES),
            Err(PpdbError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn rejects_extension_mismatch() {
        let candidate = UploadCandidate {
            file_name: "script.exe".into(),
            content_type: "application/pdf".into(),
            declared_size: 10,
            bytes: None,
        };
        assert!(validate_upload(&candidate, MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn jpg_alias_and_sniffing() {
        let candidate = UploadCandidate {
            file_name: "C:\\Users\\rina\\foto_rina.JPG".into(),
            content_type: "image/jpg".into(),
            declared_size: 0,
            bytes: Some(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0]),
        };
        let meta = validate_upload(&candidate, MAX_UPLOAD_BYTES).expect("valid");
        assert_eq!(meta.file_name, "foto_rina.JPG");
        assert_eq!(meta.content_type, "image/jpeg");
        assert_eq!(meta.size_bytes, 6);

        let disguised = UploadCandidate {
            bytes: Some(b"%PDF-1.7".to_vec()),
            ..candidate
        };
        assert!(matches!(
            validate_upload(&disguised, MAX_UPLOAD_BYTES),
            Err(PpdbError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn requirement_cap_never_exceeds_global_limit() {
        let requirements = default_requirements();
        for requirement in &requirements {
            assert!(requirement.max_bytes() <= MAX_UPLOAD_BYTES);
        }
        let foto = requirements
            .iter()
            .find(|r| r.kind == DocumentKind::Foto)
            .expect("foto");
        assert_eq!(foto.max_bytes(), 2 * MEGABYTE);
    }

    #[test]
    fn reject_requires_reason_and_sets_it() {
        let mut doc = slot();
        doc.upload(validate_upload(&pdf(100), MAX_UPLOAD_BYTES).expect("valid"), now());

        assert!(matches!(
            doc.reject("   ", now()),
            Err(PpdbError::MissingRejectionReason)
        ));
        doc.reject("Dokumen tidak lengkap", now()).expect("reject");
        assert_eq!(doc.status, DocumentStatus::Rejected);
        assert_eq!(doc.rejection_reason.as_deref(), Some("Dokumen tidak lengkap"));
    }

    #[test]
    fn reupload_and_clear_drop_reason() {
        let mut doc = slot();
        let meta = validate_upload(&pdf(100), MAX_UPLOAD_BYTES).expect("valid");
        doc.upload(meta.clone(), now());
        doc.reject("Buram", now()).expect("reject");

        doc.upload(meta, now());
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert!(doc.rejection_reason.is_none());

        doc.reject("Buram", now()).expect("reject");
        doc.clear();
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert!(doc.rejection_reason.is_none());
        assert!(doc.file.is_none());
    }

    #[test]
    fn review_requires_a_file() {
        let mut doc = slot();
        assert!(matches!(
            doc.approve(now()),
            Err(PpdbError::NothingToReview(_))
        ));
        assert!(doc.reject("x", now()).is_err());
    }

    #[test]
    fn checklist_progress_and_review_list() {
        let mut docs = Documents::default();
        assert_eq!(
            docs.open_checklist("PPDB010", "Nadia Putri", &default_requirements()),
            6
        );
        let id = docs
            .slot("PPDB010", DocumentKind::Kk)
            .expect("slot")
            .id
            .clone();
        docs.update(&id, |d| {
            d.upload(validate_upload(&pdf(500), MAX_UPLOAD_BYTES)?, now());
            Ok(())
        })
        .expect("upload");

        let progress = docs.progress("PPDB010");
        assert_eq!(progress, Progress::of(1, 6));
        assert_eq!(progress.percent, 16);

        let query = DocumentQuery {
            search: "nadia".into(),
            status: Filter::Only(DocumentStatus::Uploaded),
            kind: Filter::All,
        };
        let listed = docs.review_list(&query);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, DocumentKind::Kk);

        let stats = docs.stats();
        assert_eq!(stats.total, 6);
        assert_eq!(stats.uploaded, 1);
        assert_eq!(stats.pending, 5);
    }

    #[test]
    fn disabled_requirements_skipped() {
        let mut requirements = default_requirements();
        requirements[4].enabled = false;
        let mut docs = Documents::default();
        assert_eq!(docs.open_checklist("PPDB011", "X", &requirements), 5);
        assert!(docs.slot("PPDB011", DocumentKind::Sehat).is_err());
    }
}
