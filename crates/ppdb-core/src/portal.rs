//! # Portal
//!
//! The whole portal state in one value: settings, the live registration
//! wizards and every list store.
//!
//! Operations that touch more than one store live here:
//! - Submitting a wizard creates the application and its document checklist
//! - Student uploads honour the configured size limits and edit lock
//! - Dashboards, reports and the landing page read across stores
//!
//! The portal never reads the clock; callers pass `now`.

use crate::{
    ApplicationStatus, DocumentKind, DocumentStatus, EducationLevel, ExportDataKind, Notice,
    Outcome, PpdbError, Variant,
    announcements::{Announcement, Announcements},
    applications::{Application, Applications},
    documents::{DocumentRecord, DocumentRequirement, Documents, UploadCandidate, validate_upload},
    export::{ExportJob, ExportRequest, Exports},
    landing::{self, Landing},
    messages::Inbox,
    primitives::MAX_UPLOAD_BYTES,
    registration::WizardRegistry,
    reports::{self, AdminDashboard, Report},
    schedule::Schedule,
    seed,
    settings::Settings,
    students::{self, StudentDashboard, TimelineDates},
    users::Users,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Result of a submitted registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub application: Application,
    pub documents: usize,
}

/// Record counts shown by `ppdb status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalCounts {
    pub applications: usize,
    pub pending_applications: usize,
    pub documents: usize,
    pub documents_to_review: usize,
    pub announcements: usize,
    pub events: usize,
    pub users: usize,
    pub conversations: usize,
    pub unread_messages: u32,
    pub exports: usize,
    pub open_wizards: usize,
}

// =============================================================================
// PORTAL
// =============================================================================

#[derive(Debug, Default)]
pub struct Portal {
    pub settings: Settings,
    pub wizards: WizardRegistry,
    pub applications: Applications,
    pub documents: Documents,
    pub announcements: Announcements,
    pub schedule: Schedule,
    pub users: Users,
    pub inbox: Inbox,
    pub exports: Exports,
}

impl Portal {
    /// Portal with default settings and the seed records.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            settings: Settings::default(),
            wizards: WizardRegistry::new(),
            applications: Applications::new(seed::applications()),
            documents: Documents::new(seed::documents()),
            announcements: Announcements::new(seed::announcements()),
            schedule: Schedule::new(seed::events()),
            users: Users::new(seed::users()),
            inbox: Inbox::new(seed::conversations()),
            exports: Exports::new(seed::export_history()),
        }
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Start a registration for `level` if new registrations are accepted.
    pub fn open_wizard(
        &mut self,
        level: Option<EducationLevel>,
        now: NaiveDateTime,
    ) -> Result<String, PpdbError> {
        self.settings
            .check_registration_open(self.applications.len())?;
        if let Some(level) = level {
            self.settings.check_level(level)?;
        }
        Ok(self.wizards.open(level, now))
    }

    /// Validate and store a finished wizard.
    ///
    /// The wizard is only discarded once the application exists; on a
    /// validation failure it stays open with its errors.
    pub fn submit_wizard(
        &mut self,
        id: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome<Submission>, PpdbError> {
        self.settings
            .check_registration_open(self.applications.len())?;
        let wizard = self.wizards.get_mut(id)?;
        wizard.submit()?;
        let (form, level) = (wizard.form.clone(), wizard.level);

        let application = self.applications.register(&form, level, now);
        let documents = self.documents.open_checklist(
            &application.id,
            &application.name,
            &self.settings.requirements(),
        );
        self.wizards.discard(id)?;

        Ok(Outcome::new(
            Submission {
                application,
                documents,
            },
            Notice::success(
                "Pendaftaran Berhasil!",
                "Data Anda telah tersimpan. Silakan login ke dashboard untuk melanjutkan proses.",
            ),
        ))
    }

    // -------------------------------------------------------------------------
    // Student documents
    // -------------------------------------------------------------------------

    fn requirement(&self, kind: DocumentKind) -> Option<&DocumentRequirement> {
        self.settings.form.documents.iter().find(|r| r.kind == kind)
    }

    /// The slot a student may still edit.
    fn editable_slot(&self, student_id: &str, kind: DocumentKind) -> Result<String, PpdbError> {
        let slot = self.documents.slot(student_id, kind)?;
        if slot.status == DocumentStatus::Approved && !self.settings.flags.allow_document_edit {
            return Err(PpdbError::EditLocked(slot.id.clone()));
        }
        Ok(slot.id.clone())
    }

    /// Attach a file to one slot of a student's checklist.
    pub fn upload_document(
        &mut self,
        student_id: &str,
        kind: DocumentKind,
        candidate: &UploadCandidate,
        now: NaiveDateTime,
    ) -> Result<Outcome<DocumentRecord>, PpdbError> {
        let id = self.editable_slot(student_id, kind)?;
        let max_bytes = self
            .requirement(kind)
            .map_or(MAX_UPLOAD_BYTES, DocumentRequirement::max_bytes);
        let file = validate_upload(candidate, max_bytes)?;

        let record = self.documents.update(&id, |d| {
            d.upload(file, now);
            Ok(d.clone())
        })?;
        let description = format!(
            "{} telah berhasil diupload dan menunggu verifikasi",
            record.label
        );
        Ok(Outcome::new(
            record,
            Notice::success("File berhasil diupload", description),
        ))
    }

    /// Remove the file of one slot; the slot returns to pending.
    pub fn remove_document(
        &mut self,
        student_id: &str,
        kind: DocumentKind,
    ) -> Result<Outcome<DocumentRecord>, PpdbError> {
        let id = self.editable_slot(student_id, kind)?;
        let record = self.documents.update(&id, |d| {
            d.clear();
            Ok(d.clone())
        })?;
        let description = format!("{} telah dihapus", record.label);
        Ok(Outcome::new(
            record,
            Notice::success("File dihapus", description),
        ))
    }

    // -------------------------------------------------------------------------
    // Document review
    // -------------------------------------------------------------------------

    pub fn approve_document(
        &mut self,
        id: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome<DocumentRecord>, PpdbError> {
        let record = self.documents.update(id, |d| {
            d.approve(now)?;
            Ok(d.clone())
        })?;
        Ok(Outcome::new(
            record,
            Notice::success("Dokumen Disetujui", "Dokumen berhasil diverifikasi"),
        ))
    }

    pub fn reject_document(
        &mut self,
        id: &str,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome<DocumentRecord>, PpdbError> {
        let record = self.documents.update(id, |d| {
            d.reject(reason, now)?;
            Ok(d.clone())
        })?;
        Ok(Outcome::new(
            record,
            Notice::destructive("Dokumen Ditolak", "Status dokumen telah diperbarui"),
        ))
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    pub fn student_dashboard(&self, id: &str) -> Result<StudentDashboard, PpdbError> {
        students::dashboard(
            &self.applications,
            &self.documents,
            id,
            TimelineDates {
                verification: Some(self.settings.registration.end_date),
                announcement: Some(self.settings.registration.announcement_date),
            },
        )
    }

    /// Published announcements an applicant may read.
    pub fn student_feed(&self, id: &str) -> Result<Vec<&Announcement>, PpdbError> {
        let status: ApplicationStatus = self.applications.get(id)?.status;
        Ok(self.announcements.feed(Some(status)))
    }

    #[must_use]
    pub fn admin_dashboard(&self) -> AdminDashboard {
        reports::admin_dashboard(
            &self.applications,
            &self.documents,
            &self.schedule,
            self.inbox.total_unread(),
        )
    }

    #[must_use]
    pub fn report(&self) -> Report {
        reports::report(&self.applications, &self.documents)
    }

    #[must_use]
    pub fn landing(&self, today: NaiveDate) -> Landing {
        landing::landing(&self.settings, &self.applications, &self.documents, today)
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Rows an export of `request` would contain.
    #[must_use]
    pub fn export_rows(&self, request: &ExportRequest) -> u64 {
        let in_range = |date: NaiveDate| {
            request.date_from.is_none_or(|from| date >= from)
                && request.date_to.is_none_or(|to| date <= to)
        };
        let applicants: Vec<&Application> = self
            .applications
            .store()
            .iter()
            .filter(|a| in_range(a.registered_on))
            .collect();

        ExportDataKind::ALL
            .iter()
            .filter(|kind| request.kinds.contains(kind))
            .map(|kind| match kind {
                ExportDataKind::Students | ExportDataKind::Applications => applicants.len(),
                ExportDataKind::Verification => applicants
                    .iter()
                    .filter(|a| a.status != ApplicationStatus::Pending)
                    .count(),
                ExportDataKind::Documents => applicants
                    .iter()
                    .map(|a| self.documents.checklist(&a.id).len())
                    .sum(),
                ExportDataKind::Schedule => self
                    .schedule
                    .store()
                    .iter()
                    .filter(|e| in_range(e.date))
                    .count(),
                ExportDataKind::Statistics => reports::trend(&self.applications).len(),
            })
            .map(|rows| rows as u64)
            .sum()
    }

    pub fn start_export(
        &mut self,
        request: ExportRequest,
        now: NaiveDateTime,
    ) -> Result<&ExportJob, PpdbError> {
        let rows = self.export_rows(&request);
        self.exports.start(request, rows, now)
    }

    #[must_use]
    pub fn counts(&self) -> PortalCounts {
        let documents = self.documents.stats();
        PortalCounts {
            applications: self.applications.len(),
            pending_applications: self.applications.stats().pending,
            documents: documents.total,
            documents_to_review: documents.uploaded,
            announcements: self.announcements.stats().total,
            events: self.schedule.store().len(),
            users: self.users.stats().total,
            conversations: self.inbox.len(),
            unread_messages: self.inbox.total_unread(),
            exports: self.exports.history().len(),
            open_wizards: self.wizards.len(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::{ExportFormat, registration::FieldId};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .expect("valid timestamp")
    }

    fn pdf(size: u64) -> UploadCandidate {
        UploadCandidate {
            file_name: "ijazah.pdf".into(),
            content_type: "application/pdf".into(),
            declared_size: size,
            bytes: None,
        }
    }

    fn fill(portal: &mut Portal, id: &str) {
        let wizard = portal.wizards.get_mut(id).expect("wizard");
        let values = [
            (FieldId::FullName, "Rina Kartika"),
            (FieldId::Gender, "female"),
            (FieldId::BirthPlace, "Bandung"),
            (FieldId::BirthDate, "2009-04-12"),
            (FieldId::Religion, "islam"),
            (FieldId::Address, "Jl. Merdeka No. 5"),
            (FieldId::Phone, "081234567890"),
            (FieldId::Email, "rina@example.com"),
            (FieldId::PreviousSchool, "SMP Negeri 2"),
            (FieldId::GraduationYear, "2024"),
            (FieldId::Nisn, "0091234567"),
            (FieldId::FatherName, "Hadi"),
            (FieldId::FatherJob, "Guru"),
            (FieldId::MotherName, "Sari"),
            (FieldId::MotherJob, "Wiraswasta"),
            (FieldId::ParentPhone, "081298765432"),
        ];
        for (field, value) in values {
            wizard.set_field(field, value).expect("set field");
        }
        for _ in 0..4 {
            wizard.advance().expect("advance");
        }
        wizard.set_agreement(true);
    }

    #[test]
    fn submission_creates_application_and_checklist() {
        let mut portal = Portal::seeded();
        let id = portal
            .open_wizard(Some(EducationLevel::Sma), now())
            .expect("open");
        fill(&mut portal, &id);

        let outcome = portal.submit_wizard(&id, now()).expect("submit");
        assert_eq!(outcome.notice.title, "Pendaftaran Berhasil!");
        assert_eq!(outcome.value.application.id, "PPDB007");
        assert_eq!(outcome.value.documents, 6);
        assert_eq!(portal.documents.progress("PPDB007").completed, 0);
        assert!(portal.wizards.get(&id).is_err());
    }

    #[test]
    fn failed_submission_keeps_wizard() {
        let mut portal = Portal::seeded();
        let id = portal.open_wizard(None, now()).expect("open");
        assert!(matches!(
            portal.submit_wizard(&id, now()),
            Err(PpdbError::InvalidStep(1))
        ));
        assert!(portal.wizards.get(&id).is_ok());
        assert_eq!(portal.applications.len(), 6);
    }

    #[test]
    fn closed_registration_refuses_wizards() {
        let mut portal = Portal::seeded();
        portal.settings.registration.is_open = false;
        assert!(matches!(
            portal.open_wizard(None, now()),
            Err(PpdbError::RegistrationClosed(_))
        ));
    }

    #[test]
    fn upload_respects_requirement_size() {
        let mut portal = Portal::seeded();
        let err = portal
            .upload_document("PPDB001", DocumentKind::Foto, &pdf(2 * 1024 * 1024 + 1), now())
            .expect_err("too large");
        assert!(matches!(err, PpdbError::FileTooLarge { .. }));

        let outcome = portal
            .upload_document("PPDB001", DocumentKind::Foto, &pdf(500 * 1024), now())
            .expect("upload");
        assert_eq!(outcome.value.status, DocumentStatus::Uploaded);
        assert!(outcome.notice.description.contains("menunggu verifikasi"));
    }

    #[test]
    fn refused_file_type_leaves_slot_untouched() {
        let mut portal = Portal::seeded();
        let ijazah = portal
            .documents
            .slot("PPDB001", DocumentKind::Ijazah)
            .expect("slot")
            .id
            .clone();
        portal
            .reject_document(&ijazah, "Buram", now())
            .expect("reject");

        let note = UploadCandidate {
            file_name: "catatan.txt".into(),
            content_type: "text/plain".into(),
            declared_size: 1024,
            bytes: None,
        };
        let slots = [
            ("PPDB001", DocumentKind::Ijazah),
            ("PPDB001", DocumentKind::Kk),
            ("PPDB002", DocumentKind::Akta),
        ];
        for (student, kind) in slots {
            let before = portal.documents.slot(student, kind).expect("slot").clone();
            let err = portal
                .upload_document(student, kind, &note, now())
                .expect_err("text file");
            assert!(matches!(err, PpdbError::UnsupportedFileType(_)));

            let after = portal.documents.slot(student, kind).expect("slot");
            assert_eq!(after.status, before.status);
            assert_eq!(after.file, before.file);
            assert_eq!(after.rejection_reason, before.rejection_reason);
            assert_eq!(after, &before);
        }
    }

    #[test]
    fn approved_documents_are_locked_unless_allowed() {
        let mut portal = Portal::seeded();
        portal.settings.flags.allow_document_edit = false;
        assert!(matches!(
            portal.remove_document("PPDB002", DocumentKind::Kk),
            Err(PpdbError::EditLocked(_))
        ));

        portal.settings.flags.allow_document_edit = true;
        let outcome = portal
            .remove_document("PPDB002", DocumentKind::Kk)
            .expect("remove");
        assert_eq!(outcome.value.status, DocumentStatus::Pending);
        assert_eq!(outcome.notice.title, "File dihapus");
    }

    #[test]
    fn review_round_trip() {
        let mut portal = Portal::seeded();
        let slot = portal
            .documents
            .slot("PPDB001", DocumentKind::Ijazah)
            .expect("slot")
            .id
            .clone();

        assert!(matches!(
            portal.reject_document(&slot, " ", now()),
            Err(PpdbError::MissingRejectionReason)
        ));
        let rejected = portal
            .reject_document(&slot, "Buram", now())
            .expect("reject");
        assert_eq!(rejected.value.rejection_reason.as_deref(), Some("Buram"));

        let approved = portal.approve_document(&slot, now()).expect("approve");
        assert_eq!(approved.value.status, DocumentStatus::Approved);
        assert!(approved.value.rejection_reason.is_none());
    }

    #[test]
    fn export_rows_follow_selection() {
        let portal = Portal::seeded();
        let request = ExportRequest {
            kinds: vec![ExportDataKind::Applications, ExportDataKind::Documents],
            format: ExportFormat::Csv,
            date_from: None,
            date_to: None,
        };
        assert_eq!(portal.export_rows(&request), 6 + 36);
    }

    #[test]
    fn counts_of_seeded_portal() {
        let portal = Portal::seeded();
        let counts = portal.counts();
        assert_eq!(counts.applications, 6);
        assert_eq!(counts.documents, 36);
        assert_eq!(counts.unread_messages, 3);
        assert_eq!(counts.open_wizards, 0);
    }
}
