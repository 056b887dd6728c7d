//! # Registration Flow
//!
//! End-to-end walk of one applicant through the portal: wizard, document
//! uploads, admin review and the resulting dashboard timeline.

use chrono::{NaiveDate, NaiveDateTime};
use ppdb_core::{
    DocumentKind, DocumentStatus, EducationLevel, FieldId, Portal, PpdbError, UploadCandidate,
    students::MilestoneState,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

fn candidate(kind: DocumentKind) -> UploadCandidate {
    let (file_name, content_type, bytes) = match kind {
        DocumentKind::Foto => (
            "foto.png",
            "image/png",
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0],
        ),
        _ => ("scan.pdf", "application/pdf", b"%PDF-1.7 scan".to_vec()),
    };
    UploadCandidate {
        file_name: file_name.into(),
        content_type: content_type.into(),
        declared_size: 0,
        bytes: Some(bytes),
    }
}

const ANSWERS: [(FieldId, &str); 16] = [
    (FieldId::FullName, "Dewi Lestari"),
    (FieldId::Gender, "female"),
    (FieldId::BirthPlace, "Semarang"),
    (FieldId::BirthDate, "2009-08-17"),
    (FieldId::Religion, "kristen"),
    (FieldId::Address, "Jl. Pemuda No. 10"),
    (FieldId::Phone, "081311112222"),
    (FieldId::Email, "dewi@example.com"),
    (FieldId::PreviousSchool, "SMP Negeri 5"),
    (FieldId::GraduationYear, "2024"),
    (FieldId::Nisn, "0098765432"),
    (FieldId::FatherName, "Agus"),
    (FieldId::FatherJob, "Petani"),
    (FieldId::MotherName, "Wati"),
    (FieldId::MotherJob, "Pedagang"),
    (FieldId::ParentPhone, "081333334444"),
];

#[test]
fn applicant_from_wizard_to_verified_documents() {
    let mut portal = Portal::seeded();

    // Wizard
    let wizard_id = portal
        .open_wizard(Some(EducationLevel::Smp), at(1, 8))
        .expect("registration is open");
    {
        let wizard = portal.wizards.get_mut(&wizard_id).expect("wizard");
        assert!(matches!(wizard.advance(), Err(PpdbError::Validation(_))));
        assert!(wizard.errors.contains_key("full_name"));

        for (field, value) in ANSWERS {
            wizard.set_field(field, value).expect("field");
        }
        while !wizard.step.is_last() {
            wizard.advance().expect("step is complete");
        }
        assert!(!wizard.can_submit());
        wizard.set_agreement(true);
        assert!(wizard.can_submit());
    }
    let submission = portal
        .submit_wizard(&wizard_id, at(1, 9))
        .expect("submit")
        .value;
    let student = submission.application.id.clone();
    assert_eq!(submission.application.level, Some(EducationLevel::Smp));

    // Uploads
    let kinds = [
        DocumentKind::Ijazah,
        DocumentKind::Kk,
        DocumentKind::Akta,
        DocumentKind::Foto,
        DocumentKind::Sehat,
        DocumentKind::Rapor,
    ];
    for kind in kinds {
        portal
            .upload_document(&student, kind, &candidate(kind), at(2, 10))
            .expect("upload");
    }
    let dashboard = portal.student_dashboard(&student).expect("dashboard");
    assert_eq!(dashboard.progress.percent, 100);
    let states: Vec<MilestoneState> = dashboard.timeline.iter().map(|m| m.state).collect();
    assert_eq!(
        states,
        vec![
            MilestoneState::Completed,
            MilestoneState::Completed,
            MilestoneState::Current,
            MilestoneState::Upcoming
        ]
    );

    // Review
    let ids: Vec<String> = dashboard.documents.iter().map(|d| d.id.clone()).collect();
    for id in &ids {
        portal.approve_document(id, at(3, 10)).expect("approve");
    }
    let dashboard = portal.student_dashboard(&student).expect("dashboard");
    assert!(
        dashboard
            .documents
            .iter()
            .all(|d| d.status == DocumentStatus::Approved)
    );
    assert_eq!(dashboard.timeline[2].state, MilestoneState::Completed);
    assert_eq!(dashboard.timeline[3].state, MilestoneState::Current);

    // Announcement
    portal
        .applications
        .approve(&student, at(4, 10))
        .expect("approve application");
    let dashboard = portal.student_dashboard(&student).expect("dashboard");
    assert!(
        dashboard
            .timeline
            .iter()
            .all(|m| m.state == MilestoneState::Completed)
    );
}

#[test]
fn registration_limit_closes_the_wizard() {
    let mut portal = Portal::seeded();
    portal.settings.registration.max_applications = 6;
    assert!(matches!(
        portal.open_wizard(None, at(1, 8)),
        Err(PpdbError::RegistrationClosed(_))
    ));
}

#[test]
fn disabled_level_is_refused() {
    let mut portal = Portal::seeded();
    for level in &mut portal.settings.form.levels {
        if level.level == EducationLevel::Sd {
            level.enabled = false;
        }
    }
    assert!(matches!(
        portal.open_wizard(Some(EducationLevel::Sd), at(1, 8)),
        Err(PpdbError::Validation(_))
    ));
    assert!(portal.open_wizard(Some(EducationLevel::Sma), at(1, 8)).is_ok());
}
