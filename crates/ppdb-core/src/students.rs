//! # Students Module
//!
//! Applicants seen as students: the admin student list with document
//! progress, and the student's own dashboard.

use crate::{
    ApplicationStatus, DocumentStatus, PpdbError,
    applications::{Application, Applications},
    documents::{DocumentRecord, Documents, Progress},
    listing::{Filter, matches_search},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// STUDENT LIST
// =============================================================================

/// Row of the admin student list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub nisn: String,
    pub email: String,
    pub phone: String,
    pub previous_school: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub parent_name: String,
    pub parent_phone: String,
    pub status: ApplicationStatus,
    pub registration_date: NaiveDate,
    pub document_progress: Progress,
}

impl StudentSummary {
    fn new(application: &Application, documents: &Documents) -> Self {
        Self {
            id: application.id.clone(),
            name: application.name.clone(),
            nisn: application.nisn.clone(),
            email: application.email.clone(),
            phone: application.phone.clone(),
            previous_school: application.school.clone(),
            birth_place: application.birth_place.clone(),
            birth_date: application.birth_date,
            parent_name: application.parent_name.clone(),
            parent_phone: application.parent_phone.clone(),
            status: application.status,
            registration_date: application.registered_on,
            document_progress: documents.progress(&application.id),
        }
    }
}

/// Search (name, NISN, id) and status filter of the student list.
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
    pub search: String,
    pub status: Filter<ApplicationStatus>,
}

#[must_use]
pub fn list(
    applications: &Applications,
    documents: &Documents,
    query: &StudentQuery,
) -> Vec<StudentSummary> {
    applications
        .store()
        .iter()
        .filter(|a| matches_search(&query.search, &[&a.name, &a.nisn, &a.id]))
        .filter(|a| query.status.accepts(a.status))
        .map(|a| StudentSummary::new(a, documents))
        .collect()
}

pub fn get(
    applications: &Applications,
    documents: &Documents,
    id: &str,
) -> Result<StudentSummary, PpdbError> {
    Ok(StudentSummary::new(applications.get(id)?, documents))
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// Position of a milestone relative to the student's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    Completed,
    Current,
    Upcoming,
}

/// One milestone on the dashboard timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub state: MilestoneState,
    pub date: Option<NaiveDate>,
}

/// Everything the student dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub student: StudentSummary,
    pub documents: Vec<DocumentRecord>,
    pub progress: Progress,
    pub timeline: Vec<Milestone>,
}

/// Dates shown under the verification and announcement milestones.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineDates {
    pub verification: Option<NaiveDate>,
    pub announcement: Option<NaiveDate>,
}

/// Derive the four milestones from the application and its checklist.
///
/// Registration is always done. Uploading is done once every required
/// document is submitted. Verification is done once every required
/// document is approved or the application has been decided. The
/// announcement is done once the application has been decided.
#[must_use]
pub fn timeline(
    application: &Application,
    checklist: &[&DocumentRecord],
    dates: TimelineDates,
) -> Vec<Milestone> {
    let required: Vec<&&DocumentRecord> = checklist.iter().filter(|d| d.required).collect();
    let decided = application.status != ApplicationStatus::Pending;
    let uploads_done = decided || required.iter().all(|d| d.is_submitted());
    let verified = decided
        || required
            .iter()
            .all(|d| d.status == DocumentStatus::Approved);

    let states = [
        true,
        uploads_done,
        uploads_done && verified,
        decided,
    ];
    let titles = ["Pendaftaran", "Upload Dokumen", "Verifikasi", "Pengumuman"];
    let milestone_dates = [
        Some(application.registered_on),
        checklist.iter().filter_map(|d| d.uploaded_at).max().map(|t| t.date()),
        dates.verification,
        dates.announcement,
    ];

    let mut current_assigned = false;
    titles
        .iter()
        .zip(states)
        .zip(milestone_dates)
        .map(|((title, done), date)| {
            let state = if done {
                MilestoneState::Completed
            } else if !current_assigned {
                current_assigned = true;
                MilestoneState::Current
            } else {
                MilestoneState::Upcoming
            };
            Milestone {
                title: (*title).to_string(),
                state,
                date,
            }
        })
        .collect()
}

pub fn dashboard(
    applications: &Applications,
    documents: &Documents,
    id: &str,
    dates: TimelineDates,
) -> Result<StudentDashboard, PpdbError> {
    let application = applications.get(id)?;
    let checklist = documents.checklist(id);
    Ok(StudentDashboard {
        student: StudentSummary::new(application, documents),
        timeline: timeline(application, &checklist, dates),
        progress: documents.progress(id),
        documents: checklist.into_iter().cloned().collect(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn fixtures() -> (Applications, Documents) {
        (
            Applications::new(seed::applications()),
            Documents::new(seed::documents()),
        )
    }

    fn states(timeline: &[Milestone]) -> Vec<MilestoneState> {
        timeline.iter().map(|m| m.state).collect()
    }

    #[test]
    fn list_searches_nisn() {
        let (apps, docs) = fixtures();
        let query = StudentQuery {
            search: "0051234567".into(),
            status: Filter::All,
        };
        let found = list(&apps, &docs, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "PPDB001");
        assert_eq!(found[0].document_progress.total, 6);
    }

    #[test]
    fn dashboard_of_student_with_missing_uploads() {
        let (apps, docs) = fixtures();
        let dash = dashboard(&apps, &docs, "PPDB001", TimelineDates::default())
            .expect("dashboard");

        assert_eq!(dash.documents.len(), 6);
        assert_eq!(dash.progress.completed, 4);
        assert_eq!(
            states(&dash.timeline),
            vec![
                MilestoneState::Completed,
                MilestoneState::Current,
                MilestoneState::Upcoming,
                MilestoneState::Upcoming
            ]
        );
    }

    #[test]
    fn decided_application_completes_timeline() {
        let (apps, docs) = fixtures();
        let dash = dashboard(&apps, &docs, "PPDB002", TimelineDates::default())
            .expect("dashboard");
        assert!(
            dash.timeline
                .iter()
                .all(|m| m.state == MilestoneState::Completed)
        );
    }

    #[test]
    fn unknown_student() {
        let (apps, docs) = fixtures();
        assert!(dashboard(&apps, &docs, "PPDB404", TimelineDates::default()).is_err());
    }
}
