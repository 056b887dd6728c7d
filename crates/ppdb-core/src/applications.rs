//! # Applications Module
//!
//! Submitted registrations and their review decisions.
//!
//! - Search over name, id and email, ANDed with a status filter
//! - Single and bulk approve/reject, located by id
//! - Bulk actions refuse an empty selection and unknown ids

use crate::{
    ApplicationStatus, EducationLevel, Notice, Outcome, PpdbError,
    listing::{Filter, Searchable},
    primitives::{ID_WIDTH, MAX_BULK_IDS},
    registration::{FieldId, RegistrationForm},
    store::{Record, Store},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// APPLICATION
// =============================================================================

/// One applicant's registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// School the applicant comes from.
    pub school: String,
    pub status: ApplicationStatus,
    pub registered_on: NaiveDate,
    pub parent_name: String,
    pub parent_phone: String,
    pub address: String,
    pub nisn: String,
    pub birth_place: String,
    pub birth_date: Option<NaiveDate>,
    pub level: Option<EducationLevel>,
    pub rejection_reason: Option<String>,
    pub decided_at: Option<NaiveDateTime>,
}

impl Record for Application {
    const KIND: &'static str = "Application";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str(), self.email.as_str()]
    }
}

impl Application {
    /// Build a pending application from a validated registration form.
    #[must_use]
    pub fn from_form(
        id: String,
        form: &RegistrationForm,
        level: Option<EducationLevel>,
        now: NaiveDateTime,
    ) -> Self {
        let value = |field: FieldId| form.get(field).trim().to_string();
        Self {
            id,
            name: value(FieldId::FullName),
            email: value(FieldId::Email),
            phone: value(FieldId::Phone),
            school: value(FieldId::PreviousSchool),
            status: ApplicationStatus::Pending,
            registered_on: now.date(),
            parent_name: value(FieldId::FatherName),
            parent_phone: value(FieldId::ParentPhone),
            address: value(FieldId::Address),
            nisn: value(FieldId::Nisn),
            birth_place: value(FieldId::BirthPlace),
            birth_date: NaiveDate::parse_from_str(form.birth_date.trim(), "%Y-%m-%d").ok(),
            level,
            rejection_reason: None,
            decided_at: None,
        }
    }

    fn decide(&mut self, status: ApplicationStatus, reason: Option<&str>, now: NaiveDateTime) {
        self.status = status;
        self.decided_at = Some(now);
        self.rejection_reason = match status {
            ApplicationStatus::Rejected => reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            _ => None,
        };
    }
}

// =============================================================================
// QUERIES & STATS
// =============================================================================

/// Search and status filter of the applications screen.
#[derive(Debug, Clone, Default)]
pub struct ApplicationQuery {
    pub search: String,
    pub status: Filter<ApplicationStatus>,
}

/// Counters shown above the applications list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// Bulk decision applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Approve,
    Reject,
}

// =============================================================================
// APPLICATIONS
// =============================================================================

/// State container of the applications screen.
#[derive(Debug, Clone, Default)]
pub struct Applications {
    store: Store<Application>,
}

impl Applications {
    #[must_use]
    pub fn new(records: Vec<Application>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store<Application> {
        &self.store
    }

    pub fn get(&self, id: &str) -> Result<&Application, PpdbError> {
        self.store.require(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Append a new pending application built from a submitted form.
    pub fn register(
        &mut self,
        form: &RegistrationForm,
        level: Option<EducationLevel>,
        now: NaiveDateTime,
    ) -> Application {
        let id = self.store.next_id("PPDB", ID_WIDTH);
        let application = Application::from_form(id, form, level, now);
        self.store.push(application.clone());
        application
    }

    #[must_use]
    pub fn list(&self, query: &ApplicationQuery) -> Vec<&Application> {
        self.store
            .iter()
            .filter(|a| a.matches(&query.search))
            .filter(|a| query.status.accepts(a.status))
            .collect()
    }

    pub fn approve(&mut self, id: &str, now: NaiveDateTime) -> Result<Outcome<Application>, PpdbError> {
        let updated = self.store.update(id, |a| {
            a.decide(ApplicationStatus::Approved, None, now);
            Ok(a.clone())
        })?;
        Ok(Outcome::new(
            updated,
            Notice::success(
                "Pendaftaran Disetujui",
                format!("Pendaftaran {id} telah disetujui"),
            ),
        ))
    }

    pub fn reject(
        &mut self,
        id: &str,
        reason: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Outcome<Application>, PpdbError> {
        let updated = self.store.update(id, |a| {
            a.decide(ApplicationStatus::Rejected, reason, now);
            Ok(a.clone())
        })?;
        Ok(Outcome::new(
            updated,
            Notice::destructive(
                "Pendaftaran Ditolak",
                format!("Pendaftaran {id} telah ditolak"),
            ),
        ))
    }

    /// Apply one decision to every selected application.
    ///
    /// Nothing changes when the selection is empty or names an unknown id.
    pub fn bulk(
        &mut self,
        ids: &[String],
        action: BulkAction,
        now: NaiveDateTime,
    ) -> Result<Outcome<usize>, PpdbError> {
        let unique: Vec<String> = ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        if unique.is_empty() {
            return Err(PpdbError::EmptySelection("pendaftaran"));
        }
        if unique.len() > MAX_BULK_IDS {
            return Err(PpdbError::field(
                "ids",
                format!("Maksimal {MAX_BULK_IDS} pendaftaran sekaligus"),
            ));
        }

        let status = match action {
            BulkAction::Approve => ApplicationStatus::Approved,
            BulkAction::Reject => ApplicationStatus::Rejected,
        };
        let changed = self
            .store
            .update_many(&unique, |a| a.decide(status, None, now))?;

        let notice = match action {
            BulkAction::Approve => Notice::success(
                "Pendaftaran Disetujui",
                format!("{changed} pendaftaran telah disetujui"),
            ),
            BulkAction::Reject => Notice::destructive(
                "Pendaftaran Ditolak",
                format!("{changed} pendaftaran telah ditolak"),
            ),
        };
        Ok(Outcome::new(changed, notice))
    }

    #[must_use]
    pub fn stats(&self) -> ApplicationStats {
        self.store
            .iter()
            .fold(ApplicationStats::default(), |mut stats, a| {
                stats.total += 1;
                match a.status {
                    ApplicationStatus::Pending => stats.pending += 1,
                    ApplicationStatus::Approved => stats.approved += 1,
                    ApplicationStatus::Rejected => stats.rejected += 1,
                }
                stats
            })
    }

    /// Newest registrations first, ties broken by id.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&Application> {
        let mut sorted: Vec<&Application> = self.store.iter().collect();
        sorted.sort_by(|a, b| {
            b.registered_on
                .cmp(&a.registered_on)
                .then_with(|| b.id.cmp(&a.id))
        });
        sorted.truncate(limit);
        sorted
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid timestamp")
    }

    fn sample() -> Applications {
        Applications::new(seed::applications())
    }

    #[test]
    fn search_by_email_finds_single_record() {
        let apps = sample();
        let query = ApplicationQuery {
            search: "rina.k@".into(),
            status: Filter::All,
        };
        let found = apps.list(&query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "PPDB004");
    }

    #[test]
    fn search_and_status_combine() {
        let apps = sample();
        let query = ApplicationQuery {
            search: "smp negeri".into(),
            status: Filter::Only(ApplicationStatus::Pending),
        };
        // school is not a search field
        assert!(apps.list(&query).is_empty());

        let query = ApplicationQuery {
            search: "ppdb00".into(),
            status: Filter::Only(ApplicationStatus::Approved),
        };
        let ids: Vec<&str> = apps.list(&query).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["PPDB002", "PPDB005"]);
    }

    #[test]
    fn approve_removes_from_pending_filter() {
        let mut apps = sample();
        let pending = ApplicationQuery {
            search: String::new(),
            status: Filter::Only(ApplicationStatus::Pending),
        };
        assert!(apps.list(&pending).iter().any(|a| a.id == "PPDB001"));

        let outcome = apps.approve("PPDB001", now()).expect("approve");
        assert_eq!(outcome.value.status, ApplicationStatus::Approved);
        assert_eq!(outcome.notice.title, "Pendaftaran Disetujui");
        assert!(!apps.list(&pending).iter().any(|a| a.id == "PPDB001"));
    }

    #[test]
    fn reject_touches_only_target() {
        let mut apps = sample();
        let before: Vec<Application> = apps.store().records().to_vec();

        let outcome = apps
            .reject("PPDB001", Some("incomplete"), now())
            .expect("reject");
        assert_eq!(outcome.value.status, ApplicationStatus::Rejected);
        assert_eq!(outcome.value.rejection_reason.as_deref(), Some("incomplete"));

        for (old, new) in before.iter().zip(apps.store().records()) {
            if old.id != "PPDB001" {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn approve_unknown_is_not_found() {
        let mut apps = sample();
        assert!(matches!(
            apps.approve("PPDB999", now()),
            Err(PpdbError::NotFound { .. })
        ));
    }

    #[test]
    fn bulk_empty_selection() {
        let mut apps = sample();
        let result = apps.bulk(&[], BulkAction::Approve, now());
        let err = result.expect_err("empty selection");
        assert_eq!(err.notice().title, "Tidak ada yang dipilih");
    }

    #[test]
    fn bulk_unknown_id_changes_nothing() {
        let mut apps = sample();
        let stats_before = apps.stats();
        let ids = vec!["PPDB001".to_string(), "PPDB404".to_string()];
        assert!(apps.bulk(&ids, BulkAction::Reject, now()).is_err());
        assert_eq!(apps.stats(), stats_before);
    }

    #[test]
    fn bulk_reject_counts_unique_ids() {
        let mut apps = sample();
        let ids = vec![
            "PPDB001".to_string(),
            "PPDB003".to_string(),
            "PPDB001".to_string(),
        ];
        let outcome = apps.bulk(&ids, BulkAction::Reject, now()).expect("bulk");
        assert_eq!(outcome.value, 2);
        assert_eq!(outcome.notice.description, "2 pendaftaran telah ditolak");
        assert_eq!(apps.stats().rejected, 3);
    }

    #[test]
    fn stats_and_recent() {
        let apps = sample();
        let stats = apps.stats();
        assert_eq!(
            stats,
            ApplicationStats {
                total: 6,
                pending: 3,
                approved: 2,
                rejected: 1
            }
        );
        let recent: Vec<&str> = apps.recent(3).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(recent, vec!["PPDB002", "PPDB001", "PPDB004"]);
    }

    #[test]
    fn register_assigns_next_id() {
        let mut apps = sample();
        let mut form = RegistrationForm::new();
        form.set(FieldId::FullName, " Nadia Putri ").expect("set");
        form.set(FieldId::BirthDate, "2012-05-05").expect("set");
        let created = apps.register(&form, Some(EducationLevel::Smp), now());

        assert_eq!(created.id, "PPDB007");
        assert_eq!(created.name, "Nadia Putri");
        assert_eq!(created.status, ApplicationStatus::Pending);
        assert_eq!(created.birth_date, NaiveDate::from_ymd_opt(2012, 5, 5));
        assert_eq!(apps.len(), 7);
    }
}
