//! # Reports Module
//!
//! Figures for the reports screen and the admin dashboard, computed from
//! the live stores. All rates are integer percentages.

use crate::{
    DocumentKind, DocumentStatus, Variant,
    applications::{Application, ApplicationStats, Applications},
    documents::{DocumentStats, Documents, percent},
    primitives::RECENT_LIMIT,
    schedule::{Event, Schedule},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registrations on one date and the running total up to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
    pub cumulative: usize,
}

/// Verification figures of one document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindReport {
    pub kind: DocumentKind,
    pub label: String,
    /// Slots that have a file (waiting, approved or rejected).
    pub uploaded: usize,
    pub verified: usize,
    pub rejected: usize,
    /// Slots without a file.
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub applications: ApplicationStats,
    pub trend: Vec<TrendPoint>,
    pub documents: Vec<KindReport>,
    /// Required documents uploaded or approved, over all required documents.
    pub completeness_rate: u8,
    /// Approved applications over decided applications.
    pub approval_rate: u8,
}

/// Cumulative registrations per registration date, oldest first.
#[must_use]
pub fn trend(applications: &Applications) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for application in applications.store().iter() {
        *per_day.entry(application.registered_on).or_default() += 1;
    }
    let mut cumulative = 0;
    per_day
        .into_iter()
        .map(|(date, count)| {
            cumulative += count;
            TrendPoint {
                date,
                count,
                cumulative,
            }
        })
        .collect()
}

#[must_use]
pub fn by_kind(documents: &Documents) -> Vec<KindReport> {
    DocumentKind::ALL
        .iter()
        .map(|&kind| {
            let slots = documents.store().iter().filter(|d| d.kind == kind);
            let mut report = KindReport {
                kind,
                label: kind.label().to_string(),
                uploaded: 0,
                verified: 0,
                rejected: 0,
                missing: 0,
            };
            for slot in slots {
                match slot.status {
                    DocumentStatus::Pending => report.missing += 1,
                    DocumentStatus::Uploaded => report.uploaded += 1,
                    DocumentStatus::Approved => {
                        report.uploaded += 1;
                        report.verified += 1;
                    }
                    DocumentStatus::Rejected => {
                        report.uploaded += 1;
                        report.rejected += 1;
                    }
                }
            }
            report
        })
        .collect()
}

#[must_use]
pub fn report(applications: &Applications, documents: &Documents) -> Report {
    let stats = applications.stats();
    let (submitted, required) = documents
        .store()
        .iter()
        .filter(|d| d.required)
        .fold((0, 0), |(submitted, total), d| {
            (submitted + usize::from(d.is_submitted()), total + 1)
        });

    Report {
        applications: stats,
        trend: trend(applications),
        documents: by_kind(documents),
        completeness_rate: percent(submitted, required),
        approval_rate: percent(stats.approved, stats.approved + stats.rejected),
    }
}

// =============================================================================
// ADMIN DASHBOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub applications: ApplicationStats,
    pub documents: DocumentStats,
    pub recent: Vec<Application>,
    pub upcoming: Vec<Event>,
    pub unread_messages: u32,
}

#[must_use]
pub fn admin_dashboard(
    applications: &Applications,
    documents: &Documents,
    schedule: &Schedule,
    unread_messages: u32,
) -> AdminDashboard {
    AdminDashboard {
        applications: applications.stats(),
        documents: documents.stats(),
        recent: applications
            .recent(RECENT_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
        upcoming: schedule.upcoming().into_iter().cloned().collect(),
        unread_messages,
    }
}

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

    #[test]
    fn trend_is_cumulative() {
        let (apps, _) = fixtures();
        let points = trend(&apps);
        let cumulative: Vec<usize> = points.iter().map(|p| p.cumulative).collect();
        assert_eq!(cumulative, vec![1, 2, 4, 6]);
        assert_eq!(points.last().map(|p| p.count), Some(2));
    }

    #[test]
    fn rates() {
        let (apps, docs) = fixtures();
        let report = report(&apps, &docs);
        // 30 of 36 required documents submitted
        assert_eq!(report.completeness_rate, 83);
        assert_eq!(report.approval_rate, 66);
        assert_eq!(report.documents.len(), 6);
    }

    #[test]
    fn kind_counts_add_up() {
        let (_, docs) = fixtures();
        for kind in by_kind(&docs) {
            assert_eq!(kind.uploaded + kind.missing, 6, "{}", kind.label);
        }
        let rapor = by_kind(&docs)
            .into_iter()
            .find(|k| k.kind == DocumentKind::Rapor)
            .expect("rapor");
        assert_eq!(rapor.rejected, 1);
    }

    #[test]
    fn dashboard_lists_recent_and_upcoming() {
        let (apps, docs) = fixtures();
        let schedule = Schedule::new(seed::events());
        let dash = admin_dashboard(&apps, &docs, &schedule, 3);
        assert_eq!(dash.recent.len(), 5);
        assert_eq!(dash.recent[0].id, "PPDB002");
        assert_eq!(dash.upcoming.len(), 4);
        assert_eq!(dash.unread_messages, 3);
    }
}
