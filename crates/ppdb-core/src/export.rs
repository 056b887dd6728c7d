//! # Export Module
//!
//! Simulated data export: a job advances in fixed ticks until it reaches
//! 100 percent, then a history record is put at the top of the download list.
//!
//! No file is ever produced. The job only tracks progress; the size shown in
//! the history is estimated from the number of rows selected.
//!
//! ## Job lifecycle
//!
//! ```text
//! start ──▶ processing ──tick × 10──▶ completed (history item added)
//!               │
//!               └──cancel──▶ cancelled (nothing added)
//! ```

use crate::{
    ExportDataKind, ExportFormat, ExportStatus, Notice, Outcome, PpdbError, Variant, format_size,
    primitives::{EXPORT_TICK_PERCENT, ID_WIDTH},
    store::{Record, Store},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST
// =============================================================================

/// What to export, in which format, over which registration dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub kinds: Vec<ExportDataKind>,
    pub format: ExportFormat,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl ExportRequest {
    pub fn validate(&self) -> Result<(), PpdbError> {
        if self.kinds.is_empty() {
            return Err(PpdbError::EmptySelection("jenis data"));
        }
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from > to => Err(PpdbError::field(
                "date_to",
                "Tanggal akhir harus setelah tanggal awal",
            )),
            _ => Ok(()),
        }
    }

    /// Distinct kinds in declaration order.
    fn distinct_kinds(&self) -> Vec<ExportDataKind> {
        ExportDataKind::ALL
            .iter()
            .copied()
            .filter(|k| self.kinds.contains(k))
            .collect()
    }
}

/// Estimated file size for `rows` rows in `format`.
#[must_use]
pub fn estimate_size(format: ExportFormat, rows: u64) -> u64 {
    let (base, per_row) = match format {
        ExportFormat::Excel => (8 * 1024, 180),
        ExportFormat::Csv => (64, 120),
        ExportFormat::Pdf => (24 * 1024, 420),
    };
    rows.saturating_mul(per_row).saturating_add(base)
}

// =============================================================================
// JOB
// =============================================================================

/// The running (or last finished) export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    pub request: ExportRequest,
    pub progress: u8,
    pub status: ExportStatus,
    pub rows: u64,
    pub started_at: NaiveDateTime,
}

impl ExportJob {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == ExportStatus::Processing
    }
}

/// One entry of the download list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportHistoryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub format: ExportFormat,
    pub created_at: NaiveDateTime,
    pub file_size: String,
    pub size_bytes: u64,
    pub status: ExportStatus,
}

impl Record for ExportHistoryItem {
    const KIND: &'static str = "Export";

    fn id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// EXPORTS
// =============================================================================

/// State container of the export screen.
#[derive(Debug, Clone, Default)]
pub struct Exports {
    current: Option<ExportJob>,
    history: Store<ExportHistoryItem>,
}

impl Exports {
    #[must_use]
    pub fn new(history: Vec<ExportHistoryItem>) -> Self {
        Self {
            current: None,
            history: Store::from_records(history),
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&ExportJob> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(ExportJob::is_running)
    }

    /// Start a job over `rows` rows. Only one job may run at a time.
    pub fn start(
        &mut self,
        request: ExportRequest,
        rows: u64,
        now: NaiveDateTime,
    ) -> Result<&ExportJob, PpdbError> {
        request.validate()?;
        if self.is_running() {
            return Err(PpdbError::ExportInProgress);
        }
        Ok(self.current.insert(ExportJob {
            request,
            progress: 0,
            status: ExportStatus::Processing,
            rows,
            started_at: now,
        }))
    }

    /// Advance the running job by one tick.
    ///
    /// Returns the history item when this tick completes the job. Does
    /// nothing when no job is running.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<Outcome<ExportHistoryItem>> {
        let job = self.current.as_mut().filter(|job| job.is_running())?;
        job.progress = job.progress.saturating_add(EXPORT_TICK_PERCENT).min(100);
        if job.progress < 100 {
            return None;
        }
        job.status = ExportStatus::Completed;

        let kinds = job.request.distinct_kinds();
        let size_bytes = estimate_size(job.request.format, job.rows);
        let item = ExportHistoryItem {
            id: self.history.next_id("EXP", ID_WIDTH),
            name: format!("Export Data - {}", now.format("%-d/%-m/%Y")),
            data_type: kinds
                .iter()
                .map(|k| k.label())
                .collect::<Vec<_>>()
                .join(", "),
            format: job.request.format,
            created_at: now,
            file_size: format_size(size_bytes),
            size_bytes,
            status: ExportStatus::Completed,
        };
        self.history.push_front(item.clone());
        Some(Outcome::new(
            item,
            Notice::success("Export Berhasil", "File siap untuk diunduh"),
        ))
    }

    /// Cancel the running job; nothing is added to the history.
    pub fn cancel(&mut self) -> Result<Outcome<ExportJob>, PpdbError> {
        let job = self
            .current
            .as_mut()
            .filter(|job| job.is_running())
            .ok_or_else(|| PpdbError::not_found("ExportJob", "current"))?;
        job.status = ExportStatus::Cancelled;
        Ok(Outcome::new(
            job.clone(),
            Notice::destructive("Export Dibatalkan", "Proses export telah dibatalkan"),
        ))
    }

    #[must_use]
    pub fn history(&self) -> &[ExportHistoryItem] {
        self.history.records()
    }

    pub fn download(&self, id: &str) -> Result<Outcome<ExportHistoryItem>, PpdbError> {
        let item = self.history.require(id)?;
        Ok(Outcome::new(
            item.clone(),
            Notice::success("Mengunduh File", "File sedang diunduh..."),
        ))
    }

    pub fn delete(&mut self, id: &str) -> Result<Outcome<ExportHistoryItem>, PpdbError> {
        let removed = self.history.remove(id)?;
        Ok(Outcome::new(
            removed,
            Notice::success("File Dihapus", "File export berhasil dihapus"),
        ))
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
        NaiveDate::from_ymd_opt(2024, 1, 16)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn request(kinds: Vec<ExportDataKind>) -> ExportRequest {
        ExportRequest {
            kinds,
            format: ExportFormat::Csv,
            date_from: None,
            date_to: None,
        }
    }

    #[test]
    fn empty_selection_rejected() {
        let mut exports = Exports::default();
        let err = exports.start(request(vec![]), 0, now()).expect_err("empty");
        assert_eq!(
            err.notice().description,
            "Pilih minimal satu jenis data untuk melakukan aksi"
        );
        assert!(exports.current().is_none());
    }

    #[test]
    fn inverted_date_range_rejected() {
        let mut req = request(vec![ExportDataKind::Students]);
        req.date_from = NaiveDate::from_ymd_opt(2024, 2, 1);
        req.date_to = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(req.validate().is_err());
    }

    #[test]
    fn ten_ticks_complete_the_job() {
        let mut exports = Exports::new(seed::export_history());
        exports
            .start(
                request(vec![ExportDataKind::Applications, ExportDataKind::Students]),
                6,
                now(),
            )
            .expect("start");

        for _ in 0..9 {
            assert!(exports.tick(now()).is_none());
        }
        assert_eq!(exports.current().map(|j| j.progress), Some(90));

        let outcome = exports.tick(now()).expect("finished");
        assert_eq!(outcome.value.id, "EXP004");
        assert_eq!(outcome.value.name, "Export Data - 16/1/2024");
        assert_eq!(outcome.value.data_type, "Data Calon Siswa, Data Pendaftaran");
        assert_eq!(outcome.value.size_bytes, 64 + 6 * 120);
        assert_eq!(outcome.notice.title, "Export Berhasil");
        assert_eq!(exports.history()[0].id, "EXP004");
        assert!(!exports.is_running());
        assert!(exports.tick(now()).is_none());
    }

    #[test]
    fn only_one_job_at_a_time() {
        let mut exports = Exports::default();
        exports
            .start(request(vec![ExportDataKind::Schedule]), 5, now())
            .expect("start");
        assert!(matches!(
            exports.start(request(vec![ExportDataKind::Schedule]), 5, now()),
            Err(PpdbError::ExportInProgress)
        ));
    }

    #[test]
    fn cancel_adds_nothing() {
        let mut exports = Exports::new(seed::export_history());
        assert!(exports.cancel().is_err());
        exports
            .start(request(vec![ExportDataKind::Documents]), 36, now())
            .expect("start");
        exports.tick(now());
        let outcome = exports.cancel().expect("cancel");
        assert_eq!(outcome.value.status, ExportStatus::Cancelled);
        assert!(exports.tick(now()).is_none());
        assert_eq!(exports.history().len(), 3);
        exports
            .start(request(vec![ExportDataKind::Documents]), 36, now())
            .expect("restart after cancel");
    }

    #[test]
    fn download_and_delete_history() {
        let mut exports = Exports::new(seed::export_history());
        assert_eq!(exports.download("EXP001").expect("download").value.file_size, "2.5 MB");
        exports.delete("EXP001").expect("delete");
        assert!(exports.download("EXP001").is_err());
    }
}
