//! # Landing Module
//!
//! Content of the public pages: admission timeline, document requirements,
//! downloads, headline numbers, education levels and the FAQ.

use crate::{
    applications::Applications,
    documents::Documents,
    listing::matches_search,
    settings::{LevelSettings, Settings, TimelinePhase},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Static files offered on the landing page as `(title, path)`.
pub const DOWNLOADS: [(&str, &str); 3] = [
    ("Formulir Pendaftaran", "/downloads/formulir.pdf"),
    ("Brosur PPDB", "/downloads/brosur.pdf"),
    ("Panduan Pendaftaran", "/downloads/panduan.pdf"),
];

const FAQ: [(&str, &str); 6] = [
    (
        "Bagaimana cara menambah pengguna baru?",
        "Untuk menambah pengguna baru, pergi ke menu 'Kelola Pengguna' di sidebar, klik tombol \
         'Tambah Pengguna', isi formulir dengan data pengguna, pilih peran yang sesuai, lalu \
         klik 'Simpan'.",
    ),
    (
        "Bagaimana proses verifikasi dokumen?",
        "Proses verifikasi dokumen dilakukan melalui menu 'Verifikasi Dokumen'. Periksa \
         keaslian dan kelengkapan dokumen, lalu pilih 'Setujui' atau 'Tolak' dengan memberikan \
         alasan jika ditolak.",
    ),
    (
        "Bagaimana cara mengubah periode pendaftaran?",
        "Buka menu 'Data Sekolah', pilih tab 'Pendaftaran', atur tanggal mulai dan berakhir \
         pendaftaran, serta tanggal pengumuman.",
    ),
    (
        "Bagaimana cara export data pendaftar?",
        "Data pendaftar dapat diekspor melalui menu 'Export Data'. Pilih jenis data, format file \
         dan rentang tanggal yang ingin diekspor.",
    ),
    (
        "Bagaimana cara mengirim pengumuman ke pendaftar?",
        "Buka menu 'Pengumuman', klik 'Buat Pengumuman', isi judul dan konten, pilih kategori \
         dan target penerima, lalu publikasikan pengumuman.",
    ),
    (
        "Apa yang harus dilakukan jika lupa password?",
        "Klik link 'Lupa Password' di halaman login, masukkan email yang terdaftar, dan ikuti \
         instruksi yang dikirim ke email. Jika masih mengalami kesulitan, hubungi administrator \
         sistem.",
    ),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub phase: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PhaseStatus,
}

impl PhaseView {
    fn new(phase: &TimelinePhase, today: NaiveDate) -> Self {
        let status = if today > phase.end_date {
            PhaseStatus::Completed
        } else if today >= phase.start_date {
            PhaseStatus::Active
        } else {
            PhaseStatus::Upcoming
        };
        Self {
            phase: phase.phase.clone(),
            start_date: phase.start_date,
            end_date: phase.end_date,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlineStats {
    pub total_applicants: usize,
    pub verified_documents: usize,
    /// School capacity minus approved applicants.
    pub remaining_quota: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// Everything the public home page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landing {
    pub school_name: String,
    pub registration_open: bool,
    pub timeline_title: String,
    pub timeline: Vec<PhaseView>,
    pub requirements: Vec<String>,
    pub downloads: Vec<Download>,
    pub stats: HeadlineStats,
    pub levels: Vec<LevelSettings>,
}

// =============================================================================
// BUILDERS
// =============================================================================

#[must_use]
pub fn headline_stats(
    settings: &Settings,
    applications: &Applications,
    documents: &Documents,
) -> HeadlineStats {
    let approved = applications.stats().approved as u32;
    HeadlineStats {
        total_applicants: applications.len(),
        verified_documents: documents.stats().approved,
        remaining_quota: settings.school.capacity.saturating_sub(approved),
    }
}

#[must_use]
pub fn landing(
    settings: &Settings,
    applications: &Applications,
    documents: &Documents,
    today: NaiveDate,
) -> Landing {
    Landing {
        school_name: settings.school.name.clone(),
        registration_open: settings.registration.is_open && !settings.general.maintenance_mode,
        timeline_title: settings.home.timeline_title.clone(),
        timeline: settings
            .home
            .phases
            .iter()
            .map(|p| PhaseView::new(p, today))
            .collect(),
        requirements: settings.requirements().into_iter().map(|r| r.label).collect(),
        downloads: DOWNLOADS
            .iter()
            .map(|(title, path)| Download {
                title: (*title).to_string(),
                path: (*path).to_string(),
            })
            .collect(),
        stats: headline_stats(settings, applications, documents),
        levels: settings.enabled_levels().into_iter().cloned().collect(),
    }
}

/// FAQ entries whose question or answer contains `term`, ignoring case.
#[must_use]
pub fn search_faq(term: &str) -> Vec<FaqItem> {
    FAQ.iter()
        .filter(|(question, answer)| matches_search(term, &[*question, *answer]))
        .map(|(question, answer)| FaqItem {
            question: (*question).to_string(),
            answer: (*answer).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
    }

    #[test]
    fn timeline_status_follows_today() {
        let settings = Settings::default();
        let apps = Applications::new(seed::applications());
        let docs = Documents::new(seed::documents());
        let page = landing(&settings, &apps, &docs, day(1, 18));

        let statuses: Vec<PhaseStatus> = page.timeline.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                PhaseStatus::Completed,
                PhaseStatus::Active,
                PhaseStatus::Upcoming,
                PhaseStatus::Upcoming
            ]
        );
        assert_eq!(page.requirements.len(), 6);
        assert_eq!(page.downloads[0].path, "/downloads/formulir.pdf");
    }

    #[test]
    fn remaining_quota_subtracts_approved() {
        let settings = Settings::default();
        let apps = Applications::new(seed::applications());
        let docs = Documents::new(seed::documents());
        let stats = headline_stats(&settings, &apps, &docs);
        assert_eq!(stats.total_applicants, 6);
        assert_eq!(stats.remaining_quota, 478);
    }

    #[test]
    fn faq_search() {
        assert_eq!(search_faq("").len(), 6);
        let found = search_faq("PASSWORD");
        assert_eq!(found.len(), 1);
        assert!(found[0].question.contains("lupa password"));
        assert!(search_faq("beasiswa").is_empty());
    }
}
