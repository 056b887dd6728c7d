//! # Announcements Module
//!
//! Back-office announcements and the public feed built from them.
//!
//! New announcements start as drafts at the top of the list. Publishing
//! stamps `published_at`; scheduling sets `scheduled_at` and the item is
//! published by [`Announcements::publish_due`] once that time has passed.

use crate::{
    AnnouncementCategory, AnnouncementStatus, ApplicationStatus, Audience, Notice, Outcome,
    PpdbError,
    listing::{Filter, Searchable},
    primitives::{ANNOUNCEMENT_AUTHOR, ID_WIDTH, MAX_TEXT_LENGTH},
    store::{Record, Store},
    FieldErrors,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub status: AnnouncementStatus,
    pub audience: Audience,
    pub is_pinned: bool,
    pub created_at: NaiveDateTime,
    pub published_at: Option<NaiveDateTime>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub author: String,
    pub views: u64,
}

impl Record for Announcement {
    const KIND: &'static str = "Announcement";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for Announcement {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }
}

/// Input of the "create announcement" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: AnnouncementCategory,
    #[serde(default = "default_audience")]
    pub audience: Audience,
    #[serde(default)]
    pub is_pinned: bool,
}

fn default_category() -> AnnouncementCategory {
    AnnouncementCategory::Info
}

fn default_audience() -> Audience {
    Audience::All
}

impl NewAnnouncement {
    fn validate(&self) -> Result<(), PpdbError> {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.insert("title".into(), "Judul harus diisi".into());
        } else if self.title.len() > MAX_TITLE_LENGTH {
            errors.insert("title".into(), format!("Maksimal {MAX_TITLE_LENGTH} karakter"));
        }
        if self.content.trim().is_empty() {
            errors.insert("content".into(), "Konten harus diisi".into());
        } else if self.content.len() > MAX_TEXT_LENGTH {
            errors.insert("content".into(), format!("Maksimal {MAX_TEXT_LENGTH} karakter"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PpdbError::Validation(errors))
        }
    }
}

/// Search and status filter of the announcements screen.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQuery {
    pub search: String,
    pub status: Filter<AnnouncementStatus>,
    pub category: Filter<AnnouncementCategory>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementStats {
    pub total: usize,
    pub published: usize,
    pub scheduled: usize,
    pub draft: usize,
    pub total_views: u64,
}

/// State container of the announcements screen.
#[derive(Debug, Clone, Default)]
pub struct Announcements {
    store: Store<Announcement>,
}

impl Announcements {
    #[must_use]
    pub fn new(records: Vec<Announcement>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    pub fn get(&self, id: &str) -> Result<&Announcement, PpdbError> {
        self.store.require(id)
    }

    /// Create a draft at the top of the list.
    pub fn create(
        &mut self,
        input: NewAnnouncement,
        now: NaiveDateTime,
    ) -> Result<Outcome<Announcement>, PpdbError> {
        input.validate()?;
        let announcement = Announcement {
            id: self.store.next_id("ANN", ID_WIDTH),
            title: input.title.trim().to_string(),
            content: input.content.trim().to_string(),
            category: input.category,
            status: AnnouncementStatus::Draft,
            audience: input.audience,
            is_pinned: input.is_pinned,
            created_at: now,
            published_at: None,
            scheduled_at: None,
            author: ANNOUNCEMENT_AUTHOR.to_string(),
            views: 0,
        };
        self.store.push_front(announcement.clone());
        Ok(Outcome::new(
            announcement,
            Notice::success(
                "Pengumuman Dibuat",
                "Pengumuman berhasil disimpan sebagai draft",
            ),
        ))
    }

    pub fn publish(
        &mut self,
        id: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome<Announcement>, PpdbError> {
        let updated = self.store.update(id, |a| {
            a.status = AnnouncementStatus::Published;
            a.published_at = Some(now);
            a.scheduled_at = None;
            Ok(a.clone())
        })?;
        Ok(Outcome::new(
            updated,
            Notice::success(
                "Pengumuman Dipublikasikan",
                "Pengumuman berhasil dipublikasikan",
            ),
        ))
    }

    /// Schedule publication at `at`, which must lie in the future.
    pub fn schedule(
        &mut self,
        id: &str,
        at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<Outcome<Announcement>, PpdbError> {
        if at <= now {
            return Err(PpdbError::field(
                "scheduled_at",
                "Waktu publikasi harus di masa depan",
            ));
        }
        let updated = self.store.update(id, |a| {
            if a.status == AnnouncementStatus::Published {
                return Err(PpdbError::field(
                    "status",
                    "Pengumuman sudah dipublikasikan",
                ));
            }
            a.status = AnnouncementStatus::Scheduled;
            a.scheduled_at = Some(at);
            Ok(a.clone())
        })?;
        Ok(Outcome::new(
            updated,
            Notice::success(
                "Pengumuman Dijadwalkan",
                format!("Pengumuman akan dipublikasikan pada {}", at.format("%d/%m/%Y %H:%M")),
            ),
        ))
    }

    /// Publish every scheduled announcement whose time has come.
    ///
    /// Returns the ids that were published.
    pub fn publish_due(&mut self, now: NaiveDateTime) -> Vec<String> {
        let mut published = Vec::new();
        for a in self.store.iter_mut() {
            let due = a.scheduled_at.is_some_and(|at| at <= now);
            if a.status == AnnouncementStatus::Scheduled && due {
                a.status = AnnouncementStatus::Published;
                a.published_at = a.scheduled_at.take();
                published.push(a.id.clone());
            }
        }
        published
    }

    pub fn delete(&mut self, id: &str) -> Result<Outcome<Announcement>, PpdbError> {
        let removed = self.store.remove(id)?;
        Ok(Outcome::new(
            removed,
            Notice::success("Pengumuman Dihapus", "Pengumuman berhasil dihapus"),
        ))
    }

    pub fn toggle_pin(&mut self, id: &str) -> Result<Outcome<Announcement>, PpdbError> {
        let updated = self.store.update(id, |a| {
            a.is_pinned = !a.is_pinned;
            Ok(a.clone())
        })?;
        let description = if updated.is_pinned {
            "Pengumuman disematkan"
        } else {
            "Pengumuman tidak lagi disematkan"
        };
        Ok(Outcome::new(
            updated,
            Notice::success("Pengumuman Diperbarui", description),
        ))
    }

    /// Count one view of a published announcement.
    pub fn record_view(&mut self, id: &str) -> Result<u64, PpdbError> {
        self.store.update(id, |a| {
            if a.status != AnnouncementStatus::Published {
                return Err(PpdbError::not_found(Announcement::KIND, a.id.clone()));
            }
            a.views = a.views.saturating_add(1);
            Ok(a.views)
        })
    }

    #[must_use]
    pub fn list(&self, query: &AnnouncementQuery) -> Vec<&Announcement> {
        self.store
            .iter()
            .filter(|a| a.matches(&query.search))
            .filter(|a| query.status.accepts(a.status))
            .filter(|a| query.category.accepts(a.category))
            .collect()
    }

    /// Published announcements visible to an applicant, pinned first.
    ///
    /// `None` stands for a visitor without an application, who only sees
    /// announcements addressed to everyone.
    #[must_use]
    pub fn feed(&self, viewer: Option<ApplicationStatus>) -> Vec<&Announcement> {
        let mut visible: Vec<&Announcement> = self
            .store
            .iter()
            .filter(|a| a.status == AnnouncementStatus::Published)
            .filter(|a| match viewer {
                Some(status) => a.audience.includes(status),
                None => a.audience == Audience::All,
            })
            .collect();
        visible.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.published_at.cmp(&a.published_at))
        });
        visible
    }

    #[must_use]
    pub fn stats(&self) -> AnnouncementStats {
        self.store
            .iter()
            .fold(AnnouncementStats::default(), |mut stats, a| {
                stats.total += 1;
                stats.total_views = stats.total_views.saturating_add(a.views);
                match a.status {
                    AnnouncementStatus::Published => stats.published += 1,
                    AnnouncementStatus::Scheduled => stats.scheduled += 1,
                    AnnouncementStatus::Draft => stats.draft += 1,
                }
                stats
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn sample() -> Announcements {
        Announcements::new(seed::announcements())
    }

    fn input(title: &str, content: &str) -> NewAnnouncement {
        NewAnnouncement {
            title: title.into(),
            content: content.into(),
            category: AnnouncementCategory::Info,
            audience: Audience::All,
            is_pinned: false,
        }
    }

    #[test]
    fn create_requires_title_and_content() {
        let mut anns = sample();
        let err = anns.create(input(" ", ""), at(16, 9)).expect_err("invalid");
        match err {
            PpdbError::Validation(errors) => {
                assert!(errors.contains_key("title"));
                assert!(errors.contains_key("content"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_prepends_draft_with_next_id() {
        let mut anns = sample();
        let outcome = anns
            .create(input("Jadwal Tes", "Tes akademik tanggal 10 Februari"), at(16, 9))
            .expect("create");
        assert_eq!(outcome.value.id, "ANN005");
        assert_eq!(outcome.value.status, AnnouncementStatus::Draft);
        assert_eq!(outcome.value.author, "Admin PPDB");
        let all = anns.list(&AnnouncementQuery::default());
        assert_eq!(all[0].id, "ANN005");
    }

    #[test]
    fn toggle_pin_twice_restores() {
        let mut anns = sample();
        let original = anns.get("ANN002").expect("ann").is_pinned;
        anns.toggle_pin("ANN002").expect("pin");
        assert_ne!(anns.get("ANN002").expect("ann").is_pinned, original);
        anns.toggle_pin("ANN002").expect("pin");
        assert_eq!(anns.get("ANN002").expect("ann").is_pinned, original);
    }

    #[test]
    fn publish_stamps_time() {
        let mut anns = sample();
        let outcome = anns.publish("ANN004", at(16, 10)).expect("publish");
        assert_eq!(outcome.value.status, AnnouncementStatus::Published);
        assert_eq!(outcome.value.published_at, Some(at(16, 10)));
    }

    #[test]
    fn scheduled_items_publish_when_due() {
        let mut anns = sample();
        anns.schedule("ANN004", at(20, 8), at(16, 8)).expect("schedule");
        assert!(anns.publish_due(at(19, 23)).is_empty());

        let published = anns.publish_due(at(20, 8));
        assert_eq!(published, vec!["ANN004".to_string()]);
        let ann = anns.get("ANN004").expect("ann");
        assert_eq!(ann.published_at, Some(at(20, 8)));
        assert!(ann.scheduled_at.is_none());
    }

    #[test]
    fn sweep_publishes_each_item_once() {
        let mut anns = sample();
        anns.schedule("ANN004", at(20, 8), at(16, 8)).expect("schedule");

        assert_eq!(anns.publish_due(at(21, 8)).len(), 1);
        assert!(anns.publish_due(at(22, 8)).is_empty());
        let ann = anns.get("ANN004").expect("ann");
        assert_eq!(ann.status, AnnouncementStatus::Published);
        assert_eq!(ann.published_at, Some(at(20, 8)));
    }

    #[test]
    fn schedule_in_past_rejected() {
        let mut anns = sample();
        assert!(anns.schedule("ANN004", at(10, 8), at(16, 8)).is_err());
    }

    #[test]
    fn search_and_filter() {
        let anns = sample();
        let query = AnnouncementQuery {
            search: "VERIFIKASI".into(),
            status: Filter::Only(AnnouncementStatus::Published),
            category: Filter::All,
        };
        let ids: Vec<&str> = anns.list(&query).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["ANN001"]);
    }

    #[test]
    fn feed_shows_published_pinned_first() {
        let mut anns = sample();
        anns.toggle_pin("ANN001").expect("unpin");
        anns.toggle_pin("ANN003").expect("pin");
        let feed: Vec<&str> = anns.feed(None).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(feed, vec!["ANN003", "ANN001"]);
    }

    #[test]
    fn delete_and_views() {
        let mut anns = sample();
        assert_eq!(anns.record_view("ANN001").expect("view"), 1251);
        assert!(anns.record_view("ANN004").is_err());
        anns.delete("ANN001").expect("delete");
        assert!(anns.get("ANN001").is_err());
        assert_eq!(anns.stats().total, 3);
    }
}
