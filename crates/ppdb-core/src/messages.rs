//! # Messages Module
//!
//! Conversations between applicants and the admission office.
//!
//! - The inbox lists conversations that are not archived
//! - Opening a conversation marks the applicant's messages as read
//! - Times are shown relative to `now` ("Baru saja", "5 menit lalu", "Kemarin")

use crate::{
    MessageSender, MessageStatus, Notice, Outcome, PpdbError,
    listing::matches_search,
    primitives::{ID_WIDTH, MAX_TEXT_LENGTH},
    store::{Record, Store, format_id},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sent_at: NaiveDateTime,
    pub sender: MessageSender,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_name: String,
    pub user_email: String,
    pub student_id: String,
    pub unread_count: u32,
    pub is_starred: bool,
    pub is_archived: bool,
    pub messages: Vec<Message>,
}

impl Record for Conversation {
    const KIND: &'static str = "Conversation";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Inbox row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub user_name: String,
    pub student_id: String,
    pub last_message: String,
    pub last_message_time: String,
    pub unread_count: u32,
    pub is_starred: bool,
}

impl ConversationSummary {
    fn new(conversation: &Conversation, now: NaiveDateTime) -> Self {
        let last = conversation.messages.last();
        Self {
            id: conversation.id.clone(),
            user_name: conversation.user_name.clone(),
            student_id: conversation.student_id.clone(),
            last_message: last.map(|m| m.content.clone()).unwrap_or_default(),
            last_message_time: last
                .map(|m| relative_time(m.sent_at, now))
                .unwrap_or_default(),
            unread_count: conversation.unread_count,
            is_starred: conversation.is_starred,
        }
    }
}

/// Render `then` relative to `now` the way the inbox shows it.
#[must_use]
pub fn relative_time(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "Baru saja".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} menit lalu");
    }
    let days = now
        .date()
        .signed_duration_since(then.date())
        .num_days();
    match days {
        0 => then.format("%H:%M").to_string(),
        1 => "Kemarin".to_string(),
        n => format!("{n} hari lalu"),
    }
}

// =============================================================================
// INBOX
// =============================================================================

/// State container of the messages screen.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    store: Store<Conversation>,
}

impl Inbox {
    #[must_use]
    pub fn new(records: Vec<Conversation>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    pub fn get(&self, id: &str) -> Result<&Conversation, PpdbError> {
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

    /// Non-archived conversations whose user name or student id matches.
    #[must_use]
    pub fn list(&self, search: &str, now: NaiveDateTime) -> Vec<ConversationSummary> {
        self.store
            .iter()
            .filter(|c| !c.is_archived)
            .filter(|c| matches_search(search, &[&c.user_name, &c.student_id]))
            .map(|c| ConversationSummary::new(c, now))
            .collect()
    }

    #[must_use]
    pub fn total_unread(&self) -> u32 {
        self.store.iter().map(|c| c.unread_count).sum()
    }

    /// Open a conversation: clears its unread count and marks the
    /// applicant's messages as read.
    pub fn open(&mut self, id: &str) -> Result<Conversation, PpdbError> {
        self.store.update(id, |c| {
            c.unread_count = 0;
            for message in &mut c.messages {
                if message.sender == MessageSender::User {
                    message.status = MessageStatus::Read;
                }
            }
            Ok(c.clone())
        })
    }

    /// Append an admin reply.
    pub fn send(
        &mut self,
        id: &str,
        content: &str,
        now: NaiveDateTime,
    ) -> Result<Outcome<Message>, PpdbError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(PpdbError::field("content", "Pesan tidak boleh kosong"));
        }
        if content.len() > MAX_TEXT_LENGTH {
            return Err(PpdbError::field(
                "content",
                format!("Maksimal {MAX_TEXT_LENGTH} karakter"),
            ));
        }

        let message = Message {
            id: self.next_message_id(),
            content: content.to_string(),
            sent_at: now,
            sender: MessageSender::Admin,
            status: MessageStatus::Sent,
        };
        self.store.update(id, |c| {
            c.messages.push(message.clone());
            Ok(())
        })?;
        Ok(Outcome::new(
            message,
            Notice::success("Pesan Terkirim", "Pesan berhasil dikirim"),
        ))
    }

    pub fn toggle_star(&mut self, id: &str) -> Result<bool, PpdbError> {
        self.store.update(id, |c| {
            c.is_starred = !c.is_starred;
            Ok(c.is_starred)
        })
    }

    pub fn archive(&mut self, id: &str) -> Result<Outcome<String>, PpdbError> {
        self.store.update(id, |c| {
            c.is_archived = true;
            Ok(())
        })?;
        Ok(Outcome::new(
            id.to_string(),
            Notice::success(
                "Percakapan Diarsipkan",
                "Percakapan telah dipindahkan ke arsip",
            ),
        ))
    }

    fn next_message_id(&self) -> String {
        let highest = self
            .store
            .iter()
            .flat_map(|c| &c.messages)
            .filter_map(|m| m.id.strip_prefix("MSG"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format_id("MSG", highest.saturating_add(1), ID_WIDTH)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    fn sample() -> Inbox {
        Inbox::new(seed::conversations())
    }

    #[test]
    fn relative_labels() {
        let now = at(16, 12, 0);
        assert_eq!(relative_time(at(16, 11, 59), now), "Baru saja");
        assert_eq!(relative_time(at(16, 11, 45), now), "15 menit lalu");
        assert_eq!(relative_time(at(16, 9, 5), now), "09:05");
        assert_eq!(relative_time(at(15, 23, 0), now), "Kemarin");
        assert_eq!(relative_time(at(13, 10, 0), now), "3 hari lalu");
    }

    #[test]
    fn search_by_student_id() {
        let inbox = sample();
        let found = inbox.list("ppdb003", at(16, 12, 0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_name, "Budi Santoso");
        assert_eq!(found[0].last_message, "Kapan pengumuman hasil seleksi?");
    }

    #[test]
    fn open_clears_unread() {
        let mut inbox = sample();
        assert_eq!(inbox.total_unread(), 3);
        let conversation = inbox.open("CONV003").expect("open");
        assert_eq!(conversation.unread_count, 0);
        assert_eq!(conversation.messages[0].status, MessageStatus::Read);
        assert_eq!(inbox.total_unread(), 2);
    }

    #[test]
    fn send_appends_admin_message() {
        let mut inbox = sample();
        let now = at(16, 12, 0);
        assert!(inbox.send("CONV001", "   ", now).is_err());

        let outcome = inbox.send("CONV001", "Sama-sama.", now).expect("send");
        assert_eq!(outcome.value.id, "MSG012");
        assert_eq!(outcome.value.status, MessageStatus::Sent);
        assert_eq!(outcome.notice.title, "Pesan Terkirim");

        let row = inbox
            .list("", now)
            .into_iter()
            .find(|c| c.id == "CONV001")
            .expect("row");
        assert_eq!(row.last_message, "Sama-sama.");
        assert_eq!(row.last_message_time, "Baru saja");
    }

    #[test]
    fn star_and_archive() {
        let mut inbox = sample();
        assert!(!inbox.toggle_star("CONV001").expect("star"));
        inbox.archive("CONV002").expect("archive");
        let ids: Vec<String> = inbox
            .list("", at(16, 12, 0))
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["CONV001", "CONV003", "CONV004"]);
        assert!(inbox.archive("CONV404").is_err());
    }
}
