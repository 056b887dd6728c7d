//! # Record Store
//!
//! Ordered, id-keyed in-memory collection shared by every list screen.
//!
//! Records keep their insertion order (new items can be put at the front,
//! as the announcement and export lists do). Mutation goes through
//! [`Store::update`], which edits a copy and writes it back only when the
//! edit succeeds, so a failed edit never leaves a half-changed record.

use crate::PpdbError;
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORD TRAIT
// =============================================================================

/// A flat record addressed by a string id.
pub trait Record: Clone {
    /// Entity name used in not-found errors.
    const KIND: &'static str;

    /// The record id (`PPDB001`, `DOC003`, ...).
    fn id(&self) -> &str;
}

// =============================================================================
// STORE
// =============================================================================

/// Ordered collection of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store<R> {
    records: Vec<R>,
}

impl<R> Default for Store<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Record> Store<R> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from records in display order.
    #[must_use]
    pub fn from_records(records: Vec<R>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in display order.
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// In-place edits that cannot fail.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.records.iter_mut()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Like [`Store::get`] but reports a missing record as an error.
    pub fn require(&self, id: &str) -> Result<&R, PpdbError> {
        self.get(id).ok_or_else(|| PpdbError::not_found(R::KIND, id))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a record at the end.
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// Insert a record at the front (newest first lists).
    pub fn push_front(&mut self, record: R) {
        self.records.insert(0, record);
    }

    /// Find a record by id, apply `edit` to a copy and write it back.
    ///
    /// The stored record is untouched when `edit` fails.
    pub fn update<T>(
        &mut self,
        id: &str,
        edit: impl FnOnce(&mut R) -> Result<T, PpdbError>,
    ) -> Result<T, PpdbError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| PpdbError::not_found(R::KIND, id))?;

        let mut draft = self.records[index].clone();
        let result = edit(&mut draft)?;
        self.records[index] = draft;
        Ok(result)
    }

    /// Apply `edit` to every record matched by `ids`.
    ///
    /// All ids are checked first; an unknown id aborts before anything changes.
    pub fn update_many(
        &mut self,
        ids: &[String],
        mut edit: impl FnMut(&mut R),
    ) -> Result<usize, PpdbError> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(id)) {
            return Err(PpdbError::not_found(R::KIND, missing.clone()));
        }

        let mut changed = 0;
        for record in &mut self.records {
            if ids.iter().any(|id| id == record.id()) {
                edit(record);
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Remove a record by id and return it.
    pub fn remove(&mut self, id: &str) -> Result<R, PpdbError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| PpdbError::not_found(R::KIND, id))?;
        Ok(self.records.remove(index))
    }

    /// Next free id with the given prefix: highest numeric suffix plus one.
    ///
    /// Deleting records never causes an id to be handed out twice while a
    /// higher id is still present.
    #[must_use]
    pub fn next_id(&self, prefix: &str, width: usize) -> String {
        let highest = self
            .records
            .iter()
            .filter_map(|r| r.id().strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format_id(prefix, highest.saturating_add(1), width)
    }
}

/// Render `PREFIX` + zero padded number.
#[must_use]
pub fn format_id(prefix: &str, number: u64, width: usize) -> String {
    format!("{prefix}{number:0width$}")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Record for Item {
        const KIND: &'static str = "Item";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    fn sample() -> Store<Item> {
        Store::from_records(vec![item("IT001", 1), item("IT002", 2), item("IT007", 7)])
    }

    #[test]
    fn next_id_uses_highest_suffix() {
        let store = sample();
        assert_eq!(store.next_id("IT", 3), "IT008");
        assert_eq!(Store::<Item>::new().next_id("IT", 3), "IT001");
    }

    #[test]
    fn update_replaces_only_target() {
        let mut store = sample();
        store
            .update("IT002", |r| {
                r.value = 20;
                Ok(())
            })
            .expect("update");

        assert_eq!(store.get("IT002").map(|r| r.value), Some(20));
        assert_eq!(store.get("IT001").map(|r| r.value), Some(1));
        assert_eq!(store.get("IT007").map(|r| r.value), Some(7));
    }

    #[test]
    fn failed_update_leaves_record_unchanged() {
        let mut store = sample();
        let result: Result<(), PpdbError> = store.update("IT001", |r| {
            r.value = 99;
            Err(PpdbError::MissingRejectionReason)
        });

        assert!(result.is_err());
        assert_eq!(store.get("IT001").map(|r| r.value), Some(1));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = sample();
        let result = store.update("IT404", |_| Ok(()));
        assert!(matches!(result, Err(PpdbError::NotFound { .. })));
    }

    #[test]
    fn update_many_is_all_or_nothing() {
        let mut store = sample();
        let ids = vec!["IT001".to_string(), "IT404".to_string()];
        assert!(store.update_many(&ids, |r| r.value = 0).is_err());
        assert_eq!(store.get("IT001").map(|r| r.value), Some(1));

        let ids = vec!["IT001".to_string(), "IT007".to_string()];
        assert_eq!(store.update_many(&ids, |r| r.value = 0).expect("bulk"), 2);
        assert_eq!(store.get("IT007").map(|r| r.value), Some(0));
        assert_eq!(store.get("IT002").map(|r| r.value), Some(2));
    }

    #[test]
    fn push_front_and_remove() {
        let mut store = sample();
        store.push_front(item("IT010", 10));
        assert_eq!(store.records()[0].id, "IT010");

        let removed = store.remove("IT002").expect("remove");
        assert_eq!(removed.value, 2);
        assert_eq!(store.len(), 3);
        assert!(store.remove("IT002").is_err());
    }
}
