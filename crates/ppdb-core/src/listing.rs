//! # Listing Module
//!
//! Search and categorical filters shared by the admin list screens.
//!
//! - Search is a case-insensitive substring match over a few text fields
//! - Each filter is either "all" or one closed variant
//! - Search and every filter combine with logical AND

use crate::{PpdbError, Variant, primitives::MAX_SEARCH_LENGTH};
use serde::{Deserialize, Serialize};

// =============================================================================
// SEARCH
// =============================================================================

/// A record that can be found by free-text search.
pub trait Searchable {
    /// Text fields the search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether `term` occurs in any search field, ignoring case.
    fn matches(&self, term: &str) -> bool {
        matches_search(term, &self.search_fields())
    }
}

/// Case-insensitive substring match. An empty term matches everything.
#[must_use]
pub fn matches_search(term: &str, fields: &[&str]) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Bound a client supplied search term.
pub fn check_search(term: &str) -> Result<&str, PpdbError> {
    if term.len() > MAX_SEARCH_LENGTH {
        return Err(PpdbError::InvalidFilter(format!(
            "search term length {} exceeds maximum {}",
            term.len(),
            MAX_SEARCH_LENGTH
        )));
    }
    Ok(term)
}

// =============================================================================
// FILTER
// =============================================================================

/// A categorical filter: everything, or exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: Variant> Filter<T> {
    /// Parse `"all"` or a variant wire name.
    pub fn parse(value: &str) -> Result<Self, PpdbError> {
        if value == "all" || value.is_empty() {
            return Ok(Self::All);
        }
        T::parse(value)
            .map(Self::Only)
            .ok_or_else(|| PpdbError::InvalidFilter(value.to_string()))
    }

    /// Parse an optional query parameter; absent means `All`.
    pub fn from_param(value: Option<&str>) -> Result<Self, PpdbError> {
        value.map_or(Ok(Self::All), Self::parse)
    }

    #[must_use]
    pub fn accepts(&self, value: T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == value,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
