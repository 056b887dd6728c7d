//! # Portal Constants
//!
//! Fixed limits and timings compiled into the portal.
//!
//! ## Groups
//!
//! 1. **Upload limits**: accepted file types and the size cap.
//! 2. **Wizard shape**: number of steps and default field values.
//! 3. **Simulated jobs**: export progress tick and upload delay.
//! 4. **Input bounds**: maximum lengths accepted from clients.

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum size of one uploaded document (2 MB).
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// MIME types accepted by the document upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// File extensions accepted by the document upload (lowercase, with dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".jpeg", ".png"];

// =============================================================================
// WIZARD SHAPE
// =============================================================================

/// Number of steps in the registration wizard.
pub const STEP_COUNT: u8 = 5;

/// Default nationality prefilled on a fresh form.
pub const DEFAULT_NATIONALITY: &str = "Indonesia";

/// Live wizards kept at once; the oldest is dropped beyond this.
pub const MAX_OPEN_WIZARDS: usize = 10_000;

// =============================================================================
// SIMULATED JOBS
// =============================================================================

/// Progress added to a running export on every tick.
pub const EXPORT_TICK_PERCENT: u8 = 10;

/// Interval between export ticks in milliseconds.
pub const EXPORT_TICK_MILLIS: u64 = 300;

/// Simulated transfer delay of a document upload in milliseconds.
pub const UPLOAD_DELAY_MILLIS: u64 = 1000;

// =============================================================================
// LISTS & DASHBOARD
// =============================================================================

/// Events shown in the "upcoming" panel.
pub const UPCOMING_LIMIT: usize = 5;

/// Applications shown in the dashboard "recent" panel.
pub const RECENT_LIMIT: usize = 5;

/// Zero padding of numeric record ids (`PPDB001`, `ANN004`).
pub const ID_WIDTH: usize = 3;

/// Author stamped on announcements created from the back office.
pub const ANNOUNCEMENT_AUTHOR: &str = "Admin PPDB";

// =============================================================================
// INPUT BOUNDS
// =============================================================================

/// Maximum length of a single form field value.
pub const MAX_FIELD_LENGTH: usize = 1024;

/// Maximum length of a search term.
pub const MAX_SEARCH_LENGTH: usize = 256;

/// Maximum length of an announcement body or chat message.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum number of ids in one bulk action.
pub const MAX_BULK_IDS: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_cap_is_two_megabytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 2_097_152);
    }

    #[test]
    fn export_reaches_completion_in_whole_ticks() {
        assert_eq!(100 % EXPORT_TICK_PERCENT, 0);
    }

    #[test]
    fn every_extension_maps_to_an_allowed_type() {
        for ext in ALLOWED_EXTENSIONS {
            let content_type = crate::documents::content_type_for(&format!("file{ext}"));
            assert!(content_type.is_some_and(|t| ALLOWED_CONTENT_TYPES.contains(&t)));
        }
    }
}
