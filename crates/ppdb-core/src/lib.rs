//! # ppdb-core
//!
//! The in-memory domain engine of the PPDB admissions portal - THE LOGIC.
//!
//! This crate holds every rule of the portal: the five-step registration
//! wizard, the document checklist and its review lifecycle, the admin list
//! stores (applications, announcements, schedule, users, messages), export
//! jobs, reports and settings.
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never reads the clock: every operation that stamps time takes `now`
//! - Never panics: fallible operations return `Result<T, PpdbError>`
//! - Integer arithmetic only (percentages, file sizes)
//! - Keeps nothing on disk; a fresh [`Portal`] starts from the seed records

// =============================================================================
// MODULES
// =============================================================================

pub mod announcements;
pub mod applications;
pub mod documents;
pub mod export;
pub mod landing;
pub mod listing;
pub mod messages;
pub mod portal;
pub mod primitives;
pub mod registration;
pub mod reports;
pub mod schedule;
pub mod seed;
pub mod settings;
pub mod store;
pub mod students;
pub mod types;
pub mod users;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AnnouncementCategory, AnnouncementStatus, ApplicationStatus, Audience, DocumentKind,
    DocumentStatus, EducationLevel, EventStatus, EventType, ExportDataKind, ExportFormat,
    ExportStatus, FieldErrors, MessageSender, MessageStatus, Notice, NoticeKind, Outcome,
    PpdbError, UserRole, UserStatus, Variant, format_size,
};

// =============================================================================
// RE-EXPORTS: Stores
// =============================================================================

pub use announcements::{Announcement, AnnouncementQuery, Announcements, NewAnnouncement};
pub use applications::{Application, ApplicationQuery, Applications, BulkAction};
pub use documents::{
    DocumentQuery, DocumentRecord, DocumentRequirement, Documents, FileMeta, UploadCandidate,
    validate_upload,
};
pub use export::{ExportHistoryItem, ExportJob, ExportRequest, Exports};
pub use listing::{Filter, Searchable};
pub use messages::{Conversation, Inbox, Message};
pub use schedule::{Event, EventQuery, NewEvent, Schedule};
pub use store::{Record, Store};
pub use users::{NewUser, User, UserQuery, Users};

// =============================================================================
// RE-EXPORTS: Portal
// =============================================================================

pub use portal::{Portal, PortalCounts, Submission};
pub use registration::{
    FieldId, RegistrationForm, RegistrationSummary, Step, Wizard, WizardRegistry,
};
pub use reports::{AdminDashboard, Report};
pub use settings::{Section, Settings};
pub use students::{StudentDashboard, StudentQuery, StudentSummary};
