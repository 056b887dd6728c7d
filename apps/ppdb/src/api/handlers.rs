//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Handlers lock the portal, call exactly one core operation and wrap its
//! result in an [`ApiResponse`]. Every mutation is logged with its event
//! name and record id.

use super::{
    AppState, jobs, now,
    types::{
        AgreementRequest, ApiJson, ApiResponse, ApiResult, BulkRequest, FaqParams, FeedParams,
        FieldsRequest, HealthResponse, ListParams, Listing, MessageRequest, MonthParams,
        OpenWizardRequest, RejectRequest, RoleRequest, ScheduleRequest, ToggleResponse,
        UploadRequest, WizardView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use ppdb_core::{
    Announcement, AnnouncementQuery, AnnouncementStatus, Application, ApplicationQuery,
    Conversation, DocumentKind, DocumentQuery, DocumentRecord, DocumentStatus, Event, EventQuery,
    ExportHistoryItem, ExportJob, ExportRequest, FieldId, Filter, Message, NewAnnouncement,
    NewEvent, NewUser, PpdbError, Section, Settings, StudentDashboard, StudentQuery,
    StudentSummary, Submission, User, UserQuery, Variant,
    announcements::AnnouncementStats,
    applications::ApplicationStats,
    documents::DocumentStats,
    landing::{FaqItem, Landing, search_faq},
    listing::check_search,
    messages::ConversationSummary,
    reports::{AdminDashboard, Report},
    schedule::{MonthView, ScheduleStats},
    settings::LevelSettings,
    students,
    users::UserStats,
};
use serde::{Serialize, de::DeserializeOwned};

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// The search term of a list request, bounded.
fn search_term(params: &ListParams) -> Result<String, PpdbError> {
    Ok(check_search(params.search.as_deref().unwrap_or_default())?.to_string())
}

fn document_kind(name: &str) -> Result<DocumentKind, PpdbError> {
    DocumentKind::parse(name).ok_or_else(|| PpdbError::InvalidFilter(name.to_string()))
}

fn cloned<T: Clone>(records: Vec<&T>) -> Vec<T> {
    records.into_iter().cloned().collect()
}

// =============================================================================
// PUBLIC PAGES
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Landing page: phases, headline numbers, downloads.
pub async fn landing_handler(State(state): State<AppState>) -> ApiResult<Landing> {
    let portal = state.portal.read().await;
    ok(portal.landing(now().date()))
}

/// Education levels open for registration.
pub async fn levels_handler(State(state): State<AppState>) -> ApiResult<Vec<LevelSettings>> {
    let portal = state.portal.read().await;
    ok(portal.settings.enabled_levels().into_iter().cloned().collect())
}

pub async fn faq_handler(Query(params): Query<FaqParams>) -> ApiResult<Vec<FaqItem>> {
    let term = check_search(&params.search)?;
    ok(search_faq(term))
}

/// Published announcements for a visitor or an applicant status.
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> ApiResult<Vec<Announcement>> {
    let portal = state.portal.read().await;
    ok(cloned(portal.announcements.feed(params.audience)))
}

/// Read one published announcement, counting the view.
pub async fn read_announcement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    if portal.announcements.get(&id)?.status != AnnouncementStatus::Published {
        return Err(PpdbError::not_found("Announcement", id).into());
    }
    portal.announcements.record_view(&id)?;
    ok(portal.announcements.get(&id)?.clone())
}

// =============================================================================
// REGISTRATION WIZARD
// =============================================================================

pub async fn open_wizard_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OpenWizardRequest>,
) -> ApiResult<WizardView> {
    let mut portal = state.portal.write().await;
    let id = portal.open_wizard(request.level, now())?;
    tracing::info!(event = "wizard_opened", id = %id, "Registration started");
    ok(WizardView::new(&id, portal.wizards.get(&id)?))
}

pub async fn get_wizard_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let portal = state.portal.read().await;
    ok(WizardView::new(&id, portal.wizards.get(&id)?))
}

/// Store field values as one batch. An unknown name or a refused value
/// leaves the form as it was.
pub async fn update_fields_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<FieldsRequest>,
) -> ApiResult<WizardView> {
    let fields = request
        .fields
        .into_iter()
        .map(|(name, value)| match FieldId::parse(&name) {
            Some(field) => Ok((field, value)),
            None => Err(PpdbError::field(&name, "Field tidak dikenal")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut portal = state.portal.write().await;
    let wizard = portal.wizards.get_mut(&id)?;
    wizard.set_fields(fields)?;
    ok(WizardView::new(&id, wizard))
}

pub async fn agreement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<AgreementRequest>,
) -> ApiResult<WizardView> {
    let mut portal = state.portal.write().await;
    let wizard = portal.wizards.get_mut(&id)?;
    wizard.set_agreement(request.agreed);
    ok(WizardView::new(&id, wizard))
}

/// Validate the current step and move forward.
pub async fn next_step_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let mut portal = state.portal.write().await;
    let wizard = portal.wizards.get_mut(&id)?;
    wizard.advance()?;
    ok(WizardView::new(&id, wizard))
}

pub async fn previous_step_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let mut portal = state.portal.write().await;
    let wizard = portal.wizards.get_mut(&id)?;
    wizard.retreat();
    ok(WizardView::new(&id, wizard))
}

pub async fn submit_wizard_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Submission> {
    let mut portal = state.portal.write().await;
    let outcome = portal.submit_wizard(&id, now())?;
    tracing::info!(
        event = "registration_submitted",
        id = %outcome.value.application.id,
        documents = outcome.value.documents,
        "Registration submitted"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn discard_wizard_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let mut portal = state.portal.write().await;
    portal.wizards.discard(&id)?;
    tracing::info!(event = "wizard_discarded", id = %id, "Registration abandoned");
    ok(id)
}

// =============================================================================
// STUDENT DASHBOARD
// =============================================================================

pub async fn student_dashboard_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StudentDashboard> {
    let portal = state.portal.read().await;
    ok(portal.student_dashboard(&id)?)
}

pub async fn student_feed_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Announcement>> {
    let portal = state.portal.read().await;
    ok(cloned(portal.student_feed(&id)?))
}

pub async fn upload_document_handler(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
    ApiJson(request): ApiJson<UploadRequest>,
) -> ApiResult<DocumentRecord> {
    let kind = document_kind(&kind)?;
    let candidate = request.to_candidate()?;

    let mut portal = state.portal.write().await;
    let outcome = portal.upload_document(&id, kind, &candidate, now())?;
    tracing::info!(
        event = "document_uploaded",
        id = %outcome.value.id,
        student = %id,
        "Document uploaded"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn remove_document_handler(
    State(state): State<AppState>,
    Path((id, kind)): Path<(String, String)>,
) -> ApiResult<DocumentRecord> {
    let kind = document_kind(&kind)?;
    let mut portal = state.portal.write().await;
    let outcome = portal.remove_document(&id, kind)?;
    tracing::info!(event = "document_removed", id = %outcome.value.id, "Document removed");
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: DASHBOARD & REPORTS
// =============================================================================

pub async fn admin_dashboard_handler(State(state): State<AppState>) -> ApiResult<AdminDashboard> {
    let portal = state.portal.read().await;
    ok(portal.admin_dashboard())
}

pub async fn report_handler(State(state): State<AppState>) -> ApiResult<Report> {
    let portal = state.portal.read().await;
    ok(portal.report())
}

// =============================================================================
// ADMIN: APPLICATIONS & STUDENTS
// =============================================================================

pub async fn list_applications_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<Application, ApplicationStats>> {
    let query = ApplicationQuery {
        search: search_term(&params)?,
        status: Filter::from_param(params.status.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: cloned(portal.applications.list(&query)),
        stats: portal.applications.stats(),
    })
}

pub async fn get_application_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Application> {
    let portal = state.portal.read().await;
    ok(portal.applications.get(&id)?.clone())
}

pub async fn approve_application_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Application> {
    let mut portal = state.portal.write().await;
    let outcome = portal.applications.approve(&id, now())?;
    tracing::info!(event = "application_approved", id = %id, "Application approved");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn reject_application_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RejectRequest>,
) -> ApiResult<Application> {
    let mut portal = state.portal.write().await;
    let outcome = portal
        .applications
        .reject(&id, request.reason.as_deref(), now())?;
    tracing::info!(event = "application_rejected", id = %id, "Application rejected");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn bulk_applications_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BulkRequest>,
) -> ApiResult<usize> {
    let mut portal = state.portal.write().await;
    let outcome = portal
        .applications
        .bulk(&request.ids, request.action, now())?;
    tracing::info!(
        event = "applications_bulk",
        action = ?request.action,
        changed = outcome.value,
        "Bulk decision applied"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn list_students_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<StudentSummary, ApplicationStats>> {
    let query = StudentQuery {
        search: search_term(&params)?,
        status: Filter::from_param(params.status.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: students::list(&portal.applications, &portal.documents, &query),
        stats: portal.applications.stats(),
    })
}

pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StudentSummary> {
    let portal = state.portal.read().await;
    ok(students::get(&portal.applications, &portal.documents, &id)?)
}

// =============================================================================
// ADMIN: DOCUMENT REVIEW
// =============================================================================

/// Review queue. Without a status filter only uploaded documents show.
pub async fn list_documents_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<DocumentRecord, DocumentStats>> {
    let status = match params.status.as_deref() {
        None => Filter::Only(DocumentStatus::Uploaded),
        Some(value) => Filter::parse(value)?,
    };
    let query = DocumentQuery {
        search: search_term(&params)?,
        status,
        kind: Filter::from_param(params.kind.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: cloned(portal.documents.review_list(&query)),
        stats: portal.documents.stats(),
    })
}

pub async fn approve_document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DocumentRecord> {
    let mut portal = state.portal.write().await;
    let outcome = portal.approve_document(&id, now())?;
    tracing::info!(event = "document_approved", id = %id, "Document approved");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn reject_document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RejectRequest>,
) -> ApiResult<DocumentRecord> {
    let reason = request.reason.unwrap_or_default();
    let mut portal = state.portal.write().await;
    let outcome = portal.reject_document(&id, &reason, now())?;
    tracing::info!(event = "document_rejected", id = %id, "Document rejected");
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: USERS
// =============================================================================

pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<User, UserStats>> {
    let query = UserQuery {
        search: search_term(&params)?,
        role: Filter::from_param(params.role.as_deref())?,
        status: Filter::from_param(params.status.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: cloned(portal.users.list(&query)),
        stats: portal.users.stats(),
    })
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewUser>,
) -> ApiResult<User> {
    let mut portal = state.portal.write().await;
    let outcome = portal.users.create(request, now().date())?;
    tracing::info!(event = "user_created", id = %outcome.value.id, "User created");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let mut portal = state.portal.write().await;
    let outcome = portal.users.delete(&id)?;
    tracing::info!(event = "user_deleted", id = %id, "User deleted");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn toggle_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let mut portal = state.portal.write().await;
    let outcome = portal.users.toggle_status(&id)?;
    tracing::info!(
        event = "user_status_changed",
        id = %id,
        status = %outcome.value.status.as_str(),
        "User status changed"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RoleRequest>,
) -> ApiResult<User> {
    let mut portal = state.portal.write().await;
    let outcome = portal.users.change_role(&id, request.role)?;
    tracing::info!(
        event = "user_role_changed",
        id = %id,
        role = %request.role.as_str(),
        "User role changed"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: ANNOUNCEMENTS
// =============================================================================

pub async fn list_announcements_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<Announcement, AnnouncementStats>> {
    let query = AnnouncementQuery {
        search: search_term(&params)?,
        status: Filter::from_param(params.status.as_deref())?,
        category: Filter::from_param(params.category.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: cloned(portal.announcements.list(&query)),
        stats: portal.announcements.stats(),
    })
}

pub async fn create_announcement_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewAnnouncement>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    let outcome = portal.announcements.create(request, now())?;
    tracing::info!(
        event = "announcement_created",
        id = %outcome.value.id,
        "Announcement drafted"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn publish_announcement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    let outcome = portal.announcements.publish(&id, now())?;
    tracing::info!(event = "announcement_published", id = %id, "Announcement published");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn schedule_announcement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ScheduleRequest>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    let outcome = portal.announcements.schedule(&id, request.at, now())?;
    tracing::info!(
        event = "announcement_scheduled",
        id = %id,
        at = %request.at,
        "Announcement scheduled"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn delete_announcement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    let outcome = portal.announcements.delete(&id)?;
    tracing::info!(event = "announcement_deleted", id = %id, "Announcement deleted");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn pin_announcement_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Announcement> {
    let mut portal = state.portal.write().await;
    let outcome = portal.announcements.toggle_pin(&id)?;
    tracing::info!(
        event = "announcement_pinned",
        id = %id,
        pinned = outcome.value.is_pinned,
        "Announcement pin toggled"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: SCHEDULE
// =============================================================================

pub async fn list_events_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<Event, ScheduleStats>> {
    let query = EventQuery {
        search: search_term(&params)?,
        event_type: Filter::from_param(params.event_type.as_deref())?,
    };
    let portal = state.portal.read().await;
    ok(Listing {
        items: cloned(portal.schedule.list(&query)),
        stats: portal.schedule.stats(),
    })
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewEvent>,
) -> ApiResult<Event> {
    let mut portal = state.portal.write().await;
    let outcome = portal.schedule.create(request)?;
    tracing::info!(event = "event_created", id = %outcome.value.id, "Event added");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Event> {
    let mut portal = state.portal.write().await;
    let outcome = portal.schedule.delete(&id)?;
    tracing::info!(event = "event_deleted", id = %id, "Event deleted");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn month_handler(
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> ApiResult<MonthView> {
    let portal = state.portal.read().await;
    ok(portal.schedule.month(params.year, params.month)?)
}

pub async fn upcoming_events_handler(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let portal = state.portal.read().await;
    ok(cloned(portal.schedule.upcoming()))
}

pub async fn events_on_day_handler(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Vec<Event>> {
    let portal = state.portal.read().await;
    ok(cloned(portal.schedule.on_date(date)))
}

// =============================================================================
// ADMIN: MESSAGES
// =============================================================================

pub async fn list_conversations_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Listing<ConversationSummary, u32>> {
    let search = search_term(&params)?;
    let portal = state.portal.read().await;
    ok(Listing {
        items: portal.inbox.list(&search, now()),
        stats: portal.inbox.total_unread(),
    })
}

/// Open a conversation; its unread counter drops to zero.
pub async fn open_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Conversation> {
    let mut portal = state.portal.write().await;
    ok(portal.inbox.open(&id)?)
}

pub async fn send_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<MessageRequest>,
) -> ApiResult<Message> {
    let mut portal = state.portal.write().await;
    let outcome = portal.inbox.send(&id, &request.content, now())?;
    tracing::info!(
        event = "message_sent",
        id = %outcome.value.id,
        conversation = %id,
        "Reply sent"
    );
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn star_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ToggleResponse> {
    let mut portal = state.portal.write().await;
    let value = portal.inbox.toggle_star(&id)?;
    ok(ToggleResponse { id, value })
}

pub async fn archive_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    let mut portal = state.portal.write().await;
    let outcome = portal.inbox.archive(&id)?;
    tracing::info!(event = "conversation_archived", id = %id, "Conversation archived");
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: EXPORTS
// =============================================================================

/// Start an export; a background ticker drives it to completion.
pub async fn start_export_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ExportRequest>,
) -> ApiResult<ExportJob> {
    let mut portal = state.portal.write().await;
    let job = portal.start_export(request, now())?.clone();
    jobs::spawn_export_ticker(&state).await;
    drop(portal);
    tracing::info!(
        event = "export_started",
        format = %job.request.format.as_str(),
        rows = job.rows,
        "Export started"
    );
    ok(job)
}

pub async fn current_export_handler(State(state): State<AppState>) -> ApiResult<Option<ExportJob>> {
    let portal = state.portal.read().await;
    ok(portal.exports.current().cloned())
}

pub async fn cancel_export_handler(State(state): State<AppState>) -> ApiResult<ExportJob> {
    let mut portal = state.portal.write().await;
    let outcome = portal.exports.cancel()?;
    jobs::abort_export_ticker(&state).await;
    drop(portal);
    tracing::info!(event = "export_cancelled", "Export cancelled");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn export_history_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<ExportHistoryItem>> {
    let portal = state.portal.read().await;
    ok(portal.exports.history().to_vec())
}

pub async fn download_export_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ExportHistoryItem> {
    let portal = state.portal.read().await;
    Ok(Json(ApiResponse::outcome(portal.exports.download(&id)?)))
}

pub async fn delete_export_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ExportHistoryItem> {
    let mut portal = state.portal.write().await;
    let outcome = portal.exports.delete(&id)?;
    tracing::info!(event = "export_deleted", id = %id, "Export deleted");
    Ok(Json(ApiResponse::outcome(outcome)))
}

// =============================================================================
// ADMIN: SETTINGS
// =============================================================================

pub async fn get_settings_handler(State(state): State<AppState>) -> ApiResult<Settings> {
    let portal = state.portal.read().await;
    ok(portal.settings.clone())
}

/// Replace one settings section. Mounted once per section type.
pub async fn save_section_handler<S>(
    State(state): State<AppState>,
    ApiJson(section): ApiJson<S>,
) -> ApiResult<S>
where
    S: Section + Serialize + DeserializeOwned + Send + 'static,
{
    let mut portal = state.portal.write().await;
    let outcome = portal.settings.save(section)?;
    tracing::info!(event = "settings_saved", section = S::NAME, "Settings saved");
    Ok(Json(ApiResponse::outcome(outcome)))
}

pub async fn backup_handler(State(state): State<AppState>) -> ApiResult<chrono::NaiveDateTime> {
    let mut portal = state.portal.write().await;
    let outcome = portal.settings.backup_now(now());
    tracing::info!(event = "backup_started", at = %outcome.value, "Backup started");
    Ok(Json(ApiResponse::outcome(outcome)))
}
