//! # PPDB HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! Public (no authentication):
//! - `GET /health` - Health check
//! - `GET /`, `/levels`, `/faq` - Landing page data
//! - `GET /announcements`, `/announcements/{id}` - Published announcements
//! - `/register/*` - Five-step registration wizard
//! - `/student/{id}/*` - Applicant dashboard and document uploads
//!
//! Back office (`/admin/*`, API key when configured): dashboard,
//! applications, students, documents, users, announcements, schedule,
//! messages, exports, reports and settings.
//!
//! ## Security Configuration
//!
//! Read from the `[security]` table of the config file, overridable with
//! environment variables:
//! - `PPDB_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `PPDB_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `PPDB_API_KEY`: If set, `/admin/*` requires Bearer token authentication

mod auth;
mod handlers;
mod jobs;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::{ApiKey, keys_match};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
// Re-export handlers and types for integration tests (via `ppdb::api::*`)
pub use handlers::health_handler;
pub use types::{
    AgreementRequest, ApiError, ApiResponse, ApiResult, BulkRequest, FaqParams, FeedParams,
    FieldsRequest, HealthResponse, ListParams, Listing, MAX_UPLOAD_BASE64_LENGTH, MessageRequest,
    MonthParams, OpenWizardRequest, RejectRequest, RoleRequest, ScheduleRequest, ToggleResponse,
    UploadRequest, WizardView, error_status,
};

use crate::config::{AppConfig, SecurityConfig};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use chrono::NaiveDateTime;
use ppdb_core::{
    Portal, PpdbError,
    settings::{
        BackupSettings, FormSettings, GeneralSettings, HomePageSettings, NotificationSettings,
        RegistrationWindow, SchoolFlags, SchoolProfile, SecuritySettings,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body cap; a base64 upload of the largest document fits.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Local wall clock time, the `now` handed to every core operation.
#[must_use]
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the portal.
#[derive(Clone)]
pub struct AppState {
    /// Every store of the portal behind one lock.
    pub portal: Arc<RwLock<Portal>>,
    /// Effective configuration.
    pub config: Arc<AppConfig>,
    /// Ticker of the running export, if any.
    pub export_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Interval between export progress ticks.
    pub export_tick: Duration,
}

impl AppState {
    /// Create new app state around a portal.
    #[must_use]
    pub fn new(portal: Portal, config: AppConfig) -> Self {
        let export_tick = Duration::from_millis(config.jobs.export_tick_millis);
        Self {
            portal: Arc::new(RwLock::new(portal)),
            config: Arc::new(config),
            export_task: Arc::new(Mutex::new(None)),
            export_tick,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from `security.cors_origins`.
///
/// - `"*"`: allows all origins (development mode - use with caution!)
/// - not set: localhost only (restrictive default)
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(security: &SecurityConfig) -> CorsLayer {
    match security.cors_origins.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (PPDB_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTES
// =============================================================================

/// Landing page, announcements, registration wizard and student dashboard.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/", get(handlers::landing_handler))
        .route("/levels", get(handlers::levels_handler))
        .route("/faq", get(handlers::faq_handler))
        .route("/announcements", get(handlers::feed_handler))
        .route("/announcements/{id}", get(handlers::read_announcement_handler))
        .route("/register", post(handlers::open_wizard_handler))
        .route(
            "/register/{id}",
            get(handlers::get_wizard_handler).delete(handlers::discard_wizard_handler),
        )
        .route("/register/{id}/fields", put(handlers::update_fields_handler))
        .route("/register/{id}/agreement", put(handlers::agreement_handler))
        .route("/register/{id}/next", post(handlers::next_step_handler))
        .route("/register/{id}/previous", post(handlers::previous_step_handler))
        .route("/register/{id}/submit", post(handlers::submit_wizard_handler))
        .route("/student/{id}", get(handlers::student_dashboard_handler))
        .route(
            "/student/{id}/announcements",
            get(handlers::student_feed_handler),
        )
        .route(
            "/student/{id}/documents/{kind}",
            post(handlers::upload_document_handler).delete(handlers::remove_document_handler),
        )
}

/// Back office routes, mounted under `/admin`.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::admin_dashboard_handler))
        .route("/reports", get(handlers::report_handler))
        // Applications & students
        .route("/applications", get(handlers::list_applications_handler))
        .route("/applications/bulk", post(handlers::bulk_applications_handler))
        .route("/applications/{id}", get(handlers::get_application_handler))
        .route(
            "/applications/{id}/approve",
            post(handlers::approve_application_handler),
        )
        .route(
            "/applications/{id}/reject",
            post(handlers::reject_application_handler),
        )
        .route("/students", get(handlers::list_students_handler))
        .route("/students/{id}", get(handlers::get_student_handler))
        // Document review
        .route("/documents", get(handlers::list_documents_handler))
        .route(
            "/documents/{id}/approve",
            post(handlers::approve_document_handler),
        )
        .route("/documents/{id}/reject", post(handlers::reject_document_handler))
        // Users
        .route(
            "/users",
            get(handlers::list_users_handler).post(handlers::create_user_handler),
        )
        .route("/users/{id}", delete(handlers::delete_user_handler))
        .route("/users/{id}/toggle", post(handlers::toggle_user_handler))
        .route("/users/{id}/role", put(handlers::change_role_handler))
        // Announcements
        .route(
            "/announcements",
            get(handlers::list_announcements_handler).post(handlers::create_announcement_handler),
        )
        .route(
            "/announcements/{id}",
            delete(handlers::delete_announcement_handler),
        )
        .route(
            "/announcements/{id}/publish",
            post(handlers::publish_announcement_handler),
        )
        .route(
            "/announcements/{id}/schedule",
            post(handlers::schedule_announcement_handler),
        )
        .route(
            "/announcements/{id}/pin",
            post(handlers::pin_announcement_handler),
        )
        // Schedule
        .route(
            "/schedule",
            get(handlers::list_events_handler).post(handlers::create_event_handler),
        )
        .route("/schedule/month", get(handlers::month_handler))
        .route("/schedule/upcoming", get(handlers::upcoming_events_handler))
        .route("/schedule/day/{date}", get(handlers::events_on_day_handler))
        .route("/schedule/{id}", delete(handlers::delete_event_handler))
        // Messages
        .route("/messages", get(handlers::list_conversations_handler))
        .route("/messages/{id}", get(handlers::open_conversation_handler))
        .route("/messages/{id}/send", post(handlers::send_message_handler))
        .route("/messages/{id}/star", post(handlers::star_conversation_handler))
        .route(
            "/messages/{id}/archive",
            post(handlers::archive_conversation_handler),
        )
        // Exports
        .route(
            "/exports",
            get(handlers::export_history_handler).post(handlers::start_export_handler),
        )
        .route(
            "/exports/current",
            get(handlers::current_export_handler).delete(handlers::cancel_export_handler),
        )
        .route("/exports/{id}", delete(handlers::delete_export_handler))
        .route(
            "/exports/{id}/download",
            get(handlers::download_export_handler),
        )
        // Settings
        .route("/settings", get(handlers::get_settings_handler))
        .route("/settings/backup", post(handlers::backup_handler))
        .route(
            "/settings/school",
            put(handlers::save_section_handler::<SchoolProfile>),
        )
        .route(
            "/settings/registration",
            put(handlers::save_section_handler::<RegistrationWindow>),
        )
        .route(
            "/settings/flags",
            put(handlers::save_section_handler::<SchoolFlags>),
        )
        .route(
            "/settings/general",
            put(handlers::save_section_handler::<GeneralSettings>),
        )
        .route(
            "/settings/notifications",
            put(handlers::save_section_handler::<NotificationSettings>),
        )
        .route(
            "/settings/security",
            put(handlers::save_section_handler::<SecuritySettings>),
        )
        .route(
            "/settings/backup-schedule",
            put(handlers::save_section_handler::<BackupSettings>),
        )
        .route(
            "/settings/form",
            put(handlers::save_section_handler::<FormSettings>),
        )
        .route(
            "/settings/home",
            put(handlers::save_section_handler::<HomePageSettings>),
        )
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Authentication - validates API key on `/admin/*` (if configured)
pub fn create_router(state: AppState) -> Router {
    let security = &state.config.security;
    let cors = build_cors_layer(security);

    let rate_limiter = if security.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            security.rate_limit
        );
        Some(create_rate_limiter(security.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let mut admin = admin_routes();
    match security.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled for /admin");
            let key: ApiKey = Arc::from(key);
            admin = admin.layer(axum_middleware::from_fn_with_state(
                key,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - the back office is publicly accessible! \
                 Set PPDB_API_KEY or security.api_key to enable authentication."
            );
        }
    }

    let mut router = public_routes().nest("/admin", admin);

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server together with the announcement sweep.
pub async fn run_server(config: AppConfig, portal: Portal) -> Result<(), PpdbError> {
    let addr = config.address();
    let sweep_period = Duration::from_secs(config.jobs.announcement_sweep_secs);
    let state = AppState::new(portal, config);
    let sweep = jobs::spawn_announcement_sweep(Arc::clone(&state.portal), sweep_period);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PpdbError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("PPDB HTTP server listening on {}", addr);

    let served = axum::serve(listener, router)
        .await
        .map_err(|e| PpdbError::IoError(format!("Server error: {}", e)));
    sweep.abort();
    served
}
