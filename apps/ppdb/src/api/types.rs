//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Every endpoint answers with an [`ApiResponse`]: `data` on success, plus
//! the notice the portal shows after a mutation; `error` and
//! `field_errors` on failure.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use ppdb_core::{
    ApplicationStatus, BulkAction, EducationLevel, FieldErrors, Notice, Outcome, PpdbError,
    RegistrationForm, RegistrationSummary, UploadCandidate, UserRole, Wizard,
    primitives::MAX_UPLOAD_BYTES,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest base64 payload accepted for one upload (4/3 of the file cap).
pub const MAX_UPLOAD_BASE64_LENGTH: usize = (MAX_UPLOAD_BYTES as usize).div_ceil(3) * 4;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Envelope of every API answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            notice: None,
            error: None,
            field_errors: None,
        }
    }

    /// Success carrying the notice of a core outcome.
    pub fn outcome(outcome: Outcome<T>) -> Self {
        Self {
            success: true,
            data: Some(outcome.value),
            notice: Some(outcome.notice),
            error: None,
            field_errors: None,
        }
    }

    pub fn error(error: &PpdbError) -> Self {
        Self {
            success: false,
            data: None,
            notice: Some(error.notice()),
            error: Some(error.to_string()),
            field_errors: match error {
                PpdbError::Validation(errors) => Some(errors.clone()),
                _ => None,
            },
        }
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status of a core error.
#[must_use]
pub fn error_status(error: &PpdbError) -> StatusCode {
    match error {
        PpdbError::NotFound { .. } => StatusCode::NOT_FOUND,
        PpdbError::RegistrationClosed(_)
        | PpdbError::ExportInProgress
        | PpdbError::EditLocked(_) => StatusCode::CONFLICT,
        PpdbError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        PpdbError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PpdbError::IoError(_) | PpdbError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        PpdbError::Validation(_)
        | PpdbError::EmptySelection(_)
        | PpdbError::MissingRejectionReason
        | PpdbError::NothingToReview(_)
        | PpdbError::InvalidStep(_)
        | PpdbError::InvalidSettings(_)
        | PpdbError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
    }
}

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PpdbError);

impl From<PpdbError> for ApiError {
    fn from(error: PpdbError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "Request refused");
        }
        (status, Json(ApiResponse::<()>::error(&self.0))).into_response()
    }
}

/// Refusal issued by a middleware layer before any handler runs.
pub fn refusal(status: StatusCode, error: &str, notice: Notice) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        notice: Some(notice),
        error: Some(error.to_string()),
        field_errors: None,
    };
    (status, Json(body)).into_response()
}

/// JSON request body whose rejections use the response envelope.
///
/// Keeps the status axum picks (400, 413, 415, 422) and carries its
/// message in `error`.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(
                    status = rejection.status().as_u16(),
                    error = %rejection.body_text(),
                    "Request body refused"
                );
                Err(refusal(
                    rejection.status(),
                    &rejection.body_text(),
                    Notice::destructive(
                        "Permintaan tidak valid",
                        "Data yang dikirim tidak dapat dibaca",
                    ),
                ))
            }
        }
    }
}

/// Result type of every handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// =============================================================================
// LISTS
// =============================================================================

/// Rows of a list screen together with its counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing<T, S> {
    pub items: Vec<T>,
    pub stats: S,
}

// =============================================================================
// LIST PARAMETERS
// =============================================================================

/// Query string of the list endpoints. Each endpoint reads the filters
/// that apply to it and ignores the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub kind: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// Query string of the public announcement feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedParams {
    /// Application status of the reader; absent for anonymous visitors.
    pub audience: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqParams {
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthParams {
    pub year: i32,
    pub month: u32,
}

// =============================================================================
// REGISTRATION WIZARD
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWizardRequest {
    pub level: Option<EducationLevel>,
}

/// Field values keyed by wire name (`full_name`, `birth_date`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldsRequest {
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementRequest {
    pub agreed: bool,
}

/// A wizard as the registration pages render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardView {
    pub id: String,
    pub level: Option<EducationLevel>,
    pub step: u8,
    pub step_title: String,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub can_submit: bool,
    pub summary: RegistrationSummary,
}

impl WizardView {
    pub fn new(id: &str, wizard: &Wizard) -> Self {
        Self {
            id: id.to_string(),
            level: wizard.level,
            step: wizard.step.number(),
            step_title: wizard.step.spec().title.to_string(),
            form: wizard.form.clone(),
            errors: wizard.errors.clone(),
            can_submit: wizard.can_submit(),
            summary: wizard.summary(),
        }
    }
}

// =============================================================================
// UPLOAD REQUEST
// =============================================================================

/// Document upload. Either the base64 content or the declared size must
/// be present; the content wins when both are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub content_base64: Option<String>,
}

impl UploadRequest {
    /// Convert to an upload candidate, decoding the content if present.
    ///
    /// Oversized payloads are refused before decoding.
    pub fn to_candidate(&self) -> Result<UploadCandidate, PpdbError> {
        let bytes = match &self.content_base64 {
            Some(encoded) => {
                if encoded.len() > MAX_UPLOAD_BASE64_LENGTH {
                    return Err(PpdbError::FileTooLarge {
                        size: (encoded.len() as u64 / 4).saturating_mul(3),
                        max: MAX_UPLOAD_BYTES,
                    });
                }
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| {
                        PpdbError::field("content_base64", format!("Base64 tidak valid: {}", e))
                    })?;
                Some(decoded)
            }
            None => None,
        };
        Ok(UploadCandidate {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            declared_size: self.size,
            bytes,
        })
    }
}

// =============================================================================
// ADMIN REQUESTS
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<String>,
    pub action: BulkAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

/// Publication time of a scheduled announcement (`2024-02-01T08:00:00`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// Answer of a toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: String,
    pub value: bool,
}
