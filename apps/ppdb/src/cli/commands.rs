//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command except `server` works on a freshly seeded portal, the same
//! state a newly started server holds.

use crate::api;
use crate::config::AppConfig;
use ppdb_core::{
    DocumentKind, FileMeta, Portal, PpdbError, Settings, UploadCandidate, Variant, format_size,
    documents::content_type_for, primitives::MAX_UPLOAD_BYTES, validate_upload,
};
use std::path::{Path, PathBuf};

/// Content type reported for files with an unknown extension.
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Validate file path for security.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it
/// names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, PpdbError> {
    let canonical = path.canonicalize().map_err(|e| {
        PpdbError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(PpdbError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server on a seeded portal.
pub async fn cmd_server(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), PpdbError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    println!("PPDB Admissions Portal Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", config.server.host);
    println!("  Port:        {}", config.server.port);
    println!(
        "  Auth:        {}",
        if config.security.api_key.is_some() {
            "API key on /admin"
        } else {
            "disabled"
        }
    );
    println!("  Rate limit:  {} req/s", config.security.rate_limit);
    println!();
    println!("Endpoints:");
    println!("  GET  /              - Landing page data");
    println!("  POST /register      - Start a registration");
    println!("  GET  /student/{{id}} - Applicant dashboard");
    println!("  *    /admin/...     - Back office");
    println!("  GET  /health        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config, Portal::seeded()).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show record counts.
pub fn cmd_status(json_mode: bool) -> Result<(), PpdbError> {
    let portal = Portal::seeded();
    let counts = portal.counts();

    if json_mode {
        print_json(&counts);
        return Ok(());
    }

    println!("PPDB Portal Status");
    println!("==================");
    println!("School:        {}", portal.settings.school.name);
    println!(
        "Registration:  {}",
        if portal.settings.registration.is_open {
            "open"
        } else {
            "closed"
        }
    );
    println!();
    println!(
        "Applications:  {} ({} pending)",
        counts.applications, counts.pending_applications
    );
    println!(
        "Documents:     {} ({} to review)",
        counts.documents, counts.documents_to_review
    );
    println!("Announcements: {}", counts.announcements);
    println!("Events:        {}", counts.events);
    println!("Users:         {}", counts.users);
    println!(
        "Messages:      {} conversations, {} unread",
        counts.conversations, counts.unread_messages
    );
    println!("Exports:       {}", counts.exports);

    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Print the admissions report.
pub fn cmd_report(json_mode: bool) -> Result<(), PpdbError> {
    let report = Portal::seeded().report();

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    println!("PPDB Admissions Report");
    println!("======================");
    println!("Applications:  {}", report.applications.total);
    println!("  Pending:     {}", report.applications.pending);
    println!("  Approved:    {}", report.applications.approved);
    println!("  Rejected:    {}", report.applications.rejected);
    println!("Approval rate: {}%", report.approval_rate);
    println!("Completeness:  {}%", report.completeness_rate);
    println!();
    println!("Documents:");
    for kind in &report.documents {
        println!(
            "  {:<24} uploaded {:>3}  verified {:>3}  rejected {:>3}  missing {:>3}",
            kind.label, kind.uploaded, kind.verified, kind.rejected, kind.missing
        );
    }
    println!();
    println!("Registrations:");
    for point in &report.trend {
        println!(
            "  {}  +{:<3} total {}",
            point.date, point.count, point.cumulative
        );
    }

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration. The API key is never shown.
pub fn cmd_config(config: &AppConfig, json_mode: bool) -> Result<(), PpdbError> {
    let mut shown = config.clone();
    if shown.security.api_key.is_some() {
        shown.security.api_key = Some("********".to_string());
    }

    if json_mode {
        print_json(&shown);
        return Ok(());
    }

    let text = toml::to_string_pretty(&shown)
        .map_err(|e| PpdbError::ConfigError(format!("Cannot render config: {}", e)))?;
    print!("{}", text);
    Ok(())
}

// =============================================================================
// CHECK-FILE COMMAND
// =============================================================================

/// Run a local file through the upload rules of `kind` (or the global cap).
///
/// Oversized files are judged on their size alone and never read.
pub fn check_file(path: &Path, kind: Option<&str>) -> Result<FileMeta, PpdbError> {
    let max_bytes = match kind {
        Some(name) => {
            let kind = DocumentKind::parse(name)
                .ok_or_else(|| PpdbError::InvalidFilter(name.to_string()))?;
            Settings::default()
                .requirements()
                .iter()
                .find(|r| r.kind == kind)
                .map_or(MAX_UPLOAD_BYTES, |r| r.max_bytes())
        }
        None => MAX_UPLOAD_BYTES,
    };

    let canonical = validate_file_path(path)?;
    let size = std::fs::metadata(&canonical)
        .map_err(|e| PpdbError::IoError(format!("Cannot read file metadata: {}", e)))?
        .len();
    let file_name = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = if size > max_bytes {
        None
    } else {
        Some(
            std::fs::read(&canonical)
                .map_err(|e| PpdbError::IoError(format!("Cannot read file: {}", e)))?,
        )
    };

    let candidate = UploadCandidate {
        content_type: content_type_for(&file_name)
            .unwrap_or(UNKNOWN_CONTENT_TYPE)
            .to_string(),
        file_name,
        declared_size: size,
        bytes,
    };
    validate_upload(&candidate, max_bytes)
}

pub fn cmd_check_file(path: &Path, kind: Option<&str>, json_mode: bool) -> Result<(), PpdbError> {
    let meta = check_file(path, kind)?;

    if json_mode {
        print_json(&meta);
        return Ok(());
    }

    println!("File accepted");
    println!("  Name: {}", meta.file_name);
    println!("  Type: {}", meta.content_type);
    println!("  Size: {}", format_size(meta.size_bytes));
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(bytes).expect("write");
        path
    }

    #[test]
    fn accepts_small_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "ijazah.pdf", b"%PDF-1.4 content");
        let meta = check_file(&path, Some("ijazah")).expect("accepted");
        assert_eq!(meta.content_type, "application/pdf");
        assert_eq!(meta.size_bytes, 16);
    }

    #[test]
    fn rejects_mismatched_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "foto.png", b"%PDF-1.4 content");
        assert!(matches!(
            check_file(&path, None),
            Err(PpdbError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "notes.txt", b"hello");
        assert!(matches!(
            check_file(&path, None),
            Err(PpdbError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn oversized_file_reports_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bytes = b"%PDF-".to_vec();
        bytes.resize(MAX_UPLOAD_BYTES as usize + 1, 0);
        let path = write_file(&dir, "rapor.pdf", &bytes);
        assert!(matches!(
            check_file(&path, None),
            Err(PpdbError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn unknown_kind_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
        assert!(matches!(
            check_file(&path, Some("passport")),
            Err(PpdbError::InvalidFilter(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let missing = Path::new("/definitely/not/here.pdf");
        assert!(matches!(
            check_file(missing, None),
            Err(PpdbError::IoError(_))
        ));
    }
}
