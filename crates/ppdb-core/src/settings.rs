//! # Settings Module
//!
//! Portal configuration edited from the back office.
//!
//! Settings are grouped in sections. Each section is saved as a whole:
//! [`Settings::save`] validates the new value and only then replaces the old
//! one, returning the section's notice. A rejected save leaves every
//! section untouched.
//!
//! ## Sections
//!
//! | Section | Holds |
//! |---------|-------|
//! | `SchoolProfile` | school identity and capacity |
//! | `RegistrationWindow` | open flag, dates, application limit |
//! | `SchoolFlags` | verification and editing switches |
//! | `GeneralSettings` | site name, language, maintenance mode |
//! | `NotificationSettings` | channels and SMTP server |
//! | `SecuritySettings` | session and password policy |
//! | `BackupSettings` | backup schedule and retention |
//! | `FormSettings` | education levels, required documents, agreement |
//! | `HomePageSettings` | landing timeline |

use crate::{
    EducationLevel, Notice, Outcome, PpdbError, Variant,
    documents::{DocumentRequirement, default_requirements},
    primitives::ALLOWED_EXTENSIONS,
    registration::is_valid_email,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Session timeout bounds in minutes.
pub const SESSION_TIMEOUT_RANGE: RangeInclusive<u32> = 5..=480;

/// Minimum password length bounds.
pub const PASSWORD_LENGTH_RANGE: RangeInclusive<u32> = 6..=64;

/// Valid SMTP ports.
pub const SMTP_PORT_RANGE: RangeInclusive<u32> = 1..=65535;

/// Per-document upload size bounds in megabytes.
pub const DOCUMENT_SIZE_RANGE: RangeInclusive<u8> = 1..=10;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn invalid(message: &str) -> PpdbError {
    PpdbError::InvalidSettings(message.to_string())
}

fn require(condition: bool, message: &str) -> Result<(), PpdbError> {
    if condition { Ok(()) } else { Err(invalid(message)) }
}

// =============================================================================
// SECTION TRAIT
// =============================================================================

/// A settings section that is validated and replaced as a unit.
pub trait Section: Clone {
    /// Section name used in logs and routes.
    const NAME: &'static str;

    fn validate(&self) -> Result<(), PpdbError>;

    /// Notice shown after a successful save.
    fn saved_notice() -> Notice;

    /// The section's place inside [`Settings`].
    fn slot(settings: &mut Settings) -> &mut Self;
}

// =============================================================================
// SCHOOL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolProfile {
    pub name: String,
    pub npsn: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub principal: String,
    pub accreditation: String,
    pub capacity: u32,
    pub description: String,
}

impl Default for SchoolProfile {
    fn default() -> Self {
        Self {
            name: "SMP Negeri 1 Jakarta".into(),
            npsn: "20109031".into(),
            address: "Jl. Merdeka No. 123, Jakarta Pusat".into(),
            phone: "(021) 3456789".into(),
            email: "info@smpn1jakarta.sch.id".into(),
            website: "www.smpn1jakarta.sch.id".into(),
            principal: "Dr. Ahmad Suryadi, M.Pd".into(),
            accreditation: "A".into(),
            capacity: 480,
            description: "SMP Negeri 1 Jakarta adalah sekolah menengah pertama negeri yang \
                berlokasi di Jakarta Pusat. Sekolah ini memiliki visi untuk menciptakan generasi \
                yang cerdas, berkarakter, dan berprestasi."
                .into(),
        }
    }
}

impl Section for SchoolProfile {
    const NAME: &'static str = "school";

    fn validate(&self) -> Result<(), PpdbError> {
        require(!self.name.trim().is_empty(), "Nama sekolah harus diisi")?;
        require(is_valid_email(self.email.trim()), "Format email sekolah tidak valid")?;
        require(self.capacity > 0, "Kapasitas harus lebih dari 0")
    }

    fn saved_notice() -> Notice {
        Notice::success("Data Sekolah Disimpan", "Informasi sekolah berhasil diperbarui")
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.school
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationWindow {
    pub is_open: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub announcement_date: NaiveDate,
    pub max_applications: u32,
    pub requirement_message: String,
}

impl Default for RegistrationWindow {
    fn default() -> Self {
        Self {
            is_open: true,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 3, 31),
            announcement_date: date(2024, 5, 15),
            max_applications: 960,
            requirement_message:
                "Silakan lengkapi semua dokumen yang diperlukan untuk proses verifikasi.".into(),
        }
    }
}

impl Section for RegistrationWindow {
    const NAME: &'static str = "registration";

    fn validate(&self) -> Result<(), PpdbError> {
        require(
            self.end_date >= self.start_date,
            "Tanggal penutupan harus setelah tanggal pembukaan",
        )?;
        require(
            self.announcement_date >= self.end_date,
            "Tanggal pengumuman harus setelah penutupan pendaftaran",
        )?;
        require(self.max_applications > 0, "Kuota pendaftar harus lebih dari 0")
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Pendaftaran Disimpan",
            "Konfigurasi pendaftaran berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.registration
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolFlags {
    pub auto_verification: bool,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub allow_late_registration: bool,
    pub require_parent_data: bool,
    /// Whether students may replace or remove an approved document.
    pub allow_document_edit: bool,
}

impl Default for SchoolFlags {
    fn default() -> Self {
        Self {
            auto_verification: false,
            email_notifications: true,
            sms_notifications: false,
            allow_late_registration: false,
            require_parent_data: true,
            allow_document_edit: true,
        }
    }
}

impl Section for SchoolFlags {
    const NAME: &'static str = "flags";

    fn validate(&self) -> Result<(), PpdbError> {
        Ok(())
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Sistem Disimpan",
            "Konfigurasi sistem berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.flags
    }
}

// =============================================================================
// SYSTEM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub site_name: String,
    pub site_description: String,
    pub timezone: String,
    pub language: String,
    pub maintenance_mode: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            site_name: "PPDB Online SMP Negeri 1".into(),
            site_description: "Sistem Penerimaan Peserta Didik Baru".into(),
            timezone: "Asia/Jakarta".into(),
            language: "id".into(),
            maintenance_mode: false,
        }
    }
}

impl Section for GeneralSettings {
    const NAME: &'static str = "general";

    fn validate(&self) -> Result<(), PpdbError> {
        require(!self.site_name.trim().is_empty(), "Nama situs harus diisi")?;
        require(
            matches!(self.language.as_str(), "id" | "en"),
            "Bahasa tidak didukung",
        )
    }

    fn saved_notice() -> Notice {
        Notice::success("Pengaturan Umum Disimpan", "Perubahan berhasil diterapkan")
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.general
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u32,
    pub smtp_username: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            push_enabled: true,
            smtp_host: "smtp.sekolah.id".into(),
            smtp_port: 587,
            smtp_username: "noreply@sekolah.id".into(),
        }
    }
}

impl Section for NotificationSettings {
    const NAME: &'static str = "notifications";

    fn validate(&self) -> Result<(), PpdbError> {
        require(
            SMTP_PORT_RANGE.contains(&self.smtp_port),
            "Port SMTP harus antara 1 dan 65535",
        )?;
        require(
            !self.email_enabled || !self.smtp_host.trim().is_empty(),
            "Server SMTP harus diisi jika email aktif",
        )
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Notifikasi Disimpan",
            "Konfigurasi notifikasi berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.notifications
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub two_factor_auth: bool,
    /// Minutes of inactivity before a session expires.
    pub session_timeout: u32,
    pub max_login_attempts: u32,
    pub password_min_length: u32,
    pub require_special_char: bool,
    pub require_uppercase: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_auth: false,
            session_timeout: 30,
            max_login_attempts: 5,
            password_min_length: 8,
            require_special_char: true,
            require_uppercase: true,
        }
    }
}

impl Section for SecuritySettings {
    const NAME: &'static str = "security";

    fn validate(&self) -> Result<(), PpdbError> {
        require(
            SESSION_TIMEOUT_RANGE.contains(&self.session_timeout),
            "Batas waktu sesi harus antara 5 dan 480 menit",
        )?;
        require(
            self.max_login_attempts >= 1,
            "Maksimal percobaan login minimal 1",
        )?;
        require(
            PASSWORD_LENGTH_RANGE.contains(&self.password_min_length),
            "Panjang minimal password harus antara 6 dan 64",
        )
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Keamanan Disimpan",
            "Kebijakan keamanan berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.security
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupFrequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSettings {
    pub auto_backup: bool,
    pub frequency: BackupFrequency,
    /// Days a backup is kept.
    pub retention_days: u32,
    pub last_backup: Option<NaiveDateTime>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            frequency: BackupFrequency::Daily,
            retention_days: 30,
            last_backup: date(2024, 1, 15).and_hms_opt(2, 0, 0),
        }
    }
}

impl Section for BackupSettings {
    const NAME: &'static str = "backup";

    fn validate(&self) -> Result<(), PpdbError> {
        require(self.retention_days >= 1, "Masa simpan backup minimal 1 hari")
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Backup Disimpan",
            "Konfigurasi backup berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.backup
    }
}

// =============================================================================
// REGISTRATION FORM
// =============================================================================

/// One selectable education level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSettings {
    pub level: EducationLevel,
    pub enabled: bool,
    pub label: String,
    pub description: String,
    pub quota: u32,
    pub age_range: String,
}

impl LevelSettings {
    fn new(level: EducationLevel, description: &str, quota: u32, age_range: &str) -> Self {
        Self {
            level,
            enabled: true,
            label: level.label().to_string(),
            description: description.to_string(),
            quota,
            age_range: age_range.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
    pub levels: Vec<LevelSettings>,
    pub documents: Vec<DocumentRequirement>,
    /// Accepted extensions without the dot.
    pub allowed_formats: Vec<String>,
    pub agreement_text: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelSettings::new(
                    EducationLevel::Sd,
                    "Sekolah Dasar / Madrasah Ibtidaiyah",
                    120,
                    "6 - 12 Tahun",
                ),
                LevelSettings::new(
                    EducationLevel::Smp,
                    "Sekolah Menengah Pertama / Madrasah Tsanawiyah",
                    160,
                    "12 - 15 Tahun",
                ),
                LevelSettings::new(
                    EducationLevel::Sma,
                    "Sekolah Menengah Atas / Kejuruan / Madrasah Aliyah",
                    200,
                    "15 - 18 Tahun",
                ),
            ],
            documents: default_requirements(),
            allowed_formats: ["pdf", "jpg", "jpeg", "png"]
                .into_iter()
                .map(String::from)
                .collect(),
            agreement_text: "Saya menyatakan bahwa data yang saya masukkan adalah benar dan \
                dapat dipertanggungjawabkan."
                .into(),
        }
    }
}

impl Section for FormSettings {
    const NAME: &'static str = "form";

    fn validate(&self) -> Result<(), PpdbError> {
        for level in &self.levels {
            require(!level.label.trim().is_empty(), "Label jenjang harus diisi")?;
            require(
                !level.enabled || level.quota > 0,
                "Kuota jenjang aktif harus lebih dari 0",
            )?;
        }
        for (index, level) in self.levels.iter().enumerate() {
            require(
                !self.levels[..index].iter().any(|l| l.level == level.level),
                "Jenjang tidak boleh duplikat",
            )?;
        }
        for document in &self.documents {
            require(
                DOCUMENT_SIZE_RANGE.contains(&document.max_size_mb),
                "Ukuran maksimal dokumen harus antara 1 dan 10 MB",
            )?;
            require(!document.label.trim().is_empty(), "Nama dokumen harus diisi")?;
        }
        for format in &self.allowed_formats {
            let extension = format!(".{}", format.trim_start_matches('.').to_ascii_lowercase());
            require(
                ALLOWED_EXTENSIONS.contains(&extension.as_str()),
                "Format file tidak didukung",
            )?;
        }
        require(
            !self.agreement_text.trim().is_empty(),
            "Teks pernyataan harus diisi",
        )
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Formulir Disimpan",
            "Konfigurasi formulir pendaftaran berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.form
    }
}

// =============================================================================
// HOME PAGE
// =============================================================================

/// One phase of the public admission timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub phase: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePageSettings {
    pub timeline_title: String,
    pub timeline_description: String,
    pub phases: Vec<TimelinePhase>,
}

impl Default for HomePageSettings {
    fn default() -> Self {
        let phase = |name: &str, start: NaiveDate, end: NaiveDate| TimelinePhase {
            phase: name.to_string(),
            start_date: start,
            end_date: end,
        };
        Self {
            timeline_title: "Timeline PPDB 2024".into(),
            timeline_description:
                "Ikuti setiap tahapan penerimaan peserta didik baru dengan seksama".into(),
            phases: vec![
                phase("Pendaftaran", date(2024, 1, 1), date(2024, 1, 15)),
                phase("Verifikasi Berkas", date(2024, 1, 16), date(2024, 1, 20)),
                phase("Pengumuman", date(2024, 1, 25), date(2024, 1, 25)),
                phase("Daftar Ulang", date(2024, 1, 26), date(2024, 1, 30)),
            ],
        }
    }
}

impl Section for HomePageSettings {
    const NAME: &'static str = "home";

    fn validate(&self) -> Result<(), PpdbError> {
        for phase in &self.phases {
            require(!phase.phase.trim().is_empty(), "Nama tahapan harus diisi")?;
            require(
                phase.end_date >= phase.start_date,
                "Tanggal selesai tahapan harus setelah tanggal mulai",
            )?;
        }
        Ok(())
    }

    fn saved_notice() -> Notice {
        Notice::success(
            "Pengaturan Timeline Disimpan",
            "Konfigurasi timeline berhasil diperbarui",
        )
    }

    fn slot(settings: &mut Settings) -> &mut Self {
        &mut settings.home
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Every settings section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub school: SchoolProfile,
    pub registration: RegistrationWindow,
    pub flags: SchoolFlags,
    pub general: GeneralSettings,
    pub notifications: NotificationSettings,
    pub security: SecuritySettings,
    pub backup: BackupSettings,
    pub form: FormSettings,
    pub home: HomePageSettings,
}

impl Settings {
    /// Validate and replace one section.
    pub fn save<S: Section>(&mut self, section: S) -> Result<Outcome<S>, PpdbError> {
        section.validate()?;
        *S::slot(self) = section.clone();
        Ok(Outcome::new(section, S::saved_notice()))
    }

    /// Stamp `last_backup` with `now`.
    pub fn backup_now(&mut self, now: NaiveDateTime) -> Outcome<NaiveDateTime> {
        self.backup.last_backup = Some(now);
        Outcome::new(
            now,
            Notice::success("Backup Dimulai", "Proses backup sedang berjalan..."),
        )
    }

    /// Refuse new registrations when closed, in maintenance, or full.
    pub fn check_registration_open(&self, applications: usize) -> Result<(), PpdbError> {
        if !self.registration.is_open {
            return Err(PpdbError::RegistrationClosed("registration is closed".into()));
        }
        if self.general.maintenance_mode {
            return Err(PpdbError::RegistrationClosed("site is in maintenance mode".into()));
        }
        let limit = self.registration.max_applications as usize;
        if applications >= limit {
            return Err(PpdbError::RegistrationClosed(format!(
                "application limit of {limit} reached"
            )));
        }
        Ok(())
    }

    /// Refuse a level that is disabled or unknown to the form.
    pub fn check_level(&self, level: EducationLevel) -> Result<(), PpdbError> {
        if self.form.levels.iter().any(|l| l.level == level && l.enabled) {
            Ok(())
        } else {
            Err(PpdbError::field(
                "level",
                format!("Jenjang {} tidak tersedia", level.label()),
            ))
        }
    }

    #[must_use]
    pub fn enabled_levels(&self) -> Vec<&LevelSettings> {
        self.form.levels.iter().filter(|l| l.enabled).collect()
    }

    /// Enabled document requirements in display order.
    #[must_use]
    pub fn requirements(&self) -> Vec<DocumentRequirement> {
        self.form
            .documents
            .iter()
            .filter(|d| d.enabled)
            .cloned()
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        date(2024, 1, 20).and_hms_opt(3, 0, 0).expect("valid time")
    }

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.school.validate().expect("school");
        settings.registration.validate().expect("registration");
        settings.general.validate().expect("general");
        settings.notifications.validate().expect("notifications");
        settings.security.validate().expect("security");
        settings.backup.validate().expect("backup");
        settings.form.validate().expect("form");
        settings.home.validate().expect("home");
    }

    #[test]
    fn invalid_save_keeps_old_section() {
        let mut settings = Settings::default();
        let security = SecuritySettings {
            session_timeout: 4,
            ..SecuritySettings::default()
        };
        let err = settings.save(security).expect_err("out of range");
        assert!(matches!(err, PpdbError::InvalidSettings(_)));
        assert_eq!(settings.security.session_timeout, 30);

        let security = SecuritySettings {
            session_timeout: 480,
            ..SecuritySettings::default()
        };
        let outcome = settings.save(security).expect("save");
        assert_eq!(outcome.notice.title, "Pengaturan Keamanan Disimpan");
        assert_eq!(settings.security.session_timeout, 480);
    }

    #[test]
    fn password_and_port_bounds() {
        let mut security = SecuritySettings::default();
        security.password_min_length = 5;
        assert!(security.validate().is_err());
        security.password_min_length = 64;
        assert!(security.validate().is_ok());

        let mut notifications = NotificationSettings::default();
        notifications.smtp_port = 0;
        assert!(notifications.validate().is_err());
        notifications.smtp_port = 65_536;
        assert!(notifications.validate().is_err());
    }

    #[test]
    fn registration_dates_ordered() {
        let window = RegistrationWindow {
            end_date: date(2023, 12, 31),
            ..RegistrationWindow::default()
        };
        assert!(window.validate().is_err());
    }

    #[test]
    fn registration_gate() {
        let mut settings = Settings::default();
        assert!(settings.check_registration_open(6).is_ok());
        assert!(settings.check_registration_open(960).is_err());

        settings.general.maintenance_mode = true;
        assert!(matches!(
            settings.check_registration_open(6),
            Err(PpdbError::RegistrationClosed(_))
        ));
        settings.general.maintenance_mode = false;
        settings.registration.is_open = false;
        assert!(settings.check_registration_open(6).is_err());
    }

    #[test]
    fn disabled_level_refused() {
        let mut settings = Settings::default();
        assert!(settings.check_level(EducationLevel::Sd).is_ok());
        settings.form.levels[0].enabled = false;
        assert!(settings.check_level(EducationLevel::Sd).is_err());
        assert_eq!(settings.enabled_levels().len(), 2);
    }

    #[test]
    fn form_rejects_unknown_format() {
        let mut form = FormSettings::default();
        form.allowed_formats.push("exe".into());
        assert!(form.validate().is_err());
    }

    #[test]
    fn backup_now_stamps_time() {
        let mut settings = Settings::default();
        settings.backup_now(now());
        assert_eq!(settings.backup.last_backup, Some(now()));
    }
}
