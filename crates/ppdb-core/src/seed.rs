//! # Seed Data
//!
//! The records a fresh portal starts with. Every restart begins from this
//! state again.

use crate::{
    AnnouncementCategory, AnnouncementStatus, ApplicationStatus, Audience, DocumentKind,
    DocumentStatus, EducationLevel, EventStatus, EventType, ExportFormat, ExportStatus,
    MessageSender, MessageStatus, UserRole, UserStatus, Variant,
    announcements::Announcement,
    applications::Application,
    documents::{DocumentRecord, FileMeta, content_type_for},
    export::ExportHistoryItem,
    messages::{Conversation, Message},
    primitives::ID_WIDTH,
    schedule::Event,
    store::format_id,
    users::User,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_default()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

// =============================================================================
// APPLICANTS
// =============================================================================

struct Applicant {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    school: &'static str,
    status: ApplicationStatus,
    registered_on: NaiveDate,
    parent_name: &'static str,
    parent_phone: &'static str,
    address: &'static str,
    nisn: &'static str,
    birth_place: &'static str,
    birth_date: NaiveDate,
    /// Status of each checklist slot in `DocumentKind::ALL` order.
    documents: [DocumentStatus; 6],
}

fn applicants() -> [Applicant; 6] {
    use DocumentStatus::{Approved as A, Pending as P, Rejected as R, Uploaded as U};
    [
        Applicant {
            id: "PPDB001",
            name: "Ahmad Fadil Rahman",
            email: "ahmad.fadil@email.com",
            phone: "081234567890",
            school: "SMP Negeri 1",
            status: ApplicationStatus::Pending,
            registered_on: date(2024, 1, 15),
            parent_name: "Budi Rahman",
            parent_phone: "081298765430",
            address: "Jl. Merdeka No. 123, Jakarta",
            nisn: "0051234567",
            birth_place: "Jakarta",
            birth_date: date(2009, 3, 12),
            documents: [U, U, U, P, P, U],
        },
        Applicant {
            id: "PPDB002",
            name: "Siti Nurhaliza",
            email: "siti.nur@email.com",
            phone: "081234567891",
            school: "SMP Negeri 2",
            status: ApplicationStatus::Approved,
            registered_on: date(2024, 1, 15),
            parent_name: "Ahmad Halim",
            parent_phone: "081298765431",
            address: "Jl. Sudirman No. 45, Jakarta",
            nisn: "0051234568",
            birth_place: "Bandung",
            birth_date: date(2009, 7, 2),
            documents: [A; 6],
        },
        Applicant {
            id: "PPDB003",
            name: "Budi Santoso",
            email: "budi.s@email.com",
            phone: "081234567892",
            school: "SMP Al-Azhar",
            status: ApplicationStatus::Pending,
            registered_on: date(2024, 1, 14),
            parent_name: "Hendra Santoso",
            parent_phone: "081298765432",
            address: "Jl. Gatot Subroto No. 78",
            nisn: "0051234569",
            birth_place: "Bogor",
            birth_date: date(2008, 11, 20),
            documents: [U, U, U, P, P, R],
        },
        Applicant {
            id: "PPDB004",
            name: "Rina Kartika",
            email: "rina.k@email.com",
            phone: "081234567893",
            school: "SMP Negeri 3",
            status: ApplicationStatus::Rejected,
            registered_on: date(2024, 1, 14),
            parent_name: "Kartika Dewi",
            parent_phone: "081298765433",
            address: "Jl. Thamrin No. 90",
            nisn: "0051234570",
            birth_place: "Depok",
            birth_date: date(2009, 1, 8),
            documents: [A, A, A, U, A, A],
        },
        Applicant {
            id: "PPDB005",
            name: "Doni Pratama",
            email: "doni.p@email.com",
            phone: "081234567894",
            school: "SMP Swasta",
            status: ApplicationStatus::Approved,
            registered_on: date(2024, 1, 13),
            parent_name: "Pratama Wijaya",
            parent_phone: "081298765434",
            address: "Jl. Kuningan No. 12",
            nisn: "0051234571",
            birth_place: "Tangerang",
            birth_date: date(2009, 5, 30),
            documents: [A; 6],
        },
        Applicant {
            id: "PPDB006",
            name: "Maya Sari",
            email: "maya.s@email.com",
            phone: "081234567895",
            school: "SMP Negeri 1",
            status: ApplicationStatus::Pending,
            registered_on: date(2024, 1, 12),
            parent_name: "Sari Indah",
            parent_phone: "081298765435",
            address: "Jl. Menteng No. 34",
            nisn: "0051234572",
            birth_place: "Bekasi",
            birth_date: date(2009, 9, 17),
            documents: [U, U, U, U, P, U],
        },
    ]
}

#[must_use]
pub fn applications() -> Vec<Application> {
    applicants()
        .into_iter()
        .map(|a| {
            let decided = a.status != ApplicationStatus::Pending;
            Application {
                id: a.id.into(),
                name: a.name.into(),
                email: a.email.into(),
                phone: a.phone.into(),
                school: a.school.into(),
                status: a.status,
                registered_on: a.registered_on,
                parent_name: a.parent_name.into(),
                parent_phone: a.parent_phone.into(),
                address: a.address.into(),
                nisn: a.nisn.into(),
                birth_place: a.birth_place.into(),
                birth_date: Some(a.birth_date),
                level: Some(EducationLevel::Sma),
                rejection_reason: (a.status == ApplicationStatus::Rejected)
                    .then(|| "Nilai rapor tidak memenuhi syarat".to_string()),
                decided_at: decided.then(|| at(2024, 1, 18, 9, 0)),
            }
        })
        .collect()
}

/// Six checklist slots per applicant, numbered `DOC001` onwards.
#[must_use]
pub fn documents() -> Vec<DocumentRecord> {
    let mut records = Vec::new();
    for applicant in applicants() {
        let first_name = applicant
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let uploaded_at = applicant
            .registered_on
            .succ_opt()
            .and_then(|d| d.and_hms_opt(10, 0, 0));
        let reviewed_at = uploaded_at.map(|t| t + chrono::Duration::days(2));

        for (kind, status) in DocumentKind::ALL.iter().zip(applicant.documents) {
            let id = format_id("DOC", records.len() as u64 + 1, ID_WIDTH);
            let mut record = DocumentRecord::pending(id, applicant.id, applicant.name, *kind, true);
            if status != DocumentStatus::Pending {
                let extension = if *kind == DocumentKind::Foto { "jpg" } else { "pdf" };
                let file_name = format!("{}_{first_name}.{extension}", kind.as_str());
                record.file = Some(FileMeta {
                    content_type: content_type_for(&file_name)
                        .unwrap_or_default()
                        .to_string(),
                    file_name,
                    size_bytes: 180_000 + 25_000 * records.len() as u64,
                });
                record.status = status;
                record.uploaded_at = uploaded_at;
            }
            if matches!(status, DocumentStatus::Approved | DocumentStatus::Rejected) {
                record.reviewed_at = reviewed_at;
            }
            if status == DocumentStatus::Rejected {
                record.rejection_reason = Some("Dokumen tidak lengkap".into());
            }
            records.push(record);
        }
    }
    records
}

// =============================================================================
// ANNOUNCEMENTS & SCHEDULE
// =============================================================================

#[must_use]
pub fn announcements() -> Vec<Announcement> {
    let announcement = |id: &str,
                        title: &str,
                        content: &str,
                        category: AnnouncementCategory,
                        status: AnnouncementStatus,
                        audience: Audience,
                        created_at: NaiveDateTime| Announcement {
        id: id.into(),
        title: title.into(),
        content: content.into(),
        category,
        status,
        audience,
        is_pinned: false,
        created_at,
        published_at: (status == AnnouncementStatus::Published).then_some(created_at),
        scheduled_at: None,
        author: "Admin PPDB".into(),
        views: 0,
    };

    vec![
        Announcement {
            is_pinned: true,
            views: 1250,
            ..announcement(
                "ANN001",
                "Jadwal Verifikasi Dokumen Tahap 1",
                "Verifikasi dokumen tahap pertama akan dilaksanakan pada tanggal 20-25 Januari \
                 2024. Pastikan semua dokumen sudah lengkap.",
                AnnouncementCategory::Schedule,
                AnnouncementStatus::Published,
                Audience::All,
                at(2024, 1, 15, 10, 0),
            )
        },
        Announcement {
            scheduled_at: Some(at(2024, 2, 1, 8, 0)),
            ..announcement(
                "ANN002",
                "Pengumuman Hasil Seleksi Awal",
                "Hasil seleksi awal akan diumumkan pada tanggal 1 Februari 2024 melalui website \
                 resmi dan email masing-masing pendaftar.",
                AnnouncementCategory::Important,
                AnnouncementStatus::Scheduled,
                Audience::All,
                at(2024, 1, 14, 14, 30),
            )
        },
        Announcement {
            views: 890,
            ..announcement(
                "ANN003",
                "Perpanjangan Waktu Pendaftaran",
                "Pendaftaran PPDB diperpanjang hingga tanggal 15 Februari 2024. Segera daftarkan \
                 diri Anda!",
                AnnouncementCategory::Urgent,
                AnnouncementStatus::Published,
                Audience::All,
                at(2024, 1, 13, 9, 0),
            )
        },
        announcement(
            "ANN004",
            "Tips Mengisi Formulir Pendaftaran",
            "Berikut adalah beberapa tips untuk mengisi formulir pendaftaran dengan benar dan \
             lengkap.",
            AnnouncementCategory::Info,
            AnnouncementStatus::Draft,
            Audience::Pending,
            at(2024, 1, 12, 16, 0),
        ),
    ]
}

#[must_use]
pub fn events() -> Vec<Event> {
    let event = |id: &str,
                 title: &str,
                 description: &str,
                 day: NaiveDate,
                 (start, end): (NaiveTime, NaiveTime),
                 location: &str,
                 event_type: EventType,
                 status: EventStatus,
                 participants: Option<u32>| Event {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        date: day,
        start_time: start,
        end_time: Some(end),
        location: location.into(),
        event_type,
        status,
        participants,
    };

    vec![
        event(
            "EVT001",
            "Pembukaan Pendaftaran PPDB",
            "Pembukaan pendaftaran penerimaan peserta didik baru tahun ajaran 2024/2025",
            date(2024, 1, 15),
            (time(8, 0), time(16, 0)),
            "Online & Offline",
            EventType::Registration,
            EventStatus::Completed,
            Some(1250),
        ),
        event(
            "EVT002",
            "Verifikasi Dokumen Tahap 1",
            "Verifikasi dokumen untuk pendaftar gelombang pertama",
            date(2024, 1, 20),
            (time(8, 0), time(15, 0)),
            "Ruang Administrasi",
            EventType::Verification,
            EventStatus::Ongoing,
            Some(450),
        ),
        event(
            "EVT003",
            "Pengumuman Hasil Seleksi",
            "Pengumuman hasil seleksi administrasi tahap pertama",
            date(2024, 2, 1),
            (time(10, 0), time(12, 0)),
            "Website & Email",
            EventType::Announcement,
            EventStatus::Upcoming,
            None,
        ),
        event(
            "EVT004",
            "Tes Akademik",
            "Pelaksanaan tes akademik untuk calon siswa",
            date(2024, 2, 10),
            (time(8, 0), time(12, 0)),
            "Gedung Utama",
            EventType::Test,
            EventStatus::Upcoming,
            None,
        ),
        event(
            "EVT005",
            "Orientasi Siswa Baru",
            "Pengenalan lingkungan sekolah untuk siswa yang diterima",
            date(2024, 7, 15),
            (time(7, 0), time(13, 0)),
            "Lapangan Sekolah",
            EventType::Orientation,
            EventStatus::Upcoming,
            None,
        ),
    ]
}

// =============================================================================
// USERS & MESSAGES
// =============================================================================

#[must_use]
pub fn users() -> Vec<User> {
    vec![
        User {
            id: "USR001".into(),
            name: "Dr. Siti Nurhaliza".into(),
            email: "siti.nurhaliza@sekolah.id".into(),
            phone: "081311112222".into(),
            role: UserRole::Admin,
            status: UserStatus::Active,
            last_login: Some(at(2024, 1, 15, 9, 30)),
            joined_on: date(2023, 8, 1),
        },
        User {
            id: "USR002".into(),
            name: "Ahmad Fauzi, S.Pd".into(),
            email: "ahmad.fauzi@sekolah.id".into(),
            phone: "081311113333".into(),
            role: UserRole::Operator,
            status: UserStatus::Active,
            last_login: Some(at(2024, 1, 15, 8, 45)),
            joined_on: date(2023, 9, 15),
        },
        User {
            id: "USR003".into(),
            name: "Rina Kartika".into(),
            email: "rina.kartika@sekolah.id".into(),
            phone: "081311114444".into(),
            role: UserRole::Verifikator,
            status: UserStatus::Inactive,
            last_login: Some(at(2024, 1, 10, 14, 20)),
            joined_on: date(2023, 10, 1),
        },
    ]
}

fn message(
    id: &str,
    content: &str,
    sent_at: NaiveDateTime,
    sender: MessageSender,
    status: MessageStatus,
) -> Message {
    Message {
        id: id.into(),
        content: content.into(),
        sent_at,
        sender,
        status,
    }
}

#[must_use]
pub fn conversations() -> Vec<Conversation> {
    use MessageSender::{Admin, User};
    use MessageStatus::{Delivered, Read};

    let conversation = |id: &str, user_name: &str, user_email: &str, student_id: &str| {
        Conversation {
            id: id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            student_id: student_id.into(),
            unread_count: 0,
            is_starred: false,
            is_archived: false,
            messages: Vec::new(),
        }
    };

    vec![
        Conversation {
            unread_count: 2,
            is_starred: true,
            messages: vec![
                message(
                    "MSG001",
                    "Selamat pagi, saya ingin bertanya tentang persyaratan dokumen.",
                    at(2024, 1, 16, 9, 0),
                    User,
                    Read,
                ),
                message(
                    "MSG002",
                    "Selamat pagi. Silakan tanyakan, kami siap membantu.",
                    at(2024, 1, 16, 9, 15),
                    Admin,
                    Read,
                ),
                message(
                    "MSG003",
                    "Apakah ijazah harus yang asli atau boleh fotokopi?",
                    at(2024, 1, 16, 9, 20),
                    User,
                    Read,
                ),
                message(
                    "MSG004",
                    "Untuk verifikasi awal bisa menggunakan fotokopi yang dilegalisir. Ijazah \
                     asli akan diperiksa saat verifikasi akhir.",
                    at(2024, 1, 16, 9, 30),
                    Admin,
                    Read,
                ),
                message(
                    "MSG005",
                    "Terima kasih atas informasinya, Pak.",
                    at(2024, 1, 16, 10, 30),
                    User,
                    Read,
                ),
            ],
            ..conversation(
                "CONV001",
                "Ahmad Fadil Rahman",
                "ahmad.fadil@gmail.com",
                "PPDB001",
            )
        },
        Conversation {
            messages: vec![
                message(
                    "MSG006",
                    "Dokumen KK saya ditolak, apa yang salah ya?",
                    at(2024, 1, 15, 14, 0),
                    User,
                    Read,
                ),
                message(
                    "MSG007",
                    "Dokumen KK Anda tidak jelas/blur. Mohon upload ulang dengan kualitas yang \
                     lebih baik.",
                    at(2024, 1, 15, 14, 30),
                    Admin,
                    Read,
                ),
                message(
                    "MSG008",
                    "Baik, saya akan upload ulang dokumennya.",
                    at(2024, 1, 15, 15, 0),
                    User,
                    Read,
                ),
            ],
            ..conversation(
                "CONV002",
                "Siti Nurhaliza",
                "siti.nurhaliza@gmail.com",
                "PPDB002",
            )
        },
        Conversation {
            unread_count: 1,
            messages: vec![message(
                "MSG009",
                "Kapan pengumuman hasil seleksi?",
                at(2024, 1, 14, 11, 0),
                User,
                Delivered,
            )],
            ..conversation("CONV003", "Budi Santoso", "budi.santoso@gmail.com", "PPDB003")
        },
        Conversation {
            is_starred: true,
            messages: vec![
                message(
                    "MSG010",
                    "Apakah ada biaya pendaftaran?",
                    at(2024, 1, 13, 10, 0),
                    User,
                    Read,
                ),
                message(
                    "MSG011",
                    "Tidak ada biaya pendaftaran. PPDB ini gratis.",
                    at(2024, 1, 13, 10, 30),
                    Admin,
                    Read,
                ),
            ],
            ..conversation("CONV004", "Rina Kartika", "rina.kartika@gmail.com", "PPDB004")
        },
    ]
}

// =============================================================================
// EXPORT HISTORY
// =============================================================================

#[must_use]
pub fn export_history() -> Vec<ExportHistoryItem> {
    let item = |id: &str,
                name: &str,
                data_type: &str,
                format: ExportFormat,
                created_at: NaiveDateTime,
                file_size: &str,
                size_bytes: u64| ExportHistoryItem {
        id: id.into(),
        name: name.into(),
        data_type: data_type.into(),
        format,
        created_at,
        file_size: file_size.into(),
        size_bytes,
        status: ExportStatus::Completed,
    };

    vec![
        item(
            "EXP001",
            "Data Pendaftar - Januari 2024",
            "Pendaftar",
            ExportFormat::Excel,
            at(2024, 1, 15, 14, 30),
            "2.5 MB",
            2_621_440,
        ),
        item(
            "EXP002",
            "Laporan Verifikasi Dokumen",
            "Verifikasi",
            ExportFormat::Pdf,
            at(2024, 1, 14, 10, 15),
            "1.2 MB",
            1_258_291,
        ),
        item(
            "EXP003",
            "Statistik Pendaftaran",
            "Statistik",
            ExportFormat::Pdf,
            at(2024, 1, 13, 16, 45),
            "850 KB",
            870_400,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn document_ids_are_unique_and_sequential() {
        let docs = documents();
        assert_eq!(docs.len(), 36);
        assert_eq!(docs[0].id, "DOC001");
        assert_eq!(docs[35].id, "DOC036");
        let ids: BTreeSet<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), docs.len());
    }

    #[test]
    fn rejection_reason_only_on_rejected() {
        for doc in documents() {
            assert_eq!(
                doc.rejection_reason.is_some(),
                doc.status == DocumentStatus::Rejected,
                "{}",
                doc.id
            );
            assert_eq!(doc.file.is_some(), doc.status != DocumentStatus::Pending);
        }
    }

    #[test]
    fn seeded_files_pass_type_rules() {
        for doc in documents() {
            if let Some(file) = doc.file {
                assert_eq!(
                    content_type_for(&file.file_name),
                    Some(file.content_type.as_str())
                );
            }
        }
    }
}
