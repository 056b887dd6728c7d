//! # Users Module
//!
//! Back-office accounts (administrators, operators, verifiers).

use crate::{
    FieldErrors, Notice, Outcome, PpdbError, UserRole, UserStatus, Variant,
    listing::{Filter, Searchable},
    primitives::ID_WIDTH,
    registration::{EMAIL_FORMAT_MESSAGE, is_valid_email},
    store::{Record, Store},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub last_login: Option<NaiveDateTime>,
    pub joined_on: NaiveDate,
}

impl Record for User {
    const KIND: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

/// Input of the "add user" dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: String,
    pub role: Filter<UserRole>,
    pub status: Filter<UserStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub admins: usize,
}

/// State container of the user management screen.
#[derive(Debug, Clone, Default)]
pub struct Users {
    store: Store<User>,
}

impl Users {
    #[must_use]
    pub fn new(records: Vec<User>) -> Self {
        Self {
            store: Store::from_records(records),
        }
    }

    pub fn get(&self, id: &str) -> Result<&User, PpdbError> {
        self.store.require(id)
    }

    /// Add an active account. Emails are unique, ignoring case.
    pub fn create(&mut self, input: NewUser, today: NaiveDate) -> Result<Outcome<User>, PpdbError> {
        let name = input.name.trim();
        let email = input.email.trim();

        let mut errors = FieldErrors::new();
        if name.is_empty() {
            errors.insert("name".into(), "Nama harus diisi".into());
        }
        if email.is_empty() {
            errors.insert("email".into(), "Email harus diisi".into());
        } else if !is_valid_email(email) {
            errors.insert("email".into(), EMAIL_FORMAT_MESSAGE.into());
        } else if self
            .store
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            errors.insert("email".into(), "Email sudah terdaftar".into());
        }
        if !errors.is_empty() {
            return Err(PpdbError::Validation(errors));
        }

        let user = User {
            id: self.store.next_id("USR", ID_WIDTH),
            name: name.to_string(),
            email: email.to_string(),
            phone: input.phone.trim().to_string(),
            role: input.role,
            status: UserStatus::Active,
            last_login: None,
            joined_on: today,
        };
        self.store.push(user.clone());
        Ok(Outcome::new(
            user,
            Notice::success("Pengguna Ditambahkan", "Pengguna baru berhasil ditambahkan"),
        ))
    }

    pub fn delete(&mut self, id: &str) -> Result<Outcome<User>, PpdbError> {
        let removed = self.store.remove(id)?;
        Ok(Outcome::new(
            removed,
            Notice::success("Pengguna Dihapus", "Pengguna berhasil dihapus"),
        ))
    }

    /// Flip between active and inactive.
    pub fn toggle_status(&mut self, id: &str) -> Result<Outcome<User>, PpdbError> {
        let updated = self.store.update(id, |u| {
            u.status = match u.status {
                UserStatus::Active => UserStatus::Inactive,
                UserStatus::Inactive => UserStatus::Active,
            };
            Ok(u.clone())
        })?;
        Ok(Outcome::new(
            updated,
            Notice::success("Status Pengguna Diperbarui", "Status pengguna berhasil diubah"),
        ))
    }

    pub fn change_role(&mut self, id: &str, role: UserRole) -> Result<Outcome<User>, PpdbError> {
        let updated = self.store.update(id, |u| {
            u.role = role;
            Ok(u.clone())
        })?;
        let description = format!("Peran {} sekarang {}", updated.name, role.label());
        Ok(Outcome::new(
            updated,
            Notice::success("Peran Pengguna Diperbarui", description),
        ))
    }

    #[must_use]
    pub fn list(&self, query: &UserQuery) -> Vec<&User> {
        self.store
            .iter()
            .filter(|u| u.matches(&query.search))
            .filter(|u| query.role.accepts(u.role))
            .filter(|u| query.status.accepts(u.status))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> UserStats {
        self.store.iter().fold(UserStats::default(), |mut stats, u| {
            stats.total += 1;
            match u.status {
                UserStatus::Active => stats.active += 1,
                UserStatus::Inactive => stats.inactive += 1,
            }
            if u.role == UserRole::Admin {
                stats.admins += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).expect("valid date")
    }

    fn sample() -> Users {
        Users::new(seed::users())
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            role: UserRole::Operator,
        }
    }

    #[test]
    fn create_validates_email() {
        let mut users = sample();
        let err = users
            .create(new_user("Dewi", "dewi@"), today())
            .expect_err("invalid email");
        let PpdbError::Validation(errors) = err else {
            unreachable!("expected validation error");
        };
        assert_eq!(errors.get("email").map(String::as_str), Some("Format email tidak valid"));
    }

    #[test]
    fn create_rejects_duplicate_email() {
        let mut users = sample();
        assert!(users
            .create(new_user("Siti", "SITI.NURHALIZA@sekolah.id"), today())
            .is_err());
    }

    #[test]
    fn create_assigns_next_id() {
        let mut users = sample();
        let outcome = users
            .create(new_user("Dewi Lestari", "dewi@sekolah.id"), today())
            .expect("create");
        assert_eq!(outcome.value.id, "USR004");
        assert_eq!(outcome.value.status, UserStatus::Active);
        assert_eq!(outcome.value.joined_on, today());
    }

    #[test]
    fn toggle_status_flips() {
        let mut users = sample();
        let outcome = users.toggle_status("USR003").expect("toggle");
        assert_eq!(outcome.value.status, UserStatus::Active);
        assert_eq!(outcome.notice.title, "Status Pengguna Diperbarui");
        assert_eq!(users.stats().inactive, 0);
    }

    #[test]
    fn role_and_status_filters_combine() {
        let mut users = sample();
        users.change_role("USR002", UserRole::Verifikator).expect("role");
        let query = UserQuery {
            search: String::new(),
            role: Filter::parse(UserRole::Verifikator.as_str()).expect("filter"),
            status: Filter::Only(UserStatus::Active),
        };
        let ids: Vec<&str> = users.list(&query).iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["USR002"]);
    }

    #[test]
    fn delete_removes() {
        let mut users = sample();
        users.delete("USR002").expect("delete");
        assert!(users.get("USR002").is_err());
        assert!(users.delete("USR002").is_err());
    }
}
