//! User entity - a marketplace account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MAX_NAME_LEN: usize = 100;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::ValidationError(format!("unknown role: {other}"))),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, name: &str, email: &str) -> Result<Self, DomainError> {
        let now = Utc::now();
        Ok(Self {
            id,
            name: validate_name(name)?,
            email: normalize_email(email),
            phone: None,
            address: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Emails compare case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Partial profile update. Role is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UserChanges {
    /// Write non-empty fields into `user`; returns the new email when it changed
    pub fn apply(self, user: &mut User) -> Result<Option<String>, DomainError> {
        let mut new_email = None;

        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            user.name = validate_name(&name)?;
        }
        if let Some(email) = self.email.filter(|e| !e.trim().is_empty()) {
            let email = normalize_email(&email);
            if email != user.email {
                user.email.clone_from(&email);
                new_email = Some(email);
            }
        }
        if let Some(phone) = self.phone.filter(|p| !p.trim().is_empty()) {
            user.phone = Some(phone.trim().to_string());
        }
        if let Some(address) = self.address.filter(|a| !a.trim().is_empty()) {
            user.address = Some(address.trim().to_string());
        }

        user.updated_at = Utc::now();
        Ok(new_email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(Snowflake::new(1), " Ana ", "Ana@Example.COM ").unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::User);
        assert!(!user.is_admin());
        assert!(User::new(Snowflake::new(2), "", "a@b.c").is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_changes_keep_role_and_skip_blanks() {
        let mut user = User::new(Snowflake::new(1), "Ana", "ana@example.com").unwrap();
        user.role = Role::Admin;

        let changed = UserChanges {
            name: Some("  ".into()),
            email: Some("ANA@example.com".into()),
            phone: Some("555-0100".into()),
            address: None,
        }
        .apply(&mut user)
        .unwrap();

        assert_eq!(changed, None);
        assert_eq!(user.name, "Ana");
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_changes_report_new_email() {
        let mut user = User::new(Snowflake::new(1), "Ana", "ana@example.com").unwrap();
        let changed = UserChanges {
            email: Some("new@example.com".into()),
            ..UserChanges::default()
        }
        .apply(&mut user)
        .unwrap();
        assert_eq!(changed.as_deref(), Some("new@example.com"));
        assert_eq!(user.email, "new@example.com");
    }
}
