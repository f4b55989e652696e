use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{is_blank, CoreError, CoreResult, Problems};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::ValidationError(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role,
            department: None,
            permissions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply an admin edit. Absent fields are left untouched; a blank
    /// department clears it.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(department) = update.department {
            let department = department.trim();
            self.department = if department.is_empty() {
                None
            } else {
                Some(department.to_string())
            };
        }
        if let Some(permissions) = update.permissions {
            let mut cleaned: Vec<String> = permissions
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            cleaned.sort();
            cleaned.dedup();
            self.permissions = cleaned;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub department: Option<String>,
    pub permissions: Option<Vec<String>>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> CoreResult<()> {
    let mut problems = Problems::default();
    problems.check(!is_blank(name), "name is required");
    problems.check(looks_like_email(&normalize_email(email)), "email is invalid");
    problems.check(
        password.chars().count() >= MIN_PASSWORD_LENGTH,
        "password must be at least 6 characters",
    );
    problems.finish()
}
