use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Portal role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Registrar,
    Accounting,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Registrar => "registrar",
            Role::Accounting => "accounting",
            Role::Admin => "admin",
        }
    }

    /// Registrar-side staff (admins act with registrar rights).
    pub fn is_registrar(&self) -> bool {
        matches!(self, Role::Registrar | Role::Admin)
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Student)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "registrar" => Ok(Role::Registrar),
            "accounting" => Ok(Role::Accounting),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Who is acting, passed explicitly to every component that needs it.
///
/// For students `user_id` is their student id. The credential is the raw
/// bearer token, forwarded untouched to collaborators.
#[derive(Debug, Clone)]
pub struct SessionContext {
    user_id: Uuid,
    role: Role,
    display_name: String,
    credential: String,
}

impl SessionContext {
    pub fn new(
        user_id: Uuid,
        role: Role,
        display_name: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            display_name: display_name.into(),
            credential: credential.into(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Students may only act on their own records; staff on anyone's.
    pub fn can_access_student(&self, student_id: Uuid) -> bool {
        self.role.is_staff() || self.user_id == student_id
    }
}
