use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

/// Class every account lands in unless told otherwise.
pub const DEFAULT_CLASS_ID: &str = "1A3";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("full name cannot be empty")]
    EmptyFullName,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// What an account is allowed to look at in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    #[default]
    Student,
    Parent,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    /// Parses a stored or submitted role name.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::UnknownRole` for anything else.
    pub fn parse(raw: &str) -> Result<Self, AccountError> {
        match raw.trim() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            other => Err(AccountError::UnknownRole(other.to_string())),
        }
    }
}

/// A registered account.
///
/// Passwords are stored and compared exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: String,
    password: String,
    full_name: String,
    role: Role,
    class_id: String,
}

/// Unvalidated registration form.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<Role>,
    pub class_id: Option<String>,
}

impl NewUser {
    /// Validates the form and assigns an id.
    ///
    /// Missing role means `Student`; a missing or blank class means
    /// [`DEFAULT_CLASS_ID`].
    ///
    /// # Errors
    ///
    /// Returns `AccountError` if the username or full name is blank.
    pub fn validate(self, id: UserId) -> Result<User, AccountError> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(AccountError::EmptyUsername);
        }
        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AccountError::EmptyFullName);
        }
        let class_id = self
            .class_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CLASS_ID.to_string());

        Ok(User {
            id,
            username,
            password: self.password,
            full_name,
            role: self.role.unwrap_or_default(),
            class_id,
        })
    }
}

impl User {
    /// Rehydrates an account from storage.
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        username: String,
        password: String,
        full_name: String,
        role: Role,
        class_id: String,
    ) -> Self {
        Self {
            id,
            username,
            password,
            full_name,
            role,
            class_id,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_applies_defaults() {
        let user = NewUser {
            username: " hs01 ".into(),
            full_name: "Hà Tâm An".into(),
            ..NewUser::default()
        }
        .validate(UserId::random())
        .unwrap();

        assert_eq!(user.username(), "hs01");
        assert_eq!(user.role(), Role::Student);
        assert_eq!(user.class_id(), DEFAULT_CLASS_ID);
        assert!(user.password_matches(""));
    }

    #[test]
    fn validate_rejects_blank_username() {
        let err = NewUser {
            username: "  ".into(),
            full_name: "X".into(),
            ..NewUser::default()
        }
        .validate(UserId::random())
        .unwrap_err();
        assert_eq!(err, AccountError::EmptyUsername);
    }

    #[test]
    fn role_parsing_round_trips() {
        for role in [Role::Teacher, Role::Student, Role::Parent] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("admin").is_err());
    }
}
