use std::sync::Arc;

use literacy_core::model::{NewUser, Role, User, UserId};
use literacy_core::roster::{ADMIN_USERNAME, admin_account, class_roster};
use storage::repository::{StorageError, UserRepository};
use tracing::info;

use crate::error::AccountServiceError;

/// Most students returned for one class.
pub const CLASS_LIST_LIMIT: u32 = 50;

/// Result of seeding the default class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created { accounts: usize },
    AlreadySeeded,
}

/// Registration, login, and class listings.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Account` for a blank username or full name,
    /// `UsernameTaken` if the login name exists, or `Storage` on write failures.
    pub async fn register(&self, form: NewUser) -> Result<User, AccountServiceError> {
        let user = form.validate(UserId::random())?;
        if self.users.find_by_username(user.username()).await?.is_some() {
            return Err(AccountServiceError::UsernameTaken);
        }
        self.users.insert_user(&user).await.map_err(taken)?;
        info!(username = user.username(), role = user.role().as_str(), "account registered");
        Ok(user)
    }

    /// Checks a username and password pair.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::InvalidCredentials` when the account is
    /// unknown or the password differs.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AccountServiceError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .filter(|u| u.password_matches(password))
            .ok_or(AccountServiceError::InvalidCredentials)?;
        Ok(user)
    }

    /// Students of a class, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Storage` if the store cannot be read.
    pub async fn list_students(&self, class_id: &str) -> Result<Vec<User>, AccountServiceError> {
        Ok(self
            .users
            .list_class(class_id.trim(), Role::Student, CLASS_LIST_LIMIT)
            .await?)
    }

    /// Creates the teacher account and the default class roster unless the
    /// teacher already exists.
    ///
    /// # Errors
    ///
    /// Returns `AccountServiceError::Storage` if the accounts cannot be written.
    pub async fn seed_default_class(&self) -> Result<SeedOutcome, AccountServiceError> {
        if self.users.find_by_username(ADMIN_USERNAME).await?.is_some() {
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let mut accounts = vec![admin_account().validate(UserId::random())?];
        for student in class_roster() {
            accounts.push(student.validate(UserId::random())?);
        }
        self.users.insert_users(&accounts).await.map_err(taken)?;

        info!(accounts = accounts.len(), "seeded default class");
        Ok(SeedOutcome::Created {
            accounts: accounts.len(),
        })
    }
}

fn taken(e: StorageError) -> AccountServiceError {
    match e {
        StorageError::Conflict => AccountServiceError::UsernameTaken,
        other => AccountServiceError::Storage(other),
    }
}
