use uuid::Uuid;

use crate::db::Db;
use crate::db::models::{NewUserRecord, UserRow};
use crate::error::AppError;
use crate::models::{NewUser, Role, SessionToken, User};
use crate::password::{self, HashAlgorithm};
use crate::validate::{self, MAX_EMAIL_LEN, MAX_USERNAME_LEN};

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn insert_user(
        &self,
        record: NewUserRecord,
    ) -> impl std::future::Future<Output = Result<User, AppError>> + Send;

    fn find_credentials(
        &self,
        identifier: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserRow>, AppError>> + Send;

    fn create_session(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<SessionToken, AppError>> + Send;

    fn remove_session(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<(), AppError>> + Send;
}

impl AuthRepository for Db {
    async fn insert_user(&self, record: NewUserRecord) -> Result<User, AppError> {
        Db::insert_user(self, &record).await
    }

    async fn find_credentials(&self, identifier: &str) -> Result<Option<UserRow>, AppError> {
        Db::find_credentials(self, identifier).await
    }

    async fn create_session(&self, user_id: Uuid) -> Result<SessionToken, AppError> {
        Db::create_session(self, user_id).await
    }

    async fn remove_session(&self, token: &str) -> Result<(), AppError> {
        Db::remove_session(self, token).await
    }
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

/// Sign-up / sign-in / sign-out flows: validation boundary plus credential
/// engine in front of the session manager.
pub struct AuthService<R: AuthRepository = Db> {
    repo: R,
}

impl<R: AuthRepository + Clone> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Self-service registration. The payload's role field is ignored here:
    /// public sign-up always produces a plain user.
    pub async fn sign_up(&self, input: &NewUser) -> Result<(User, SessionToken), AppError> {
        let record = normalize_new_user(input, Role::User)?;
        let user = self.repo.insert_user(record).await?;
        let session = self.repo.create_session(user.id).await?;
        Ok((user, session))
    }

    /// Admin-driven creation: role is selectable, no session is started.
    pub async fn create_user(&self, input: &NewUser) -> Result<User, AppError> {
        let role = input.role.unwrap_or(Role::User);
        let record = normalize_new_user(input, role)?;
        self.repo.insert_user(record).await
    }

    /// Check credentials without starting a session. The identifier matches
    /// email or username, case-insensitively. Every failure mode collapses
    /// into `Unauthorized` so the response never reveals which part was
    /// wrong.
    pub async fn verify_user(&self, identifier: &str, password: &str) -> Result<User, AppError> {
        let identifier = identifier.trim().to_lowercase();
        let password = password.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let row = self
            .repo
            .find_credentials(&identifier)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let verified = HashAlgorithm::parse(&row.password_algo)
            .map(|algo| password::verify_password(password, &row.salt, &row.password_hash, algo))
            .unwrap_or(false);
        if !verified {
            return Err(AppError::Unauthorized);
        }

        Ok(row.into_user())
    }

    pub async fn sign_in(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(User, SessionToken), AppError> {
        let user = self.verify_user(identifier, password).await?;
        let session = self.repo.create_session(user.id).await?;
        Ok((user, session))
    }

    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        self.repo.remove_session(token).await
    }
}

/// Trim, range-check and hash a registration payload into an insertable
/// record. All of this happens before any storage call.
fn normalize_new_user(input: &NewUser, role: Role) -> Result<NewUserRecord, AppError> {
    let email = validate::require_text(&input.email, "Email", MAX_EMAIL_LEN)?.to_lowercase();
    validate::validate_email(&email)?;

    let username = validate::require_text(&input.username, "Username", MAX_USERNAME_LEN)?;
    validate::validate_username(&username)?;

    let password = input.password.trim();
    password::validate_password(password)?;

    let display_name = validate::optional_text(input.display_name.as_deref(), MAX_USERNAME_LEN)?
        .unwrap_or_else(|| username.clone());

    let salt = password::generate_salt();
    let password_hash = password::hash_password(password, &salt)?;

    Ok(NewUserRecord {
        email,
        username,
        display_name,
        role,
        salt,
        password_hash,
        password_algo: HashAlgorithm::CURRENT.as_str(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
