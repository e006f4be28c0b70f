use std::sync::{Arc, Mutex};

use chrono::Duration;

use portier_auth::config::{AuthConfig, JwtConfig, OtpConfig};
use portier_auth::domain::repository::{CredentialStore, OtpDelivery, PasswordHasher};
use portier_auth::error::AuthServiceError;
use portier_domain::id::{RoleId, UserId};
use portier_domain::user::{NewUser, Role, RoleAssignment, User};

// ── MockCredentialStore ──────────────────────────────────────────────────────

/// In-memory credential store. Passwords are compared in plain text.
#[derive(Clone, Default)]
pub struct MockCredentialStore {
    pub users: Vec<(User, String)>,
    /// When set, `fetch_user_info` fails with exactly this message.
    pub fetch_error: Option<String>,
    /// When set, existence checks fail with exactly this message.
    pub exists_error: Option<String>,
    pub taken_mobile_numbers: Vec<String>,
    pub taken_usernames: Vec<String>,
    pub taken_emails: Vec<String>,
    /// Never resolve `fetch_user_info` (for cancellation tests).
    pub hang_fetch: bool,
    /// Never resolve `exists_username` (for fail-fast tests).
    pub hang_username_check: bool,
    pub default_role: i32,
    pub created: Arc<Mutex<Vec<NewUser>>>,
}

impl MockCredentialStore {
    pub fn with_user(user: User, password: &str) -> Self {
        Self {
            users: vec![(user, password.to_owned())],
            default_role: 1,
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self {
            default_role: 1,
            ..Default::default()
        }
    }

    pub fn failing_fetch(message: &str) -> Self {
        Self {
            fetch_error: Some(message.to_owned()),
            ..Self::empty()
        }
    }

    /// Returns a shared handle to the created-user list for post-execution inspection.
    pub fn created_handle(&self) -> Arc<Mutex<Vec<NewUser>>> {
        Arc::clone(&self.created)
    }

    fn exists_result(&self, taken: &[String], value: &str) -> Result<bool, AuthServiceError> {
        if let Some(msg) = &self.exists_error {
            return Err(anyhow::anyhow!("{msg}").into());
        }
        Ok(taken.iter().any(|v| v == value))
    }
}

impl CredentialStore for MockCredentialStore {
    async fn exists_mobile_number(&self, mobile_number: &str) -> Result<bool, AuthServiceError> {
        self.exists_result(&self.taken_mobile_numbers, mobile_number)
    }

    async fn exists_username(&self, username: &str) -> Result<bool, AuthServiceError> {
        if self.hang_username_check {
            std::future::pending::<()>().await;
        }
        self.exists_result(&self.taken_usernames, username)
    }

    async fn exists_email(&self, email: &str) -> Result<bool, AuthServiceError> {
        self.exists_result(&self.taken_emails, email)
    }

    async fn fetch_user_info(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<User, AuthServiceError> {
        if self.hang_fetch {
            std::future::pending::<()>().await;
        }
        if let Some(msg) = &self.fetch_error {
            return Err(anyhow::anyhow!("{msg}").into());
        }
        self.users
            .iter()
            .find(|(u, p)| u.username == identifier && p == password)
            .map(|(u, _)| u.clone())
            .ok_or(AuthServiceError::CredentialNotFound)
    }

    async fn get_default_role(&self) -> Result<RoleId, AuthServiceError> {
        Ok(RoleId(self.default_role))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, AuthServiceError> {
        let mut created = self.created.lock().unwrap();
        created.push(user.clone());
        Ok(User {
            id: UserId(created.len() as i64),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile_number: user.mobile_number.clone(),
            roles: user.roles.clone(),
        })
    }
}

// ── FakeHasher ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Default)]
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    async fn hash(&self, password: &str) -> Result<String, AuthServiceError> {
        Ok(format!("hashed:{password}"))
    }
}

// ── RecordingDelivery ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingDelivery {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingDelivery {
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, code)| code.clone())
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl OtpDelivery for RecordingDelivery {
    async fn deliver(&self, principal_id: &str, code: &str) -> Result<(), AuthServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push((principal_id.to_owned(), code.to_owned()));
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const TEST_PASSWORD: &str = "testpass";

pub fn test_user() -> User {
    User {
        id: UserId(1),
        username: "testuser".to_owned(),
        first_name: "John".to_owned(),
        last_name: "Doe".to_owned(),
        email: "john.doe@example.com".to_owned(),
        mobile_number: "1234567890".to_owned(),
        roles: vec![RoleAssignment::from(Role {
            id: RoleId(1),
            name: "user".to_owned(),
        })],
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::hours(24),
        secret: b"test-secret-key".to_vec(),
        refresh_secret: b"test-refresh-secret-key".to_vec(),
    }
}

pub fn test_otp_config() -> OtpConfig {
    OtpConfig {
        digits: 6,
        expire: Duration::seconds(120),
        limiter: Duration::seconds(5),
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig {
        jwt: test_jwt_config(),
        otp: test_otp_config(),
        redis_url: None,
        auth_port: 3112,
    }
}
