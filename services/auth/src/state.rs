use tokio_util::sync::CancellationToken;

use crate::config::AuthConfig;
use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::usecase::otp::{IssueOtpUseCase, OtpManager, ValidateOtpUseCase};
use crate::usecase::token::{LoginUseCase, RefreshTokenUseCase, TokenIssuer};
use crate::usecase::user::RegisterUserUseCase;

/// Bounds a collaborator must meet to live in [`AppState`].
pub trait Component: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Component for T {}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState<S, C, H, D> {
    pub credentials: S,
    pub otp: OtpManager<C>,
    pub tokens: TokenIssuer,
    pub hasher: H,
    pub delivery: D,
    /// Fired on shutdown; pending collaborator calls are abandoned.
    pub shutdown: CancellationToken,
}

impl<S, C, H, D> AppState<S, C, H, D>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    pub fn new(
        config: &AuthConfig,
        credentials: S,
        challenges: C,
        hasher: H,
        delivery: D,
    ) -> Self {
        Self {
            credentials,
            otp: OtpManager::new(challenges, config.otp),
            tokens: TokenIssuer::new(config.jwt.clone()),
            hasher,
            delivery,
            shutdown: CancellationToken::new(),
        }
    }

    /// Tie the state to an externally owned shutdown token.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Cancellation token for a single request.
    pub fn request_cancel(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn login_usecase(&self) -> LoginUseCase<S> {
        LoginUseCase {
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
        }
    }

    pub fn refresh_usecase(&self) -> RefreshTokenUseCase {
        RefreshTokenUseCase {
            tokens: self.tokens.clone(),
        }
    }

    pub fn register_usecase(&self) -> RegisterUserUseCase<S, H> {
        RegisterUserUseCase {
            credentials: self.credentials.clone(),
            hasher: self.hasher.clone(),
        }
    }

    pub fn issue_otp_usecase(&self) -> IssueOtpUseCase<C, D> {
        IssueOtpUseCase {
            otp: self.otp.clone(),
            delivery: self.delivery.clone(),
        }
    }

    pub fn validate_otp_usecase(&self) -> ValidateOtpUseCase<C> {
        ValidateOtpUseCase {
            otp: self.otp.clone(),
        }
    }
}
