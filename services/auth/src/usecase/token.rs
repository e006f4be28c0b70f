use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio_util::sync::CancellationToken;
use tracing::info;

use portier_auth_types::token::{TokenClaims, TokenKind, validate_token};
use portier_domain::id::UserId;

use crate::config::JwtConfig;
use crate::domain::repository::CredentialStore;
use crate::domain::types::{Identity, TokenDetail};
use crate::error::AuthServiceError;
use crate::usecase::cancellable;

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

fn ttl_secs(ttl: Duration) -> u64 {
    u64::try_from(ttl.num_seconds()).unwrap_or_default()
}

fn sign(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthServiceError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(AuthServiceError::Issuance)
}

fn claims_for(identity: &Identity, kind: TokenKind, iat: u64, exp: u64) -> TokenClaims {
    TokenClaims {
        sub: identity.user_id.to_string(),
        username: identity.username.clone(),
        roles: identity.roles.clone(),
        kind,
        iat,
        exp,
    }
}

fn identity_from_claims(claims: TokenClaims) -> Result<Identity, AuthServiceError> {
    let user_id = claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AuthServiceError::InvalidToken)?;
    Ok(Identity {
        user_id,
        username: claims.username,
        roles: claims.roles,
    })
}

/// Mints and checks access/refresh token pairs.
///
/// Access tokens are signed with the primary secret and refresh tokens with
/// the refresh secret, so one leaked secret cannot forge the other kind.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<JwtConfig>,
}

impl TokenIssuer {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn issue_tokens(&self, identity: &Identity) -> Result<TokenDetail, AuthServiceError> {
        self.issue_tokens_at(identity, now_secs())
    }

    /// Issue a pair as if the current time were `now` (seconds since epoch).
    pub fn issue_tokens_at(
        &self,
        identity: &Identity,
        now: u64,
    ) -> Result<TokenDetail, AuthServiceError> {
        let access_token_exp = now + ttl_secs(self.config.access_token_ttl);
        let refresh_token_exp = now + ttl_secs(self.config.refresh_token_ttl);

        let access_token = sign(
            &claims_for(identity, TokenKind::Access, now, access_token_exp),
            &self.config.secret,
        )?;
        let refresh_token = sign(
            &claims_for(identity, TokenKind::Refresh, now, refresh_token_exp),
            &self.config.refresh_secret,
        )?;

        Ok(TokenDetail {
            access_token,
            refresh_token,
            access_token_exp,
            refresh_token_exp,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        Ok(validate_token(token, &self.config.secret, TokenKind::Access)?)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        Ok(validate_token(
            token,
            &self.config.refresh_secret,
            TokenKind::Refresh,
        )?)
    }
}

// ── Login ─────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

pub struct LoginUseCase<S: CredentialStore> {
    pub credentials: S,
    pub tokens: TokenIssuer,
}

impl<S: CredentialStore> LoginUseCase<S> {
    /// Store errors are returned exactly as the store produced them.
    pub async fn execute(
        &self,
        input: LoginInput,
        cancel: &CancellationToken,
    ) -> Result<TokenDetail, AuthServiceError> {
        let user = cancellable(
            cancel,
            self.credentials
                .fetch_user_info(&input.identifier, &input.password),
        )
        .await?;

        let detail = self.tokens.issue_tokens(&Identity::from(&user))?;
        info!(user_id = %user.id, "user logged in");
        Ok(detail)
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase {
    pub tokens: TokenIssuer,
}

impl RefreshTokenUseCase {
    /// Mint a fresh pair from a valid refresh token. An expired refresh token
    /// is [`AuthServiceError::ExpiredToken`], anything else unusable is
    /// [`AuthServiceError::InvalidToken`].
    pub fn execute(&self, refresh_token: &str) -> Result<TokenDetail, AuthServiceError> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        let identity = identity_from_claims(claims)?;
        self.tokens.issue_tokens(&identity)
    }
}
