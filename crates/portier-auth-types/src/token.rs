//! JWT claims and validation.

use jsonwebtoken::{DecodingKey, Validation, decode, get_current_timestamp};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;

use portier_domain::id::UserId;

/// Which secret a token was signed with, and what it may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: UserId,
    pub username: String,
    pub roles: Vec<String>,
    pub access_token_exp: u64,
}

/// Errors returned by token validation.
///
/// Callers may attempt a refresh on [`TokenError::Expired`], never on
/// [`TokenError::Invalid`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// JWT claims payload shared by token creation (auth service) and validation.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (decimal string) |
/// | `username` | custom | login name |
/// | `roles` | custom | role names, so authorization needs no second lookup |
/// | `kind` | custom | `access` or `refresh` |
/// | `iat` | `iat` | issuance, seconds since epoch |
/// | `exp` | `exp` | expiration, seconds since epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature;
/// only the auth service mints tokens.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct TokenClaims {
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub kind: TokenKind,
    pub iat: u64,
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// HS256, exp checked with zero leeway, required claims: `exp` + `sub`.
///
/// jsonwebtoken still accepts `exp == now`, so expiry is re-checked against
/// `now`: a token is usable only while `now < exp`.
fn decode_jwt(token: &str, secret: &[u8], now: u64) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

    if data.claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(data.claims)
}

/// Validate a token of the given kind against `secret`, returning its claims.
///
/// The signature is checked before expiry, so a forged token that also
/// happens to be stale is reported as [`TokenError::Invalid`].
pub fn validate_token(
    token: &str,
    secret: &[u8],
    kind: TokenKind,
) -> Result<TokenClaims, TokenError> {
    validate_token_at(token, secret, kind, get_current_timestamp())
}

/// [`validate_token`] as if the current time were `now` (seconds since epoch).
pub fn validate_token_at(
    token: &str,
    secret: &[u8],
    kind: TokenKind,
    now: u64,
) -> Result<TokenClaims, TokenError> {
    let claims = decode_jwt(token, secret, now)?;
    if claims.kind != kind {
        return Err(TokenError::Invalid);
    }
    Ok(claims)
}

/// Validate an access token, returning parsed identity.
///
/// Request-authorization middleware calls this on every request.
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<TokenInfo, TokenError> {
    let claims = validate_token(token, secret, TokenKind::Access)?;
    let user_id = claims.sub.parse::<UserId>().map_err(|_| TokenError::Invalid)?;
    Ok(TokenInfo {
        user_id,
        username: claims.username,
        roles: claims.roles,
        access_token_exp: claims.exp,
    })
}
