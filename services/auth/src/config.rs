use std::fmt;

use chrono::Duration;
use serde::Deserialize;

use portier_core::config::Config;

/// Startup configuration failures. None of these are recoverable at runtime.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("refresh token TTL must exceed access token TTL")]
    RefreshNotLonger,
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),
    #[error("refresh secret must differ from access secret")]
    SharedSecret,
    #[error("otp digits must be between 1 and 9, got {0}")]
    OtpDigits(u32),
    #[error("otp limiter must be shorter than otp expiry")]
    LimiterNotShorter,
}

/// Raw auth service environment. Env var names are the upper-cased field names.
#[derive(Debug, Deserialize)]
pub struct AuthEnv {
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: i64,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    #[serde(default = "default_otp_digits")]
    pub otp_digits: u32,
    #[serde(default = "default_otp_expire_secs")]
    pub otp_expire_secs: i64,
    #[serde(default = "default_otp_limiter_secs")]
    pub otp_limiter_secs: i64,
    /// Redis URL for the OTP challenge store. In-memory store when unset.
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
}

impl Config for AuthEnv {}

fn default_access_token_ttl_secs() -> i64 {
    15 * 60
}

fn default_refresh_token_ttl_secs() -> i64 {
    24 * 60 * 60
}

fn default_otp_digits() -> u32 {
    6
}

fn default_otp_expire_secs() -> i64 {
    120
}

fn default_otp_limiter_secs() -> i64 {
    60
}

fn default_auth_port() -> u16 {
    3112
}

/// Token signing settings.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// HMAC secret for access tokens.
    pub secret: Vec<u8>,
    /// HMAC secret for refresh tokens. Never equal to `secret`.
    pub refresh_secret: Vec<u8>,
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_ttl <= Duration::zero() {
            return Err(ConfigError::NonPositive("access token TTL"));
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(ConfigError::RefreshNotLonger);
        }
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret("jwt secret"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::EmptySecret("jwt refresh secret"));
        }
        if self.secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .finish()
    }
}

/// One-time passcode settings.
#[derive(Debug, Clone, Copy)]
pub struct OtpConfig {
    /// Number of decimal digits in a code (leading digit never zero).
    pub digits: u32,
    /// How long an issued code stays valid.
    pub expire: Duration,
    /// Minimum interval between two issuances for the same principal.
    pub limiter: Duration,
}

impl OtpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=9).contains(&self.digits) {
            return Err(ConfigError::OtpDigits(self.digits));
        }
        if self.expire <= Duration::zero() {
            return Err(ConfigError::NonPositive("otp expiry"));
        }
        if self.limiter < Duration::zero() || self.limiter >= self.expire {
            return Err(ConfigError::LimiterNotShorter);
        }
        Ok(())
    }
}

/// Validated auth service configuration. Built once at startup, read-only after.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub otp: OtpConfig,
    pub redis_url: Option<String>,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        AuthEnv::from_env()?.try_into()
    }
}

impl TryFrom<AuthEnv> for AuthConfig {
    type Error = ConfigError;

    fn try_from(env: AuthEnv) -> Result<Self, Self::Error> {
        let jwt = JwtConfig {
            access_token_ttl: Duration::seconds(env.access_token_ttl_secs),
            refresh_token_ttl: Duration::seconds(env.refresh_token_ttl_secs),
            secret: env.jwt_secret.into_bytes(),
            refresh_secret: env.jwt_refresh_secret.into_bytes(),
        };
        jwt.validate()?;

        let otp = OtpConfig {
            digits: env.otp_digits,
            expire: Duration::seconds(env.otp_expire_secs),
            limiter: Duration::seconds(env.otp_limiter_secs),
        };
        otp.validate()?;

        Ok(Self {
            jwt,
            otp,
            redis_url: env.redis_url,
            auth_port: env.auth_port,
        })
    }
}
