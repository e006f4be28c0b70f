//! Authentication core: credential login, token pair issuance and refresh,
//! registration, and one-time passcode challenges.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod router;
pub mod server;
pub mod state;
pub mod usecase;
