//! Service plumbing shared by Portier services: configuration loading,
//! tracing setup, health handlers and request-id middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
