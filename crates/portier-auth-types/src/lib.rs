//! Auth types shared across Portier services.
//!
//! Provides the JWT claims payload and the signature/expiry validation used
//! by the auth service and by request-authorization middleware.

pub mod token;
