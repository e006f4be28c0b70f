use std::fmt::Display;

use axum::http::StatusCode;

/// Handler for `GET /healthz`: the process is up and serving.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a dependency check to a readiness status. A failing `component`
/// makes the service not ready (503) and is logged with its cause.
pub fn readiness<E: Display>(component: &str, check: Result<(), E>) -> StatusCode {
    match check {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(component, error = %e, "dependency not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
