use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::AuthServiceError;

pub mod otp;
pub mod token;
pub mod user;

/// Await a collaborator call unless `cancel` fires first, in which case the
/// pending call is dropped and [`AuthServiceError::Canceled`] returned.
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, AuthServiceError>
where
    F: Future<Output = Result<T, AuthServiceError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AuthServiceError::Canceled),
        res = fut => res,
    }
}
