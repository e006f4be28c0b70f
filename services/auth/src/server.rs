use anyhow::Context as _;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use portier_core::tracing::init_tracing;

use crate::config::AuthConfig;
use crate::domain::repository::{ChallengeStore, CredentialStore, OtpDelivery, PasswordHasher};
use crate::infra::backend::ChallengeBackend;
use crate::router::build_router;
use crate::state::{AppState, Component};

/// Serve the auth API on `listener` until `state.shutdown` fires.
///
/// Shutdown also cancels every in-flight request, since each one runs under
/// a child of the same token.
pub async fn serve<S, C, H, D>(
    listener: TcpListener,
    state: AppState<S, C, H, D>,
) -> std::io::Result<()>
where
    S: CredentialStore + Component,
    C: ChallengeStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    let shutdown = state.shutdown.clone();
    let addr = listener.local_addr()?;
    let router = build_router(state);

    info!(%addr, "auth service listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    info!("auth service stopped");
    Ok(())
}

/// Service entry point: tracing, the configured challenge store, and the API
/// on `0.0.0.0:{auth_port}` until `shutdown` fires or the process gets Ctrl-C.
///
/// Credentials, hashing and delivery are supplied by the deployment.
pub async fn run<S, H, D>(
    config: AuthConfig,
    credentials: S,
    hasher: H,
    delivery: D,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    S: CredentialStore + Component,
    H: PasswordHasher + Component,
    D: OtpDelivery + Component,
{
    init_tracing("portier_auth");

    let challenges = ChallengeBackend::from_config(&config)?;
    info!(backend = challenges.name(), "otp challenge store selected");

    let listener = TcpListener::bind(("0.0.0.0", config.auth_port))
        .await
        .with_context(|| format!("bind port {}", config.auth_port))?;

    let on_signal = shutdown.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            on_signal.cancel();
        }
    });

    let state = AppState::new(&config, credentials, challenges, hasher, delivery)
        .with_shutdown(shutdown);
    let served = serve(listener, state).await.context("serve auth api");
    signal.abort();
    served
}
