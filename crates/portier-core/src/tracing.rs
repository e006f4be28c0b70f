use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset: `info` everywhere, `debug` for the
/// service's own crate and for HTTP request spans.
fn default_directives(service_crate: &str) -> String {
    format!("info,{service_crate}=debug,tower_http=debug")
}

/// Initialize structured JSON tracing on stdout. Call once at service startup.
///
/// `RUST_LOG` wins when set; otherwise [`default_directives`] for
/// `service_crate` (the crate name with underscores, e.g. `portier_auth`).
/// Each event carries its current span, so request ids reach every line
/// logged inside a request. Subsequent calls are silently ignored.
pub fn init_tracing(service_crate: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_crate)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(true).with_span_list(false))
        .try_init();
}
