//! Tracing initialization
//!
//! Structured logging via tracing-subscriber, filtered by `RUST_LOG` with a
//! sensible default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber. Call once at startup before any
/// tracing occurs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("switchboard_api=info,switchboard_engine=info,info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
