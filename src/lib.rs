//! A small HTTP service taking waitlist signups.
//!
//! `POST /api/waitlist` records the address in an optional REST store (best-effort)
//! and sends a welcome email through an email-delivery API.

pub mod app;
pub mod config;
pub mod email_client;
mod error;
pub mod store_client;
pub mod templ_manager;
pub mod web;

// re-exports
pub use app::{serve, App, AppState};
pub use email_client::EmailClient;
pub use error::{Error, Result};

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Compact, colored output without timestamps for local development.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(env_filter())
        .compact()
        .init();
}

/// Full format without ANSI colors, for log collectors.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(env_filter())
        .init();
}
