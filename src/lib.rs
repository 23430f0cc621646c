//! gifrec - record a capture stream and turn it into an animated GIF.
//!
//! This is the orchestration core of a screen/webcam recorder: stream
//! acquisition, recorder lifecycle, lazy transcoding and local file save,
//! composed into one state machine (`app::Orchestrator`). The presentation
//! layer embedding this crate supplies configuration (see `form`) and renders
//! whatever state the orchestrator reports.

pub mod app;
pub mod capture;
pub mod form;
pub mod recorder;
pub mod save;
pub mod transcode;
pub mod utils;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for an embedding application.
///
/// Respects `RUST_LOG`; defaults to debug-level output for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gifrec=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("gifrec v{} initialized", env!("CARGO_PKG_VERSION"));
}
