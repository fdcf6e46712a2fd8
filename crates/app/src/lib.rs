//! EduArt application composition root
//!
//! Wires configuration, the persistent store, the artifact repository and
//! the generation service into one `Session`.

pub mod generation;
pub mod session;

pub use generation::{
    generate, render_generation, settings_for, workflows_for, GenerationOutcome, WorkflowSettings,
};
pub use session::{Download, Session};

/// Install the tracing subscriber used by the binaries
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();
}
