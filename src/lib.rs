pub mod certificate; // PDF certificate filler
pub mod config;
pub mod dose_dates;
pub mod form; // Screen view state + background dispatch
pub mod models;
pub mod openai;
pub mod recommendation;
pub mod template; // Blank form template generation

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the embedding shell. Call once at startup.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("VaxForm core starting v{}", config::APP_VERSION);
}
