use tracing_subscriber::EnvFilter;

/// Env var holding the log filter directive (e.g. `debug`, `color_contrast_native=trace`).
pub const LOG_ENV: &str = "COLOR_ANALYZER_LOG";
const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber.
///
/// An explicit `filter` wins over `COLOR_ANALYZER_LOG`. Returns false when a
/// subscriber was already installed (the host may call this more than once).
pub fn init(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
