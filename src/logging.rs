#[cfg(feature = "logging")]
use tracing_subscriber::EnvFilter;
#[cfg(feature = "logging")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "logging")]
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize structured logging for the pipeline binary.
///
/// Defaults to `info` level unless overridden by `BATCHSCRIBE_LOG`.
#[cfg(feature = "logging")]
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var("BATCHSCRIBE_LOG")
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
