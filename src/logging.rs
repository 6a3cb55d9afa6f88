use tracing_subscriber::EnvFilter;

/// Installs a stdout subscriber; `RUST_LOG` overrides the `info` default.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
}
