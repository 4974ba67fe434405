use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "CLIMBLY_LOG";

/// Install the stderr subscriber. Filter directives come from `CLIMBLY_LOG`
/// (default `warn`) so stdout stays machine-readable.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("invalid log filter")?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;
    Ok(())
}
