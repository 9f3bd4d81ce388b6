use anyhow::{anyhow, Context, Result};

/// Install the global tracing subscriber.
///
/// `filter` is added on top of `RUST_LOG`, e.g. `zordon=info`. Fails if a
/// subscriber is already installed.
pub fn init(filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(filter.parse().context("Invalid log filter")?),
        )
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize logging: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        assert!(init("zordon=loudest").is_err());
    }
}
