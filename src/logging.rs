use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// Filter comes from `RUST_LOG`, then `MERGE_ME_LOG`, then `merge_me=info`.
pub fn initialize_logging() -> anyhow::Result<()> {
    let directives = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("MERGE_ME_LOG"))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(directives)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;

    Ok(())
}
