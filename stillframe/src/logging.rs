use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sends progress messages for this tool's crates to stdout at `level`.
/// The filter is fixed; nothing is read from the environment.
pub fn init_logging(level: LevelFilter) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse(format!("stillframe={level},stillframe_core={level}"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
