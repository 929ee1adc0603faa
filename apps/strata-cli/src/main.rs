use strata_cli::config::StrataConfig;
use strata_cli::driver::Session;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Parse CLI args for config file path
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "strata.yaml".to_string());

    // Load configuration (try file first, fall back to env)
    let config = if std::path::Path::new(&config_path).exists() {
        tracing::info!("Loading configuration from: {}", config_path);
        StrataConfig::load_from_file(&config_path)?
    } else {
        tracing::warn!("Config file not found, loading from environment variables");
        StrataConfig::load_from_env()?
    };

    tracing::info!(
        seed = config.seed,
        points = config.points,
        queries = config.queries,
        "Starting session on a {}x{} canvas",
        config.canvas.width,
        config.canvas.height
    );

    let mut session = Session::new(config)?;
    let summary = session.run()?;

    tracing::info!(
        nodes = summary.nodes,
        edges = summary.edges,
        max_layer = summary.max_layer,
        "Recall {:.1}% over {} queries, {:.1} hops per trace",
        summary.recall() * 100.0,
        summary.queries,
        summary.mean_hops
    );
    if summary.dropped_events > 0 {
        tracing::warn!(dropped = summary.dropped_events, "event queue overflowed");
    }

    Ok(())
}
