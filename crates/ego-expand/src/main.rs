//! CLI entry point: performs exactly one expansion run and exits.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use ego_client::TwitterClient;
use ego_core::Credentials;

use ego_expand::config::ExpandConfig;
use ego_expand::pipeline::run_once;
use ego_expand::store::FsRunStore;

/// Config file prefix (`ego.toml`).
const CONFIG_FILE: &str = "ego";

#[derive(Parser)]
#[command(name = "ego-expand", version)]
#[command(about = "Expand the seed account's follow graph by one hop")]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let _cli = Cli::parse();

    // Fail before any network call if credentials are missing.
    let credentials = Credentials::from_env()?;
    let config = load_expand_config(CONFIG_FILE)?;

    let client = TwitterClient::new(&config.client_config(&credentials.bearer_token))?;
    let store = FsRunStore::new(&config.data_dir);

    let summary = run_once(
        Arc::new(client),
        &store,
        &config,
        &credentials.username,
        chrono::Utc::now(),
    )
    .await?;

    tracing::info!(
        run_id = %summary.run_id,
        seed = %summary.seed,
        new = summary.frontier.new_count,
        written = summary.records_written,
        output = summary.output.as_ref().map(|p| p.display().to_string()).unwrap_or_default(),
        "Done"
    );

    Ok(())
}

fn load_expand_config(file_prefix: &str) -> anyhow::Result<ExpandConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        // EGO_EXPAND__WORKERS -> expand.workers
        .add_source(
            config::Environment::with_prefix("EGO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<ExpandConfig>("expand") {
        Ok(c) => Ok(c),
        Err(config::ConfigError::NotFound(_)) => Ok(ExpandConfig::default()),
        Err(e) => Err(e.into()),
    }
}
