use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use lendhero_db::MySqlConnector;
use lendhero_kernel::settings::{LoadOptions, Settings};

/// Create the LendHero MySQL database if it does not exist yet.
#[derive(Debug, Parser)]
#[command(name = "lendhero-dbinit", version)]
struct Cli {
    /// Deployment mode selecting `.env.<MODE>`. Defaults to `ENV`, then `development`.
    #[arg(long = "env", value_name = "MODE")]
    environment: Option<String>,

    /// Directory holding the `.env.<MODE>` files. Defaults to `ENV_DIR`, then the working directory.
    #[arg(long, value_name = "DIR")]
    env_dir: Option<PathBuf>,

    /// Exit with status 1 when the database could not be ensured.
    #[arg(long, env = "DB_BOOTSTRAP_STRICT")]
    strict: bool,

    /// Abort the connection attempt after this many seconds.
    #[arg(long, value_name = "SECS")]
    connect_timeout_secs: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = Settings::load_with(LoadOptions {
        environment: cli.environment,
        env_dir: cli.env_dir,
    })
    .with_context(|| "failed to load LendHero settings")?;

    lendhero_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = %settings.environment,
        database = ?settings.database,
        strict = cli.strict,
        "lendhero-dbinit starting"
    );

    let mut connector = MySqlConnector::new();
    if let Some(secs) = cli.connect_timeout_secs {
        connector = connector.with_connect_timeout(Duration::from_secs(secs));
    }

    let outcome = lendhero_app::run(&settings, &connector).await;

    if cli.strict && !outcome.is_ready() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
