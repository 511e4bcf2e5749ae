use clap::Parser;

use vibrant_yoga::cli::{run_command, Cli};
use vibrant_yoga::config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "vibrant_yoga=warn,vibrant=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout carries the rendered pages
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config);
    tracing::debug!(backend = %config.api_base(), session_dir = %config.session_dir.display(), "starting");

    run_command(&cli, &config).await
}
