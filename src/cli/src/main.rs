use anyhow::Context;
use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    shared::telemetry::init(&config.telemetry()).context("failed to initialise logging")?;
    tracing::debug!(
        backend = ?config.llm.backend,
        model = %config.llm.model(),
        "configuration loaded"
    );

    let code = CliApp::new(config).run(cli).await;
    std::process::exit(code);
}
