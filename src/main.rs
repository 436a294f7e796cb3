// Entrypoint for the CLI application.
// - Keeps `main` small: read flags and config, build the HTTP client and
//   hand it to the query loop.
// - Returns `anyhow::Result` so setup failures print with context.

use anyhow::Context;
use clap::Parser;
use diamond_query::{
    api::HttpClient,
    cli::Cli,
    config::Config,
    ui::{DialoguerPrompt, LineSource, Session},
};
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("diamond_query={}", cli.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let path = cli.config_path();
    if cli.init_config {
        Config::default()
            .save_to_file(&path)
            .context("Failed to write default config")?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = Config::load_from_file(&path)?;
    config.apply_env();
    if let Some(season) = cli.season.clone() {
        config.stats.season = season;
    }
    if cli.timeout.is_some() {
        config.timeout_secs = cli.timeout;
    }
    config.validate()?;
    if config.intent.subscription_key.is_empty() {
        tracing::warn!(
            "no intent subscription key configured; set {} or intent.subscription_key in {}",
            diamond_query::config::ENV_INTENT_KEY,
            path.display()
        );
    }

    let client = HttpClient::from_config(&config)?;
    let interactive = io::stdin().is_terminal();
    let color = !cli.no_color && io::stdout().is_terminal();
    let mut session = Session::new(client, config, io::stdout())
        .with_spinner(interactive)
        .with_color(color);

    if let Some(query) = cli.query.as_deref() {
        return session.answer(query);
    }

    if interactive {
        session.print_banner()?;
        session.run(&mut DialoguerPrompt)
    } else {
        session.run(&mut LineSource::new(io::stdin().lock()))
    }
}
