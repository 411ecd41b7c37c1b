//! jobspec CLI entrypoint.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

#[cfg(test)]
mod handlers_tests;

use commands::{Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "jobspec")]
#[command(author, version, about = "Build job specification tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load().unwrap_or_default();
    init_tracing(&config);

    match cli.command {
        Commands::Init => handlers::init(&config).await?,
        Commands::Validate { path } => handlers::validate(&config, &path).await?,
        Commands::Match { path, event } => handlers::match_event(&config, &path, &event).await?,
        Commands::Query { commit, job } => handlers::query(&commit, &job)?,
        Commands::Plan { path } => handlers::plan(&config, &path).await?,
        Commands::Retries { path, job } => handlers::retries(&config, &path, &job).await?,
        Commands::Schedule { path } => handlers::schedule(&config, &path).await?,
        Commands::Schema => handlers::schema()?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
