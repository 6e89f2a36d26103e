mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jobboard_lib::SyncConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse the job board admin lists from the terminal")]
struct Cli {
    /// Output format: table, json or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page of a list and print it
    List(commands::list::ListArgs),
    /// Interactive list session driven by commands on stdin
    Session(commands::session::SessionArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("jobboard=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        _ => OutputFormat::Table,
    };

    let config = SyncConfig::from_env();

    match &cli.command {
        Commands::List(args) => commands::list::run(args, &config, &format).await?,
        Commands::Session(args) => commands::session::run(args, &config, &format).await?,
    }

    Ok(())
}
