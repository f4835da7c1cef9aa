use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segstore_storage::{Backend, LayoutType};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "segstore")]
#[command(about = "Segment store storage configuration tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported (backend, layout) pairs
    Factories,

    /// Validate a backend configuration and print a redacted summary
    Validate {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Backend: extendeds3, s3 or azure
        #[arg(short, long)]
        backend: Backend,

        /// Also build the storage factory for this layout: chunked or rolling
        #[arg(short, long)]
        layout: Option<LayoutType>,
    },

    /// Derive the primary and alternate extended S3 replicas
    Replicas {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Factories => commands::run_factories(),
        Commands::Validate {
            config,
            backend,
            layout,
        } => commands::run_validate(&config, backend, layout, tokio::runtime::Handle::current()),
        Commands::Replicas { config } => commands::run_replicas(&config),
    }
}
