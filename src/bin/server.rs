use anyhow::Result;
use clap::{Parser, Subcommand};
use cotacao::config::AppConfig;
use cotacao::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Serve the current USD-BRL bid on /cotacao")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the quote server (default)
    Serve,
    /// Create default configuration
    Setup {
        /// Where to write the file instead of the platform config directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.config_path.as_deref()).await,
        Commands::Setup { path } => setup(path),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Server failed");
    }
    result
}

async fn serve(config_path: Option<&str>) -> Result<()> {
    let config = AppConfig::load_or_default(config_path)?;
    tracing::debug!("Loaded config: {config:#?}");
    cotacao::server::serve(&config.server).await
}

fn setup(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => AppConfig::default_config_path()?,
    };
    AppConfig::write_default(path)
}
