use anyhow::Result;
use clap::Parser;
use cotacao::config::AppConfig;
use cotacao::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Fetch the current bid from the quote server and save it")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,

    /// Quote server endpoint, overrides the configured one
    #[arg(long)]
    url: Option<String>,

    /// File to write the quote to, overrides the configured one
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Client failed");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load_or_default(cli.config_path.as_deref())?.client;
    if let Some(url) = cli.url {
        config.server_url = url;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }

    cotacao::client::run(&config).await?;
    Ok(())
}
