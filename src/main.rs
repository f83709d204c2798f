mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rejoinder::{config, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rejoinder", version, about = "Knowledge-base chat responder with generative fallback")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Answer a single message from the command line
    Ask {
        /// The message to answer
        message: String,
        /// User id to record the exchange under
        #[arg(long, default_value = "cli")]
        user_id: String,
        /// Append the exchange to the conversation log
        #[arg(long)]
        record: bool,
    },
    /// Show knowledge base and conversation statistics
    Stats,
    /// Check the store file and report malformed entries
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let mut config = config::RejoinderConfig::load()?;

    // Log to stderr so stdout stays clean for CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await?;
        }
        Command::Ask {
            message,
            user_id,
            record,
        } => {
            cli::ask::ask(config, &message, &user_id, record).await?;
        }
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
