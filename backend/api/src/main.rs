use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;
mod config;
mod handlers;
mod server;

use config::Settings;

#[derive(Parser)]
#[command(name = "peitho-server")]
#[command(about = "Peitho - Hong Kong bank intent classifier", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (default if no command specified)
    Serve {
        /// Address to bind (overrides API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT / API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify one inquiry and compare against the keyword baseline
    Classify {
        /// Customer inquiry text
        text: String,

        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Propose new intents from the built-in unclassified query sample
    Discover {
        /// Print raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let cli_args = Cli::parse();
    let mut settings = Settings::from_env()?;

    match cli_args.command {
        // Default: start server
        None => {
            server::start_server(settings).await?;
        }

        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            server::start_server(settings).await?;
        }

        Some(Commands::Classify { text, json }) => {
            cli::handle_classify(&settings, &text, json).await?;
        }

        Some(Commands::Discover { json }) => {
            cli::handle_discover(&settings, json).await?;
        }
    }

    Ok(())
}
