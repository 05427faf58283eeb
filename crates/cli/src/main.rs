//! pharmhand CLI — the main entry point.
//!
//! Commands:
//! - `serve` — Start the HTTP chat gateway
//! - `chat`  — Send a single message and stream the reply to stdout

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pharmhand",
    about = "pharmhand — streaming pharmacy chat assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single message and stream the reply
    Chat {
        /// The gated user identifier
        #[arg(short, long)]
        user_id: String,

        /// The message to send
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { user_id, message } => commands::chat::run(user_id, message).await?,
    }

    Ok(())
}
