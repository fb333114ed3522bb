pub mod api_client;
mod commands;
pub mod error;

use clap::{Parser, Subcommand};
use miette::Result;

#[derive(Parser)]
#[command(name = "docsnap")]
#[command(author, version, about = "MongoDB snapshot CLI", long_about = None)]
pub struct Cli {
    /// Override the API URL (default: DOCSNAP_API_URL env or http://localhost:3000)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the API (default: DOCSNAP_API_TOKEN env)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every user collection into the server's snapshot directory
    Export {
        /// MongoDB connection URI
        #[arg(long)]
        uri: String,
    },
    /// Import the server's snapshot directory into a store
    Import {
        /// MongoDB connection URI
        #[arg(long)]
        uri: String,
    },
}

pub async fn run() -> Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let api_client = api_client::ApiClient::new(cli.api_url, cli.token);

    let output = match cli.command {
        Some(Commands::Export { uri }) => commands::snapshot::export(&api_client, &uri).await?,
        Some(Commands::Import { uri }) => commands::snapshot::import(&api_client, &uri).await?,
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["docsnap", "--help"]);
            return Ok(());
        }
    };

    println!("{}", output);
    Ok(())
}
