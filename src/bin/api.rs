//! docsnap API server binary.
//!
//! This binary wires the MongoDB connector and the local filesystem into the
//! API server. The API layer stays agnostic of both backends.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use docsnap::api::{self, ApiError, Config};
use docsnap::snapshot::{ImportLayout, LocalFs};
use docsnap::store::MongoConnector;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("API server error: {0}")]
    #[diagnostic(code(docsnap::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "docsnap-api")]
#[command(author, version, about = "MongoDB snapshot API server", long_about = None)]
struct Cli {
    /// Host address to bind to (default: DOCSNAP_HOST env or 0.0.0.0)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (default: PORT env or 3000)
    #[arg(short, long)]
    port: Option<u16>,

    /// Snapshot directory (default: DOCSNAP_EXPORTS_DIR env or ./mongo-exports)
    #[arg(long)]
    exports_dir: Option<PathBuf>,

    /// Collections processed at once per job (default: DOCSNAP_CONCURRENCY env or 1)
    #[arg(long)]
    concurrency: Option<usize>,

    /// How import treats files nested below <database>/ (lenient or strict)
    #[arg(long, default_value = "lenient")]
    layout: ImportLayout,

    /// Bearer token required on snapshot endpoints (default: DOCSNAP_API_TOKEN env)
    #[arg(long)]
    api_token: Option<String>,

    /// Origin allowed for browser calls (default: FRONTEND_URL env or any origin)
    #[arg(long)]
    frontend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    let cli = Cli::parse();

    let mut config = Config::new();
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(dir) = cli.exports_dir {
        config = config.with_exports_dir(dir);
    }
    let mut options = config.options.with_layout(cli.layout);
    if let Some(n) = cli.concurrency {
        options = options.with_concurrency(n);
    }
    config = config.with_options(options);
    if let Some(token) = cli.api_token {
        config = config.with_api_token(token);
    }
    if let Some(origin) = cli.frontend_url {
        config = config.with_frontend_url(origin);
    }

    println!("🚀 docsnap API server starting...");
    println!("   API:      http://{}:{}/api", config.host, config.port);
    println!("   Docs:     http://{}:{}/docs", config.host, config.port);
    println!("   Snapshot: {}", config.exports_dir.display());
    println!();

    api::run(config, MongoConnector::new(), LocalFs::new()).await?;

    Ok(())
}
