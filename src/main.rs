//! CLI entry point for content-server

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "content-server")]
#[command(version)]
#[command(about = "Serve markdown posts with front-matter as a JSON API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to the configured host)
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// List published posts
    List {
        /// Also show drafts and files that failed to load
        #[arg(short, long)]
        all: bool,
    },

    /// Print a single post as JSON
    Show {
        /// Slug of the post
        slug: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "content_server=debug,tower_http=debug,info"
    } else {
        "content_server=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let site = content_server::Site::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| site.config.host.clone());
            let port = port.unwrap_or(site.config.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            site.serve(&ip, port).await?;
        }

        Commands::List { all } => {
            let site = content_server::Site::new(&base_dir)?;
            content_server::commands::list::run(&site, all)?;
        }

        Commands::Show { slug } => {
            let site = content_server::Site::new(&base_dir)?;
            content_server::commands::show::run(&site, &slug)?;
        }

        Commands::Version => {
            println!("content-server version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
