mod commands;
mod media;

use std::sync::Arc;

use anyhow::Context;
use shelf_core::browser::Browser;
use shelf_core::client::{HttpStorageClient, StorageApi};
use shelf_core::preview::media::MediaBackend;
use shelf_core::preview::PreviewDispatcher;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Usage: shelf [BACKEND_URL]");
    eprintln!();
    eprintln!("Interactive browser for a shelf storage backend.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BACKEND_URL   Base URL of the backend (e.g. http://127.0.0.1:3000).");
    eprintln!("                Falls back to the SHELF_BACKEND_URL environment variable.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --version   Print version and exit");
    eprintln!("  --help      Print this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut base_arg = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--version" => {
                println!("shelf {}", VERSION);
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
            other => base_arg = Some(other.to_string()),
        }
    }

    let Some(base) = base_arg.or_else(|| std::env::var("SHELF_BACKEND_URL").ok()) else {
        print_usage();
        std::process::exit(1);
    };

    // Logs go to stderr so they don't interleave with listings on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let base: Url = base.parse().context("invalid backend URL")?;
    info!("shelf {} connecting to {}", VERSION, base);

    let api: Arc<dyn StorageApi> = Arc::new(HttpStorageClient::new(base));
    let media: Arc<dyn MediaBackend> = Arc::new(media::ProbeMediaBackend::new());
    let browser = Browser::new(Arc::clone(&api));
    let previews = PreviewDispatcher::new(Arc::clone(&api), media);

    commands::run_loop(browser, previews, api).await
}
