//! CLI entry point: serve the site in the current (or given) directory on
//! one loopback origin, mirror achievement progress in memory, open the
//! browser at the entry page.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use http::Method;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use siteserve::{ProgressStore, Router, Server, api, select_port, static_files};

/// The page the browser opens first.
const ENTRY_PAGE: &str = "/home.html";

/// Serve a static site from one origin so browser storage works across pages.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on; falls back to a free port if taken
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Do not auto-open the site in the default browser
    #[arg(long)]
    no_browser: bool,

    /// Document root to serve
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let root = match args.root.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("cannot resolve document root {}: {e}", args.root.display());
            return ExitCode::FAILURE;
        }
    };

    let port = match select_port(args.port) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("cannot find a port to listen on: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(ProgressStore::new());
    let static_root = Arc::new(root.clone());

    let app = Router::new()
        .on(Method::GET, api::ACHIEVEMENTS_PATH, {
            let store = Arc::clone(&store);
            move |req| api::get_achievements(Arc::clone(&store), req)
        })
        .on(Method::POST, api::ACHIEVEMENTS_PATH, {
            let store = Arc::clone(&store);
            move |req| api::post_achievements(Arc::clone(&store), req)
        })
        .fallback(move |req| static_files::serve(Arc::clone(&static_root), req));

    let url = format!("http://127.0.0.1:{port}{ENTRY_PAGE}");
    println!("Serving {} on http://127.0.0.1:{port}", root.display());
    println!("Open {url} to view the site. Press Ctrl+C to stop.");

    if !args.no_browser {
        if let Err(e) = open::that(&url) {
            warn!("could not open the browser: {e}");
        }
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match Server::bind(addr).serve(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
