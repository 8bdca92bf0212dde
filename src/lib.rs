//! # siteserve
//!
//! A single-origin dev server for static multi-page sites.
//! Nothing more. Nothing less.
//!
//! ## Why it exists
//!
//! Open a multi-page site over `file://` and every page is its own origin:
//! `localStorage` written on one page is invisible on the next, so features
//! like achievement tracking silently break. Serve the same tree over HTTP
//! on loopback and the whole site shares one origin. That is the entire job.
//!
//! What a dev server does not need — siteserve intentionally skips:
//!
//! - **TLS** — it binds `127.0.0.1`, the traffic never leaves the machine
//! - **Authentication** — the only client is the developer's own browser
//! - **Persistence** — progress state is session-scoped by design; restart
//!   the process and the slate is clean
//! - **Hardening** — rate limits and body caps protect public servers from
//!   strangers; there are no strangers on loopback
//!
//! What is left:
//!
//! - Static files from a fixed document root, with index resolution,
//!   directory listings, and traversal rejection
//! - One JSON endpoint, `/api/achievements`, mirroring the site's progress
//!   state in memory behind a mutex
//! - A port selector that falls back to an OS-assigned port when the
//!   preferred one is taken
//! - Graceful shutdown on Ctrl-C — drains in-flight requests, exits 0
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use siteserve::{ProgressStore, Router, Server, api, select_port, static_files};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(ProgressStore::new());
//!     let root = Arc::new(PathBuf::from("."));
//!
//!     let app = Router::new()
//!         .on(http::Method::GET, api::ACHIEVEMENTS_PATH, {
//!             let store = Arc::clone(&store);
//!             move |req| api::get_achievements(Arc::clone(&store), req)
//!         })
//!         .on(http::Method::POST, api::ACHIEVEMENTS_PATH, {
//!             let store = Arc::clone(&store);
//!             move |req| api::post_achievements(Arc::clone(&store), req)
//!         })
//!         .fallback(move |req| static_files::serve(Arc::clone(&root), req));
//!
//!     let port = select_port(8000).unwrap();
//!     let addr = SocketAddr::from(([127, 0, 0, 1], port));
//!     Server::bind(addr).serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod port;
mod progress;
mod request;
mod response;
mod router;
mod server;

pub mod api;
pub mod static_files;

pub use error::Error;
pub use handler::Handler;
pub use port::select_port;
pub use progress::{ProgressRecord, ProgressStore, ValidationError};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;
