//! # market-dl
//!
//! Client library for a private, binary, session-oriented app-market
//! delivery protocol.
//!
//! ## Design Philosophy
//!
//! market-dl is designed to be:
//! - **Explicit** - every operation takes its transport and session as
//!   parameters; there is no process-wide default client or ambient session
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Non-resilient by default** - no internal retries or timeouts beyond
//!   the transport's; failures surface immediately, and callers opting into
//!   resilience wrap operations with [`retry::with_retry`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use market_dl::{
//!     auth, handshake, purchase, DeviceProperties, Endpoints, HttpTransport, Service, Session,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new()?;
//!     let endpoints = Endpoints::default();
//!     let mut session = Session::new(
//!         "user@example.org",
//!         "<long-lived account token>",
//!         DeviceProperties::default(),
//!     );
//!
//!     // Bootstrap the device identity and the storefront token.
//!     handshake::check_in(&transport, &endpoints, &mut session).await?;
//!     handshake::upload_device_config(&transport, &endpoints, &mut session).await?;
//!     auth::exchange(&transport, &endpoints, &mut session, Service::Play).await?;
//!     auth::fetch_toc(&transport, &endpoints, &mut session).await?;
//!
//!     // Run the purchase/delivery transaction.
//!     let artifacts =
//!         purchase::purchase(&transport, &endpoints, &session, "com.example.app", 5, 1).await?;
//!     for artifact in artifacts {
//!         println!("{} <- {} ({} bytes)", artifact.name, artifact.url, artifact.size);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Token exchange and session gates
pub mod auth;
/// Catalog queries (details, search, reviews, library)
pub mod catalog;
/// Configuration types (device profile, endpoints, retry policy)
pub mod config;
/// Response envelope codec
pub mod envelope;
/// Error types
pub mod error;
/// Device check-in and configuration upload
pub mod handshake;
/// Catalog domain models
pub mod models;
/// Wire format messages
pub mod proto;
/// Purchase/delivery transaction
pub mod purchase;
/// Retry logic with exponential backoff (caller-side)
pub mod retry;
/// Session aggregate
pub mod session;
/// Pagination/stream decoding
pub mod stream;
/// HTTP transport seam
pub mod transport;
/// Core types
pub mod types;
/// Response parsing utilities
pub mod utils;

// Re-export commonly used types
pub use auth::Service;
pub use config::{DeviceProperties, Endpoints, RetryConfig};
pub use envelope::{Envelope, PayloadKind};
pub use error::{Error, Result};
pub use models::{App, Artwork, Rating, Review};
pub use purchase::PurchaseGrant;
pub use session::{DeviceIdentity, Session};
pub use stream::{StreamBundle, StreamCluster};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{Artifact, ArtifactKind};
