//! Sync layer: one request to the remote content pipeline per load, and the
//! day-cached flow that turns whatever comes back into a complete bundle.

pub mod fetcher;
pub mod loader;
pub mod session;
pub mod transport;

#[cfg(feature = "http")]
pub mod http;

pub use fetcher::{Connectivity, ContentFetcher, DashboardRequest, FetchFailure, FetcherConfig};
pub use loader::{DashboardLoader, LoadOutcome};
pub use session::new_session_id;
pub use transport::{RawResponse, Transport, TransportError};

#[cfg(feature = "http")]
pub use http::HttpTransport;
