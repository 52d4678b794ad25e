//! interpals_client: unofficial client for the Interpals social network.
//!
//! The site exposes no public API, so this crate authenticates as a browser
//! session and parses server-rendered HTML (plus a few JSON-over-HTML
//! endpoints) into typed records: profiles, search results, chat threads and
//! messages, friends, albums and pictures.
//!
//! # Example
//!
//! ```no_run
//! use interpals_client::{Client, SearchOptions, Session};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::new("anna", "session-id", "csrf-cookie");
//! let client = Client::new(session);
//!
//! let profile = client.profile("some_user").await?;
//! println!("{} is from {}", profile.username, profile.current_city);
//!
//! let results = client
//!     .search_collect(&SearchOptions::default(), 50, Duration::from_secs(1))
//!     .await?;
//! println!("{} matches", results.len());
//! # Ok(())
//! # }
//! ```
//!
//! Login is out of scope: a [`Session`] is constructed from cookie values
//! obtained externally. The async client needs a Tokio runtime; the
//! [`blocking`] module wraps it for synchronous callers.

pub mod blocking;
mod client;
mod error;
pub mod jobs;
mod models;
mod params;
pub mod parse;
mod search;
mod session;
mod transport;

pub use client::Client;
pub use error::{ApiError, Result, TransportError};
pub use models::{
    Album, ChatMessage, ChatOverview, ChatSummary, FriendEntry, Gender, Language, Picture,
    Profile, SearchResult,
};
pub use params::Params;
pub use search::{Continent, OptionsError, SearchOptions, Sex, SortOrder};
pub use session::{CookieSet, Session};
pub use transport::{
    is_authenticated, HttpTransport, Outcome, Transport, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
    USER_AGENT,
};
