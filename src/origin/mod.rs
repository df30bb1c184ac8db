//! Origin subsystem.
//!
//! # Data Flow
//! ```text
//! inbound path ("/soccer/premier_league/mancity.ics")
//!     → client.rs (base URL + path, verbatim concatenation)
//!     → reqwest GET against the origin
//!     → reqwest::Response handed back to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - One pooled client for the process; it is cheap to clone per request
//! - No retries and no status interpretation here; the caller decides
//! - Transport failures surface as `ProxyError::Upstream`

pub mod client;

pub use client::{origin_url, OriginClient};
