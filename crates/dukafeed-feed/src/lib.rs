//! Google Merchant (Shopping) feed generation for the duka catalog.
//!
//! Everything in this crate is pure, synchronous string-shaping: catalog
//! snapshots go in, an RSS/XML document comes out. Fetching rows, caching the
//! document, and serving it over HTTP are the callers' concerns
//! (`dukafeed-db`, `dukafeed-server`, `dukafeed-cli`).

pub mod categories;
pub mod describe;
pub mod error;
pub mod generator;
pub mod images;
pub mod pricing;
pub mod variants;
pub mod xml;

pub use categories::resolve_assignments;
pub use error::FeedError;
pub use generator::{build_feed, FeedConfig};
