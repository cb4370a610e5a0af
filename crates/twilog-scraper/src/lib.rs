//! Feed crawling and fact projection.
//!
//! The pipeline for one feed of one identity: [`FeedClient::fetch_feed`]
//! collects raw nodes down to the stored watermark, [`flatten`] resolves
//! repost and quote nesting, and the [`project`] functions derive the fact
//! rows that the store persists.

pub mod client;
pub mod error;
pub mod flatten;
pub mod probe;
pub mod project;
mod rate_limit;
pub mod shape;
pub mod tree;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use client::{decode_page, Credentials, FeedClient, FetchWindow, IdentityCache};
pub use error::ScraperError;
pub use flatten::{flatten, Author, EmbeddedRef, FlatRecord, ProfileCounters};
pub use probe::{HeadProbe, SizeProbe, UNKNOWN_SIZE};
pub use types::{FeedKind, FeedPage, Identity, RawNode};
