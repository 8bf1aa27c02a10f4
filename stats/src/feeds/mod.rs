//! # Feeds
//!
//! The four upstream feeds a refresh cycle pulls from.
//!
//! - **`FeedClient`**: fetch capability, one method per feed
//! - **`HttpFeedClient`**: reqwest implementation against the dashboard API
//! - **`FallbackSynthesizer`**: zero-valued stand-in data when a fetch fails

pub mod client;
pub mod fallback;
pub mod http;

pub use client::{
    FeedClient,
    FeedError,
    FeedFuture,
    FeedKind,
};
pub use fallback::FallbackSynthesizer;
pub use http::HttpFeedClient;
