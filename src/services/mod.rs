//! Services module
//!
//! Upstream API client and proxy relay logic.

mod upstream;

pub use upstream::{ProxyReply, UpstreamClient, MAX_BODY_SIZE};
