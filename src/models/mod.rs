//! Data models module
//!
//! Wire types shared between handlers and the upstream client.

mod types;

pub use types::*;
