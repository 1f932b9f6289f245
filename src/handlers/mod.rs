//! Handlers module
//!
//! Request handlers for the auth flow and the proxy gateway.

pub mod auth;
pub mod proxy;
