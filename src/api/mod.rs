//! HTTP transport
//!
//! - Router and server lifecycle
//! - Request handlers
//! - Response bodies

pub mod handlers;
pub mod server;
pub mod types;
