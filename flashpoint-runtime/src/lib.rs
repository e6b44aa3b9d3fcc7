//! Flashpoint Runtime
//!
//! Runs the aggregation pipeline behind a single service object:
//! - Concurrent adapter fan-out with per-call timeouts
//! - Decay tracker ownership and seed reconciliation
//! - TTL result cache with in-flight computation sharing
//! - Static fallback when every event source is down

pub mod cache;
pub mod config;
pub mod fallback;
pub mod service;
pub mod status;

pub use cache::*;
pub use config::*;
pub use fallback::*;
pub use service::*;
pub use status::*;
