//! Flashpoint Net Layer
//!
//! Shared plumbing for the source adapters:
//! - HTTP client construction with timeouts, retries and user-agent rotation
//! - RSS 2.0 / Atom item extraction
//! - HTML-to-text stripping for feed summaries
//! - Bounded concurrent feed fetches

pub mod client;
pub mod feed;
pub mod html;

pub use client::*;
pub use feed::*;
pub use html::*;
