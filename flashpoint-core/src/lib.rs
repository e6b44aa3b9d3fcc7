//! Flashpoint Core - Conflict signal model and scoring primitives
//!
//! This crate provides the I/O-free building blocks of the threat engine:
//! - Canonical conflict entities and the ordered location resolver
//! - Rolling-window aggregation of raw event observations
//! - Volume + acceleration scoring and level classification
//! - Seed baselines that decay over wall-clock time and are reinforced by live evidence
//! - Upgrade-only merging of secondary severity hints

pub mod aggregate;
pub mod assess;
pub mod clock;
pub mod config;
pub mod decay;
pub mod entities;
pub mod merge;
pub mod resolver;
pub mod scoring;
pub mod signals;

pub use aggregate::*;
pub use assess::*;
pub use clock::*;
pub use config::*;
pub use decay::*;
pub use entities::*;
pub use merge::*;
pub use resolver::*;
pub use scoring::*;
pub use signals::*;

/// Default rolling window length in days
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Default per-interval decay multiplier for seed baselines
pub const DEFAULT_DECAY_RATE: f64 = 0.97;

/// Default decay interval in seconds (one day)
pub const DEFAULT_DECAY_INTERVAL_SECS: i64 = 86_400;

/// Default initial score for seed entities
pub const DEFAULT_SEED_SCORE: f64 = 25.0;

/// Assumed growth rate for an entity with no prior-window events
pub const DEFAULT_NEW_SIGNAL_RATE: f64 = 0.5;
