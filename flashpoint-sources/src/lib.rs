//! Flashpoint Sources
//!
//! Source adapters for the threat engine. Every adapter returns one
//! normalized shape and degrades failures to an empty result:
//! - **ACLED**: geolocated armed conflict events (primary signal)
//! - **Headlines**: conflict news RSS items (primary signal)
//! - **Crisis watch**: named long-running conflicts from tracker feeds (hints)
//! - **ReliefWeb**: humanitarian conflict reports per country (hints)

pub mod acled;
pub mod crisis_watch;
pub mod headlines;
pub mod registry;
pub mod reliefweb;
pub mod traits;

pub use acled::*;
pub use crisis_watch::*;
pub use headlines::*;
pub use registry::*;
pub use reliefweb::*;
pub use traits::*;
