//! Ecosystem status aggregation.
//!
//! Holds the component inventory and the per-service health table, and
//! fans notable events out to push-channel listeners.

pub mod aggregator;

pub use aggregator::Aggregator;
