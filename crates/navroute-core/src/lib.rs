//! Navroute Core - Shared library for the route and router crates
//!
//! This crate provides the router configuration and the elapsed-time clock
//! used for refresh TTL bookkeeping.

pub mod clock;
pub mod config;

pub use clock::{ElapsedClock, ManualClock, SystemElapsedClock};
pub use config::RouterConfig;
