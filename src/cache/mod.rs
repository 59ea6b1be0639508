//! Cache module for holding API responses in memory
//!
//! This module provides a time-expiring key/value store for raw response bodies.
//! Every entry shares the cache's single interval: a background sweeper wakes once
//! per interval and drops entries older than it. Reads never check age themselves,
//! so an entry can outlive its interval by up to one sweep period.

mod store;

pub use store::{Cache, CacheError};
