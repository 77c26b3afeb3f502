//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache.
//!
//! # Tasks
//! - Janitor: removes expired cache entries at a configured interval

mod janitor;
