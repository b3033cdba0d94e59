//! Local caching module for instant startup.
//!
//! This module provides the `CacheManager` for storing the last board
//! snapshot fetched for each event. The board renders the cached snapshot
//! immediately while a refresh runs, and the cached copy is considered stale
//! after 15 minutes.
//!
//! Only service records are cached. Drag state never touches disk.

pub mod manager;

pub use manager::{CacheManager, CachedData};
