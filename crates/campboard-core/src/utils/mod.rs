//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{format_occupancy, format_optional, pluralize, truncate_string};
