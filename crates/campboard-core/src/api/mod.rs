//! REST API client module for the camp data service.
//!
//! This module provides the `ApiClient` for reading an event's board records
//! (bunks, cabins, assignments, unassigned campers, counselors) and for the
//! four writes the board issues: create, delete, and move an assignment, and
//! set or clear a bunk's counselor.
//!
//! Requests carry a bearer token taken from the configuration; obtaining the
//! token is the surrounding application's job.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
