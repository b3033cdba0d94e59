//! Data models for camp records.
//!
//! This module contains the records the assignment board reads:
//!
//! - `Camper`, `Counselor`: people owned by the external roster service
//! - `Cabin`, `Bunk`: physical housing, bunks optionally grouped under a cabin
//! - `Assignment`: one camper occupying one bunk for one event
//! - `BoardSnapshot`: the read-refreshed record set for a single event

pub mod assignment;
pub mod housing;
pub mod person;
pub mod snapshot;

pub use assignment::{Assignment, AssignmentCreate, AssignmentMove, BunkCounselorUpdate};
pub use housing::{Bunk, Cabin};
pub use person::{Camper, Counselor};
pub use snapshot::BoardSnapshot;
