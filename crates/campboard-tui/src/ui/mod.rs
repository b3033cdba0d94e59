//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title and status bars, overlays
//! - `board`: the pools and cabin-grouped bunk boxes, plus hit areas
//! - `input`: keyboard and mouse handling
//! - `styles`: color scheme and occupancy tiers

pub mod board;
pub mod input;
pub mod render;
pub mod styles;
