//! Core library for campboard.
//!
//! Holds everything the assignment board needs apart from the terminal:
//!
//! - `models`: camp records (campers, counselors, cabins, bunks, assignments)
//! - `api`: REST client for the camp data service
//! - `cache`: local JSON snapshot cache so the board renders before a refresh lands
//! - `config`: user configuration and environment overrides
//! - `board`: the drag-and-drop assignment engine

pub mod api;
pub mod board;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;
