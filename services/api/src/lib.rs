//! services/api/src/lib.rs
//!
//! The HTTP and Postgres adapters around `reading_tracker_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
