//! # PrRoster Shared Library
//!
//! This crate contains the data layer and the reviewer assignment engine used
//! by the PrRoster API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, teams, pull requests, reviewer rows)
//! - `assignment`: Reviewer assignment, reassignment, deactivation cascade and
//!   pull request lifecycle

pub mod assignment;
pub mod db;
pub mod models;

/// Current version of the PrRoster shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
