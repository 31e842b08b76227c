//! Aligner case server library.
//!
//! Case records, the treatment-plan review workflow, the two case stores
//! (PostgreSQL and in-memory) and the HTTP API on top of them.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod store;
