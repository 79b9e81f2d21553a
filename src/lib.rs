//! Shortener - per-user URL shortener service
//!
//! Accounts own short links, public slugs answer with a 302 to the
//! destination, and every hit is recorded for per-link statistics.
//!
//! # Architecture
//! - `storage`: SeaORM repositories (SQLite / MySQL / PostgreSQL)
//! - `services`: slug allocation, URL management, redirects, auth, stats
//! - `analytics`: asynchronous visit recording
//! - `api`: HTTP routes, middleware and JWT
//! - `config`: TOML + environment configuration
//! - `runtime`: startup wiring, server loop, graceful shutdown
//! - `system`: logging

pub mod analytics;
pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
