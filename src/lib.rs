//! Topicmarks: a bookmark organizer engine.
//!
//! Imports browser exports (Netscape HTML, CSV, JSON) into a single-rooted
//! topic tree, deduplicates on import, finds duplicate urls and guards topic
//! moves against cycles. The library exposes every module for the RPC binary
//! and the integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
