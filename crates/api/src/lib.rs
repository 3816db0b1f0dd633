//! HTTP server for the meeting document service.
//!
//! The binary in `main.rs` loads configuration, connects both databases and
//! serves [`app::build_router`]. Integration tests build the same router
//! against a test pool.

pub mod app;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
