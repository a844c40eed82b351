//! Carrot-Mapper web library.
//!
//! Backend-for-frontend over the Carrot-Mapper Django API: forwards the
//! browser's session to the backend, composes table views with their
//! concepts, permissions and jobs, and serves file exports.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod query;
pub mod resources;
pub mod services;
