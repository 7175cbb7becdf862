//! API client module for the file repository service.
//!
//! Provides the HTTP client with bearer token injection, token persistence,
//! one query function per resource operation, and the request/response types
//! matching the service's JSON.

pub mod auth;
pub mod categories;
pub mod client;
pub mod error;
pub mod files;
pub mod response;
pub mod types;
pub mod users;
