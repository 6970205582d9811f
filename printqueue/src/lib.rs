//! Print queue upload gateway
//!
//! Issues signed object-storage URLs for uploading and downloading files and
//! lists what has been uploaded.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Access gates and CORS
pub mod middleware;

/// Object storage seam
pub mod object_store;

/// HTTP routes
pub mod routes;

/// Server setup
pub mod server;

/// Configuration, errors and extractors
pub mod types;
