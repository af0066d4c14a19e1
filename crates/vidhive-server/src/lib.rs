//! VidHive HTTP server: routing, request handlers, session cookies,
//! and the uniform response envelope over the auth and storage crates.

pub mod api;
pub mod config;
