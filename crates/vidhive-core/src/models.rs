//! Domain models for VidHive.
//!
//! These are the core types shared across all crates.

pub mod user;
