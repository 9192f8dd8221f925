//! Pantry Core - Shared domain types.
//!
//! This crate provides the types shared by every pantry component:
//! - `server` - HTTP API for pantry items and recipe suggestions
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, user identities, item names,
//!   pantry items, and recipe suggestions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
