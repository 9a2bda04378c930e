//! eventpass core - Shared domain types.
//!
//! This crate provides the types used across all eventpass components:
//! - `server` - HTTP service for attendees, booth staff and admins
//! - `cli` - Command-line tools for migrations and roster management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, employee/booth labels, roles and items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
