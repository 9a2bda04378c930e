//! Core types for eventpass.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod item;
pub mod label;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use item::{Item, ParseItemError, REDEMPTION_DELTA};
pub use label::{BoothId, EmployeeId, LabelError};
pub use role::{ParseRoleError, Role};
