//! Business logic services for the event server.
//!
//! # Services
//!
//! - `session` - Signed, stateless session tokens
//! - `export` - CSV rendering of the redemption log
//! - `qr` - QR code rendering for attendee badges

pub mod export;
pub mod qr;
pub mod session;

pub use session::{SessionError, SessionKeys};
