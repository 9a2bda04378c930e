//! Domain models for the event server.

pub mod attendee;
pub mod redemption;
pub mod session;

pub use attendee::{
    Attendee, AttendeePatch, AttendeeSearch, NewAttendee, PageMeta, RosterEntry,
};
pub use redemption::{LogFilter, QuotaSnapshot, RedemptionLogEntry, RedemptionRequest};
pub use session::{SESSION_COOKIE, SessionClaims};
