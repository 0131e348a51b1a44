//! Field-level change history for assets and staff.
//!
//! [`tracker`] decides which tracked fields changed between two snapshots,
//! [`writer`] appends the resulting rows. History writes never fail the
//! entity write they belong to.

pub mod tracker;
pub mod writer;

pub use tracker::*;
pub use writer::*;
