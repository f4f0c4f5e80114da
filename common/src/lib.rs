//! Denomina Common Types
//!
//! This crate contains the data model shared by every Denomina crate:
//! currency codes, optimization modes, constraints, breakdown entries,
//! and the calculation request/result pair exchanged with callers.

pub mod calculation;
pub mod constraint;
pub mod error;
pub mod monetary;

pub use calculation::*;
pub use constraint::*;
pub use error::*;
pub use monetary::*;
