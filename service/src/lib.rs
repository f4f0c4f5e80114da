//! Denomina Service
//!
//! Embedding layer over the engines: optional FX conversion ahead of the
//! breakdown, constraint validation, alternatives, and row-level batch
//! processing. The `denomina` binary exposes it on the command line.

pub mod batch;
pub mod calculator;
pub mod config;
pub mod error;

pub use batch::{BatchRow, BatchSummary, RowOutcome, RowStatus};
pub use calculator::{Calculator, RateTable};
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
