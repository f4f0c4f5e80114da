//! Denomina Denomination Engine
//!
//! Breaks an amount into a count of notes and coins for a configured
//! currency.
//!
//! # Features
//!
//! - Mode-dependent denomination ordering
//! - Greedy partition over exact integer minor units (no floating point)
//! - Alternative breakdowns under other optimization modes
//! - Amount validation against the currency's smallest unit
//!
//! The greedy partition minimizes piece count only for canonical
//! denomination systems. Canonicity of a configured set is not verified.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use denomina_common::CalculationRequest;
//! use denomina_engine::DenominationEngine;
//! use denomina_registry::CurrencyRegistry;
//!
//! let engine = DenominationEngine::new(Arc::new(CurrencyRegistry::builtin().unwrap()));
//! let request = CalculationRequest::parse("50000", "INR").unwrap();
//! let result = engine.calculate(&request).unwrap();
//! assert_eq!(result.total_value(), request.amount);
//! ```

pub mod engine;
pub mod partition;

#[cfg(test)]
mod props;

pub use engine::{CurrencyInfo, DenominationEngine};
pub use partition::{greedy_partition, Partition};
