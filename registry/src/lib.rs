//! Denomina Currency Registry
//!
//! Process-wide, read-only mapping from currency code to its denomination
//! configuration. Built once from a static JSON source and shared by
//! reference (`Arc<CurrencyRegistry>`) with every engine instance.
//!
//! # Example
//!
//! ```rust
//! use denomina_common::CurrencyCode;
//! use denomina_registry::CurrencyRegistry;
//!
//! let registry = CurrencyRegistry::builtin().unwrap();
//! let inr = registry.get(&CurrencyCode::parse("INR").unwrap()).unwrap();
//! assert_eq!(inr.symbol, "₹");
//! ```

pub mod config;
pub mod registry;

pub use config::CurrencyConfig;
pub use registry::CurrencyRegistry;
