//! Property-based tests for constraint application.
//!
//! - Cap bounds the capped entry and conserves value
//! - Avoid leaves no trace of the avoided denomination

use std::sync::Arc;

use denomina_common::{CalculationRequest, Constraint, CurrencyCode};
use denomina_engine::DenominationEngine;
use denomina_registry::CurrencyRegistry;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::engine::OptimizationEngine;

fn optimizer() -> OptimizationEngine {
    let registry = Arc::new(CurrencyRegistry::builtin().unwrap());
    OptimizationEngine::new(DenominationEngine::new(registry))
}

/// Whole rupees, 1 to 10,000,000.
fn inr_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(Decimal::from)
}

/// INR denominations that have something smaller to redistribute into.
fn cappable_inr() -> impl Strategy<Value = Decimal> {
    prop::sample::select(vec![
        Decimal::from(2000),
        Decimal::from(500),
        Decimal::from(200),
        Decimal::from(100),
        Decimal::from(50),
        Decimal::from(20),
        Decimal::from(10),
        Decimal::from(5),
        Decimal::from(2),
    ])
}

fn request(amount: Decimal, constraints: Vec<Constraint>) -> CalculationRequest {
    CalculationRequest::new(amount, CurrencyCode::parse("INR").unwrap())
        .unwrap()
        .with_constraints(constraints)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_cap_bounds_count_and_conserves_value(
        amount in inr_amount(),
        denomination in cappable_inr(),
        max in 0i64..20,
    ) {
        let constraints = vec![Constraint::Cap { denomination, value: max }];
        let result = optimizer().calculate(&request(amount, constraints)).unwrap();

        if let Some(entry) = result.breakdown_for(denomination) {
            prop_assert!(entry.count() <= max as u128);
        }
        prop_assert_eq!(result.total_value(), amount);
        prop_assert!(!result.metadata.contains_key("unallocated_amount"));
    }

    #[test]
    fn prop_avoid_removes_denomination(amount in inr_amount(), denomination in cappable_inr()) {
        let optimizer = optimizer();
        let plain = optimizer.calculate(&request(amount, vec![])).unwrap();
        let avoided = optimizer
            .calculate(&request(amount, vec![Constraint::Avoid { denomination }]))
            .unwrap();

        prop_assert!(avoided.breakdown_for(denomination).is_none());
        match plain.breakdown_for(denomination) {
            Some(entry) => prop_assert_eq!(avoided.total_value(), amount - entry.total_value()),
            None => prop_assert_eq!(avoided.total_value(), amount),
        }
    }
}
