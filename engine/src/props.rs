//! Property-based tests for the denomination engine.
//!
//! - Value conservation for amounts on the smallest-unit grid
//! - Strictly descending, non-zero breakdown entries
//! - Note/coin totals agree with the entries
//! - Deterministic output

use std::sync::Arc;

use denomina_common::{CalculationRequest, CurrencyCode, OptimizationMode};
use denomina_registry::CurrencyRegistry;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::engine::DenominationEngine;

fn engine() -> DenominationEngine {
    DenominationEngine::new(Arc::new(CurrencyRegistry::builtin().unwrap()))
}

/// Whole rupees, 1 to 10,000,000.
fn inr_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(Decimal::from)
}

/// Cents, 0.01 to 1,000,000.00.
fn cent_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn cent_currency() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("USD"), Just("EUR"), Just("GBP")]
}

fn mode() -> impl Strategy<Value = OptimizationMode> {
    prop_oneof![
        Just(OptimizationMode::Greedy),
        Just(OptimizationMode::MinimizeLarge),
        Just(OptimizationMode::Balanced),
        Just(OptimizationMode::MinimizeSmall),
    ]
}

fn request(amount: Decimal, currency: &str, mode: OptimizationMode) -> CalculationRequest {
    CalculationRequest::new(amount, CurrencyCode::parse(currency).unwrap())
        .unwrap()
        .with_mode(mode)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The breakdown always sums back to an INR amount.
    #[test]
    fn prop_inr_value_conserved(amount in inr_amount(), mode in mode()) {
        let result = engine().calculate(&request(amount, "INR", mode)).unwrap();
        prop_assert_eq!(result.total_value(), amount);
    }

    /// The breakdown always sums back to a cent-denominated amount.
    #[test]
    fn prop_cent_value_conserved(
        amount in cent_amount(),
        currency in cent_currency(),
        mode in mode(),
    ) {
        let result = engine().calculate(&request(amount, currency, mode)).unwrap();
        prop_assert_eq!(result.total_value(), amount);
        prop_assert_eq!(result.shortfall(), Decimal::ZERO);
    }

    #[test]
    fn prop_entries_descending_and_non_zero(
        amount in cent_amount(),
        currency in cent_currency(),
        mode in mode(),
    ) {
        let result = engine().calculate(&request(amount, currency, mode)).unwrap();

        for pair in result.breakdowns.windows(2) {
            prop_assert!(pair[0].denomination() > pair[1].denomination());
        }
        for entry in &result.breakdowns {
            prop_assert!(entry.count() > 0);
            prop_assert_eq!(
                entry.total_value(),
                entry.denomination() * Decimal::from(entry.count() as u64)
            );
        }
    }

    #[test]
    fn prop_totals_agree_with_entries(amount in inr_amount(), mode in mode()) {
        let result = engine().calculate(&request(amount, "INR", mode)).unwrap();

        let notes: u128 = result.breakdowns.iter().filter(|b| b.is_note()).map(|b| b.count()).sum();
        let coins: u128 = result.breakdowns.iter().filter(|b| b.is_coin()).map(|b| b.count()).sum();
        prop_assert_eq!(result.total_notes, notes);
        prop_assert_eq!(result.total_coins, coins);
        prop_assert_eq!(result.total_denominations, notes + coins);
    }

    /// Greedy never uses more pieces than smallest-first.
    #[test]
    fn prop_greedy_uses_fewest_pieces(amount in cent_amount(), currency in cent_currency()) {
        let engine = engine();
        let greedy = engine.calculate(&request(amount, currency, OptimizationMode::Greedy)).unwrap();
        let smallest_first = engine
            .calculate(&request(amount, currency, OptimizationMode::MinimizeLarge))
            .unwrap();
        prop_assert!(greedy.total_denominations <= smallest_first.total_denominations);
    }

    #[test]
    fn prop_deterministic(amount in cent_amount(), currency in cent_currency(), mode in mode()) {
        let engine = engine();
        let request = request(amount, currency, mode);
        let first = serde_json::to_string(&engine.calculate(&request).unwrap()).unwrap();
        let second = serde_json::to_string(&engine.calculate(&request).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }
}
