//! Pure constraint application over an ordered breakdown set.

use std::collections::BTreeMap;

use denomina_common::{Constraint, DenominaError, DenominationBreakdown, Result};
use denomina_engine::greedy_partition;
use denomina_registry::CurrencyConfig;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Breakdown entries keyed by denomination.
pub type BreakdownMap = BTreeMap<Decimal, DenominationBreakdown>;

/// Index breakdown entries by denomination.
pub fn to_map(breakdowns: impl IntoIterator<Item = DenominationBreakdown>) -> BreakdownMap {
    breakdowns
        .into_iter()
        .map(|entry| (entry.denomination(), entry))
        .collect()
}

/// Materialize entries descending by denomination.
pub fn into_descending(map: BreakdownMap) -> Vec<DenominationBreakdown> {
    map.into_values().rev().collect()
}

/// Apply one constraint, returning the rewritten set.
///
/// A constraint that cannot apply (a cap on an absent denomination, a
/// negative cap) leaves the set unchanged.
pub fn apply_constraint(
    mut map: BreakdownMap,
    constraint: &Constraint,
    config: &CurrencyConfig,
) -> Result<BreakdownMap> {
    match constraint {
        Constraint::Avoid { denomination } => {
            if let Some(removed) = map.remove(denomination) {
                debug!(
                    denomination = %denomination,
                    removed_value = %removed.total_value(),
                    "Avoided denomination"
                );
            }
            Ok(map)
        }
        Constraint::Cap {
            denomination,
            value,
        } => cap(map, *denomination, *value, config),
        Constraint::Only { denominations } => {
            map.retain(|d, _| denominations.contains(d));
            Ok(map)
        }
        Constraint::Minimize { .. } | Constraint::Require { .. } => {
            debug!(constraint = %constraint, "Constraint has no effect on the breakdown");
            Ok(map)
        }
    }
}

fn cap(
    mut map: BreakdownMap,
    denomination: Decimal,
    max: i64,
    config: &CurrencyConfig,
) -> Result<BreakdownMap> {
    let Ok(max) = u128::try_from(max) else {
        warn!(denomination = %denomination, max, "Ignoring negative cap");
        return Ok(map);
    };
    let Some(entry) = map.get(&denomination) else {
        return Ok(map);
    };
    if entry.count() <= max {
        return Ok(map);
    }

    let capped = entry.with_count(max)?;
    let excess = entry.total_value() - capped.total_value();
    if max == 0 {
        map.remove(&denomination);
    } else {
        map.insert(denomination, capped);
    }

    let smaller: Vec<Decimal> = config
        .all_denominations()
        .iter()
        .copied()
        .filter(|d| *d < denomination)
        .collect();
    let partition = greedy_partition(excess, &smaller, config)?;

    if !partition.remainder.is_zero() {
        warn!(
            denomination = %denomination,
            unallocated = %partition.remainder,
            "Capped value could not be fully redistributed"
        );
    }

    for added in partition.breakdowns {
        let merged = match map.get(&added.denomination()) {
            Some(existing) => {
                let count = existing.count().checked_add(added.count()).ok_or_else(|| {
                    DenominaError::Overflow(format!(
                        "count for {} exceeds u128",
                        added.denomination()
                    ))
                })?;
                existing.with_count(count)?
            }
            None => added,
        };
        map.insert(merged.denomination(), merged);
    }

    debug!(
        denomination = %denomination,
        max = %max,
        redistributed = %excess,
        "Capped denomination"
    );

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use denomina_common::CurrencyCode;
    use denomina_registry::CurrencyRegistry;
    use rust_decimal_macros::dec;

    fn inr() -> CurrencyConfig {
        CurrencyRegistry::builtin()
            .unwrap()
            .get(&CurrencyCode::parse("INR").unwrap())
            .unwrap()
            .clone()
    }

    fn breakdown(config: &CurrencyConfig, amount: Decimal) -> BreakdownMap {
        to_map(
            greedy_partition(amount, config.all_denominations(), config)
                .unwrap()
                .breakdowns,
        )
    }

    fn total(map: &BreakdownMap) -> Decimal {
        map.values().map(|b| b.total_value()).sum()
    }

    #[test]
    fn test_avoid_removes_without_redistribution() {
        let config = inr();
        let map = breakdown(&config, dec!(10000));
        let avoid = Constraint::Avoid {
            denomination: dec!(2000),
        };

        let result = apply_constraint(map, &avoid, &config).unwrap();

        assert!(!result.contains_key(&dec!(2000)));
        assert!(total(&result) < dec!(10000));
    }

    #[test]
    fn test_cap_redistributes_into_smaller_denominations() {
        let config = inr();
        let map = breakdown(&config, dec!(10500));
        let cap = Constraint::Cap {
            denomination: dec!(2000),
            value: 2,
        };

        let result = apply_constraint(map, &cap, &config).unwrap();

        assert_eq!(result[&dec!(2000)].count(), 2);
        // 6000 excess becomes 12 x 500, merged with the existing 500.
        assert_eq!(result[&dec!(500)].count(), 13);
        assert_eq!(total(&result), dec!(10500));
    }

    #[test]
    fn test_cap_zero_drops_entry() {
        let config = inr();
        let map = breakdown(&config, dec!(4000));
        let cap = Constraint::Cap {
            denomination: dec!(2000),
            value: 0,
        };

        let result = apply_constraint(map, &cap, &config).unwrap();

        assert!(!result.contains_key(&dec!(2000)));
        assert_eq!(result[&dec!(500)].count(), 8);
        assert_eq!(total(&result), dec!(4000));
    }

    #[test]
    fn test_cap_smallest_denomination_leaves_shortfall() {
        let config = inr();
        let map = breakdown(&config, dec!(3));
        let cap = Constraint::Cap {
            denomination: dec!(1),
            value: 0,
        };

        let result = apply_constraint(map, &cap, &config).unwrap();

        assert!(!result.contains_key(&dec!(1)));
        assert_eq!(total(&result), dec!(2));
    }

    #[test]
    fn test_cap_noops() {
        let config = inr();
        let map = breakdown(&config, dec!(2500));

        let under = Constraint::Cap {
            denomination: dec!(2000),
            value: 5,
        };
        let absent = Constraint::Cap {
            denomination: dec!(200),
            value: 0,
        };
        let negative = Constraint::Cap {
            denomination: dec!(2000),
            value: -1,
        };

        for constraint in [under, absent, negative] {
            let result = apply_constraint(map.clone(), &constraint, &config).unwrap();
            assert_eq!(result, map);
        }
    }

    #[test]
    fn test_only_filters() {
        let config = inr();
        let map = breakdown(&config, dec!(2555));
        let only = Constraint::Only {
            denominations: vec![dec!(2000), dec!(50), dec!(5)],
        };

        let result = apply_constraint(map, &only, &config).unwrap();

        let kept: Vec<Decimal> = result.keys().copied().collect();
        assert_eq!(kept, vec![dec!(5), dec!(50), dec!(2000)]);
        assert_eq!(total(&result), dec!(2055));
    }

    #[test]
    fn test_minimize_and_require_pass_through() {
        let config = inr();
        let map = breakdown(&config, dec!(777));

        for constraint in [
            Constraint::Minimize {
                denomination: dec!(500),
            },
            Constraint::Require {
                denomination: dec!(100),
                value: 3,
            },
        ] {
            let result = apply_constraint(map.clone(), &constraint, &config).unwrap();
            assert_eq!(result, map);
        }
    }

    #[test]
    fn test_into_descending() {
        let config = inr();
        let entries = into_descending(breakdown(&config, dec!(2712)));
        let order: Vec<Decimal> = entries.iter().map(|b| b.denomination()).collect();
        assert_eq!(order, vec![dec!(2000), dec!(500), dec!(200), dec!(10), dec!(2)]);
    }
}
