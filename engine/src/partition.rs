//! Greedy partition over exact minor units.

use denomina_common::{
    common_scale, from_minor_units, to_minor_units, DenominaError, DenominationBreakdown, Result,
};
use denomina_registry::CurrencyConfig;
use rust_decimal::Decimal;

/// Output of a greedy partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Entries with a non-zero count, descending by denomination.
    pub breakdowns: Vec<DenominationBreakdown>,
    /// Value left once the denomination list was exhausted.
    pub remainder: Decimal,
    /// Part of `remainder` that is a whole number of smallest units.
    ///
    /// Zero for well-formed currencies; the rest of `remainder` is the
    /// sub-unit residue that gets truncated.
    pub representable_remainder: Decimal,
}

impl Partition {
    pub fn total_value(&self) -> Decimal {
        self.breakdowns.iter().map(|b| b.total_value()).sum()
    }
}

/// Break `amount` down using denominations in the given selection order.
///
/// Each denomination takes `floor(remaining / d)` pieces. All arithmetic
/// happens on integers scaled to the finest scale among the amount, the
/// denominations, and the smallest unit, so counts are exact for any amount
/// a `Decimal` can hold.
pub fn greedy_partition(
    amount: Decimal,
    order: &[Decimal],
    config: &CurrencyConfig,
) -> Result<Partition> {
    if amount <= Decimal::ZERO {
        return Err(DenominaError::invalid_amount(format!(
            "amount must be positive, got {amount}"
        )));
    }

    let scale = common_scale(
        order
            .iter()
            .chain(std::iter::once(&amount))
            .chain(std::iter::once(&config.smallest_unit)),
    );
    let units = |value: Decimal| {
        to_minor_units(value, scale).ok_or_else(|| {
            DenominaError::Overflow(format!("{value} at scale {scale} exceeds 128 bits"))
        })
    };

    let mut remaining = units(amount)?;
    let mut breakdowns = Vec::new();

    for &denomination in order {
        if remaining == 0 {
            break;
        }
        let denomination_units = units(denomination)?;
        if denomination_units == 0 {
            continue;
        }

        let count = remaining / denomination_units;
        if count > 0 {
            breakdowns.push(DenominationBreakdown::new(
                denomination,
                count,
                config.is_note(denomination),
            )?);
            remaining -= count * denomination_units;
        }
    }

    breakdowns.sort_by(|a, b| b.denomination().cmp(&a.denomination()));

    let smallest_units = units(config.smallest_unit)?.max(1);
    let representable = remaining - remaining % smallest_units;
    let to_decimal = |value: u128| {
        from_minor_units(value, scale)
            .ok_or_else(|| DenominaError::Overflow(format!("{value} minor units at scale {scale}")))
    };

    Ok(Partition {
        breakdowns,
        remainder: to_decimal(remaining)?,
        representable_remainder: to_decimal(representable)?,
    })
}
