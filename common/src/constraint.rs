//! User constraints applied to a breakdown after the initial partition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-specified rule altering a breakdown.
///
/// Constraints are not commutative: each one operates on the output of the
/// previous one, so list order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Reduce usage of a denomination.
    Minimize { denomination: Decimal },
    /// Drop a denomination from the breakdown entirely.
    Avoid { denomination: Decimal },
    /// At most `value` pieces of a denomination.
    Cap { denomination: Decimal, value: i64 },
    /// At least `value` pieces of a denomination.
    Require { denomination: Decimal, value: i64 },
    /// Restrict the breakdown to the listed denominations.
    Only { denominations: Vec<Decimal> },
}

impl Constraint {
    /// Wire name of the constraint kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Minimize { .. } => "minimize",
            Constraint::Avoid { .. } => "avoid",
            Constraint::Cap { .. } => "cap",
            Constraint::Require { .. } => "require",
            Constraint::Only { .. } => "only",
        }
    }

    /// The single denomination this constraint targets, if any.
    pub fn denomination(&self) -> Option<Decimal> {
        match self {
            Constraint::Minimize { denomination }
            | Constraint::Avoid { denomination }
            | Constraint::Cap { denomination, .. }
            | Constraint::Require { denomination, .. } => Some(*denomination),
            Constraint::Only { .. } => None,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Minimize { denomination } => write!(f, "minimize({denomination})"),
            Constraint::Avoid { denomination } => write!(f, "avoid({denomination})"),
            Constraint::Cap {
                denomination,
                value,
            } => write!(f, "cap({denomination}, {value})"),
            Constraint::Require {
                denomination,
                value,
            } => write!(f, "require({denomination}, {value})"),
            Constraint::Only { denominations } => {
                let list: Vec<String> = denominations.iter().map(|d| d.to_string()).collect();
                write!(f, "only({})", list.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_constraint_wire_format() {
        let cap = Constraint::Cap {
            denomination: dec!(500),
            value: 10,
        };
        let json = serde_json::to_value(&cap).unwrap();
        assert_eq!(json["type"], "cap");
        assert_eq!(json["denomination"], "500");
        assert_eq!(json["value"], 10);

        let parsed: Constraint =
            serde_json::from_str(r#"{"type":"only","denominations":["500","100"]}"#).unwrap();
        assert_eq!(
            parsed,
            Constraint::Only {
                denominations: vec![dec!(500), dec!(100)]
            }
        );
    }

    #[test]
    fn test_constraint_accessors() {
        let avoid = Constraint::Avoid {
            denomination: dec!(2000),
        };
        assert_eq!(avoid.kind(), "avoid");
        assert_eq!(avoid.denomination(), Some(dec!(2000)));
        assert_eq!(avoid.to_string(), "avoid(2000)");

        let only = Constraint::Only {
            denominations: vec![dec!(10)],
        };
        assert_eq!(only.denomination(), None);
    }
}
