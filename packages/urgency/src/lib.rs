#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deterministic urgency scoring for blood requests and civic alerts.
//!
//! Four independent sub-scores — blood-group rarity, quantity required,
//! expiry proximity, and nearby-stock scarcity — are summed and clamped to
//! [0, 100]. The result is a pure function of its inputs: no clock reads,
//! no randomness, no external state. Callers that need expiry proximity
//! compute hours-until-expiry themselves and pass it in.

use bloodlink_blood_models::{BloodGroup, DEFAULT_RARITY_WEIGHT, UrgencyLabel};
use serde::{Deserialize, Serialize};

/// Which rarity weight table to score with.
///
/// Emergency requests and civic alerts intentionally weight the same
/// blood groups differently; see the table definitions on [`BloodGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarityTable {
    /// `RARITY_WEIGHTS_REQUEST` — emergency blood requests.
    Request,
    /// `RARITY_WEIGHTS_ALERT` — civic alert snapshots.
    Alert,
}

impl RarityTable {
    /// Rarity weight for `group` under this table.
    #[must_use]
    pub const fn weight(self, group: BloodGroup) -> u8 {
        match self {
            Self::Request => group.request_rarity_weight(),
            Self::Alert => group.alert_rarity_weight(),
        }
    }
}

/// Inputs to one urgency computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyInput {
    /// Requested blood group; `None` when unknown or unparsable.
    pub blood_group: Option<BloodGroup>,
    /// Units required.
    pub units_required: u32,
    /// Hours until the need expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_hours: Option<f64>,
    /// Per-hospital unit totals held nearby; `None` when no lookup was
    /// performed, empty when the lookup found no stock records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby_stock: Option<Vec<u32>>,
}

/// One sub-score with its explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    /// Stable factor identifier.
    pub factor: String,
    /// Points awarded.
    pub score: u8,
    /// Maximum points this factor can award.
    pub max_score: u8,
    /// Human-readable explanation.
    pub reason: String,
}

/// A computed urgency score.
///
/// Derived per request; some flows persist it as a snapshot for
/// historical ordering, but it is always recomputable from its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyScore {
    /// Total score in [0, 100].
    pub score: u8,
    /// Qualitative band for the total.
    pub label: UrgencyLabel,
    /// One entry per sub-score.
    pub breakdown: Vec<FactorScore>,
}

/// Computes the urgency score for `input` under the given rarity table.
#[must_use]
pub fn score_urgency(input: &UrgencyInput, table: RarityTable) -> UrgencyScore {
    let rarity = rarity_factor(input.blood_group, table);
    let quantity = quantity_factor(input.units_required);
    let expiry = expiry_factor(input.expiry_hours);
    let stock = stock_factor(input.nearby_stock.as_deref(), input.units_required);

    let total: u16 = [&rarity, &quantity, &expiry, &stock]
        .iter()
        .map(|f| u16::from(f.score))
        .sum();
    let score = u8::try_from(total.min(100)).unwrap_or(100);

    UrgencyScore {
        score,
        label: UrgencyLabel::from_score(score),
        breakdown: vec![rarity, quantity, expiry, stock],
    }
}

fn rarity_factor(group: Option<BloodGroup>, table: RarityTable) -> FactorScore {
    let (score, reason) = group.map_or_else(
        || {
            (
                DEFAULT_RARITY_WEIGHT,
                "Unknown blood group; default rarity weight applied".to_string(),
            )
        },
        |g| {
            let w = table.weight(g);
            (w, format!("Blood group {g} carries rarity weight {w}"))
        },
    );
    FactorScore {
        factor: "bloodGroupRarity".to_string(),
        score,
        max_score: 30,
        reason,
    }
}

fn quantity_factor(units: u32) -> FactorScore {
    let score = match units {
        10.. => 25,
        7..=9 => 20,
        5 | 6 => 15,
        3 | 4 => 10,
        2 => 5,
        _ => 2,
    };
    FactorScore {
        factor: "quantityRequired".to_string(),
        score,
        max_score: 25,
        reason: format!("{units} units requested"),
    }
}

fn expiry_factor(hours: Option<f64>) -> FactorScore {
    let (score, reason) = hours.map_or_else(
        || (0, "No expiry recorded".to_string()),
        |h| {
            let score = if h < 24.0 {
                25
            } else if h < 48.0 {
                20
            } else if h < 72.0 {
                15
            } else if h < 120.0 {
                10
            } else if h < 168.0 {
                5
            } else {
                0
            };
            (score, format!("Need expires in {h:.0} hours"))
        },
    );
    FactorScore {
        factor: "expiryProximity".to_string(),
        score,
        max_score: 25,
        reason,
    }
}

fn stock_factor(nearby: Option<&[u32]>, needed: u32) -> FactorScore {
    let (score, reason) = match nearby {
        None => (20, "No nearby stock records".to_string()),
        Some(records) if records.is_empty() => (20, "No nearby stock records".to_string()),
        Some(records) => {
            let total: u32 = records.iter().sum();
            let score = if total < needed {
                15
            } else if total < needed.saturating_mul(2) {
                10
            } else if total < needed.saturating_mul(3) {
                5
            } else {
                2
            };
            (
                score,
                format!("{total} units available nearby against {needed} needed"),
            )
        }
    };
    FactorScore {
        factor: "nearbyStockScarcity".to_string(),
        score,
        max_score: 20,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(units: u32) -> UrgencyInput {
        UrgencyInput {
            blood_group: Some(BloodGroup::ONegative),
            units_required: units,
            expiry_hours: Some(36.0),
            nearby_stock: Some(vec![2, 1]),
        }
    }

    #[test]
    fn reference_scenario_scores_85_with_request_table() {
        // O-, 8 units, 36h to expiry, 3 units nearby: 30 + 20 + 20 + 15.
        let result = score_urgency(&input(8), RarityTable::Request);
        assert_eq!(result.score, 85);
        assert_eq!(result.label, UrgencyLabel::Critical);

        let scores: Vec<u8> = result.breakdown.iter().map(|f| f.score).collect();
        assert_eq!(scores, vec![30, 20, 20, 15]);
        let factors: Vec<&str> = result.breakdown.iter().map(|f| f.factor.as_str()).collect();
        assert_eq!(
            factors,
            vec![
                "bloodGroupRarity",
                "quantityRequired",
                "expiryProximity",
                "nearbyStockScarcity"
            ]
        );
    }

    #[test]
    fn alert_table_scores_the_same_scenario_lower() {
        let result = score_urgency(&input(8), RarityTable::Alert);
        assert_eq!(result.score, 80);
        assert_eq!(result.label, UrgencyLabel::Critical);
    }

    #[test]
    fn score_bounded_for_all_input_combinations() {
        let groups: Vec<Option<BloodGroup>> = std::iter::once(None)
            .chain(BloodGroup::all().iter().copied().map(Some))
            .collect();
        let stocks: [Option<Vec<u32>>; 4] =
            [None, Some(vec![]), Some(vec![1]), Some(vec![50, 50])];

        for group in &groups {
            for units in [0, 1, 2, 3, 5, 7, 10, 200] {
                for expiry in [None, Some(0.5), Some(36.0), Some(500.0)] {
                    for stock in &stocks {
                        for table in [RarityTable::Request, RarityTable::Alert] {
                            let result = score_urgency(
                                &UrgencyInput {
                                    blood_group: *group,
                                    units_required: units,
                                    expiry_hours: expiry,
                                    nearby_stock: stock.clone(),
                                },
                                table,
                            );
                            assert!(result.score <= 100);
                            assert_eq!(result.label, UrgencyLabel::from_score(result.score));
                            assert_eq!(result.breakdown.len(), 4);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn quantity_steps_are_monotonic() {
        let mut previous = 0;
        for units in 0..=12 {
            let result = score_urgency(&input(units), RarityTable::Request);
            assert!(
                result.score >= previous,
                "score decreased at {units} units: {} < {previous}",
                result.score
            );
            previous = result.score;
        }
    }

    #[test]
    fn unknown_group_gets_default_weight() {
        let result = score_urgency(
            &UrgencyInput {
                blood_group: None,
                units_required: 1,
                expiry_hours: None,
                nearby_stock: Some(vec![100]),
            },
            RarityTable::Request,
        );
        assert_eq!(result.breakdown[0].score, DEFAULT_RARITY_WEIGHT);
    }

    #[test]
    fn zero_units_still_scores_minimum_quantity() {
        let result = score_urgency(
            &UrgencyInput {
                blood_group: Some(BloodGroup::APositive),
                units_required: 0,
                expiry_hours: None,
                nearby_stock: None,
            },
            RarityTable::Request,
        );
        assert_eq!(result.breakdown[1].score, 2);
    }

    #[test]
    fn missing_and_empty_stock_both_score_maximal_scarcity() {
        for stock in [None, Some(vec![])] {
            let result = score_urgency(
                &UrgencyInput {
                    blood_group: Some(BloodGroup::APositive),
                    units_required: 3,
                    expiry_hours: None,
                    nearby_stock: stock,
                },
                RarityTable::Request,
            );
            assert_eq!(result.breakdown[3].score, 20);
        }
    }

    #[test]
    fn stock_scarcity_steps() {
        let cases = [
            (vec![2], 15),  // below need
            (vec![4], 10),  // below twice the need
            (vec![8], 5),   // below three times the need
            (vec![20], 2),  // plentiful
        ];
        for (stock, expected) in cases {
            let result = score_urgency(
                &UrgencyInput {
                    blood_group: Some(BloodGroup::APositive),
                    units_required: 3,
                    expiry_hours: None,
                    nearby_stock: Some(stock.clone()),
                },
                RarityTable::Request,
            );
            assert_eq!(result.breakdown[3].score, expected, "stock {stock:?}");
        }
    }

    #[test]
    fn expiry_steps() {
        let cases = [
            (Some(12.0), 25),
            (Some(36.0), 20),
            (Some(60.0), 15),
            (Some(100.0), 10),
            (Some(150.0), 5),
            (Some(300.0), 0),
            (None, 0),
        ];
        for (expiry, expected) in cases {
            let result = score_urgency(
                &UrgencyInput {
                    blood_group: Some(BloodGroup::APositive),
                    units_required: 1,
                    expiry_hours: expiry,
                    nearby_stock: None,
                },
                RarityTable::Request,
            );
            assert_eq!(result.breakdown[2].score, expected, "expiry {expiry:?}");
        }
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let a = score_urgency(&input(8), RarityTable::Request);
        let b = score_urgency(&input(8), RarityTable::Request);
        assert_eq!(a.score, b.score);
        assert_eq!(a.label, b.label);
        for (fa, fb) in a.breakdown.iter().zip(&b.breakdown) {
            assert_eq!(fa.score, fb.score);
            assert_eq!(fa.reason, fb.reason);
        }
    }
}
