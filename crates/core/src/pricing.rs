//! Cart and order pricing evaluator.
//!
//! This is the single authoritative implementation of the pricing rules.
//! The order placement transaction computes every stored breakdown through
//! this module; client-submitted totals are never trusted.
//!
//! # Rules
//!
//! - Promos are a fixed lookup table ([`promo_by_code`]): percent-with-cap,
//!   flat amount, or free shipping, each gated by a minimum subtotal.
//! - A promo below its minimum yields zero discount plus a note telling the
//!   customer how much more they need to add; the code is not rejected.
//! - Tax is a flat 3% of the post-discount subtotal, rounded to two decimal
//!   places half-away-from-zero. This is the only rounding point.
//! - Delivery is a flat 40 below the free-shipping threshold of 499
//!   (post-discount), zero above it. Express adds a flat 99 on top. A
//!   free-shipping promo forces the standard fee to zero; the express
//!   surcharge still applies.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::ShippingMode;

/// Tax rate applied to the post-discount subtotal (3%).
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(3, 2)
}

/// Post-discount subtotal at or above which standard delivery is free.
#[must_use]
pub fn free_shipping_threshold() -> Decimal {
    Decimal::new(499, 0)
}

/// Flat standard delivery fee below the free-shipping threshold.
#[must_use]
pub fn base_delivery_fee() -> Decimal {
    Decimal::new(40, 0)
}

/// Flat surcharge for express shipping.
#[must_use]
pub fn express_surcharge() -> Decimal {
    Decimal::new(99, 0)
}

/// What a promo does once its minimum subtotal is met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoKind {
    /// Percentage of the subtotal, capped at a fixed amount.
    Percent {
        /// Discount percentage (e.g. 10 for 10%).
        percent: u32,
        /// Maximum discount amount.
        cap: Decimal,
    },
    /// Fixed amount off.
    Flat(Decimal),
    /// No discount; the standard delivery fee is waived instead.
    FreeShipping,
}

/// A named discount rule gated by a minimum subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promo {
    /// Promo code as entered by the customer.
    pub code: &'static str,
    /// What the promo does.
    pub kind: PromoKind,
    /// Minimum subtotal required for the promo to apply.
    pub min_subtotal: Decimal,
}

/// Look up a promo definition by code (case-insensitive).
///
/// The table is fixed: `SAVE10` (10% capped at 150, min 299), `SAVE50`
/// (flat 50, min 499) and `FREESHIP` (free shipping, min 199).
#[must_use]
pub fn promo_by_code(code: &str) -> Option<Promo> {
    match code.trim().to_ascii_uppercase().as_str() {
        "SAVE10" => Some(Promo {
            code: "SAVE10",
            kind: PromoKind::Percent {
                percent: 10,
                cap: Decimal::new(150, 0),
            },
            min_subtotal: Decimal::new(299, 0),
        }),
        "SAVE50" => Some(Promo {
            code: "SAVE50",
            kind: PromoKind::Flat(Decimal::new(50, 0)),
            min_subtotal: Decimal::new(499, 0),
        }),
        "FREESHIP" => Some(Promo {
            code: "FREESHIP",
            kind: PromoKind::FreeShipping,
            min_subtotal: Decimal::new(199, 0),
        }),
        _ => None,
    }
}

/// Result of evaluating a promo against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoOutcome {
    /// Discount amount (zero when not eligible or free-shipping).
    pub discount: Decimal,
    /// Whether the standard delivery fee is waived.
    pub free_shipping: bool,
    /// Customer-facing note ("10% off (max 150)", "Add 49.00 more...").
    pub note: String,
}

impl PromoOutcome {
    fn none() -> Self {
        Self {
            discount: Decimal::ZERO,
            free_shipping: false,
            note: String::new(),
        }
    }
}

/// Evaluate a promo against a subtotal.
///
/// Below the minimum subtotal the promo yields zero discount and a
/// non-empty note saying how much more is needed; the code is not
/// rejected outright.
#[must_use]
pub fn evaluate_promo(subtotal: Decimal, promo: Option<&Promo>) -> PromoOutcome {
    let Some(promo) = promo else {
        return PromoOutcome::none();
    };

    if subtotal < promo.min_subtotal {
        let missing = (promo.min_subtotal - subtotal).round_dp(2);
        return PromoOutcome {
            discount: Decimal::ZERO,
            free_shipping: false,
            note: format!("Add \u{20b9}{missing:.2} more to use {}", promo.code),
        };
    }

    match &promo.kind {
        PromoKind::Percent { percent, cap } => {
            let raw = subtotal * Decimal::from(*percent) / Decimal::ONE_HUNDRED;
            PromoOutcome {
                discount: raw.min(*cap),
                free_shipping: false,
                note: format!("{percent}% off (max \u{20b9}{cap})"),
            }
        }
        PromoKind::Flat(amount) => PromoOutcome {
            discount: *amount,
            free_shipping: false,
            note: format!("\u{20b9}{amount} off"),
        },
        PromoKind::FreeShipping => PromoOutcome {
            discount: Decimal::ZERO,
            free_shipping: true,
            note: "Free shipping".to_owned(),
        },
    }
}

/// Full pricing breakdown for a cart or order.
///
/// Invariant: `total = after_discount + taxes + delivery`, where
/// `after_discount = subtotal - discount` (floored at zero). Computed once
/// at order creation and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub after_discount: Decimal,
    pub taxes: Decimal,
    pub delivery: Decimal,
    pub total: Decimal,
    /// Customer-facing promo note, empty when no promo applied.
    pub note: String,
}

/// Compute the full pricing breakdown.
#[must_use]
pub fn compute_pricing(
    subtotal: Decimal,
    promo: Option<&Promo>,
    mode: ShippingMode,
) -> PricingBreakdown {
    let outcome = evaluate_promo(subtotal, promo);
    let after_discount = (subtotal - outcome.discount).max(Decimal::ZERO);

    let mut delivery = if after_discount < free_shipping_threshold() {
        base_delivery_fee()
    } else {
        Decimal::ZERO
    };
    if outcome.free_shipping {
        delivery = Decimal::ZERO;
    }
    if mode == ShippingMode::Express {
        delivery += express_surcharge();
    }

    let taxes = (after_discount * tax_rate())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let total = after_discount + taxes + delivery;

    PricingBreakdown {
        subtotal,
        discount: outcome.discount,
        after_discount,
        taxes,
        delivery,
        total,
        note: outcome.note,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_save10_at_threshold() {
        // 299 with SAVE10: 10% = 29.90, under the 150 cap.
        let promo = promo_by_code("SAVE10").unwrap();
        let pricing = compute_pricing(dec("299"), Some(&promo), ShippingMode::Standard);

        assert_eq!(pricing.discount, dec("29.90"));
        assert_eq!(pricing.after_discount, dec("269.10"));
        assert_eq!(pricing.taxes, dec("8.07"));
        // 269.10 < 499, so the standard fee applies.
        assert_eq!(pricing.delivery, dec("40"));
        assert_eq!(pricing.total, dec("317.17"));
    }

    #[test]
    fn test_save10_cap_applies() {
        // 10% of 2000 is 200; the cap brings it down to 150.
        let promo = promo_by_code("SAVE10").unwrap();
        let pricing = compute_pricing(dec("2000"), Some(&promo), ShippingMode::Standard);
        assert_eq!(pricing.discount, dec("150"));
    }

    #[test]
    fn test_below_threshold_yields_zero_and_note() {
        let promo = promo_by_code("SAVE10").unwrap();
        let outcome = evaluate_promo(dec("250"), Some(&promo));
        assert_eq!(outcome.discount, Decimal::ZERO);
        assert!(!outcome.free_shipping);
        assert!(outcome.note.contains("49.00"));
        assert!(outcome.note.contains("SAVE10"));
    }

    #[test]
    fn test_flat_promo() {
        let promo = promo_by_code("SAVE50").unwrap();
        let pricing = compute_pricing(dec("499"), Some(&promo), ShippingMode::Standard);
        assert_eq!(pricing.discount, dec("50"));
        assert_eq!(pricing.after_discount, dec("449"));
        // 449 < 499 after discount, so delivery is charged.
        assert_eq!(pricing.delivery, dec("40"));
    }

    #[test]
    fn test_freeship_forces_standard_delivery_to_zero() {
        let promo = promo_by_code("FREESHIP").unwrap();
        // 250 is under the 499 threshold, so without the promo delivery
        // would be 40.
        let pricing = compute_pricing(dec("250"), Some(&promo), ShippingMode::Standard);
        assert_eq!(pricing.discount, Decimal::ZERO);
        assert_eq!(pricing.delivery, Decimal::ZERO);
    }

    #[test]
    fn test_freeship_express_still_pays_surcharge() {
        let promo = promo_by_code("FREESHIP").unwrap();
        let pricing = compute_pricing(dec("250"), Some(&promo), ShippingMode::Express);
        assert_eq!(pricing.delivery, dec("99"));
    }

    #[test]
    fn test_express_adds_surcharge_on_top_of_base() {
        let pricing = compute_pricing(dec("100"), None, ShippingMode::Express);
        assert_eq!(pricing.delivery, dec("139"));
    }

    #[test]
    fn test_free_shipping_by_subtotal() {
        let pricing = compute_pricing(dec("600"), None, ShippingMode::Standard);
        assert_eq!(pricing.delivery, Decimal::ZERO);
        assert_eq!(pricing.taxes, dec("18.00"));
        assert_eq!(pricing.total, dec("618.00"));
    }

    #[test]
    fn test_total_identity() {
        for (subtotal, code, mode) in [
            ("299", Some("SAVE10"), ShippingMode::Standard),
            ("2000", Some("SAVE10"), ShippingMode::Express),
            ("499", Some("SAVE50"), ShippingMode::Standard),
            ("250", Some("FREESHIP"), ShippingMode::Standard),
            ("123.45", None, ShippingMode::Express),
        ] {
            let promo = code.and_then(promo_by_code);
            let pricing = compute_pricing(dec(subtotal), promo.as_ref(), mode);
            assert_eq!(
                pricing.total,
                pricing.subtotal - pricing.discount + pricing.taxes + pricing.delivery,
                "identity broken for subtotal {subtotal}"
            );
        }
    }

    #[test]
    fn test_unknown_code_is_none() {
        assert!(promo_by_code("NOPE").is_none());
        assert!(promo_by_code("").is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(promo_by_code("save10").unwrap().code, "SAVE10");
        assert_eq!(promo_by_code(" freeship ").unwrap().code, "FREESHIP");
    }

    #[test]
    fn test_no_promo_has_empty_note() {
        let pricing = compute_pricing(dec("100"), None, ShippingMode::Standard);
        assert!(pricing.note.is_empty());
        assert_eq!(pricing.discount, Decimal::ZERO);
    }
}
