//! Cart pricing.
//!
//! Pure computation over already-loaded cart lines; no I/O happens here. The order flow loads the
//! live product prices, builds [`PricedLine`]s, and prices them with [`quote`].
//!
//! The rules are fixed: flat shipping below a free-shipping threshold, and a flat tax rate on the
//! subtotal. Totals are computed in minor currency units, so they are exact.

use market_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::CartItem;

pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_minor(100_00);
pub const FLAT_SHIPPING_FEE: Money = Money::from_minor(15_00);
pub const TAX_RATE_PERCENT: i64 = 8;

/// One cart line with the price it will be charged at. The unit price is snapshotted into the
/// order item on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i64,
    pub artist_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl PricedLine {
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

impl From<&CartItem> for PricedLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            artist_id: item.artist_id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

pub fn quote(lines: &[PricedLine]) -> Quote {
    let subtotal: Money = lines.iter().map(PricedLine::line_total).sum();
    let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD { Money::from(0) } else { FLAT_SHIPPING_FEE };
    let tax = subtotal.percent(TAX_RATE_PERCENT);
    let total = subtotal + shipping + tax;
    Quote { subtotal, shipping, tax, total }
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(product_id: i64, price: i64, qty: i64) -> PricedLine {
        PricedLine {
            product_id,
            artist_id: 1,
            name: format!("product-{product_id}"),
            unit_price: Money::from_units(price),
            quantity: qty,
        }
    }

    #[test]
    fn empty_cart_quotes_shipping_only() {
        let q = quote(&[]);
        assert_eq!(q.subtotal, Money::from(0));
        assert_eq!(q.shipping, FLAT_SHIPPING_FEE);
        assert_eq!(q.tax, Money::from(0));
        assert_eq!(q.total, FLAT_SHIPPING_FEE);
    }

    #[test]
    fn below_threshold_pays_flat_shipping() {
        // 2 x 40.00 + 1 x 10.00 = 90.00 → shipping 15.00, tax 7.20, total 112.20
        let q = quote(&[line(1, 40, 2), line(2, 10, 1)]);
        assert_eq!(q.subtotal, Money::from(90_00));
        assert_eq!(q.shipping, Money::from(15_00));
        assert_eq!(q.tax, Money::from(7_20));
        assert_eq!(q.total, Money::from(112_20));
    }

    #[test]
    fn at_threshold_ships_free() {
        // Same cart plus a 20.00 item: subtotal 110.00 ≥ 100.00
        let q = quote(&[line(1, 40, 2), line(2, 10, 1), line(3, 20, 1)]);
        assert_eq!(q.subtotal, Money::from(110_00));
        assert_eq!(q.shipping, Money::from(0));
        assert_eq!(q.tax, Money::from(8_80));
        assert_eq!(q.total, Money::from(118_80));
    }

    #[test]
    fn exactly_on_threshold_ships_free() {
        let q = quote(&[line(1, 100, 1)]);
        assert_eq!(q.shipping, Money::from(0));
        assert_eq!(q.total, Money::from(108_00));
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let lines = vec![line(1, 3, 7), line(2, 11, 2), line(3, 1, 13)];
        let expected: Money = lines.iter().map(|l| l.unit_price * l.quantity).sum();
        assert_eq!(quote(&lines).subtotal, expected);
    }
}
