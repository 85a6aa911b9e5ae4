//! # Sale Line Math
//!
//! Pure arithmetic for sale lines and sale totals. Every figure is derived
//! from the caller-supplied price, fees and discount plus the cost snapshot
//! resolved at sale time; nothing here touches storage.
//!
//! ## Line Formulas
//! ```text
//! gross  = qty × unit_price
//! net    = gross − fees − discount
//! cost   = qty × unit_cost
//! profit = net − cost
//! ```
//! Header totals are the plain sums of the per-line figures. Negative net or
//! profit is allowed (a discounted or below-cost line is valid business).

use crate::money::Money;

/// Computed figures for one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFigures {
    pub gross: Money,
    pub fees: Money,
    pub discount: Money,
    pub net: Money,
    pub cost: Money,
    pub profit: Money,
}

impl LineFigures {
    /// Computes all derived figures for a line.
    ///
    /// ## Example
    /// ```
    /// use balcao_core::money::Money;
    /// use balcao_core::pricing::LineFigures;
    ///
    /// // 3 × 10.00, fees 1.00, discount 0.50, cost 4.00
    /// let line = LineFigures::compute(
    ///     3,
    ///     Money::from_cents(1000),
    ///     Money::from_cents(100),
    ///     Money::from_cents(50),
    ///     Money::from_cents(400),
    /// );
    /// assert_eq!(line.net.cents(), 2850);
    /// assert_eq!(line.profit.cents(), 1650);
    /// ```
    pub fn compute(
        qty: i64,
        unit_price: Money,
        fees: Money,
        discount: Money,
        unit_cost: Money,
    ) -> Self {
        let gross = unit_price.multiply_quantity(qty);
        let net = gross - fees - discount;
        let cost = unit_cost.multiply_quantity(qty);
        let profit = net - cost;
        LineFigures {
            gross,
            fees,
            discount,
            net,
            cost,
            profit,
        }
    }
}

/// Accumulator for a sale's six header totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaleTotals {
    pub gross: Money,
    pub fees: Money,
    pub discount: Money,
    pub net: Money,
    pub cost: Money,
    pub profit: Money,
}

impl SaleTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one line's figures into the running totals.
    pub fn add_line(&mut self, line: &LineFigures) {
        self.gross += line.gross;
        self.fees += line.fees;
        self.discount += line.discount;
        self.net += line.net;
        self.cost += line.cost;
        self.profit += line.profit;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
