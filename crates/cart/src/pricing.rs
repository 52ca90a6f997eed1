//! Pure pricing derivations.
//!
//! All prices are integer amounts in the smallest currency unit; discounted
//! prices round down. Inputs are validated at `CartLine` construction, so
//! `percent_off` is already within `0..=100` by the time it reaches this
//! module. Intermediate math is widened to `u128` and results saturate at
//! `u64::MAX`; extreme but parseable stored lines must never panic the
//! derivation.

use crate::line::CartLine;

/// Unit price after applying the percent discount:
/// `unit_price × (100 − percent_off) / 100`, floored.
pub fn effective_unit_price(unit_price: u64, percent_off: u8) -> u64 {
    debug_assert!(percent_off <= 100, "percent_off is validated at construction");
    let discounted =
        u128::from(unit_price) * u128::from(100 - percent_off.min(100)) / 100;
    // Never exceeds unit_price, so this cannot truncate.
    u64::try_from(discounted).unwrap_or(u64::MAX)
}

/// Total for one line: discounted unit price times quantity, saturating.
pub fn line_total(line: &CartLine) -> u64 {
    u64::try_from(line_total_wide(line)).unwrap_or(u64::MAX)
}

/// Total for a line sequence. Order-independent, saturating.
pub fn cart_total(lines: &[CartLine]) -> u64 {
    let total: u128 = lines.iter().map(line_total_wide).sum();
    u64::try_from(total).unwrap_or(u64::MAX)
}

fn line_total_wide(line: &CartLine) -> u128 {
    u128::from(effective_unit_price(line.unit_price, line.percent_off))
        * u128::from(line.quantity)
}
