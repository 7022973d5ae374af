//! # Curves
//!
//! The two primitives every domain scorer is built from:
//!
//! - [`speed_modifier`]: per-unit latency → multiplier in `[0, 1]`.
//!   Flat `1.0` up to `lower`, quadratic decay to `0.0` at `upper`.
//! - [`work_bonus`]: requested work → sub-linear reward (`flat^0.8`), so a big
//!   job at the same per-unit speed still earns more than a small one.
//!
//! Both are pure. Callers guarantee `upper > lower > 0`; the calibration table
//! checks that once at load time (see `config::calibration`).

/// Exponent applied to the flat work estimate.
pub const WORK_BONUS_EXPONENT: f64 = 0.8;

/// Penalty multiplier for an observed per-unit time `x`.
///
/// `adjusted = max(x - lower, 0)`, `penalty = adjusted / (upper - lower)`,
/// result `max(1 - penalty², 0)`.
#[inline]
pub fn speed_modifier(x: f64, lower: f64, upper: f64) -> f64 {
    let adjusted = (x - lower).max(0.0);
    let penalty = adjusted / (upper - lower);
    (1.0 - penalty * penalty).max(0.0)
}

/// Reward for `units` of work at the fastest plausible per-unit time.
///
/// `units = 0` yields `overhead^0.8`.
#[inline]
pub fn work_bonus(units: u64, overhead: f64, lower_bound_per_unit: f64) -> f64 {
    let flat = overhead + units as f64 * lower_bound_per_unit;
    flat.powf(WORK_BONUS_EXPONENT)
}
