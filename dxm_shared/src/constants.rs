//! Empirical constants for estimating energy demand and savings of robotic motions.
//!
//! All energies derived from these are relative units, not physical quantities.

/// Smallest full/half speed duration ratio observed, for large sweeping motions.
pub const MIN_SPEED_RATIO: f64 = 0.72;

/// Largest ratio observed, for minimal motions such as hops between close weld points.
pub const MAX_SPEED_RATIO: f64 = 1.0;

pub const MIN_SAVINGS: f64 = 0.0;

/// Maximum fraction of energy saved by slowing a motion down, measured on real robots.
pub const MAX_SAVINGS: f64 = 0.4;

/// Power draw of the least demanding motions (relative units).
///
/// A robot drawing 0.5kW for very slow motions draws around 4kW for fast sweeping ones.
pub const MIN_ENERGY_CONSUMPTION: f64 = 1.0;

/// Power draw of the most demanding motions (relative units).
pub const MAX_ENERGY_CONSUMPTION: f64 = 8.0;
