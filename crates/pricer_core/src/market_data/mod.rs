//! Discounting inputs consumed by the pricers.
//!
//! Curves are treated as opaque functions of time: the PDE layer only asks
//! for discount factors and short rates, never for the instruments a curve
//! was built from.
//!
//! # Components
//!
//! - [`curves`]: Yield curve trait and implementations (FlatCurve, InterpolatedCurve)
//! - [`error`]: Market data error types (MarketDataError)
//!
//! # Example
//!
//! ```
//! use pricer_core::market_data::curves::{FlatCurve, YieldCurve};
//!
//! let curve = FlatCurve::new(0.05_f64);
//! let df = curve.discount_factor(1.0).unwrap();
//! assert!((df - 0.951229).abs() < 1e-5);
//! assert!((curve.short_rate(2.0).unwrap() - 0.05).abs() < 1e-12);
//! ```

pub mod curves;
pub mod error;

pub use curves::{CurveInterpolation, FlatCurve, InterpolatedCurve, YieldCurve};
pub use error::MarketDataError;
