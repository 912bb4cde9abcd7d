//! Analytical pricing formulas used as references for the numerical engines.
//!
//! - Black (1976) model on forwards, with removable-singularity handling
//! - Standard normal distribution functions

pub mod black;
pub mod distributions;
pub mod error;

pub use black::black_price;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
