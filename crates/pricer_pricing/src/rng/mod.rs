//! # Random Number Generation
//!
//! Seeded pseudo-random numbers for the Monte Carlo cross-check.
//!
//! - **Reproducibility**: every generator is built from an explicit seed
//! - **Batching**: buffers are filled in place without allocation
//! - **Independence**: parallel batches derive their own seeds from the
//!   configured one, so results do not depend on thread scheduling
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(12345);
//!
//! let u = rng.gen_uniform();
//! let z = rng.gen_normal();
//! let tau = rng.gen_exponential(4.0);
//! assert!((0.0..1.0).contains(&u));
//! assert!(z.is_finite());
//! assert!(tau >= 0.0);
//! ```

mod prng;

pub use prng::PricerRng;
