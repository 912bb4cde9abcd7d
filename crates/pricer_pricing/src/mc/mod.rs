//! # Monte Carlo Cross-Check
//!
//! Independent estimator used to validate the PDE pricers:
//!
//! - [`config`]: validated path, step and batch counts, seeding
//! - [`error`]: configuration and runtime errors
//! - [`markov_chain`]: regime-path simulation for the two-state model
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::instruments::OptionType;
//! use pricer_models::models::TwoStateMarkovChain;
//! use pricer_pricing::mc::{MarkovChainMonteCarlo, MonteCarloConfig};
//!
//! let model = TwoStateMarkovChain::new(0.2, 0.2, 1.0, 1.0, 0.5, 1.0, 1.0).unwrap();
//! let config = MonteCarloConfig::builder().n_paths(1_000).n_steps(10).build().unwrap();
//! let estimates = MarkovChainMonteCarlo::new(model, config)
//!     .unwrap()
//!     .price(100.0, 1.0, &[100.0], OptionType::Call)
//!     .unwrap();
//!
//! // Equal vols: every path carries the same Black price.
//! assert!((estimates[0].price - 7.9656).abs() < 1e-3);
//! ```

pub mod config;
pub mod error;
pub mod markov_chain;

pub use config::{
    MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_EULER_STEPS,
    DEFAULT_PATHS, DEFAULT_SEED,
};
pub use error::{ConfigError, McError};
pub use markov_chain::{MarkovChainMonteCarlo, McEstimate};
