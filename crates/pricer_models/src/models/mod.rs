//! Stochastic models whose pricing problems reduce to the PDE form solved
//! in `pricer_pricing`.
//!
//! - [`TwoStateMarkovChain`]: CEV dynamics switching between two regimes
//! - [`Regime`]: State label of the chain
//! - [`ModelError`]: Parameter validation errors

pub mod error;
pub mod two_state;

pub use error::ModelError;
pub use two_state::{Regime, TwoStateMarkovChain};
