//! # Pricer Models (L2: Business Logic)
//!
//! Model parameters, payoff types and closed-form references.
//!
//! This crate provides:
//! - The two-state Markov-chain CEV model (`models`)
//! - Vanilla option payoff types (`instruments`)
//! - Black (1976) prices and normal distribution functions (`analytical`)
//!
//! ## Design Principles
//!
//! - **Validated parameters**: constructors reject inadmissible inputs up front
//! - **Removable singularities** are resolved by their analytic limits below
//!   `pricer_core::math::SINGULARITY_THRESHOLD`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
pub mod models;
