//! Direct solvers for banded linear systems.
//!
//! - [`TridiagonalSystem`]: scalar tridiagonal systems (Thomas algorithm)
//! - [`BlockTridiagonalSystem`]: tridiagonal systems of 2x2 blocks, used when
//!   two coupled PDEs are stepped together
//!
//! Both types own their band storage and scratch buffers so that repeated
//! solves on a fixed grid allocate nothing.

mod block;
mod tridiagonal;

pub use block::BlockTridiagonalSystem;
pub use tridiagonal::{solve_tridiagonal, TridiagonalSystem};
