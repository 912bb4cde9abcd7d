//! Instrument definitions.
//!
//! Only vanilla European calls and puts are priced by the PDE engines; the
//! payoff type carries the parity conversion the pricers rely on.

mod payoff;

pub use payoff::OptionType;
