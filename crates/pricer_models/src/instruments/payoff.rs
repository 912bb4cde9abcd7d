//! Vanilla option payoff definitions.

use std::fmt;
use std::str::FromStr;

/// Type of a vanilla European option.
///
/// # Examples
/// ```
/// use pricer_models::instruments::OptionType;
///
/// assert_eq!(OptionType::Call.payoff(0.05, 0.03), 0.05 - 0.03);
/// assert_eq!(OptionType::Put.payoff(0.05, 0.03), 0.0);
/// assert_eq!("put".parse::<OptionType>().unwrap(), OptionType::Put);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OptionType {
    /// Call option: max(S - K, 0)
    #[default]
    Call,
    /// Put option: max(K - S, 0)
    Put,
}

impl OptionType {
    /// Intrinsic value at `spot` for `strike`.
    #[inline]
    pub fn payoff(&self, spot: f64, strike: f64) -> f64 {
        (self.sign() * (spot - strike)).max(0.0)
    }

    /// +1 for calls, -1 for puts.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Convert an undiscounted call price on `forward` into the price of this
    /// option type using put-call parity `C - P = F - K`.
    ///
    /// # Examples
    /// ```
    /// use pricer_models::instruments::OptionType;
    ///
    /// let call = 0.012;
    /// assert_eq!(OptionType::Call.from_call(call, 0.03, 0.02), call);
    /// assert!((OptionType::Put.from_call(call, 0.03, 0.02) - 0.002).abs() < 1e-15);
    /// ```
    #[inline]
    pub fn from_call(&self, call: f64, forward: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => call,
            OptionType::Put => call - (forward - strike),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(format!("unknown option type '{other}', expected 'call' or 'put'")),
        }
    }
}
