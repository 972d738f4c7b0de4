//! Precision-safe decimal types for the fee market.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors critical in fee calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Number of decimals between wei and gwei.
pub const GWEI_DECIMALS: u32 = 9;

/// A wei amount with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// fee-market amounts with token amounts in calculations. Values
/// may carry fractional wei mid-computation; call [`Wei::ceil`]
/// before handing a value to anything that expects integer wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(pub Decimal);

impl Wei {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Construct from a gwei amount.
    #[inline]
    pub fn from_gwei(gwei: Decimal) -> Self {
        Self(gwei * Decimal::from(10u64.pow(GWEI_DECIMALS)))
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round up to an integer wei amount.
    #[inline]
    pub fn ceil(&self) -> Self {
        Self(self.0.ceil())
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Wei {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl From<u64> for Wei {
    fn from(v: u64) -> Self {
        Self(Decimal::from(v))
    }
}

impl Add for Wei {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Wei {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Wei {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Wei {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// Largest token decimals value the unit conversions support.
///
/// `Decimal` carries 28-29 significant digits; a larger decimals value
/// cannot be represented as a power of ten. Token metadata must be
/// checked against this bound where it enters the system.
pub const MAX_TOKEN_DECIMALS: u8 = 28;

/// Convert a token amount in base units to unit terms.
///
/// A USDC amount of `1_000_000` base units with 6 decimals becomes `1`.
/// Exact: no precision is lost for any decimals value a token can carry.
/// Requires `decimals <= MAX_TOKEN_DECIMALS`; metadata is bounded at
/// config load, before any amount reaches this function.
#[inline]
pub fn to_unit_amount(base_units: Decimal, decimals: u8) -> Decimal {
    base_units / Decimal::from_i128_with_scale(10i128.pow(decimals as u32), 0)
}

/// Round to a fixed number of decimal places, half away from zero.
///
/// Matches the banker's-rounding-free behavior quote consumers expect
/// from published prices.
#[inline]
pub fn round_dp_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
