//! Positive item quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Error returned when a quantity is not a positive integer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero items were requested.
    #[error("quantity must be at least 1")]
    Zero,
}

/// Number of units of a product in an order request or quantity selector.
///
/// Always at least one. The selector's `-` button can never take it below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit; the default selector value.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::Zero` if `n` is 0.
    pub fn new(n: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(n).map(Self).ok_or(QuantityError::Zero)
    }

    /// The number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Apply a stepper delta, clamping at 1.
    #[must_use]
    pub fn step(self, delta: i32) -> Self {
        let next = i64::from(self.get()) + i64::from(delta);
        let clamped = u32::try_from(next.max(1)).unwrap_or(u32::MAX);
        Self::new(clamped).unwrap_or(Self::ONE)
    }

    /// One more unit.
    #[must_use]
    pub fn increment(self) -> Self {
        self.step(1)
    }

    /// One fewer unit, never below 1.
    #[must_use]
    pub fn decrement(self) -> Self {
        self.step(-1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
