//! Linear fee model.
//!
//! ```text
//! fee = linear_fee_constant + linear_fee_coefficient * size_in_bytes
//! ```
//!
//! `size_in_bytes` is the length of the complete signed transaction, so the
//! fee of a draft depends on the draft itself. Resolving that circularity is
//! the assembler's job; this module only evaluates the formula.

use serde::{Deserialize, Serialize};

use crate::config::ProtocolParams;

/// The two terms of the linear fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearFee {
    pub constant: u64,
    pub coefficient: u64,
}

impl LinearFee {
    pub fn new(constant: u64, coefficient: u64) -> Self {
        Self {
            constant,
            coefficient,
        }
    }

    /// Minimum fee for a transaction of `size` bytes.
    ///
    /// Saturates at `u64::MAX` instead of wrapping. A saturated fee can never
    /// be covered by real inputs, so it surfaces as "not enough money".
    pub fn min_fee(&self, size: usize) -> u64 {
        let size = u64::try_from(size).unwrap_or(u64::MAX);
        self.coefficient
            .saturating_mul(size)
            .saturating_add(self.constant)
    }
}

impl From<&ProtocolParams> for LinearFee {
    fn from(params: &ProtocolParams) -> Self {
        Self::new(params.linear_fee_constant, params.linear_fee_coefficient)
    }
}

/// Minimum fee for a signed transaction of `size` bytes under `params`.
pub fn estimate_fee(size: usize, params: &ProtocolParams) -> u64 {
    LinearFee::from(params).min_fee(size)
}
