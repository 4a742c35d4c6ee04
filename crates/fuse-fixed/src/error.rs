// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Numeric faults raised by fixed-point operations.

use thiserror::Error;

/// Errors emitted by fixed-point arithmetic.
///
/// Overflow is not an error: every operation saturates to [`crate::Fix::MAX`]
/// or [`crate::Fix::MIN`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FixError {
    /// The divisor was the fixed-point zero value.
    #[error("division by zero")]
    DivideByZero,
}
