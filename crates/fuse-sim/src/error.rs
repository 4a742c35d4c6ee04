// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use fuse_fixed::FixError;
use thiserror::Error;

/// Errors produced by [`crate::Simulation`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A body with this handle is already present.
    #[error("duplicate body handle {0}")]
    DuplicateHandle(u32),
    /// No body with this handle exists.
    #[error("unknown body handle {0}")]
    UnknownHandle(u32),
    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A fixed-point operation failed.
    #[error(transparent)]
    Numeric(#[from] FixError),
}
