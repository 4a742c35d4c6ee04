// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic Q32.32 fixed-point numerics for Fuse.
//!
//! Everything that can change a simulation outcome (positions, box extents,
//! areas, line clipping) is computed with [`Fix`] and [`Fix2`] instead of
//! floating point, so identical inputs produce bit-identical results on every
//! machine.
//!
//! Overflow saturates; division by zero is the only reported fault
//! ([`FixError::DivideByZero`]).
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]

mod error;
mod fix;
mod fix2;
mod q32;

pub use error::FixError;
pub use fix::Fix;
pub use fix2::Fix2;
