// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the index (AABB, line clipping).
//!
//! Determinism notes:
//! - All coordinates are `Fix` (Q32.32); no floating point is involved.
//! - Box overlap is inclusive on faces so that touching tiles pair up.
//! - Clipping rounds each intersection once, from the original endpoints.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Cohen–Sutherland segment clipping."]
pub mod clip;
