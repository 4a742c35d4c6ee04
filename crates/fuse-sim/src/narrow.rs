// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Exact shape intersection tests and static surface contacts.
//!
//! Every test is strict: shapes that only touch do not intersect.

use fuse_fixed::{Fix, Fix2};
use fuse_geom::Aabb;

use crate::body::{Body, Shape};

/// Extra separation added when a dynamic body is pushed out, so the
/// resolved pair no longer satisfies the strict overlap test after rounding.
pub const RESOLVE_SKIN: Fix = Fix::from_raw(1 << 16);

/// `true` when the two bodies' shapes strictly intersect.
pub fn intersects(a: &Body, b: &Body) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let reach = ra + rb;
            a.position.distance_squared(b.position) < reach * reach
        }
        (Shape::Circle { radius }, Shape::Box { .. }) => circle_box(a.position, radius, &b.aabb()),
        (Shape::Box { .. }, Shape::Circle { radius }) => circle_box(b.position, radius, &a.aabb()),
        (Shape::Box { .. }, Shape::Box { .. }) => boxes(&a.aabb(), &b.aabb()),
    }
}

fn circle_box(center: Fix2, radius: Fix, aabb: &Aabb) -> bool {
    let closest = aabb.clamp_point(center);
    center.distance_squared(closest) < radius * radius
}

fn boxes(a: &Aabb, b: &Aabb) -> bool {
    a.min().x < b.max().x && b.min().x < a.max().x && a.min().y < b.max().y && b.min().y < a.max().y
}

/// Point on a static body's surface closest to `target`, with the outward
/// unit normal there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceContact {
    /// Point on the surface.
    pub point: Fix2,
    /// Outward unit normal at `point`.
    pub normal: Fix2,
}

/// Closest surface point of `body` to `target`.
///
/// When `target` sits exactly on a circle's center the normal falls back to
/// `+y`; inside a box the nearest face wins (left, right, bottom, top on ties).
pub fn surface_contact(body: &Body, target: Fix2) -> SurfaceContact {
    match body.shape {
        Shape::Circle { radius } => {
            let normal = (target - body.position).normalize().unwrap_or(Fix2::UNIT_Y);
            SurfaceContact {
                point: body.position + normal * radius,
                normal,
            }
        }
        Shape::Box { .. } => box_contact(&body.aabb(), target),
    }
}

fn box_contact(aabb: &Aabb, target: Fix2) -> SurfaceContact {
    let clamped = aabb.clamp_point(target);
    if clamped != target {
        if let Ok(normal) = (target - clamped).normalize() {
            return SurfaceContact {
                point: clamped,
                normal,
            };
        }
    }

    let (min, max) = (aabb.min(), aabb.max());
    let faces = [
        (target.x - min.x, Fix2::new(min.x, target.y), -Fix2::UNIT_X),
        (max.x - target.x, Fix2::new(max.x, target.y), Fix2::UNIT_X),
        (target.y - min.y, Fix2::new(target.x, min.y), -Fix2::UNIT_Y),
        (max.y - target.y, Fix2::new(target.x, max.y), Fix2::UNIT_Y),
    ];
    let mut best = faces[0];
    for face in &faces[1..] {
        if face.0 < best.0 {
            best = *face;
        }
    }
    SurfaceContact {
        point: best.1,
        normal: best.2,
    }
}

/// Moves `dynamic` out of `fixed` along the static surface normal.
///
/// The dynamic body ends at `point + normal * (support + RESOLVE_SKIN)`.
pub fn push_out(fixed: &Body, dynamic: &mut Body) -> SurfaceContact {
    let contact = surface_contact(fixed, dynamic.position);
    let reach = dynamic.shape.support(contact.normal) + RESOLVE_SKIN;
    dynamic.position = contact.point + contact.normal * reach;
    contact
}
