#![allow(missing_docs)]
//! Integration tests for AABB algebra and segment clipping.

use fuse_fixed::{Fix, Fix2};
use fuse_geom::{clip_line_to_box, segment_hits_box, Aabb};
use proptest::prelude::*;

fn aabb_strategy() -> impl Strategy<Value = Aabb> {
    (-30i32..30, -30i32..30, 0i32..12, 0i32..12)
        .prop_map(|(x, y, w, h)| Aabb::from_ints(x, y, x + w, y + h))
}

fn point_strategy() -> impl Strategy<Value = (i32, i32)> {
    (-40i32..40, -40i32..40)
}

/// Exact closed segment/box intersection on integer coordinates.
fn exact_hit(b: (i64, i64, i64, i64), p0: (i64, i64), p1: (i64, i64)) -> bool {
    let (min_x, min_y, max_x, max_y) = b;
    if p0.0.max(p1.0) < min_x
        || p0.0.min(p1.0) > max_x
        || p0.1.max(p1.1) < min_y
        || p0.1.min(p1.1) > max_y
    {
        return false;
    }
    let (dx, dy) = (i128::from(p1.0 - p0.0), i128::from(p1.1 - p0.1));
    let side = |cx: i64, cy: i64| {
        dx * i128::from(cy - p0.1) - dy * i128::from(cx - p0.0)
    };
    let corners = [
        side(min_x, min_y),
        side(max_x, min_y),
        side(min_x, max_y),
        side(max_x, max_y),
    ];
    corners.iter().any(|&c| c <= 0) && corners.iter().any(|&c| c >= 0)
}

#[test]
fn empty_is_identity_of_conjugate() {
    let b = Aabb::from_ints(-1, 2, 3, 4);
    assert_eq!(Aabb::EMPTY.conjugate(&b), b);
    assert_eq!(b.conjugate(&Aabb::EMPTY), b);
    assert!(!Aabb::EMPTY.overlaps(&b));
    assert_eq!(Aabb::EMPTY.area(), Fix::ZERO);
}

#[test]
fn touching_faces_overlap() {
    let a = Aabb::from_ints(0, 0, 1, 1);
    let b = Aabb::from_ints(1, 0, 2, 1);
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&Aabb::from_ints(2, 0, 3, 1)));
}

#[test]
fn degenerate_box_has_zero_area() {
    assert_eq!(Aabb::from_ints(3, 0, 3, 10).area(), Fix::ZERO);
    assert_eq!(Aabb::from_ints(0, 0, 2, 3).area(), Fix::from_int(6));
}

#[test]
fn vertical_segment_clips_to_box_edges() {
    let b = Aabb::from_ints(0, 0, 4, 4);
    let mut p0 = Fix2::from_ints(2, -3);
    let mut p1 = Fix2::from_ints(2, 9);
    assert!(clip_line_to_box(&b, &mut p0, &mut p1));
    assert_eq!(p0, Fix2::from_ints(2, 0));
    assert_eq!(p1, Fix2::from_ints(2, 4));
}

#[test]
fn corner_graze_counts_as_hit() {
    let b = Aabb::from_ints(2, 2, 3, 3);
    assert!(segment_hits_box(&b, Fix2::from_ints(0, 4), Fix2::from_ints(4, 0)));
    assert!(!segment_hits_box(&b, Fix2::from_ints(0, 3), Fix2::from_ints(1, 4)));
}

#[test]
fn empty_box_rejects_everything() {
    assert!(!segment_hits_box(
        &Aabb::EMPTY,
        Fix2::from_ints(-5, -5),
        Fix2::from_ints(5, 5)
    ));
}

proptest! {
    #[test]
    fn conjugate_contains_both(a in aabb_strategy(), b in aabb_strategy()) {
        let u = a.conjugate(&b);
        prop_assert!(u.contains(&a));
        prop_assert!(u.contains(&b));
        prop_assert!(u.area() >= a.area().max(b.area()));
        prop_assert_eq!(u, b.conjugate(&a));
    }

    #[test]
    fn conjugate_is_associative(a in aabb_strategy(), b in aabb_strategy(), c in aabb_strategy()) {
        prop_assert_eq!(a.conjugate(&b).conjugate(&c), a.conjugate(&b.conjugate(&c)));
    }

    #[test]
    fn overlap_is_symmetric(a in aabb_strategy(), b in aabb_strategy()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn clip_matches_exact_reference(
        (x, y, w, h) in (-30i64..30, -30i64..30, 0i64..12, 0i64..12),
        p0 in point_strategy(),
        p1 in point_strategy(),
    ) {
        let b = Aabb::from_ints(x as i32, y as i32, (x + w) as i32, (y + h) as i32);
        let expected = exact_hit(
            (x, y, x + w, y + h),
            (i64::from(p0.0), i64::from(p0.1)),
            (i64::from(p1.0), i64::from(p1.1)),
        );
        let mut a = Fix2::from_ints(p0.0, p0.1);
        let mut c = Fix2::from_ints(p1.0, p1.1);
        let hit = clip_line_to_box(&b, &mut a, &mut c);
        prop_assert_eq!(hit, expected);
        if hit {
            prop_assert!(b.contains_point(a));
            prop_assert!(b.contains_point(c));
        }
    }

    #[test]
    fn clip_rejects_axis_disjoint_segments(
        b in aabb_strategy(),
        p0 in point_strategy(),
        p1 in point_strategy(),
    ) {
        let a = Fix2::from_ints(p0.0, p0.1);
        let c = Fix2::from_ints(p1.0, p1.1);
        if !Aabb::from_points(&[a, c]).overlaps(&b) {
            prop_assert!(!segment_hits_box(&b, a, c));
        }
    }
}
