// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Quadratic node split specialised to `MAX_ENTRIES = 4`, `MIN_ENTRIES = 2`.

use crate::types::aabb::Aabb;

use super::node::{Slot, MAX_ENTRIES, MIN_ENTRIES};

const CANDIDATES: usize = MAX_ENTRIES + 1;

/// Summary of one side of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SplitHalf {
    pub count: usize,
    pub aabb: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    First,
    Second,
}

/// Running bounds and membership of one group.
struct Group {
    aabb: Aabb,
    count: usize,
}

impl Group {
    fn seeded(aabb: Aabb) -> Self {
        Self { aabb, count: 1 }
    }

    fn absorb(&mut self, aabb: &Aabb) {
        self.aabb = self.aabb.conjugate(aabb);
        self.count += 1;
    }
}

/// Index of the pair whose union has the largest area (first pair on ties).
fn pick_seeds<T: Slot>(pool: &[T; CANDIDATES]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_area = pool[0].bounds().conjugate(&pool[1].bounds()).area();
    for i in 0..CANDIDATES {
        for j in (i + 1)..CANDIDATES {
            let area = pool[i].bounds().conjugate(&pool[j].bounds()).area();
            if area > best_area {
                best_area = area;
                best = (i, j);
            }
        }
    }
    best
}

/// `true` if `aabb` should join `first` rather than `second`.
fn prefers_first(first: &Aabb, second: &Aabb, aabb: &Aabb) -> bool {
    let grow_first = first.enlargement(aabb);
    let grow_second = second.enlargement(aabb);
    if grow_first != grow_second {
        return grow_first < grow_second;
    }
    second.size_growth(aabb) >= first.size_growth(aabb)
}

fn bounds_of<T: Slot>(pool: &[T; CANDIDATES], sides: &[Side; CANDIDATES], side: Side) -> Aabb {
    pool.iter()
        .zip(sides)
        .filter(|(_, s)| **s == side)
        .fold(Aabb::EMPTY, |acc, (slot, _)| acc.conjugate(&slot.bounds()))
}

/// Moves the cheapest member of `from` into `to` (least area growth of `to`,
/// lowest index on ties).
fn transfer_one<T: Slot>(
    pool: &[T; CANDIDATES],
    sides: &mut [Side; CANDIDATES],
    to_aabb: &Aabb,
    from: Side,
    to: Side,
) -> Aabb {
    let mut pick: Option<(usize, fuse_fixed::Fix)> = None;
    for (i, slot) in pool.iter().enumerate() {
        if sides[i] != from {
            continue;
        }
        let growth = to_aabb.enlargement(&slot.bounds());
        if pick.is_none_or(|(_, best)| growth < best) {
            pick = Some((i, growth));
        }
    }
    match pick {
        Some((i, _)) => {
            sides[i] = to;
            to_aabb.conjugate(&pool[i].bounds())
        }
        None => *to_aabb,
    }
}

/// Splits a full block plus `incoming` across `kept` (the original block) and
/// `spill` (a freshly allocated block).
///
/// Both blocks must be `MAX_ENTRIES` long. Unused slots are overwritten with
/// `empty`. The first group always stays in `kept`.
pub(crate) fn split_block<T: Slot>(
    kept: &mut [T],
    spill: &mut [T],
    incoming: T,
    empty: T,
) -> (SplitHalf, SplitHalf) {
    debug_assert_eq!(kept.len(), MAX_ENTRIES);
    debug_assert_eq!(spill.len(), MAX_ENTRIES);

    let mut pool = [incoming; CANDIDATES];
    pool[..MAX_ENTRIES].copy_from_slice(kept);

    let (seed_a, seed_b) = pick_seeds(&pool);
    let mut sides = [Side::First; CANDIDATES];
    sides[seed_b] = Side::Second;
    let mut first = Group::seeded(pool[seed_a].bounds());
    let mut second = Group::seeded(pool[seed_b].bounds());

    for (i, slot) in pool.iter().enumerate() {
        if i == seed_a || i == seed_b {
            continue;
        }
        let aabb = slot.bounds();
        if prefers_first(&first.aabb, &second.aabb, &aabb) {
            sides[i] = Side::First;
            first.absorb(&aabb);
        } else {
            sides[i] = Side::Second;
            second.absorb(&aabb);
        }
    }

    while first.count < MIN_ENTRIES {
        first.aabb = transfer_one(&pool, &mut sides, &first.aabb, Side::Second, Side::First);
        first.count += 1;
        second.count -= 1;
        second.aabb = bounds_of(&pool, &sides, Side::Second);
    }
    while second.count < MIN_ENTRIES {
        second.aabb = transfer_one(&pool, &mut sides, &second.aabb, Side::First, Side::Second);
        second.count += 1;
        first.count -= 1;
        first.aabb = bounds_of(&pool, &sides, Side::First);
    }

    let (mut a, mut b) = (0, 0);
    for (slot, side) in pool.iter().zip(&sides) {
        match side {
            Side::First => {
                kept[a] = *slot;
                a += 1;
            }
            Side::Second => {
                spill[b] = *slot;
                b += 1;
            }
        }
    }
    kept[a..].fill(empty);
    spill[b..].fill(empty);

    (
        SplitHalf {
            count: first.count,
            aabb: first.aabb,
        },
        SplitHalf {
            count: second.count,
            aabb: second.aabb,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broad::tree::node::LeafEntry;

    fn leaf(x: i32, y: i32, payload: u32) -> LeafEntry {
        LeafEntry::new(Aabb::from_ints(x, y, x + 1, y + 1), payload)
    }

    #[test]
    fn split_separates_distant_clusters() {
        let mut kept = [leaf(0, 0, 0), leaf(100, 100, 1), leaf(1, 0, 2), leaf(101, 100, 3)];
        let mut spill = [LeafEntry::EMPTY; MAX_ENTRIES];
        let (a, b) = split_block(&mut kept, &mut spill, leaf(0, 1, 4), LeafEntry::EMPTY);
        assert_eq!(a.count + b.count, CANDIDATES);
        let mut near: Vec<u32> = kept[..a.count].iter().map(|e| e.payload).collect();
        near.sort_unstable();
        assert_eq!(near, vec![0, 2, 4]);
        let mut far: Vec<u32> = spill[..b.count].iter().map(|e| e.payload).collect();
        far.sort_unstable();
        assert_eq!(far, vec![1, 3]);
        assert_eq!(kept[3], LeafEntry::EMPTY);
        assert_eq!(spill[2], LeafEntry::EMPTY);
        assert_eq!(b.aabb, Aabb::from_ints(100, 100, 102, 101));
    }

    #[test]
    fn split_enforces_minimum_fill() {
        // Four coincident boxes and one far away: the far one seeds alone and
        // must be topped up to MIN_ENTRIES.
        let mut kept = [leaf(0, 0, 0), leaf(0, 0, 1), leaf(0, 0, 2), leaf(0, 0, 3)];
        let mut spill = [LeafEntry::EMPTY; MAX_ENTRIES];
        let (a, b) = split_block(&mut kept, &mut spill, leaf(50, 50, 4), LeafEntry::EMPTY);
        assert!(a.count >= MIN_ENTRIES && b.count >= MIN_ENTRIES);
        assert_eq!(a.count + b.count, CANDIDATES);
    }
}
