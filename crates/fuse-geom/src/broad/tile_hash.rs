// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Uniform-grid spatial hash.

use fuse_fixed::{Fix, Fix2, FixError};
use rustc_hash::FxHashMap;

use crate::types::aabb::Aabb;
use crate::types::clip::segment_hits_box;

use super::tree::LeafEntry;
use super::BroadPhase;

/// Entries covering more cells than this are kept in a list that every query
/// scans instead of being stamped into the grid.
pub const OVERSIZE_CELLS: u64 = 16;

type Cell = (i64, i64);

/// Inclusive cell rectangle covered by a box.
#[derive(Debug, Clone, Copy)]
struct CellSpan {
    min: Cell,
    max: Cell,
}

impl CellSpan {
    fn cells(&self) -> u64 {
        let w = self.max.0.abs_diff(self.min.0).saturating_add(1);
        let h = self.max.1.abs_diff(self.min.1).saturating_add(1);
        w.saturating_mul(h)
    }

    fn iter(self) -> impl Iterator<Item = Cell> {
        (self.min.1..=self.max.1).flat_map(move |y| (self.min.0..=self.max.0).map(move |x| (x, y)))
    }
}

/// Spatial hash keyed by integer tile coordinates `floor(coord / tile_size)`.
///
/// Query results are sorted by payload and free of duplicates, regardless of
/// how many cells an entry spans.
#[derive(Debug, Clone)]
pub struct TileHash {
    tile_raw: i64,
    entries: Vec<LeafEntry>,
    cells: FxHashMap<Cell, Vec<usize>>,
    oversize: Vec<usize>,
}

impl TileHash {
    /// Creates an empty hash with square tiles of side `tile_size`.
    ///
    /// A negative size is treated as its magnitude.
    pub fn new(tile_size: Fix) -> Result<Self, FixError> {
        if tile_size.is_zero() {
            return Err(FixError::DivideByZero);
        }
        Ok(Self {
            tile_raw: tile_size.raw().saturating_abs(),
            entries: Vec::new(),
            cells: FxHashMap::default(),
            oversize: Vec::new(),
        })
    }

    /// Side length of one tile.
    #[must_use]
    pub fn tile_size(&self) -> Fix {
        Fix::from_raw(self.tile_raw)
    }

    /// Tile coordinates containing `p`.
    #[must_use]
    pub fn tile_of(&self, p: Fix2) -> (i64, i64) {
        (
            p.x.raw().div_euclid(self.tile_raw),
            p.y.raw().div_euclid(self.tile_raw),
        )
    }

    /// Number of indexed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn span(&self, aabb: &Aabb) -> CellSpan {
        CellSpan {
            min: self.tile_of(aabb.min()),
            max: self.tile_of(aabb.max()),
        }
    }

    /// Indices of entries that might overlap `query`, sorted and deduplicated.
    fn candidates(&self, query: &Aabb) -> Vec<usize> {
        let mut found = self.oversize.clone();
        let span = self.span(query);
        if span.cells() > u64::try_from(self.cells.len()).unwrap_or(u64::MAX) {
            found.extend(self.cells.values().flatten());
        } else {
            for cell in span.iter() {
                if let Some(bucket) = self.cells.get(&cell) {
                    found.extend(bucket);
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    fn emit(&self, mut hits: Vec<usize>, out: &mut Vec<LeafEntry>) {
        hits.sort_by_key(|&i| (self.entries[i].payload, i));
        out.extend(hits.into_iter().map(|i| self.entries[i]));
    }

    /// Appends every entry whose box the segment `p0 → p1` touches.
    pub fn query_by_line(&self, p0: Fix2, p1: Fix2, out: &mut Vec<LeafEntry>) {
        let bounds = Aabb::from_points(&[p0, p1]);
        let hits = self
            .candidates(&bounds)
            .into_iter()
            .filter(|&i| segment_hits_box(&self.entries[i].aabb, p0, p1))
            .collect();
        self.emit(hits, out);
    }
}

impl BroadPhase for TileHash {
    fn rebuild(&mut self, entries: &[LeafEntry]) {
        self.entries.clear();
        self.entries.extend_from_slice(entries);
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.oversize.clear();

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.aabb.is_empty() {
                continue;
            }
            let span = self.span(&entry.aabb);
            if span.cells() > OVERSIZE_CELLS {
                self.oversize.push(i);
                continue;
            }
            for cell in span.iter() {
                self.cells.entry(cell).or_default().push(i);
            }
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
    }

    fn query_by_aabb(&self, query: &Aabb, out: &mut Vec<LeafEntry>) {
        if query.is_empty() {
            return;
        }
        let hits = self
            .candidates(query)
            .into_iter()
            .filter(|&i| self.entries[i].aabb.overlaps(query))
            .collect();
        self.emit(hits, out);
    }

    fn query_by_line(&self, p0: Fix2, p1: Fix2, out: &mut Vec<LeafEntry>) {
        TileHash::query_by_line(self, p0, p1, out);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hash() -> TileHash {
        TileHash::new(Fix::from_int(4)).unwrap()
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        assert_eq!(
            TileHash::new(Fix::ZERO).map(|_| ()),
            Err(FixError::DivideByZero)
        );
    }

    #[test]
    fn tiles_floor_negative_coordinates() {
        let h = hash();
        assert_eq!(h.tile_of(Fix2::from_ints(-1, 0)), (-1, 0));
        assert_eq!(h.tile_of(Fix2::from_ints(4, 7)), (1, 1));
    }

    #[test]
    fn entries_spanning_cells_are_reported_once_in_payload_order() {
        let mut h = hash();
        h.rebuild(&[
            LeafEntry::new(Aabb::from_ints(3, 3, 5, 5), 9),
            LeafEntry::new(Aabb::from_ints(0, 0, 1, 1), 2),
            LeafEntry::new(Aabb::from_ints(-100, -100, 100, 100), 5),
        ]);
        let mut out = Vec::new();
        h.query_by_aabb(&Aabb::from_ints(0, 0, 6, 6), &mut out);
        let ids: Vec<u32> = out.iter().map(|e| e.payload).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn rebuild_drops_buckets_left_empty() {
        let mut h = hash();
        h.rebuild(&[LeafEntry::new(Aabb::from_ints(0, 0, 1, 1), 1)]);
        h.rebuild(&[LeafEntry::new(Aabb::from_ints(40, 40, 41, 41), 1)]);
        assert_eq!(h.cells.len(), 1);
        assert!(h.cells.contains_key(&(10, 10)));
        let mut out = Vec::new();
        h.query_by_aabb(&Aabb::from_ints(0, 0, 1, 1), &mut out);
        assert!(out.is_empty());
    }
}
