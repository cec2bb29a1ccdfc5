//! The status line: sub-curves currently intersecting the sweep line.

use std::cmp::Ordering;

use crate::traits::SweepTraits;

use super::subcurve::{SubCurveArena, SubCurveId};

/// The totally ordered sequence of sub-curves crossing the sweep line,
/// bottom to top.
///
/// The container stores ids only; every ordering probe receives the arena,
/// the traits and an explicit reference point, so there is no hidden
/// comparator state. Coincident (overlapping) curves coexist; their relative
/// order is whatever the sweep inserted, and lookups scan the coincident run
/// for an exact id match.
///
/// Order inversions at a crossing are never done in place: the sweep removes
/// the curves at the crossing event and re-inserts them in their new order.
pub(crate) struct StatusLine {
    entries: Vec<SubCurveId>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, idx: usize) -> Option<SubCurveId> {
        self.entries.get(idx).copied()
    }

    /// The entry at `idx`, which must be in bounds.
    pub fn at(&self, idx: usize) -> SubCurveId {
        self.entries[idx]
    }

    pub fn insert_at(&mut self, idx: usize, id: SubCurveId) {
        self.entries.insert(idx, id);
    }

    pub fn remove_at(&mut self, idx: usize) -> SubCurveId {
        self.entries.remove(idx)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The first position whose curve is not strictly below `p`.
    pub fn lower_bound<T: SweepTraits>(
        &self,
        arena: &SubCurveArena<T>,
        traits: &T,
        p: &T::Point,
    ) -> usize {
        self.entries.partition_point(|&id| {
            let c = arena[id].curve();
            traits.point_in_x_range(c, p)
                && traits.curve_compare_y_at_x(p, c) == Ordering::Greater
        })
    }

    /// The position of `id`, whose curve passes through `p`.
    ///
    /// Tries the sub-curve's cached hint first; on a miss, searches the run
    /// of curves through `p` for the exact id.
    pub fn position_of<T: SweepTraits>(
        &self,
        arena: &SubCurveArena<T>,
        traits: &T,
        id: SubCurveId,
        p: &T::Point,
    ) -> Option<usize> {
        let hint = arena[id].hint();
        if self.entries.get(hint) == Some(&id) {
            return Some(hint);
        }
        let mut idx = self.lower_bound(arena, traits, p);
        while let Some(&candidate) = self.entries.get(idx) {
            if candidate == id {
                return Some(idx);
            }
            let c = arena[candidate].curve();
            let through = traits.point_in_x_range(c, p)
                && traits.curve_compare_y_at_x(p, c) == Ordering::Equal;
            if !through {
                break;
            }
            idx += 1;
        }
        None
    }
}
