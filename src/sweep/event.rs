//! Event points and their incident sub-curves.

use std::cmp::Ordering;

use crate::traits::SweepTraits;

use super::subcurve::{SubCurveArena, SubCurveId};

/// A point at which the status line changes: a curve endpoint, a pairwise
/// intersection, or a vertical-crossing point.
///
/// The event keeps its incident sub-curves split into the ones that extend to
/// its left (ending or crossing here) and the ones that extend to its right,
/// each list ordered by ascending `y` along the sweep. Vertical curves
/// through the event point live in their own list, since they never enter the
/// status line.
pub(crate) struct Event<T: SweepTraits> {
    point: T::Point,
    left: Vec<SubCurveId>,
    right: Vec<SubCurveId>,
    verticals: Vec<SubCurveId>,
    /// Crossing points on a vertical curve anchored at this event, sorted in
    /// sweep order and deduplicated.
    vertical_x_points: Vec<T::Point>,
    internal_intersection: bool,
}

impl<T: SweepTraits> Event<T> {
    pub fn new(point: T::Point) -> Self {
        Self {
            point,
            left: Vec::new(),
            right: Vec::new(),
            verticals: Vec::new(),
            vertical_x_points: Vec::new(),
            internal_intersection: false,
        }
    }

    pub fn point(&self) -> &T::Point {
        &self.point
    }

    /// Register a sub-curve with one of its endpoints at this event.
    ///
    /// Vertical curves go to the vertical list; otherwise the curve extends
    /// right from its left end and left from its right end.
    pub fn add_curve(&mut self, id: SubCurveId, arena: &SubCurveArena<T>, traits: &T) {
        let sc = &arena[id];
        if traits.curve_is_vertical(sc.curve()) {
            self.add_vertical_curve(id);
        } else if sc.is_left_end(&self.point, traits) {
            self.add_curve_to_right(id, arena, traits);
        } else {
            debug_assert!(sc.is_right_end(&self.point, traits));
            let at = self.point.clone();
            self.add_curve_to_left(id, arena, traits, &at);
        }
    }

    /// Insert `id` into the left list, keeping it ordered by ascending `y`
    /// near `ref_point` (a sweep position no later than this event).
    ///
    /// Marks the event as an internal intersection when the event point lies
    /// in the curve's interior.
    pub fn add_curve_to_left(
        &mut self,
        id: SubCurveId,
        arena: &SubCurveArena<T>,
        traits: &T,
        ref_point: &T::Point,
    ) {
        if self.left.contains(&id) {
            return;
        }
        if !arena[id].is_end_point(&self.point, traits) {
            self.internal_intersection = true;
        }
        let pos = self
            .left
            .partition_point(|&other| left_list_before(arena, traits, other, id, ref_point));
        self.left.insert(pos, id);
    }

    /// Insert `id` into the right list, keeping it ordered by ascending `y`
    /// just right of the event point.
    ///
    /// Marks the event as an internal intersection when the event point lies
    /// in the curve's interior.
    pub fn add_curve_to_right(&mut self, id: SubCurveId, arena: &SubCurveArena<T>, traits: &T) {
        if self.right.contains(&id) {
            return;
        }
        if !arena[id].is_end_point(&self.point, traits) {
            self.internal_intersection = true;
        }
        let pos = self.right.partition_point(|&other| {
            match traits.curves_compare_y_at_x_right(
                arena[other].curve(),
                arena[id].curve(),
                &self.point,
            ) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => other < id,
            }
        });
        self.right.insert(pos, id);
    }

    /// Record a vertical curve through this event point.
    pub fn add_vertical_curve(&mut self, id: SubCurveId) {
        if !self.verticals.contains(&id) {
            self.verticals.push(id);
        }
    }

    /// Record that some curve crosses a vertical anchored at this event at
    /// the given point.
    pub fn add_vertical_x_point(&mut self, p: T::Point, traits: &T) {
        let pos = self
            .vertical_x_points
            .partition_point(|q| traits.compare_xy(q, &p) == Ordering::Less);
        if self
            .vertical_x_points
            .get(pos)
            .is_some_and(|q| traits.point_equal(q, &p))
        {
            return;
        }
        self.vertical_x_points.insert(pos, p);
    }

    pub fn mark_internal_intersection_point(&mut self) {
        self.internal_intersection = true;
    }

    /// Does some curve cross this point in its interior?
    ///
    /// Used to decide whether the point is reported when endpoint reporting
    /// is suppressed.
    pub fn is_internal_intersection_point(&self) -> bool {
        self.internal_intersection
    }

    pub fn does_contain_vertical_curve(&self) -> bool {
        !self.verticals.is_empty()
    }

    pub fn has_left_curves(&self) -> bool {
        !self.left.is_empty()
    }

    pub fn num_left_curves(&self) -> usize {
        self.left.len()
    }

    pub fn num_right_curves(&self) -> usize {
        self.right.len()
    }

    pub fn left_ids(&self) -> &[SubCurveId] {
        &self.left
    }

    pub fn right_ids(&self) -> &[SubCurveId] {
        &self.right
    }

    pub fn vertical_ids(&self) -> &[SubCurveId] {
        &self.verticals
    }

    pub fn vertical_x_points(&self) -> &[T::Point] {
        &self.vertical_x_points
    }
}

/// Does `a` come before `b` in the left list?
///
/// Left-list curves all reach the event from the left, so they are compared
/// at the rightmost of `ref_point` and their left ends; that position is in
/// both curves' x-range. Ties at that position are broken by how the curves
/// leave it, then by id.
fn left_list_before<T: SweepTraits>(
    arena: &SubCurveArena<T>,
    traits: &T,
    a: SubCurveId,
    b: SubCurveId,
    ref_point: &T::Point,
) -> bool {
    let ca = arena[a].curve();
    let cb = arena[b].curve();
    let mut at = ref_point;
    for candidate in [arena[a].left_end(traits), arena[b].left_end(traits)] {
        if traits.compare_x(candidate, at) == Ordering::Greater {
            at = candidate;
        }
    }
    match traits.curves_compare_y_at_x(ca, cb, at) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match traits.curves_compare_y_at_x_right(ca, cb, at) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => a < b,
        },
    }
}
