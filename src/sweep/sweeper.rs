//! The sweep loop and its per-event phases.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::traits::{Intersection, SweepTraits};

use super::event::Event;
use super::queue::EventQueue;
use super::status::StatusLine;
use super::subcurve::{SubCurveArena, SubCurveId};

/// Where the sweep sends its output.
pub(crate) enum Sink<'a, T: SweepTraits> {
    Curves(&'a mut dyn FnMut(&T::Curve)),
    Points(&'a mut dyn FnMut(&T::Point)),
}

impl<T: SweepTraits> Sink<'_, T> {
    fn is_points(&self) -> bool {
        matches!(self, Sink::Points(_))
    }
}

/// A same-x event we have already processed, remembered so that vertical
/// handling at a later event on the same vertical line can still ask whether
/// the point was an interior intersection.
struct SeenEvent<T: SweepTraits> {
    point: T::Point,
    internal: bool,
}

/// A degeneracy-robust Bentley–Ottmann sweep over a set of x-monotone curves.
///
/// The sweeper owns its event queue, status line and sub-curve arena for the
/// duration of an operation; a single `Sweeper` can be reused for any number
/// of operations, one at a time. All geometry is delegated to the traits
/// oracle, so with an exact oracle the sweep handles every degenerate
/// configuration: vertical curves, three or more curves through one point,
/// curves beginning on the interior of other curves, and overlapping curves.
pub struct Sweeper<T: SweepTraits = crate::traits::SegmentTraits> {
    traits: T,
    subcurves: SubCurveArena<T>,
    queue: EventQueue<T>,
    status: StatusLine,

    /// Vertical curves at the current x whose span we are still inside.
    verticals: Vec<SubCurveId>,
    /// Vertical pieces already emitted at the current x, for overlap merging.
    vertical_pieces: Vec<T::Curve>,
    /// Processed events sharing the current x.
    same_x_events: Vec<SeenEvent<T>>,

    overlapping: bool,
    include_endpoints: bool,
    stop_at_first: bool,
    found_intersection: bool,
    /// Once some pair of curves has been found to overlap, neighbour probes
    /// widen from single curves to whole coincident runs.
    overlap_seen: bool,

    last_piece: Option<T::Curve>,
    last_point: Option<T::Point>,
}

impl<T: SweepTraits + Default> Sweeper<T> {
    /// Create a sweeper with a freshly constructed oracle.
    pub fn new() -> Self {
        Self::with_traits(T::default())
    }
}

impl<T: SweepTraits + Default> Default for Sweeper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SweepTraits> Sweeper<T> {
    /// Create a sweeper around the caller's oracle.
    pub fn with_traits(traits: T) -> Self {
        Self {
            traits,
            subcurves: SubCurveArena::new(),
            queue: EventQueue::new(),
            status: StatusLine::new(),
            verticals: Vec::new(),
            vertical_pieces: Vec::new(),
            same_x_events: Vec::new(),
            overlapping: false,
            include_endpoints: true,
            stop_at_first: false,
            found_intersection: false,
            overlap_seen: false,
            last_piece: None,
            last_point: None,
        }
    }

    /// Compute the maximal non-intersecting sub-curves induced by the
    /// arrangement of `curves`, passing each to `sink` in sweep order.
    ///
    /// When `overlapping` is true, a portion on which k input curves coincide
    /// is emitted k times; otherwise it is emitted once.
    pub fn get_subcurves<I, F>(&mut self, curves: I, mut sink: F, overlapping: bool)
    where
        I: IntoIterator<Item = T::Curve>,
        F: FnMut(&T::Curve),
    {
        self.reset();
        self.overlapping = overlapping;
        self.init(curves);
        self.sweep(&mut Sink::Curves(&mut sink));
    }

    /// Compute the pairwise intersection points of `curves`, passing each to
    /// `sink` in sweep order.
    ///
    /// When `include_endpoints` is false, only interior intersections are
    /// reported; otherwise curve endpoints are reported too.
    pub fn get_intersection_points<I, F>(&mut self, curves: I, mut sink: F, include_endpoints: bool)
    where
        I: IntoIterator<Item = T::Curve>,
        F: FnMut(&T::Point),
    {
        self.reset();
        self.include_endpoints = include_endpoints;
        self.init(curves);
        self.sweep(&mut Sink::Points(&mut sink));
    }

    /// Do any two of the curves intersect away from shared endpoints?
    ///
    /// Stops sweeping as soon as one intersection is found.
    pub fn do_curves_intersect<I>(&mut self, curves: I) -> bool
    where
        I: IntoIterator<Item = T::Curve>,
    {
        self.reset();
        self.include_endpoints = false;
        self.stop_at_first = true;
        self.init(curves);
        self.sweep(&mut Sink::Points(&mut |_| {}));
        self.found_intersection
    }

    fn reset(&mut self) {
        self.subcurves.clear();
        self.queue.clear();
        self.status.clear();
        self.verticals.clear();
        self.vertical_pieces.clear();
        self.same_x_events.clear();
        self.overlapping = false;
        self.include_endpoints = true;
        self.stop_at_first = false;
        self.found_intersection = false;
        self.overlap_seen = false;
        self.last_piece = None;
        self.last_point = None;
    }

    /// Split the input into x-monotone pieces and register their endpoint
    /// events.
    fn init<I: IntoIterator<Item = T::Curve>>(&mut self, curves: I) {
        for curve in curves {
            if self.traits.is_x_monotone(&curve) {
                self.init_curve(curve);
            } else {
                for piece in self.traits.make_x_monotone(&curve) {
                    self.init_curve(piece);
                }
            }
        }
    }

    fn init_curve(&mut self, curve: T::Curve) {
        let source = self.traits.curve_source(&curve).clone();
        let target = self.traits.curve_target(&curve).clone();
        let id = self.subcurves.push(curve, &self.traits);
        for p in [source, target] {
            let ev = self.queue.find_or_insert(&self.traits, &p);
            ev.add_curve(id, &self.subcurves, &self.traits);
        }
    }

    /// Pop events in sweep order and run the five per-event phases.
    fn sweep(&mut self, out: &mut Sink<'_, T>) {
        let Some(mut sweep_pos) = self.queue.first_point().cloned() else {
            return;
        };
        let mut prev_pos = sweep_pos.clone();

        while let Some(mut ev) = self.queue.pop_first() {
            let p = ev.point().clone();
            if self.traits.compare_x(&sweep_pos, &p) == Ordering::Less {
                // The sweep line moved strictly right; everything tied to the
                // old x is gone.
                prev_pos = sweep_pos.clone();
                self.verticals.clear();
                self.vertical_pieces.clear();
                self.same_x_events.clear();
            }
            sweep_pos = p.clone();
            debug!("event at {:?}", p);

            self.handle_vertical_curve_bottom(&mut ev, &p, &prev_pos, out.is_points());
            self.handle_vertical_overlap_curves(&mut ev, &p);
            self.handle_left_curves(&mut ev, &p, out);
            self.handle_vertical_curve_top(&mut ev, &p, out);
            self.handle_right_curves(&mut ev, &p, &prev_pos, out);

            self.same_x_events.push(SeenEvent {
                point: p,
                internal: ev.is_internal_intersection_point(),
            });
            if self.stop_at_first && self.found_intersection {
                return;
            }
        }
    }

    /// Phase 1: the current event is the bottom end of one or more vertical
    /// curves.
    ///
    /// Walk the status line across each vertical's span. Curves through one
    /// of the vertical's ends are re-registered on the event at that end;
    /// curves through the interior get an event at the crossing, and the
    /// crossing is recorded on the vertical's top-end event so that phase 4
    /// can slice the vertical there.
    fn handle_vertical_curve_bottom(
        &mut self,
        ev: &mut Event<T>,
        p: &T::Point,
        prev_pos: &T::Point,
        points: bool,
    ) {
        if !ev.does_contain_vertical_curve() {
            return;
        }
        trace!("vertical bottom at {:?}", p);

        for vid in ev.vertical_ids().to_vec() {
            if self.subcurves[vid].is_top_end(p, &self.traits) {
                continue;
            }
            let top = self.subcurves[vid].top_end(&self.traits).clone();
            let vcv = self.subcurves[vid].curve().clone();

            let mut idx = self.status.lower_bound(&self.subcurves, &self.traits, p);
            let mut last_created_here = false;
            let mut prev_xp: Option<T::Point> = None;

            while idx < self.status.len() {
                let cid = self.status.at(idx);
                let ccv = self.subcurves[cid].curve().clone();
                let above_top = self.traits.point_in_x_range(&ccv, &top)
                    && self.traits.curve_compare_y_at_x(&top, &ccv) == Ordering::Less;
                let below_bottom = self.traits.point_in_x_range(&ccv, p)
                    && self.traits.curve_compare_y_at_x(p, &ccv) == Ordering::Greater;
                if above_top || below_bottom {
                    break;
                }

                if self.handle_vertical_x_at_end(cid, &top, ev, p, prev_pos, points) {
                    idx += 1;
                    continue;
                }

                // The status curve crosses the vertical's interior.
                let xp = match self.traits.nearest_intersection_to_right(&vcv, &ccv, p) {
                    Some(Intersection::Point(xp)) => xp,
                    other => panic!(
                        "oracle: curve through a vertical span reported {:?}",
                        other
                    ),
                };

                if !self.queue.contains(&self.traits, &xp) {
                    debug!("new event at {:?} (vertical crossing)", xp);
                    let e = self.queue.find_or_insert(&self.traits, &xp);
                    e.add_curve_to_left(cid, &self.subcurves, &self.traits, p);
                    e.add_curve_to_right(cid, &self.subcurves, &self.traits);
                    last_created_here = true;
                } else if points {
                    let left_ref = self.subcurves[cid].left_end(&self.traits).clone();
                    let extends_right = self.traits.compare_x(
                        self.subcurves[cid].right_end(&self.traits),
                        p,
                    ) == Ordering::Greater;
                    let e = self
                        .queue
                        .find_mut(&self.traits, &xp)
                        .expect("event just found");
                    e.mark_internal_intersection_point();
                    e.add_vertical_curve(vid);
                    e.add_curve_to_left(cid, &self.subcurves, &self.traits, &left_ref);
                    if extends_right {
                        e.add_curve_to_right(cid, &self.subcurves, &self.traits);
                    }
                } else {
                    let same_as_prev = prev_xp
                        .as_ref()
                        .is_some_and(|q| self.traits.point_equal(q, &xp));
                    if same_as_prev {
                        if last_created_here {
                            let at_left = self.subcurves[cid].is_left_end(&xp, &self.traits);
                            let at_right = self.subcurves[cid].is_right_end(&xp, &self.traits);
                            let e = self
                                .queue
                                .find_mut(&self.traits, &xp)
                                .expect("event just found");
                            if !at_left {
                                e.add_curve_to_left(cid, &self.subcurves, &self.traits, p);
                            }
                            if !at_right {
                                e.add_curve_to_right(cid, &self.subcurves, &self.traits);
                            }
                        }
                    } else {
                        last_created_here = false;
                    }
                }

                let top_ev = self
                    .queue
                    .find_mut(&self.traits, &top)
                    .expect("top end of a vertical curve is always queued");
                top_ev.add_vertical_x_point(xp.clone(), &self.traits);
                prev_xp = Some(xp);
                idx += 1;
            }
        }
    }

    /// Does the status curve `cid` pass through one of the vertical `vid`'s
    /// ends? If so, re-register it on the event at that end.
    fn handle_vertical_x_at_end(
        &mut self,
        cid: SubCurveId,
        top: &T::Point,
        ev: &mut Event<T>,
        p: &T::Point,
        prev_pos: &T::Point,
        points: bool,
    ) -> bool {
        let ccv = self.subcurves[cid].curve().clone();

        if self.traits.point_in_x_range(&ccv, top)
            && self.traits.curve_compare_y_at_x(top, &ccv) == Ordering::Equal
        {
            if points {
                if !self.subcurves[cid].is_end_point(top, &self.traits) {
                    let top_ev = self
                        .queue
                        .find_mut(&self.traits, top)
                        .expect("top end of a vertical curve is always queued");
                    top_ev.mark_internal_intersection_point();
                }
            } else {
                let at_left = self.subcurves[cid].is_left_end(top, &self.traits);
                let at_right = self.subcurves[cid].is_right_end(top, &self.traits);
                let top_ev = self
                    .queue
                    .find_mut(&self.traits, top)
                    .expect("top end of a vertical curve is always queued");
                if !at_left {
                    top_ev.add_curve_to_left(cid, &self.subcurves, &self.traits, prev_pos);
                }
                if !at_right {
                    top_ev.add_curve_to_right(cid, &self.subcurves, &self.traits);
                }
            }
            return true;
        }

        if self.traits.point_in_x_range(&ccv, p)
            && self.traits.curve_compare_y_at_x(p, &ccv) == Ordering::Equal
        {
            if points {
                if !self.subcurves[cid].is_end_point(p, &self.traits) {
                    ev.mark_internal_intersection_point();
                }
            } else {
                if !self.subcurves[cid].is_left_end(p, &self.traits) {
                    ev.add_curve_to_left(cid, &self.subcurves, &self.traits, prev_pos);
                }
                if !self.subcurves[cid].is_right_end(p, &self.traits) {
                    ev.add_curve_to_right(cid, &self.subcurves, &self.traits);
                }
            }
            return true;
        }

        false
    }

    /// Phase 2: vertical curves carried over from earlier events at this x.
    ///
    /// Verticals whose top end is below the current point have been passed
    /// and are dropped. If the current point lies strictly inside a
    /// working-set vertical, the event is an interior intersection and the
    /// crossing is recorded on that vertical's top-end event. Finally,
    /// verticals whose bottom end is the current point join the working set.
    fn handle_vertical_overlap_curves(&mut self, ev: &mut Event<T>, p: &T::Point) {
        let mut idx = 0;
        while idx < self.verticals.len() {
            let vid = self.verticals[idx];
            let vcv = self.subcurves[vid].curve().clone();
            if self.traits.point_in_x_range(&vcv, p)
                && self.traits.curve_compare_y_at_x(p, &vcv) == Ordering::Greater
            {
                self.verticals.remove(idx);
            } else if !self.subcurves[vid].is_end_point(p, &self.traits) {
                let top = self.subcurves[vid].top_end(&self.traits).clone();
                let top_ev = self
                    .queue
                    .find_mut(&self.traits, &top)
                    .expect("top end of a vertical curve is always queued");
                top_ev.add_vertical_x_point(p.clone(), &self.traits);
                ev.mark_internal_intersection_point();
                idx += 1;
            } else {
                idx += 1;
            }
        }

        for vid in ev.vertical_ids().to_vec() {
            if self.subcurves[vid].is_bottom_end(p, &self.traits) {
                self.verticals.push(vid);
            }
        }
    }

    /// Phase 3: curves that end at or cross the current event.
    ///
    /// In sub-curves mode this emits each left curve's pending piece; in
    /// points mode it reports the event point. Either way the curves leave
    /// the status line (curves that merely cross come back in phase 5).
    fn handle_left_curves(&mut self, ev: &mut Event<T>, p: &T::Point, out: &mut Sink<'_, T>) {
        trace!("left curves at {:?}", p);
        if out.is_points() {
            if !ev.has_left_curves() {
                if self.include_endpoints || ev.is_internal_intersection_point() {
                    self.emit_point(out, p);
                }
                return;
            }
            for lid in ev.left_ids().to_vec() {
                self.remove_curve_from_status(lid, p);
            }
            if self.include_endpoints || ev.is_internal_intersection_point() {
                self.emit_point(out, p);
            }
        } else {
            for lid in ev.left_ids().to_vec() {
                let piece = self.left_piece(lid, p);
                self.emit_curve(out, &piece);
                self.remove_curve_from_status(lid, p);
            }
        }
    }

    /// The piece of left curve `lid` that becomes reportable at `p`, with the
    /// emitted/unemitted partition advanced past `p`.
    fn left_piece(&mut self, lid: SubCurveId, p: &T::Point) -> T::Curve {
        let cv = self.subcurves[lid].curve().clone();
        let last_point = self.subcurves[lid].last_point().clone();
        let source_left = self.subcurves[lid].source_left_of_target();

        if self.subcurves[lid].is_source(p, &self.traits) {
            // The event is the curve's source, which must be its right end.
            if !self.subcurves[lid].is_target(&last_point, &self.traits) {
                let (first, _) = self.traits.curve_split(&cv, &last_point);
                first
            } else {
                cv
            }
        } else if self.subcurves[lid].is_target(p, &self.traits) {
            if !self.subcurves[lid].is_source(&last_point, &self.traits) {
                let (_, second) = self.traits.curve_split(&cv, &last_point);
                second
            } else {
                cv
            }
        } else {
            // The event is interior to the original curve: split off the
            // piece between `last_point` and `p` and keep the remainder.
            let (piece, rest) = if self.subcurves[lid].is_source(&last_point, &self.traits) {
                let (first, second) = self.traits.curve_split(&cv, p);
                (first, second)
            } else if self.subcurves[lid].is_target(&last_point, &self.traits) {
                let (first, second) = self.traits.curve_split(&cv, p);
                (second, first)
            } else {
                let lc = self.subcurves[lid].last_curve().clone();
                let (first, second) = self.traits.curve_split(&lc, p);
                if source_left {
                    (first, second)
                } else {
                    (second, first)
                }
            };
            self.subcurves[lid].set_last_point(p.clone());
            self.subcurves[lid].set_last_curve(rest);
            piece
        }
    }

    /// Remove `lid` from the status line. On a final removal (the event is
    /// the curve's right end) its former neighbours become adjacent, so probe
    /// them for intersections first.
    fn remove_curve_from_status(&mut self, lid: SubCurveId, p: &T::Point) {
        let idx = self
            .status
            .position_of(&self.subcurves, &self.traits, lid, p)
            .expect("left curve is always on the status line");

        if self.subcurves[lid].is_end_point(p, &self.traits) && idx > 0 && idx + 1 < self.status.len()
        {
            let below = self.overlap_group_below(idx - 1, p);
            let above = self.overlap_group_above(idx + 1, p);
            for &b in &above {
                for &a in &below {
                    self.intersect(b, a, p);
                }
            }
        }
        self.status.remove_at(idx);
        self.subcurves[lid].set_in_status(false);
    }

    /// Phase 4: the current event is the top end of one or more vertical
    /// curves.
    ///
    /// First sweep the status line upward to pick up curves that begin on the
    /// vertical's interior at this x; then, in sub-curves mode, slice the
    /// vertical at every recorded crossing and emit the pieces. In points
    /// mode the collected left ends are reported here if they were not
    /// interior crossings already.
    fn handle_vertical_curve_top(&mut self, ev: &mut Event<T>, p: &T::Point, out: &mut Sink<'_, T>) {
        if !ev.does_contain_vertical_curve() {
            return;
        }
        trace!("vertical top at {:?}", p);

        for vid in ev.vertical_ids().to_vec() {
            if self.subcurves[vid].is_bottom_end(p, &self.traits) {
                continue;
            }
            let bottom = self.subcurves[vid].bottom_end(&self.traits).clone();

            let mut idx = self
                .status
                .lower_bound(&self.subcurves, &self.traits, &bottom);
            while idx < self.status.len() {
                let cid = self.status.at(idx);
                let ccv = self.subcurves[cid].curve().clone();
                let crosses = self.traits.point_in_x_range(&ccv, p)
                    && self.traits.curve_compare_y_at_x(p, &ccv) == Ordering::Greater
                    && self.traits.point_in_x_range(&ccv, &bottom)
                    && self.traits.curve_compare_y_at_x(&bottom, &ccv) == Ordering::Less;
                if !crosses {
                    break;
                }
                let left_end = self.subcurves[cid].left_end(&self.traits).clone();
                if self.traits.compare_x(&left_end, p) == Ordering::Equal {
                    // A curve begins on the vertical's interior.
                    ev.add_vertical_x_point(left_end.clone(), &self.traits);
                    if out.is_points()
                        && !self.include_endpoints
                        && !self.note_internal_x_point(&left_end)
                    {
                        self.emit_point(out, &left_end);
                    }
                }
                idx += 1;
            }

            if let Sink::Curves(_) = out {
                let points = ev.vertical_x_points().to_vec();
                let source_left = self.subcurves[vid].source_left_of_target();
                let mut rest = self.subcurves[vid].curve().clone();
                for q in &points {
                    if !self.subcurves[vid].is_point_in_range(q, &self.traits)
                        || self.subcurves[vid].is_end_point(q, &self.traits)
                    {
                        continue;
                    }
                    let (first, second) = self.traits.curve_split(&rest, q);
                    if source_left {
                        self.emit_vertical_curve(out, &first);
                        rest = second;
                    } else {
                        self.emit_vertical_curve(out, &second);
                        rest = first;
                    }
                }
                self.emit_vertical_curve(out, &rest);
            }
        }
    }

    /// Was `p` (an already-processed event at the current x) an interior
    /// intersection? Marks it as one on the first query, so that the same
    /// crossing is not reported from two verticals.
    fn note_internal_x_point(&mut self, p: &T::Point) -> bool {
        let idx = self
            .same_x_events
            .iter()
            .position(|seen| self.traits.point_equal(&seen.point, p))
            .expect("crossing point on a vertical was an event at this x");
        if self.same_x_events[idx].internal {
            return true;
        }
        self.same_x_events[idx].internal = true;
        if let Some(e) = self.queue.find_mut(&self.traits, p) {
            e.mark_internal_intersection_point();
        }
        false
    }

    /// Phase 5: insert the curves extending right of the event and probe
    /// their new neighbourhoods for intersections.
    fn handle_right_curves(
        &mut self,
        ev: &mut Event<T>,
        p: &T::Point,
        prev_pos: &T::Point,
        out: &mut Sink<'_, T>,
    ) {
        if ev.num_right_curves() == 0 {
            return;
        }
        trace!("right curves at {:?}", p);

        if ev.num_right_curves() == 1 {
            let rid = ev.right_ids()[0];
            let mut cursor = self.status.lower_bound(&self.subcurves, &self.traits, p);
            let pos = self.insert_right_curve(rid, &mut cursor, p);
            if self.status.len() == 1 {
                return;
            }

            let mut group = Vec::new();
            if pos > 0 {
                group.extend(self.overlap_group_below(pos - 1, p));
            }
            if pos + 1 < self.status.len() {
                group.extend(self.overlap_group_above(pos + 1, p));
            }
            if out.is_points() {
                if pos > 0 {
                    self.report_junction(rid, self.status.at(pos - 1), p, out);
                }
                if pos + 1 < self.status.len() {
                    self.report_junction(rid, self.status.at(pos + 1), p, out);
                }
                for &other in &group {
                    self.intersect(rid, other, p);
                }
            } else {
                self.intersect_group_splitting(rid, &group, false, ev, p, prev_pos, out);
            }
            return;
        }

        // Several curves extend right: an intersection point, or a fan of
        // curves starting here.
        if ev.num_left_curves() == 0 {
            self.handle_junction_fan(ev, p, out);
        }

        let ids = ev.right_ids().to_vec();
        let mut cursor = self.status.lower_bound(&self.subcurves, &self.traits, p);

        let first = ids[0];
        let pos0 = self.insert_right_curve(first, &mut cursor, p);
        let mut prevlist: Vec<SubCurveId> = Vec::new();
        let mut currentlist = vec![first];
        if pos0 > 0 {
            prevlist = self.overlap_group_below(pos0 - 1, p);
            let list = prevlist.clone();
            if out.is_points() {
                self.report_junction(first, self.status.at(pos0 - 1), p, out);
                for &other in &list {
                    self.intersect(first, other, p);
                }
            } else {
                self.intersect_group_splitting(first, &list, false, ev, p, prev_pos, out);
            }
        }

        let mut prev_id = first;
        for &rid in &ids[1..] {
            self.insert_right_curve(rid, &mut cursor, p);
            if self.do_curves_overlap(rid, prev_id, p) {
                let list = currentlist.clone();
                if out.is_points() {
                    for &other in &list {
                        self.intersect(rid, other, p);
                    }
                } else {
                    self.intersect_group_splitting(rid, &list, false, ev, p, prev_pos, out);
                }
                currentlist.push(rid);
            } else {
                prevlist = std::mem::take(&mut currentlist);
                currentlist.push(rid);
            }
            let list = prevlist.clone();
            if out.is_points() {
                for &other in &list {
                    self.intersect(rid, other, p);
                }
            } else {
                self.intersect_group_splitting(rid, &list, false, ev, p, prev_pos, out);
            }
            prev_id = rid;
        }

        // The neighbour group above the highest inserted curve.
        if cursor < self.status.len() {
            let next = self.status.at(cursor);
            let list = currentlist.clone();
            if out.is_points() {
                self.report_junction(*ids.last().expect("non-empty"), next, p, out);
                for &other in &list {
                    self.intersect(next, other, p);
                }
            } else {
                self.intersect_group_splitting(next, &list, true, ev, p, prev_pos, out);
            }
            if self.overlap_seen {
                let mut above = cursor + 1;
                while above < self.status.len() {
                    let cand = self.status.at(above);
                    if !self.do_curves_overlap(next, cand, p) {
                        break;
                    }
                    if out.is_points() {
                        for &other in &list {
                            self.intersect(cand, other, p);
                        }
                    } else {
                        self.intersect_group_splitting(cand, &list, true, ev, p, prev_pos, out);
                    }
                    above += 1;
                }
            }
        }
    }

    /// The "several curves start here, none end here" configuration: one of
    /// the starting curves may sit on the interior of a status curve.
    fn handle_junction_fan(&mut self, ev: &mut Event<T>, p: &T::Point, out: &mut Sink<'_, T>) {
        for rid in ev.right_ids().to_vec() {
            let idx = self.status.lower_bound(&self.subcurves, &self.traits, p);
            let Some(host) = self.status.get(idx) else {
                continue;
            };
            if !self.curve_starts_at_curve(rid, host, p) {
                continue;
            }
            if out.is_points() {
                if !self.include_endpoints {
                    let junction = self.subcurves[rid].left_end(&self.traits).clone();
                    self.emit_point(out, &junction);
                    break;
                }
            } else {
                ev.add_curve_to_left(host, &self.subcurves, &self.traits, p);
                ev.add_curve_to_right(host, &self.subcurves, &self.traits);
                let piece = self.split_host_at(host, p);
                self.emit_curve(out, &piece);
                break;
            }
        }
    }

    /// Insert a right curve at its ordered position, advancing `cursor` past
    /// it.
    ///
    /// Curves already resident in the status line (T-junction hosts that were
    /// re-registered on this event) are not inserted again; the cursor just
    /// moves past them. Status curves passing through `p` that leave it below
    /// the new curve are also skipped over.
    fn insert_right_curve(&mut self, rid: SubCurveId, cursor: &mut usize, p: &T::Point) -> usize {
        if self.subcurves[rid].in_status() {
            let pos = self
                .status
                .position_of(&self.subcurves, &self.traits, rid, p)
                .expect("resident curve is on the status line");
            *cursor = pos + 1;
            return pos;
        }

        while let Some(sid) = self.status.get(*cursor) {
            let scv = self.subcurves[sid].curve().clone();
            let through = self.traits.point_in_x_range(&scv, p)
                && self.traits.curve_compare_y_at_x(p, &scv) == Ordering::Equal;
            if !through {
                break;
            }
            let rcv = self.subcurves[rid].curve().clone();
            if self.traits.curves_compare_y_at_x_right(&scv, &rcv, p) == Ordering::Less {
                *cursor += 1;
            } else {
                break;
            }
        }

        self.status.insert_at(*cursor, rid);
        self.subcurves[rid].set_hint(*cursor);
        self.subcurves[rid].set_in_status(true);
        let pos = *cursor;
        *cursor += 1;
        pos
    }

    /// Probe `c1` against every curve in `list` for future intersections,
    /// handling curve-starts-at-curve junctions along the way (sub-curves
    /// mode).
    ///
    /// With `reverse` false, `c1` is the curve starting at the current event
    /// and the list members are potential hosts; with `reverse` true the
    /// roles flip. A host gets split at the junction, re-registered on the
    /// current event, and its pending piece is emitted after the probes.
    fn intersect_group_splitting(
        &mut self,
        c1: SubCurveId,
        list: &[SubCurveId],
        reverse: bool,
        ev: &mut Event<T>,
        p: &T::Point,
        prev_pos: &T::Point,
        out: &mut Sink<'_, T>,
    ) {
        let mut staged = Vec::new();
        for &other in list {
            let (starter, host) = if reverse { (other, c1) } else { (c1, other) };
            if self.curve_starts_at_curve(starter, host, p)
                && !self
                    .traits
                    .point_equal(self.subcurves[host].last_point(), p)
            {
                debug!("curve {:?} starts on {:?} at {:?}", starter, host, p);
                ev.add_curve_to_right(host, &self.subcurves, &self.traits);
                ev.add_curve_to_left(host, &self.subcurves, &self.traits, prev_pos);
                let piece = self.split_host_at(host, p);
                self.subcurves[host].set_last_piece(piece);
                staged.push(host);
            }
            self.intersect(c1, other, p);
        }
        for host in staged {
            let piece = self.subcurves[host]
                .take_last_piece()
                .expect("staged host piece");
            self.emit_curve(out, &piece);
        }
    }

    /// Split the host curve's unemitted suffix at `p`, advancing its
    /// emitted/unemitted partition, and return the piece left of `p`.
    fn split_host_at(&mut self, host: SubCurveId, p: &T::Point) -> T::Curve {
        let lc = self.subcurves[host].last_curve().clone();
        let (first, second) = self.traits.curve_split(&lc, p);
        let (piece, rest) = if self.subcurves[host].source_left_of_target() {
            (first, second)
        } else {
            (second, first)
        };
        self.subcurves[host].set_last_point(p.clone());
        self.subcurves[host].set_last_curve(rest);
        piece
    }

    /// Report a curve-starts-at-curve junction in points mode.
    fn report_junction(
        &mut self,
        starter: SubCurveId,
        host: SubCurveId,
        p: &T::Point,
        out: &mut Sink<'_, T>,
    ) {
        if self.curve_starts_at_curve(starter, host, p) && !self.include_endpoints {
            let junction = self.subcurves[starter].left_end(&self.traits).clone();
            self.emit_point(out, &junction);
        }
    }

    /// Does `one` begin at the current event point, on the interior of `two`?
    fn curve_starts_at_curve(&self, one: SubCurveId, two: SubCurveId, p: &T::Point) -> bool {
        let one_left = self.subcurves[one].left_end(&self.traits);
        let two_left = self.subcurves[two].left_end(&self.traits);
        if self.traits.point_equal(one_left, two_left) {
            return false;
        }
        if !self.traits.point_equal(one_left, p) {
            return false;
        }
        let two_curve = self.subcurves[two].curve();
        self.traits.point_in_x_range(two_curve, one_left)
            && self.traits.curve_compare_y_at_x(one_left, two_curve) == Ordering::Equal
    }

    /// Ask the oracle for the next intersection of `a` and `b` right of `p`
    /// and create or amend the event there. Returns true when the curves
    /// overlap.
    fn intersect(&mut self, a: SubCurveId, b: SubCurveId, p: &T::Point) -> bool {
        if a == b {
            return false;
        }
        let ca = self.subcurves[a].curve().clone();
        let cb = self.subcurves[b].curve().clone();
        match self.traits.nearest_intersection_to_right(&ca, &cb, p) {
            None => false,
            Some(Intersection::Point(xp)) => {
                self.queue_intersection(a, b, xp, p);
                false
            }
            Some(Intersection::Overlap(_, far)) => {
                debug!("overlap between {:?} and {:?}", a, b);
                self.overlap_seen = true;
                // Queue the far end of the overlap; both curves get emitted
                // (or merged) when the sweep reaches it.
                self.queue_intersection(a, b, far, p);
                true
            }
        }
    }

    fn queue_intersection(&mut self, a: SubCurveId, b: SubCurveId, xp: T::Point, p: &T::Point) {
        if !self.queue.contains(&self.traits, &xp) {
            debug!("new intersection event at {:?}", xp);
            let e = self.queue.find_or_insert(&self.traits, &xp);
            e.add_curve_to_left(a, &self.subcurves, &self.traits, p);
            e.add_curve_to_left(b, &self.subcurves, &self.traits, p);
            e.add_curve_to_right(a, &self.subcurves, &self.traits);
            e.add_curve_to_right(b, &self.subcurves, &self.traits);
        } else {
            let a_end = self.subcurves[a].is_end_point(&xp, &self.traits);
            let b_end = self.subcurves[b].is_end_point(&xp, &self.traits);
            let e = self
                .queue
                .find_mut(&self.traits, &xp)
                .expect("event just found");
            if !a_end {
                e.add_curve_to_left(a, &self.subcurves, &self.traits, p);
                e.add_curve_to_right(a, &self.subcurves, &self.traits);
            }
            if !b_end {
                e.add_curve_to_left(b, &self.subcurves, &self.traits, p);
                e.add_curve_to_right(b, &self.subcurves, &self.traits);
            }
        }
    }

    /// Do `a` and `b` coincide at the sweep position?
    fn do_curves_overlap(&self, a: SubCurveId, b: SubCurveId, p: &T::Point) -> bool {
        let ca = self.subcurves[a].curve();
        let cb = self.subcurves[b].curve();
        self.traits.curves_compare_y_at_x(ca, cb, p) == Ordering::Equal
            && self.traits.curves_overlap(ca, cb)
    }

    /// The curve at `idx` plus, once an overlap has been seen, any contiguous
    /// lower neighbours coinciding with it.
    fn overlap_group_below(&self, idx: usize, p: &T::Point) -> Vec<SubCurveId> {
        let anchor = self.status.at(idx);
        let mut group = vec![anchor];
        if self.overlap_seen {
            let mut j = idx;
            while j > 0 {
                j -= 1;
                let cand = self.status.at(j);
                if self.do_curves_overlap(anchor, cand, p) {
                    group.push(cand);
                } else {
                    break;
                }
            }
        }
        group
    }

    /// The curve at `idx` plus, once an overlap has been seen, any contiguous
    /// upper neighbours coinciding with it.
    fn overlap_group_above(&self, idx: usize, p: &T::Point) -> Vec<SubCurveId> {
        let anchor = self.status.at(idx);
        let mut group = vec![anchor];
        if self.overlap_seen {
            let mut j = idx + 1;
            while j < self.status.len() {
                let cand = self.status.at(j);
                if self.do_curves_overlap(anchor, cand, p) {
                    group.push(cand);
                } else {
                    break;
                }
                j += 1;
            }
        }
        group
    }

    fn emit_curve(&mut self, out: &mut Sink<'_, T>, cv: &T::Curve) {
        let Sink::Curves(sink) = out else {
            unreachable!("curve emission in points mode");
        };
        if !self.overlapping {
            if let Some(prev) = &self.last_piece {
                if self.traits.curve_equal(prev, cv) {
                    trace!("suppressing duplicate piece {:?}", cv);
                    return;
                }
            }
            self.last_piece = Some(cv.clone());
        }
        sink(cv);
    }

    /// Emit a piece of a vertical curve.
    ///
    /// Coincident vertical pieces at one x can be produced out of emission
    /// order, so merging compares against everything emitted at this x rather
    /// than just the previous piece.
    fn emit_vertical_curve(&mut self, out: &mut Sink<'_, T>, cv: &T::Curve) {
        let Sink::Curves(sink) = out else {
            unreachable!("curve emission in points mode");
        };
        if !self.overlapping {
            if self
                .vertical_pieces
                .iter()
                .any(|prev| self.traits.curve_equal(prev, cv))
            {
                trace!("suppressing duplicate vertical piece {:?}", cv);
                return;
            }
            self.vertical_pieces.push(cv.clone());
        }
        sink(cv);
    }

    fn emit_point(&mut self, out: &mut Sink<'_, T>, p: &T::Point) {
        let Sink::Points(sink) = out else {
            unreachable!("point emission in sub-curves mode");
        };
        self.found_intersection = true;
        if let Some(prev) = &self.last_point {
            if self.traits.point_equal(prev, p) {
                return;
            }
        }
        self.last_point = Some(p.clone());
        sink(p);
    }
}
