//! End-to-end tests of the sweep on degenerate arrangements.

use std::collections::BTreeSet;

use planesweep::{
    any_intersections, intersection_points, subcurves, Intersection, Point, Segment,
    SegmentTraits, SweepTraits, Sweeper,
};
use proptest::prelude::*;

type Input = ((f64, f64), (f64, f64));

fn pt(x: f64, y: f64) -> Point {
    Point::from_f64(x, y).unwrap()
}

fn point_set(points: &[Point]) -> BTreeSet<Point> {
    points.iter().cloned().collect()
}

/// Pieces as a sorted multiset of (source, target) pairs.
fn piece_list(pieces: &[Segment]) -> Vec<(Point, Point)> {
    let mut v: Vec<_> = pieces
        .iter()
        .map(|s| (s.source.clone(), s.target.clone()))
        .collect();
    v.sort();
    v
}

fn expected_pieces(expected: &[Input]) -> Vec<(Point, Point)> {
    let mut v: Vec<_> = expected
        .iter()
        .map(|&((sx, sy), (tx, ty))| (pt(sx, sy), pt(tx, ty)))
        .collect();
    v.sort();
    v
}

#[test]
fn two_crossing_segments() {
    let input = [((0.0, 0.0), (10.0, 10.0)), ((0.0, 10.0), (10.0, 0.0))];
    assert_eq!(intersection_points(input, false).unwrap(), vec![pt(5.0, 5.0)]);
    let pieces = subcurves(input, false).unwrap();
    assert_eq!(
        piece_list(&pieces),
        expected_pieces(&[
            ((0.0, 0.0), (5.0, 5.0)),
            ((5.0, 5.0), (10.0, 10.0)),
            ((0.0, 10.0), (5.0, 5.0)),
            ((5.0, 5.0), (10.0, 0.0)),
        ])
    );
}

#[test]
fn three_concurrent_segments() {
    let input = [
        ((0.0, 0.0), (6.0, 6.0)),
        ((0.0, 6.0), (6.0, 0.0)),
        ((3.0, 0.0), (3.0, 6.0)),
    ];
    assert_eq!(intersection_points(input, false).unwrap(), vec![pt(3.0, 3.0)]);
    let pieces = subcurves(input, false).unwrap();
    assert_eq!(
        piece_list(&pieces),
        expected_pieces(&[
            ((0.0, 0.0), (3.0, 3.0)),
            ((3.0, 3.0), (6.0, 6.0)),
            ((0.0, 6.0), (3.0, 3.0)),
            ((3.0, 3.0), (6.0, 0.0)),
            ((3.0, 0.0), (3.0, 3.0)),
            ((3.0, 3.0), (3.0, 6.0)),
        ])
    );
}

#[test]
fn t_junction() {
    let input = [((0.0, 0.0), (10.0, 0.0)), ((5.0, 0.0), (5.0, 10.0))];
    assert_eq!(intersection_points(input, false).unwrap(), vec![pt(5.0, 0.0)]);
    assert_eq!(
        point_set(&intersection_points(input, true).unwrap()),
        [pt(0.0, 0.0), pt(5.0, 0.0), pt(5.0, 10.0), pt(10.0, 0.0)]
            .into_iter()
            .collect()
    );
    let pieces = subcurves(input, false).unwrap();
    assert_eq!(
        piece_list(&pieces),
        expected_pieces(&[
            ((0.0, 0.0), (5.0, 0.0)),
            ((5.0, 0.0), (10.0, 0.0)),
            ((5.0, 0.0), (5.0, 10.0)),
        ])
    );
}

#[test]
fn overlapping_segments() {
    let input = [((0.0, 0.0), (10.0, 0.0)), ((3.0, 0.0), (7.0, 0.0))];
    let merged = subcurves(input, false).unwrap();
    assert_eq!(
        piece_list(&merged),
        expected_pieces(&[
            ((0.0, 0.0), (3.0, 0.0)),
            ((3.0, 0.0), (7.0, 0.0)),
            ((7.0, 0.0), (10.0, 0.0)),
        ])
    );
    let multiple = subcurves(input, true).unwrap();
    assert_eq!(
        piece_list(&multiple),
        expected_pieces(&[
            ((0.0, 0.0), (3.0, 0.0)),
            ((3.0, 0.0), (7.0, 0.0)),
            ((3.0, 0.0), (7.0, 0.0)),
            ((7.0, 0.0), (10.0, 0.0)),
        ])
    );
}

#[test]
fn vertical_through_horizontal() {
    let input = [((0.0, 5.0), (10.0, 5.0)), ((5.0, 0.0), (5.0, 10.0))];
    assert_eq!(intersection_points(input, false).unwrap(), vec![pt(5.0, 5.0)]);
    let pieces = subcurves(input, false).unwrap();
    assert_eq!(
        piece_list(&pieces),
        expected_pieces(&[
            ((0.0, 5.0), (5.0, 5.0)),
            ((5.0, 5.0), (10.0, 5.0)),
            ((5.0, 0.0), (5.0, 5.0)),
            ((5.0, 5.0), (5.0, 10.0)),
        ])
    );
}

#[test]
fn endpoint_on_interior() {
    let input = [((0.0, 0.0), (10.0, 0.0)), ((5.0, 0.0), (5.0, 5.0))];
    assert_eq!(intersection_points(input, false).unwrap(), vec![pt(5.0, 0.0)]);
    assert!(any_intersections(input).unwrap());
}

#[test]
fn disjoint_segments_do_not_intersect() {
    let input = [((0.0, 0.0), (1.0, 1.0)), ((2.0, 2.0), (3.0, 2.0))];
    assert_eq!(intersection_points(input, false).unwrap(), vec![]);
    assert!(!any_intersections(input).unwrap());
    // A shared endpoint alone is not an intersection.
    let touching = [((0.0, 0.0), (1.0, 1.0)), ((1.0, 1.0), (2.0, 0.0))];
    assert!(!any_intersections(touching).unwrap());
}

#[test]
fn empty_input_succeeds_silently() {
    assert_eq!(subcurves([], false).unwrap(), vec![]);
    assert_eq!(intersection_points([], true).unwrap(), vec![]);
    assert!(!any_intersections([]).unwrap());
}

#[test]
fn single_segment_passes_through() {
    let input = [((1.0, 2.0), (7.0, 4.0))];
    let pieces = subcurves(input, false).unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].source, pt(1.0, 2.0));
    assert_eq!(pieces[0].target, pt(7.0, 4.0));
    assert_eq!(intersection_points(input, false).unwrap(), vec![]);
    assert_eq!(
        point_set(&intersection_points(input, true).unwrap()),
        [pt(1.0, 2.0), pt(7.0, 4.0)].into_iter().collect()
    );
}

/// Pairwise reference oracle: every intersection point that lies in the
/// interior of at least one of the two segments involved.
fn brute_force_interior(segments: &[Segment]) -> BTreeSet<Point> {
    let traits = SegmentTraits;
    let far_left = pt(-1000.0, -1000.0);
    let interior = |s: &Segment, q: &Point| s.contains(q) && *q != s.source && *q != s.target;

    let mut found = BTreeSet::new();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            let candidates = match traits.nearest_intersection_to_right(a, b, &far_left) {
                None => vec![],
                Some(Intersection::Point(q)) => vec![q],
                Some(Intersection::Overlap(lo, hi)) => vec![lo, hi],
            };
            for q in candidates {
                if interior(a, &q) || interior(b, &q) {
                    found.insert(q);
                }
            }
        }
    }
    found
}

fn brute_force_endpoints(segments: &[Segment]) -> BTreeSet<Point> {
    segments
        .iter()
        .flat_map(|s| [s.source.clone(), s.target.clone()])
        .collect()
}

fn small_soup() -> impl Strategy<Value = Vec<Segment>> {
    let seg = (0i32..6, 0i32..6, 0i32..6, 0i32..6)
        .prop_filter("zero length", |(a, b, c, d)| (a, b) != (c, d))
        .prop_map(|(a, b, c, d)| {
            Segment::from_f64((a as f64, b as f64), (c as f64, d as f64)).unwrap()
        });
    prop::collection::vec(seg, 2..5)
}

fn sweep_points(segments: &[Segment], include_endpoints: bool) -> Vec<Point> {
    let mut sweeper = Sweeper::<SegmentTraits>::new();
    let mut out = Vec::new();
    sweeper.get_intersection_points(
        segments.to_vec(),
        |p| out.push(p.clone()),
        include_endpoints,
    );
    out
}

fn sweep_pieces(segments: &[Segment]) -> Vec<Segment> {
    let mut sweeper = Sweeper::<SegmentTraits>::new();
    let mut out = Vec::new();
    sweeper.get_subcurves(segments.to_vec(), |c| out.push(c.clone()), false);
    out
}

proptest! {
    #[test]
    fn interior_points_match_pairwise_oracle(segments in small_soup()) {
        let reported = sweep_points(&segments, false);
        // Exactly once each.
        prop_assert_eq!(reported.len(), point_set(&reported).len());
        prop_assert_eq!(point_set(&reported), brute_force_interior(&segments));
    }

    #[test]
    fn endpoint_reporting_adds_exactly_the_endpoints(segments in small_soup()) {
        let reported = sweep_points(&segments, true);
        prop_assert_eq!(reported.len(), point_set(&reported).len());
        let mut expected = brute_force_interior(&segments);
        expected.extend(brute_force_endpoints(&segments));
        prop_assert_eq!(point_set(&reported), expected);
    }

    #[test]
    fn reported_points_never_move_left(segments in small_soup()) {
        let reported = sweep_points(&segments, true);
        for pair in reported.windows(2) {
            prop_assert!(pair[0].x <= pair[1].x);
        }
    }

    #[test]
    fn intersection_flag_matches_point_reporting(segments in small_soup()) {
        let mut sweeper = Sweeper::<SegmentTraits>::new();
        let found = sweeper.do_curves_intersect(segments.clone());
        prop_assert_eq!(found, !sweep_points(&segments, false).is_empty());
    }

    #[test]
    fn runs_are_deterministic(segments in small_soup()) {
        prop_assert_eq!(sweep_pieces(&segments), sweep_pieces(&segments));
        prop_assert_eq!(sweep_points(&segments, true), sweep_points(&segments, true));
    }

    #[test]
    fn pieces_lie_on_the_input(segments in small_soup()) {
        for piece in sweep_pieces(&segments) {
            prop_assert!(
                segments
                    .iter()
                    .any(|s| s.contains(&piece.source) && s.contains(&piece.target)),
                "piece {:?} is not supported by any input segment",
                piece
            );
        }
    }

    #[test]
    fn pieces_meet_only_at_endpoints(segments in small_soup()) {
        let traits = SegmentTraits;
        let far_left = pt(-1000.0, -1000.0);
        let pieces = sweep_pieces(&segments);
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                match traits.nearest_intersection_to_right(a, b, &far_left) {
                    None => {}
                    Some(Intersection::Point(q)) => {
                        let a_end = q == a.source || q == a.target;
                        let b_end = q == b.source || q == b.target;
                        prop_assert!(
                            a_end && b_end,
                            "pieces {:?} and {:?} cross at {:?}",
                            a, b, q
                        );
                    }
                    Some(Intersection::Overlap(lo, hi)) => {
                        // Merging compares pieces as oriented curves, so a
                        // piece and its reversal can both be emitted; any
                        // other overlap is a genuine defect.
                        let reversed_twin = a.source == b.target && a.target == b.source;
                        prop_assert!(
                            reversed_twin,
                            "pieces overlap on [{:?}, {:?}]",
                            lo, hi
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn subcurves_are_idempotent(segments in small_soup()) {
        let once = sweep_pieces(&segments);
        let twice = sweep_pieces(&once);
        prop_assert_eq!(piece_list(&once), piece_list(&twice));
    }
}
