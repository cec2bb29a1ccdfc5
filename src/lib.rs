#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

mod geom;
pub mod sweep;
pub mod traits;

pub use geom::{Point, Segment};
pub use sweep::Sweeper;
pub use traits::{Intersection, SegmentTraits, SweepTraits};

/// The input segments were faulty.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// An input coordinate was infinite or NaN.
    #[error("input coordinate is not finite")]
    NotFinite,
    /// An input segment had coincident endpoints.
    #[error("input segment has zero length")]
    DegenerateSegment,
}

fn collect_segments(
    segments: impl IntoIterator<Item = ((f64, f64), (f64, f64))>,
) -> Result<Vec<Segment>, Error> {
    segments
        .into_iter()
        .map(|(source, target)| Segment::from_f64(source, target))
        .collect()
}

/// Computes the maximal non-intersecting sub-segments induced by the
/// arrangement of the input segments.
///
/// Each input is a `(source, target)` pair of `(x, y)` coordinates. When
/// `overlapping` is true, a portion on which several inputs coincide is
/// reported once per input; otherwise it is reported once.
pub fn subcurves(
    segments: impl IntoIterator<Item = ((f64, f64), (f64, f64))>,
    overlapping: bool,
) -> Result<Vec<Segment>, Error> {
    let segments = collect_segments(segments)?;
    let mut sweeper = Sweeper::<SegmentTraits>::new();
    let mut out = Vec::new();
    sweeper.get_subcurves(segments, |c| out.push(c.clone()), overlapping);
    Ok(out)
}

/// Computes the pairwise intersection points of the input segments, in sweep
/// order.
///
/// When `include_endpoints` is false, only interior intersections are
/// reported.
pub fn intersection_points(
    segments: impl IntoIterator<Item = ((f64, f64), (f64, f64))>,
    include_endpoints: bool,
) -> Result<Vec<Point>, Error> {
    let segments = collect_segments(segments)?;
    let mut sweeper = Sweeper::<SegmentTraits>::new();
    let mut out = Vec::new();
    sweeper.get_intersection_points(segments, |p| out.push(p.clone()), include_endpoints);
    Ok(out)
}

/// Do any two of the input segments intersect away from shared endpoints?
pub fn any_intersections(
    segments: impl IntoIterator<Item = ((f64, f64), (f64, f64))>,
) -> Result<bool, Error> {
    let segments = collect_segments(segments)?;
    let mut sweeper = Sweeper::<SegmentTraits>::new();
    Ok(sweeper.do_curves_intersect(segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_crossing_segments() {
        let input = [((0.0, 0.0), (10.0, 10.0)), ((0.0, 10.0), (10.0, 0.0))];
        let points = intersection_points(input, false).unwrap();
        assert_eq!(points, vec![Point::from_f64(5.0, 5.0).unwrap()]);
        assert_eq!(subcurves(input, false).unwrap().len(), 4);
        assert!(any_intersections(input).unwrap());
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            subcurves([((0.0, f64::NAN), (1.0, 1.0))], false),
            Err(Error::NotFinite)
        );
        assert_eq!(
            subcurves([((1.0, 1.0), (1.0, 1.0))], false),
            Err(Error::DegenerateSegment)
        );
    }
}
