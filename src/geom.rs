//! Geometric primitives: exact points and line segments.
//!
//! Coordinates are `malachite::Rational`, so every predicate in this module
//! is exact. The sweep engine never inspects coordinates itself; it only sees
//! these types through the oracle in [`crate::traits`].

use malachite::Rational;

/// A two-dimensional point with exact rational coordinates.
///
/// Points are ordered by `x` and then by `y`, for the convenience of our
/// sweep-line algorithm (which moves in increasing `x`, and handles events
/// sharing an `x` coordinate bottom-to-top).
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: Rational,
    /// Vertical coordinate.
    pub y: Rational,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.x, &self.y).cmp(&(&other.x, &other.y))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    pub fn new(x: Rational, y: Rational) -> Self {
        Point { x, y }
    }

    /// Create a point from `f64` coordinates.
    ///
    /// The conversion is exact. Fails if either coordinate is infinite or NaN.
    pub fn from_f64(x: f64, y: f64) -> Result<Self, crate::Error> {
        let x = Rational::try_from(x).map_err(|_| crate::Error::NotFinite)?;
        let y = Rational::try_from(y).map_err(|_| crate::Error::NotFinite)?;
        Ok(Point { x, y })
    }
}

/// The cross product of `b - a` and `c - a`.
///
/// Positive when walking `a -> b -> c` turns counter-clockwise, zero when the
/// three points are collinear.
fn cross(a: &Point, b: &Point, c: &Point) -> Rational {
    (&b.x - &a.x) * (&c.y - &a.y) - (&b.y - &a.y) * (&c.x - &a.x)
}

/// A line segment between two distinct exact points.
///
/// The segment remembers its original orientation: `source` and `target` are
/// the endpoints in the order they were given to us, not in sweep order.
/// Splitting preserves orientation, which is what lets the sweep hand back
/// sub-curves that still point the way the input did.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// The endpoint the segment starts at.
    pub source: Point,
    /// The endpoint the segment ends at.
    pub target: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.source, self.target)
    }
}

impl Segment {
    /// Create a new segment.
    ///
    /// `source` and `target` must be distinct.
    pub fn new(source: Point, target: Point) -> Self {
        debug_assert!(source != target);
        Self { source, target }
    }

    /// Create a segment from `f64` endpoint pairs.
    ///
    /// Fails on non-finite coordinates and on zero-length segments.
    pub fn from_f64(source: (f64, f64), target: (f64, f64)) -> Result<Self, crate::Error> {
        let source = Point::from_f64(source.0, source.1)?;
        let target = Point::from_f64(target.0, target.1)?;
        if source == target {
            return Err(crate::Error::DegenerateSegment);
        }
        Ok(Self { source, target })
    }

    /// Is this segment vertical?
    pub fn is_vertical(&self) -> bool {
        self.source.x == self.target.x
    }

    /// The endpoint that comes first in sweep order.
    ///
    /// For a vertical segment this is the bottom endpoint.
    pub fn left(&self) -> &Point {
        if self.source <= self.target {
            &self.source
        } else {
            &self.target
        }
    }

    /// The endpoint that comes last in sweep order.
    ///
    /// For a vertical segment this is the top endpoint.
    pub fn right(&self) -> &Point {
        if self.source <= self.target {
            &self.target
        } else {
            &self.source
        }
    }

    /// Our `y` coordinate at the given `x` coordinate.
    ///
    /// # Panics
    ///
    /// May panic if `x` is outside the `x` range of this segment, or if the
    /// segment is vertical.
    pub(crate) fn at_x(&self, x: &Rational) -> Rational {
        debug_assert!(!self.is_vertical());
        debug_assert!((&self.left().x..=&self.right().x).contains(&x));

        let t = (x - &self.source.x) / (&self.target.x - &self.source.x);
        &self.source.y + &t * (&self.target.y - &self.source.y)
    }

    /// The slope `dy/dx` of this segment.
    ///
    /// Must not be called on vertical segments.
    pub(crate) fn slope(&self) -> Rational {
        debug_assert!(!self.is_vertical());
        (&self.target.y - &self.source.y) / (&self.target.x - &self.source.x)
    }

    /// Does `p` lie on this segment (endpoints included)?
    pub fn contains(&self, p: &Point) -> bool {
        if self.is_vertical() {
            p.x == self.source.x && (&self.left().y..=&self.right().y).contains(&&p.y)
        } else {
            (&self.left().x..=&self.right().x).contains(&&p.x) && self.at_x(&p.x) == p.y
        }
    }

    /// Do the two segments lie on a single line?
    pub(crate) fn collinear_with(&self, other: &Segment) -> bool {
        cross(&self.source, &self.target, &other.source) == 0
            && cross(&self.source, &self.target, &other.target) == 0
    }

    /// Split this segment at `p`, which must lie strictly between the
    /// endpoints.
    ///
    /// The two pieces are returned in curve direction: the first runs from
    /// `source` to `p`, the second from `p` to `target`.
    pub(crate) fn split_at(&self, p: &Point) -> (Segment, Segment) {
        debug_assert!(self.contains(p));
        debug_assert!(*p != self.source && *p != self.target);
        (
            Segment::new(self.source.clone(), p.clone()),
            Segment::new(p.clone(), self.target.clone()),
        )
    }

    /// The point where the infinite extensions of `self` and `other` meet.
    ///
    /// Returns `None` for parallel (including collinear) segments. The
    /// returned point need not lie on either segment.
    pub(crate) fn line_intersection(&self, other: &Segment) -> Option<Point> {
        let d1x = &self.target.x - &self.source.x;
        let d1y = &self.target.y - &self.source.y;
        let d2x = &other.target.x - &other.source.x;
        let d2y = &other.target.y - &other.source.y;

        let denom = &d1x * &d2y - &d1y * &d2x;
        if denom == 0 {
            return None;
        }

        let sx = &other.source.x - &self.source.x;
        let sy = &other.source.y - &self.source.y;
        let t = (&sx * &d2y - &sy * &d2x) / &denom;

        Some(Point::new(
            &self.source.x + &t * &d1x,
            &self.source.y + &t * &d1y,
        ))
    }
}
