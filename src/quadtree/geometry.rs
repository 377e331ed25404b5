//! Quadrants, paths and the squares they address.

use std::fmt;

use geo_traits::RectTrait;
use tinyvec::TinyVec;

use crate::r#type::{Coord, IndexableNum};

/// One of the four children of an internal node.
///
/// A point is routed by comparing it against the center of the node. A coordinate equal to the
/// center goes to the positive side: east for `x`, north for `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    /// `x < cx`, `y >= cy`
    #[default]
    NorthWest = 0,
    /// `x >= cx`, `y >= cy`
    NorthEast = 1,
    /// `x < cx`, `y < cy`
    SouthWest = 2,
    /// `x >= cx`, `y < cy`
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants, ordered by [`Quadrant::index`].
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// The quadrant of the square centered on `(cx, cy)` that owns `(x, y)`.
    #[inline]
    pub fn locate<N: IndexableNum>(x: N, y: N, cx: N, cy: N) -> Self {
        match (x >= cx, y >= cy) {
            (false, true) => Quadrant::NorthWest,
            (true, true) => Quadrant::NorthEast,
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        }
    }

    /// Slot of this quadrant in a node's children.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `true` for the two eastern quadrants.
    #[inline]
    pub fn is_east(self) -> bool {
        matches!(self, Quadrant::NorthEast | Quadrant::SouthEast)
    }

    /// `true` for the two northern quadrants.
    #[inline]
    pub fn is_north(self) -> bool {
        matches!(self, Quadrant::NorthWest | Quadrant::NorthEast)
    }

    /// Two letter compass label, e.g. `"NE"`.
    pub fn label(self) -> &'static str {
        match self {
            Quadrant::NorthWest => "NW",
            Quadrant::NorthEast => "NE",
            Quadrant::SouthWest => "SW",
            Quadrant::SouthEast => "SE",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The sequence of quadrant choices leading from the root to a node.
///
/// Paths are recorded for every point when the tree is computed, so that the leaf holding a
/// point (and its square) can be found again without descending from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(TinyVec<[Quadrant; 32]>);

impl Path {
    /// The empty path, addressing the root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps, which is also the depth of the addressed node.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append one step.
    pub fn push(&mut self, quadrant: Quadrant) {
        self.0.push(quadrant);
    }

    /// Remove the last step, moving the path one level up.
    pub fn pop(&mut self) -> Option<Quadrant> {
        self.0.pop()
    }

    /// Keep the first `len` steps.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// The path extended by one step.
    pub fn child(&self, quadrant: Quadrant) -> Self {
        let mut child = self.clone();
        child.push(quadrant);
        child
    }

    /// The steps, from the root down.
    pub fn as_slice(&self) -> &[Quadrant] {
        self.0.as_slice()
    }

    /// Iterate over the steps, from the root down.
    pub fn iter(&self) -> impl Iterator<Item = Quadrant> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Quadrant> for Path {
    fn from_iter<I: IntoIterator<Item = Quadrant>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<root>");
        }
        for (i, quadrant) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(quadrant.label())?;
        }
        Ok(())
    }
}

/// An axis-aligned square given by its center and half of its side length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square<N: IndexableNum> {
    pub(crate) center_x: N,
    pub(crate) center_y: N,
    pub(crate) half_length: N,
}

impl<N: IndexableNum> Square<N> {
    /// A square centered on `(center_x, center_y)` with sides of `2 * half_length`.
    pub fn new(center_x: N, center_y: N, half_length: N) -> Self {
        Self {
            center_x,
            center_y,
            half_length,
        }
    }

    /// The square centered on the bounding box of `coords` whose side is the larger of the box's
    /// width and height. `None` when `coords` is empty.
    pub(crate) fn bounding(coords: impl IntoIterator<Item = (N, N)>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let (x, y) = coords.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
        for (x, y) in coords {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        // halve before combining so that extents up to the full float range stay finite
        let two = N::one() + N::one();
        let (min_x, min_y, max_x, max_y) = (min_x / two, min_y / two, max_x / two, max_y / two);
        Some(Self {
            center_x: min_x + max_x,
            center_y: min_y + max_y,
            half_length: (max_x - min_x).max(max_y - min_y),
        })
    }

    /// Horizontal coordinate of the center.
    pub fn center_x(&self) -> N {
        self.center_x
    }

    /// Vertical coordinate of the center.
    pub fn center_y(&self) -> N {
        self.center_y
    }

    /// Half of the side length.
    pub fn half_length(&self) -> N {
        self.half_length
    }

    /// Full side length.
    pub fn length(&self) -> N {
        self.half_length + self.half_length
    }

    /// Western edge.
    pub fn min_x(&self) -> N {
        self.center_x - self.half_length
    }

    /// Southern edge.
    pub fn min_y(&self) -> N {
        self.center_y - self.half_length
    }

    /// Eastern edge.
    pub fn max_x(&self) -> N {
        self.center_x + self.half_length
    }

    /// Northern edge.
    pub fn max_y(&self) -> N {
        self.center_y + self.half_length
    }

    /// The square of one quadrant: half the side, center moved by the new half length towards
    /// that quadrant.
    ///
    /// This is the only halving rule in the crate. Partitioning and path reconstruction both go
    /// through it, so a square rebuilt from a path is bitwise equal to the one stored on the node.
    #[inline]
    pub fn child(&self, quadrant: Quadrant) -> Self {
        let half_length = self.half_length / (N::one() + N::one());
        let center_x = if quadrant.is_east() {
            self.center_x + half_length
        } else {
            self.center_x - half_length
        };
        let center_y = if quadrant.is_north() {
            self.center_y + half_length
        } else {
            self.center_y - half_length
        };
        Self {
            center_x,
            center_y,
            half_length,
        }
    }

    /// Returns `true` when halving no longer separates the children on some axis, or no longer
    /// yields finite squares.
    pub(crate) fn is_exhausted(&self) -> bool {
        let east = self.child(Quadrant::NorthEast);
        let west = self.child(Quadrant::SouthWest);
        let finite = [east.center_x, east.center_y, west.center_x, west.center_y]
            .into_iter()
            .all(|value| value.is_finite());
        !finite
            || !east.half_length.is_finite()
            || east.center_x == west.center_x
            || east.center_y == west.center_y
    }

    /// The closed outline, starting and ending at the north west corner.
    pub fn ring(&self) -> [(N, N); 5] {
        let (min_x, min_y, max_x, max_y) = (self.min_x(), self.min_y(), self.max_x(), self.max_y());
        [
            (min_x, max_y),
            (max_x, max_y),
            (max_x, min_y),
            (min_x, min_y),
            (min_x, max_y),
        ]
    }
}

impl<N: IndexableNum> RectTrait for Square<N> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.min_x(),
            y: self.min_y(),
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        Coord {
            x: self.max_x(),
            y: self.max_y(),
        }
    }
}

/// The half-open region a node owns, expressed with the split lines of its ancestors.
///
/// Unlike [`Square`], these are the exact values points were compared against while routing,
/// so containment here guarantees every point near the query was routed below the node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds<N: IndexableNum> {
    min_x: N,
    min_y: N,
    max_x: N,
    max_y: N,
}

impl<N: IndexableNum> Bounds<N> {
    /// The root owns the whole plane.
    pub(crate) fn unbounded() -> Self {
        Self {
            min_x: N::neg_infinity(),
            min_y: N::neg_infinity(),
            max_x: N::infinity(),
            max_y: N::infinity(),
        }
    }

    /// Restrict to `quadrant` of a node with square `parent`.
    pub(crate) fn narrow(&mut self, parent: &Square<N>, quadrant: Quadrant) {
        if quadrant.is_east() {
            self.min_x = parent.center_x;
        } else {
            self.max_x = parent.center_x;
        }
        if quadrant.is_north() {
            self.min_y = parent.center_y;
        } else {
            self.max_y = parent.center_y;
        }
    }

    /// Returns `true` when every point outside the region is farther than squared distance `r2`
    /// from `(x, y)`, which must lie inside it.
    ///
    /// Points on a lower edge belong to the region and points on an upper edge do not, but both
    /// gaps are required to exceed the radius so that rounding of the gap can not admit an
    /// outside point.
    pub(crate) fn contains_circle(&self, x: N, y: N, r2: N) -> bool {
        [x - self.min_x, self.max_x - x, y - self.min_y, self.max_y - y]
            .into_iter()
            .all(|gap| gap > N::zero() && gap * gap > r2)
    }

    /// Returns `false` only when no point of the region is within squared distance `r2` of
    /// `(x, y)`.
    ///
    /// The gap to each edge is computed with the same subtraction as the point distance, and
    /// rounding is monotonic, so a point the region owns is never closer than its gap.
    pub(crate) fn reaches_circle(&self, x: N, y: N, r2: N) -> bool {
        let zero = N::zero();
        let gap_x = (self.min_x - x).max(x - self.max_x).max(zero);
        let gap_y = (self.min_y - y).max(y - self.max_y).max(zero);
        gap_x * gap_x + gap_y * gap_y <= r2
    }
}

impl<N: IndexableNum> Default for Bounds<N> {
    fn default() -> Self {
        Self::unbounded()
    }
}
