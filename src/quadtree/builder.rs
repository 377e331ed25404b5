use geo_traits::CoordTrait;

use crate::error::{QuadTreeError, Result};
use crate::quadtree::{PointKey, QuadTree};
use crate::r#type::IndexableNum;

/// The default leaf capacity used by [`QuadTreeOptions::default`].
pub const DEFAULT_NEIGHBORS: u32 = 1;

/// Construction-time configuration of a [`QuadTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuadTreeOptions {
    /// A node holding at most this many points is not split further. Must be at least 1.
    pub neighbors: u32,
    /// Nodes deeper than this are not split further. `None` leaves depth unbounded.
    pub max_depth: Option<u32>,
}

impl Default for QuadTreeOptions {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            max_depth: None,
        }
    }
}

impl QuadTreeOptions {
    /// Options with the given leaf capacity and depth limit.
    pub fn new(neighbors: u32, max_depth: Option<u32>) -> Self {
        Self {
            neighbors,
            max_depth,
        }
    }

    /// Replace the leaf capacity.
    pub fn with_neighbors(self, neighbors: u32) -> Self {
        Self { neighbors, ..self }
    }

    /// Limit the depth of the tree.
    pub fn with_max_depth(self, max_depth: u32) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..self
        }
    }
}

/// A builder to create a [`QuadTree`].
///
/// ```
/// use quad_index::quadtree::QuadTreeBuilder;
///
/// let mut builder = QuadTreeBuilder::<f64>::new(3);
/// builder.add(0., 0.);
/// builder.add(1., 0.);
/// builder.add(0., 1.);
/// let mut tree = builder.finish().unwrap();
/// tree.compute();
/// assert_eq!(tree.extract(0, 1.).unwrap(), vec![1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct QuadTreeBuilder<N: IndexableNum> {
    coords: Vec<(N, N)>,
    num_items: u32,
    options: QuadTreeOptions,
}

impl<N: IndexableNum> QuadTreeBuilder<N> {
    /// Create a new builder with the provided number of items and the default options.
    pub fn new(num_items: u32) -> Self {
        Self::new_with_options(num_items, QuadTreeOptions::default())
    }

    /// Create a new builder with the provided number of items and options.
    pub fn new_with_options(num_items: u32, options: QuadTreeOptions) -> Self {
        Self {
            coords: Vec::with_capacity(num_items as usize),
            num_items,
            options,
        }
    }

    /// The options the tree will be built with.
    pub fn options(&self) -> &QuadTreeOptions {
        &self.options
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index, which is the key [`QuadTree::extract`] reports for this
    /// point. Adding more points than announced makes [`QuadTreeBuilder::finish`] fail; keys past
    /// `u32::MAX` saturate instead of wrapping onto earlier points.
    #[inline]
    pub fn add(&mut self, x: N, y: N) -> PointKey {
        let key = PointKey::try_from(self.coords.len()).unwrap_or(PointKey::MAX);
        self.coords.push((x, y));
        key
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index, which is the key [`QuadTree::extract`] reports for this
    /// point.
    #[inline]
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>) -> PointKey {
        self.add(coord.x(), coord.y())
    }

    /// Consume this builder, validating the points.
    ///
    /// Fails when the number of points differs from the one announced, when a coordinate is not
    /// finite, or when two points coincide. The returned tree still has to be
    /// [computed][QuadTree::compute] before it can be queried.
    pub fn finish(self) -> Result<QuadTree<N>> {
        if self.coords.len() != self.num_items as usize {
            return Err(QuadTreeError::General(format!(
                "Added {} items when expected {}.",
                self.coords.len(),
                self.num_items
            )));
        }
        if self.options.neighbors == 0 {
            return Err(QuadTreeError::General(
                "A leaf must be allowed to hold at least one point.".to_string(),
            ));
        }

        check_finite(&self.coords)?;
        check_unique(&self.coords)?;

        Ok(QuadTree {
            coords: self.coords,
            options: self.options,
            partition: None,
        })
    }
}

fn check_finite<N: IndexableNum>(coords: &[(N, N)]) -> Result<()> {
    match coords
        .iter()
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        Some(key) => Err(QuadTreeError::NonFinitePoint {
            key: key as PointKey,
        }),
        None => Ok(()),
    }
}

/// Sort by value and compare neighbors. Coordinates are finite here, so `partial_cmp` is total
/// apart from `-0.0 == 0.0`, which counts as coincident.
fn check_unique<N: IndexableNum>(coords: &[(N, N)]) -> Result<()> {
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        coords[a]
            .partial_cmp(&coords[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for pair in order.windows(2) {
        let (x, y) = coords[pair[1]];
        if coords[pair[0]] == (x, y) {
            return Err(QuadTreeError::DuplicatePoint {
                x: x.to_f64().unwrap_or(f64::NAN),
                y: y.to_f64().unwrap_or(f64::NAN),
            });
        }
    }
    Ok(())
}
