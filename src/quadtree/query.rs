//! Fixed-radius neighbor queries.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{QuadTreeError, Result};
use crate::quadtree::partition::sq_dist;
use crate::quadtree::{PointKey, QuadTree};
use crate::r#type::IndexableNum;

impl<N: IndexableNum> QuadTree<N> {
    /// Search the tree for the points within `radius` of the point `key`.
    ///
    /// The search first rises from the leaf of `key` to the smallest ancestor whose region holds
    /// the whole query circle, then falls from there, visiting only quadrants whose region
    /// comes within `radius` of the point and testing the points of each leaf it reaches exactly.
    ///
    /// Returns the keys of the found points in ascending order, never including `key` itself. A
    /// radius that is not positive finds nothing.
    ///
    /// ```
    /// use quad_index::quadtree::{QuadTree, QuadTreeOptions};
    ///
    /// let points = [(0., 0.), (1., 0.), (0., 1.), (1., 1.)];
    /// let mut tree = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap();
    /// tree.compute();
    /// assert_eq!(tree.extract(0, 1.2).unwrap(), vec![1, 2]);
    /// assert_eq!(tree.extract(0, 1.5).unwrap(), vec![1, 2, 3]);
    /// ```
    pub fn extract(&self, key: PointKey, radius: N) -> Result<Vec<PointKey>> {
        let partition = self.partition()?;
        let path = partition.path(key)?;
        let (x, y) = self.coords[key as usize];
        if !(radius > N::zero()) {
            return Ok(vec![]);
        }

        let (path, bounds) = partition.rise(path, x, y, radius)?;
        let start = partition.descend(&path)?;
        Ok(partition.fall(start, bounds, &self.coords, key, x, y, radius))
    }

    /// Search every point for the points within `radius` of the point `key`, without using the
    /// partition.
    ///
    /// This does not require [`QuadTree::compute`] and returns exactly what
    /// [`QuadTree::extract`] returns.
    pub fn extract_brute_force(&self, key: PointKey, radius: N) -> Result<Vec<PointKey>> {
        let (x, y) = self.point(key).ok_or(QuadTreeError::KeyNotFound(key))?;
        if !(radius > N::zero()) {
            return Ok(vec![]);
        }

        let r2 = radius * radius;
        Ok(self
            .coords
            .iter()
            .enumerate()
            .filter(|&(other, &(px, py))| {
                other != key as usize && sq_dist(px, py, x, y) <= r2
            })
            .map(|(other, _)| other as PointKey)
            .collect())
    }

    /// The neighbors within `radius` of every point, indexed by key.
    pub fn extract_all(&self, radius: N) -> Result<Vec<Vec<PointKey>>> {
        (0..self.num_items())
            .map(|key| self.extract(key, radius))
            .collect()
    }

    /// The neighbors within `radius` of every point, indexed by key, searched in parallel.
    #[cfg(feature = "rayon")]
    pub fn par_extract_all(&self, radius: N) -> Result<Vec<Vec<PointKey>>> {
        (0..self.num_items())
            .into_par_iter()
            .map(|key| self.extract(key, radius))
            .collect()
    }
}
