//! A point quadtree for fixed-radius neighbor queries, rebuilt whenever its points move.

#![warn(missing_docs)]

mod builder;
mod geometry;
mod index;
mod partition;
mod query;
mod render;
mod traversal;

pub use builder::{QuadTreeBuilder, QuadTreeOptions, DEFAULT_NEIGHBORS};
pub use geometry::{Path, Quadrant, Square};
pub use index::QuadTree;
pub use render::{Color, DrawSink};
pub use traversal::Node;

/// The key of a point: its insertion index.
pub type PointKey = u32;

#[cfg(test)]
mod test;
