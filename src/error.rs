use thiserror::Error;

use crate::quadtree::PointKey;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuadTreeError {
    /// Two input points compare equal.
    #[error("No point must be upon another: ({x}, {y}) appears more than once.")]
    DuplicatePoint { x: f64, y: f64 },

    /// An input coordinate is NaN or infinite.
    #[error("Point {key} has a non-finite coordinate.")]
    NonFinitePoint { key: PointKey },

    /// The key is not indexed by this tree.
    #[error("Point key {0} is not indexed by this tree.")]
    KeyNotFound(PointKey),

    /// A query ran before [`QuadTree::compute`][crate::quadtree::QuadTree::compute].
    #[error("The quadtree has not been computed yet.")]
    UncomputedTree,

    /// A path does not lead to a node of this tree.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, QuadTreeError>;
