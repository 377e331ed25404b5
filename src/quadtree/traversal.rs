//! Utilities to traverse the QuadTree structure.

use geo_traits::RectTrait;

use crate::quadtree::geometry::{Quadrant, Square};
use crate::quadtree::partition::{NodeId, NodeKind, Partition};
use crate::quadtree::PointKey;
use crate::r#type::{Coord, IndexableNum};

/// A node in a computed QuadTree.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a, N: IndexableNum> {
    /// The partition that this node is a reference onto
    partition: &'a Partition<N>,

    id: NodeId,
}

impl<'a, N: IndexableNum> Node<'a, N> {
    pub(crate) fn new(partition: &'a Partition<N>, id: NodeId) -> Self {
        Self { partition, id }
    }

    /// The square this node covers. Not necessarily tight around its points.
    pub fn square(&self) -> Square<N> {
        self.partition.node(self.id).square
    }

    /// Number of steps from the root, which has depth 0.
    pub fn depth(&self) -> u32 {
        self.partition.node(self.id).depth
    }

    /// Returns `true` if this is a leaf node without children.
    pub fn is_leaf(&self) -> bool {
        matches!(self.partition.node(self.id).kind, NodeKind::Leaf { .. })
    }

    /// Returns `true` if this is an intermediate node with children.
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The sorted keys stored in this node. Empty for intermediate nodes.
    pub fn keys(&self) -> &'a [PointKey] {
        match &self.partition.node(self.id).kind {
            NodeKind::Leaf { keys } => keys,
            NodeKind::Internal { .. } => &[],
        }
    }

    /// The child in `quadrant`, if that quadrant holds any point.
    pub fn child(&self, quadrant: Quadrant) -> Option<Node<'a, N>> {
        match &self.partition.node(self.id).kind {
            NodeKind::Internal { children } => {
                children[quadrant.index()].map(|id| Node::new(self.partition, id))
            }
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Returns an iterator over the materialized children of this node, in quadrant order.
    pub fn children(&self) -> impl Iterator<Item = (Quadrant, Node<'a, N>)> + 'a {
        let node = *self;
        Quadrant::ALL
            .into_iter()
            .filter_map(move |quadrant| node.child(quadrant).map(|child| (quadrant, child)))
    }
}

impl<N: IndexableNum> RectTrait for Node<'_, N> {
    type T = N;
    type CoordType<'a>
        = Coord<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        let square = self.square();
        Coord {
            x: square.min_x(),
            y: square.min_y(),
        }
    }

    fn max(&self) -> Self::CoordType<'_> {
        let square = self.square();
        Coord {
            x: square.max_x(),
            y: square.max_y(),
        }
    }
}
