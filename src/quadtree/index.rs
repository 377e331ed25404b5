use std::fmt;

use crate::error::{QuadTreeError, Result};
use crate::quadtree::geometry::{Path, Quadrant, Square};
use crate::quadtree::partition::{NodeId, NodeKind, Partition, ROOT};
use crate::quadtree::traversal::Node;
use crate::quadtree::{PointKey, QuadTreeBuilder, QuadTreeOptions};
use crate::r#type::IndexableNum;

/// A point quadtree, rebuilt from scratch whenever its points move.
///
/// Usually this will be created via [`QuadTreeBuilder`], or [`QuadTree::try_new`] when the
/// points are already collected. Points are validated on creation; the partition itself is
/// built by [`QuadTree::compute`], after which the tree is read-only and can be shared between
/// threads for concurrent queries.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTree<N: IndexableNum> {
    pub(crate) coords: Vec<(N, N)>,
    pub(crate) options: QuadTreeOptions,
    pub(crate) partition: Option<Partition<N>>,
}

impl<N: IndexableNum> QuadTree<N> {
    /// Create an uncomputed tree over `points`, keyed by their position in the slice.
    pub fn try_new(points: &[(N, N)], options: QuadTreeOptions) -> Result<Self> {
        let num_items = points.len().try_into().map_err(|_| {
            QuadTreeError::General(format!("Too many points for a quadtree: {}", points.len()))
        })?;
        let mut builder = QuadTreeBuilder::new_with_options(num_items, options);
        for &(x, y) in points {
            builder.add(x, y);
        }
        builder.finish()
    }

    /// Partition the points.
    ///
    /// Calling this again rebuilds the same partition from the same points. Taking `&mut self`
    /// means no query can be running meanwhile.
    pub fn compute(&mut self) {
        self.partition = Some(Partition::compute(&self.coords, &self.options));
    }

    /// Returns `true` once [`QuadTree::compute`] has run.
    pub fn is_computed(&self) -> bool {
        self.partition.is_some()
    }

    pub(crate) fn partition(&self) -> Result<&Partition<N>> {
        self.partition.as_ref().ok_or(QuadTreeError::UncomputedTree)
    }

    /// The number of points in this tree.
    pub fn num_items(&self) -> u32 {
        self.coords.len() as u32
    }

    /// The options this tree partitions with.
    pub fn options(&self) -> &QuadTreeOptions {
        &self.options
    }

    /// The point inserted with `key`.
    pub fn point(&self, key: PointKey) -> Option<(N, N)> {
        self.coords.get(key as usize).copied()
    }

    /// All points, indexed by key.
    pub fn points(&self) -> &[(N, N)] {
        &self.coords
    }

    /// The number of nodes, leaves included.
    pub fn num_nodes(&self) -> Result<usize> {
        Ok(self.partition()?.nodes.len())
    }

    /// The square covering every point, or `None` for an empty tree.
    pub fn root_square(&self) -> Result<Option<Square<N>>> {
        let partition = self.partition()?;
        Ok(partition.nodes.first().map(|root| root.square))
    }

    /// The path to the leaf holding `key`.
    pub fn leaf_path(&self, key: PointKey) -> Result<&Path> {
        self.partition()?.path(key)
    }

    /// Rebuild the square addressed by `path` from the root square alone.
    ///
    /// The path does not have to lead to an existing node.
    pub fn square(&self, path: &Path) -> Result<Square<N>> {
        let root = self.root_square()?.ok_or_else(|| {
            QuadTreeError::InvalidPath(format!("{} in an empty quadtree", path))
        })?;
        Ok(path
            .iter()
            .fold(root, |square, quadrant| square.child(quadrant)))
    }

    /// The leaf square of every point.
    pub fn squares(&self) -> Result<Vec<(PointKey, Square<N>)>> {
        let partition = self.partition()?;
        partition
            .paths
            .iter()
            .enumerate()
            .map(|(key, path)| Ok((key as PointKey, self.square(path)?)))
            .collect()
    }

    /// The node reached by following `path` from the root.
    pub fn access(&self, path: &Path) -> Result<Node<'_, N>> {
        let partition = self.partition()?;
        let id = partition.descend(path)?;
        Ok(Node::new(partition, id))
    }

    /// Access the root node of the quadtree for manual traversal.
    pub fn root(&self) -> Result<Node<'_, N>> {
        self.access(&Path::new())
    }
}

impl<N: IndexableNum> fmt::Display for QuadTree<N> {
    /// Nested quadrant maps with the keys of each leaf, e.g.
    /// `QuadTree({NW: [0], NE: {SW: [1], SE: [2]}})`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Token {
            Node(NodeId),
            Text(&'static str),
            Label(Quadrant),
        }

        let Some(partition) = &self.partition else {
            return f.write_str("QuadTree(uncomputed)");
        };
        if partition.is_empty() {
            return f.write_str("QuadTree(empty)");
        }

        f.write_str("QuadTree(")?;
        let mut stack = vec![Token::Text(")"), Token::Node(ROOT)];
        while let Some(token) = stack.pop() {
            match token {
                Token::Text(text) => f.write_str(text)?,
                Token::Label(quadrant) => write!(f, "{}: ", quadrant)?,
                Token::Node(id) => match &partition.node(id).kind {
                    NodeKind::Leaf { keys } => write!(f, "{:?}", keys)?,
                    NodeKind::Internal { children } => {
                        f.write_str("{")?;
                        stack.push(Token::Text("}"));
                        let present = Quadrant::ALL
                            .into_iter()
                            .filter_map(|quadrant| {
                                children[quadrant.index()].map(|child| (quadrant, child))
                            })
                            .collect::<Vec<_>>();
                        // pushed in reverse so that they pop in quadrant order
                        for (i, (quadrant, child)) in present.into_iter().enumerate().rev() {
                            stack.push(Token::Node(child));
                            stack.push(Token::Label(quadrant));
                            if i > 0 {
                                stack.push(Token::Text(", "));
                            }
                        }
                    }
                },
            }
        }
        Ok(())
    }
}
