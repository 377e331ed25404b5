//! The computed partition: a node arena plus the path of every point.

use log::{debug, trace, warn};
use tinyvec::TinyVec;

use crate::error::{QuadTreeError, Result};
use crate::quadtree::geometry::{Bounds, Path, Quadrant, Square};
use crate::quadtree::{PointKey, QuadTreeOptions};
use crate::r#type::IndexableNum;

/// Position of a node in [`Partition::nodes`]. The root is always `0`.
pub(crate) type NodeId = u32;

pub(crate) const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    /// Sorted keys of the points stored in this leaf.
    Leaf { keys: Vec<PointKey> },
    /// Children by [`Quadrant::index`]. Empty quadrants are never materialized.
    Internal { children: [Option<NodeId>; 4] },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeData<N: IndexableNum> {
    pub(crate) square: Square<N>,
    pub(crate) depth: u32,
    pub(crate) kind: NodeKind,
}

impl<N: IndexableNum> NodeData<N> {
    fn pending(square: Square<N>, depth: u32) -> Self {
        Self {
            square,
            depth,
            kind: NodeKind::Leaf { keys: Vec::new() },
        }
    }
}

/// A unit of pending work while partitioning.
struct Task {
    id: NodeId,
    path: Path,
    keys: Vec<PointKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Partition<N: IndexableNum> {
    /// Empty when the tree holds no points.
    pub(crate) nodes: Vec<NodeData<N>>,
    /// Leaf path of every point, indexed by key.
    pub(crate) paths: Vec<Path>,
}

impl<N: IndexableNum> Partition<N> {
    /// Recursively split `coords` into quadrants, driven by an explicit stack.
    ///
    /// A node becomes a leaf when it holds at most `neighbors` points, when its depth exceeds
    /// `max_depth`, or when its square can no longer be halved in floating point.
    pub(crate) fn compute(coords: &[(N, N)], options: &QuadTreeOptions) -> Self {
        let Some(root_square) = Square::bounding(coords.iter().copied()) else {
            return Self {
                nodes: vec![],
                paths: vec![],
            };
        };

        let neighbors = options.neighbors as usize;
        let mut nodes = vec![NodeData::pending(root_square, 0)];
        let mut paths = vec![Path::new(); coords.len()];
        let mut stack = vec![Task {
            id: ROOT,
            path: Path::new(),
            keys: (0..coords.len() as PointKey).collect(),
        }];

        while let Some(Task { id, path, mut keys }) = stack.pop() {
            let (square, depth) = {
                let node = &nodes[id as usize];
                (node.square, node.depth)
            };

            let is_small = keys.len() <= neighbors;
            let is_deep = options.max_depth.is_some_and(|max_depth| depth > max_depth);
            if is_small || is_deep || square.is_exhausted() {
                if !is_small && !is_deep {
                    warn!(
                        "Square at {} can not be halved further, keeping {} points in one leaf",
                        path,
                        keys.len()
                    );
                }
                for &key in keys.iter() {
                    paths[key as usize] = path.clone();
                }
                keys.sort_unstable();
                nodes[id as usize].kind = NodeKind::Leaf { keys };
                continue;
            }

            let mut buckets: [Vec<PointKey>; 4] = Default::default();
            for key in keys {
                let (x, y) = coords[key as usize];
                let quadrant = Quadrant::locate(x, y, square.center_x, square.center_y);
                buckets[quadrant.index()].push(key);
            }

            let mut children = [None; 4];
            for (quadrant, bucket) in Quadrant::ALL.into_iter().zip(buckets) {
                if bucket.is_empty() {
                    continue;
                }
                let child = nodes.len() as NodeId;
                nodes.push(NodeData::pending(square.child(quadrant), depth + 1));
                children[quadrant.index()] = Some(child);
                stack.push(Task {
                    id: child,
                    path: path.child(quadrant),
                    keys: bucket,
                });
            }
            nodes[id as usize].kind = NodeKind::Internal { children };
        }

        let partition = Self { nodes, paths };
        debug!(
            "Partitioned {} points into {} nodes ({} leaves, max depth {})",
            coords.len(),
            partition.nodes.len(),
            partition.num_leaves(),
            partition.max_depth()
        );
        partition
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &NodeData<N> {
        &self.nodes[id as usize]
    }

    pub(crate) fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::Leaf { .. }))
            .count()
    }

    pub(crate) fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// The leaf path recorded for `key`.
    pub(crate) fn path(&self, key: PointKey) -> Result<&Path> {
        self.paths
            .get(key as usize)
            .ok_or(QuadTreeError::KeyNotFound(key))
    }

    /// Follow `path` down from the root.
    pub(crate) fn descend(&self, path: &Path) -> Result<NodeId> {
        if self.is_empty() {
            return Err(QuadTreeError::InvalidPath(format!(
                "{} in an empty quadtree",
                path
            )));
        }

        let mut id = ROOT;
        for (depth, quadrant) in path.iter().enumerate() {
            let child = match &self.node(id).kind {
                NodeKind::Internal { children } => children[quadrant.index()],
                NodeKind::Leaf { .. } => {
                    return Err(QuadTreeError::InvalidPath(format!(
                        "{} continues below a leaf at depth {}",
                        path, depth
                    )))
                }
            };
            id = child.ok_or_else(|| {
                QuadTreeError::InvalidPath(format!(
                    "{} has no {} quadrant at depth {}",
                    path, quadrant, depth
                ))
            })?;
        }
        Ok(id)
    }

    /// Shorten a leaf path until the region of the node it addresses fully holds the circle.
    ///
    /// Returns the path of the smallest such ancestor, or the root when none is, together with
    /// the region that ancestor owns.
    pub(crate) fn rise(&self, path: &Path, x: N, y: N, r: N) -> Result<(Path, Bounds<N>)> {
        // bounds[i] is the region of the node at depth i along the path
        let mut bounds = Vec::with_capacity(path.len() + 1);
        let mut current = Bounds::unbounded();
        bounds.push(current);
        let mut id = ROOT;
        for quadrant in path.iter() {
            current.narrow(&self.node(id).square, quadrant);
            bounds.push(current);
            id = match &self.node(id).kind {
                NodeKind::Internal { children } => children[quadrant.index()],
                NodeKind::Leaf { .. } => None,
            }
            .ok_or_else(|| QuadTreeError::InvalidPath(path.to_string()))?;
        }

        let r2 = r * r;
        let mut risen = path.clone();
        while !risen.is_empty() && !bounds[risen.len()].contains_circle(x, y, r2) {
            risen.pop();
        }
        trace!(
            "Rose from depth {} to depth {} for radius {}",
            path.len(),
            risen.len(),
            r
        );
        Ok((risen.clone(), bounds[risen.len()]))
    }

    /// Collect the keys within `r` of `(x, y)` below `start`, which owns `bounds`, skipping
    /// `exclude`.
    ///
    /// Children are pruned by the region their parent's split lines give them, not by their
    /// rounded squares. Results are ascending.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn fall(
        &self,
        start: NodeId,
        bounds: Bounds<N>,
        coords: &[(N, N)],
        exclude: PointKey,
        x: N,
        y: N,
        r: N,
    ) -> Vec<PointKey> {
        let r2 = r * r;

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[(NodeId, Bounds<N>); 32]> = TinyVec::new();
        stack.push((start, bounds));

        let mut result = vec![];
        while let Some((id, bounds)) = stack.pop() {
            match &self.node(id).kind {
                NodeKind::Leaf { keys } => {
                    for &key in keys {
                        let (px, py) = coords[key as usize];
                        if key != exclude && sq_dist(px, py, x, y) <= r2 {
                            result.push(key);
                        }
                    }
                }
                NodeKind::Internal { children } => {
                    let square = &self.node(id).square;
                    for quadrant in Quadrant::ALL {
                        let Some(child) = children[quadrant.index()] else {
                            continue;
                        };
                        let mut child_bounds = bounds;
                        child_bounds.narrow(square, quadrant);
                        if child_bounds.reaches_circle(x, y, r2) {
                            stack.push((child, child_bounds));
                        }
                    }
                }
            }
        }

        result.sort_unstable();
        result
    }
}

#[inline]
pub(crate) fn sq_dist<N: IndexableNum>(ax: N, ay: N, bx: N, by: N) -> N {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}
