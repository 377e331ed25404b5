use geo_traits::{CoordTrait, RectTrait};

use crate::error::QuadTreeError;
use crate::quadtree::{
    Color, DrawSink, Path, Quadrant, QuadTree, QuadTreeBuilder, QuadTreeOptions, Square,
};
use crate::r#type::Coord;

fn corners() -> Vec<(f64, f64)> {
    vec![(0., 0.), (1., 0.), (0., 1.), (1., 1.)]
}

fn make_tree(points: &[(f64, f64)], options: QuadTreeOptions) -> QuadTree<f64> {
    let mut tree = QuadTree::try_new(points, options).unwrap();
    tree.compute();
    tree
}

#[derive(Default)]
struct RecordingSink {
    polylines: Vec<Vec<(f64, f64)>>,
    colors: Vec<Color>,
    markers: Vec<(f64, f64)>,
}

impl DrawSink<f64> for RecordingSink {
    fn polyline(&mut self, coords: &[(f64, f64)], color: Color) {
        self.polylines.push(coords.to_vec());
        self.colors.push(color);
    }

    fn marker(&mut self, x: f64, y: f64) {
        self.markers.push((x, y));
    }
}

#[test]
fn four_corners_radius_search() {
    let tree = make_tree(&corners(), QuadTreeOptions::default());

    // (1, 1) is sqrt(2) ~ 1.414 away from (0, 0)
    assert_eq!(tree.extract(0, 1.2).unwrap(), vec![1, 2]);
    assert_eq!(tree.extract(0, 1.5).unwrap(), vec![1, 2, 3]);
    assert_eq!(tree.extract(3, 1.).unwrap(), vec![1, 2]);
    assert_eq!(tree.extract(1, 0.99).unwrap(), Vec::<u32>::new());
}

#[test]
fn four_corners_structure() {
    let tree = make_tree(&corners(), QuadTreeOptions::default());

    assert_eq!(
        tree.to_string(),
        "QuadTree({NW: [2], NE: [3], SW: [0], SE: [1]})"
    );
    assert_eq!(tree.num_nodes().unwrap(), 5);
    assert_eq!(
        tree.root_square().unwrap(),
        Some(Square::new(0.5, 0.5, 0.5))
    );
    assert_eq!(
        tree.leaf_path(0).unwrap().as_slice(),
        &[Quadrant::SouthWest]
    );
    assert_eq!(
        tree.square(tree.leaf_path(3).unwrap()).unwrap(),
        Square::new(0.75, 0.75, 0.25)
    );
}

#[test]
fn center_ties_go_north_east() {
    let points = [(-1., -1.), (1., 1.), (0., 0.)];
    let tree = make_tree(&points, QuadTreeOptions::default());

    // (0, 0) sits on both center lines of the root
    assert_eq!(
        tree.leaf_path(2).unwrap().as_slice(),
        &[Quadrant::NorthEast, Quadrant::SouthWest]
    );
    assert_eq!(
        tree.leaf_path(1).unwrap().as_slice(),
        &[Quadrant::NorthEast, Quadrant::NorthEast]
    );
    assert_eq!(tree.to_string(), "QuadTree({NE: {NE: [1], SW: [2]}, SW: [0]})");
    assert_eq!(tree.extract(2, 1.5).unwrap(), vec![0, 1]);
}

#[test]
fn leaf_squares_hold_their_points() {
    let points: Vec<(f64, f64)> = (0..50)
        .map(|i| {
            let t = i as f64 * 0.37;
            (t.cos() * (1. + i as f64), t.sin() * 0.5 * i as f64)
        })
        .collect();
    let tree = make_tree(&points, QuadTreeOptions::default());

    for (key, square) in tree.squares().unwrap() {
        let path = tree.leaf_path(key).unwrap();
        let leaf = tree.access(path).unwrap();
        assert!(leaf.is_leaf());
        assert!(leaf.keys().contains(&key));
        assert_eq!(leaf.square(), square, "rebuilt square matches the stored one");
        assert_eq!(leaf.depth() as usize, path.len());

        // corners are rebuilt from center and half length, allow for rounding
        let (x, y) = points[key as usize];
        let eps = 1e-9;
        assert!(square.min_x() - eps <= x && x <= square.max_x() + eps);
        assert!(square.min_y() - eps <= y && y <= square.max_y() + eps);
    }
}

#[test]
fn rejects_coincident_points() {
    let points = [(0., 0.), (1., 2.), (3., 3.), (1., 2.)];
    let err = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap_err();
    assert_eq!(err, QuadTreeError::DuplicatePoint { x: 1., y: 2. });

    let points = [(0., 0.), (-0., 0.)];
    let err = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap_err();
    assert!(matches!(err, QuadTreeError::DuplicatePoint { .. }));
}

#[test]
fn rejects_invalid_input() {
    let points = [(0., 0.), (f64::NAN, 1.)];
    let err = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap_err();
    assert_eq!(err, QuadTreeError::NonFinitePoint { key: 1 });

    let points = [(f64::INFINITY, 0.)];
    let err = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap_err();
    assert_eq!(err, QuadTreeError::NonFinitePoint { key: 0 });

    let err = QuadTree::try_new(&corners(), QuadTreeOptions::default().with_neighbors(0));
    assert!(matches!(err, Err(QuadTreeError::General(_))));

    let mut builder = QuadTreeBuilder::<f64>::new(3);
    builder.add(0., 0.);
    builder.add(1., 1.);
    assert!(matches!(builder.finish(), Err(QuadTreeError::General(_))));
}

#[test]
fn builder_rejects_extra_points() {
    let mut builder = QuadTreeBuilder::<f64>::new(1);
    assert_eq!(builder.add(0., 0.), 0);
    assert_eq!(builder.add(1., 1.), 1);
    assert_eq!(
        builder.finish(),
        Err(QuadTreeError::General(
            "Added 2 items when expected 1.".to_string()
        ))
    );
}

#[test]
fn builder_keys_follow_insertion_order() {
    let mut builder = QuadTreeBuilder::<f64>::new(3);
    assert_eq!(builder.add(5., 5.), 0);
    assert_eq!(builder.add_coord(&Coord { x: 6., y: 5. }), 1);
    assert_eq!(builder.add(5., 7.), 2);
    let mut tree = builder.finish().unwrap();
    tree.compute();

    assert_eq!(tree.num_items(), 3);
    assert_eq!(tree.point(1), Some((6., 5.)));
    assert_eq!(tree.point(3), None);
    assert_eq!(tree.extract(0, 1.).unwrap(), vec![1]);
    assert_eq!(tree.extract(0, 2.).unwrap(), vec![1, 2]);
}

#[test]
fn queries_fail_before_compute() {
    let tree = QuadTree::try_new(&corners(), QuadTreeOptions::default()).unwrap();
    assert!(!tree.is_computed());
    assert_eq!(tree.to_string(), "QuadTree(uncomputed)");

    assert_eq!(tree.extract(0, 1.), Err(QuadTreeError::UncomputedTree));
    assert_eq!(tree.square(&Path::new()), Err(QuadTreeError::UncomputedTree));
    assert_eq!(tree.leaf_path(0), Err(QuadTreeError::UncomputedTree));
    assert_eq!(tree.extract_all(1.), Err(QuadTreeError::UncomputedTree));
    assert!(matches!(tree.root(), Err(QuadTreeError::UncomputedTree)));

    let mut sink = RecordingSink::default();
    assert_eq!(
        tree.render(&mut sink, Color::WHITE),
        Err(QuadTreeError::UncomputedTree)
    );
    assert!(sink.polylines.is_empty());

    // the exhaustive search does not need the partition
    assert_eq!(tree.extract_brute_force(0, 1.2).unwrap(), vec![1, 2]);
}

#[test]
fn unknown_keys() {
    let tree = make_tree(&corners(), QuadTreeOptions::default());
    assert_eq!(tree.extract(4, 1.), Err(QuadTreeError::KeyNotFound(4)));
    assert_eq!(
        tree.extract_brute_force(99, 1.),
        Err(QuadTreeError::KeyNotFound(99))
    );
    assert_eq!(tree.leaf_path(4), Err(QuadTreeError::KeyNotFound(4)));
}

#[test]
fn boundary_radius() {
    let tree = make_tree(&corners(), QuadTreeOptions::default());
    let empty: Vec<u32> = vec![];

    assert_eq!(tree.extract(0, 0.).unwrap(), empty);
    assert_eq!(tree.extract(0, -1.).unwrap(), empty);
    assert_eq!(tree.extract(0, f64::NAN).unwrap(), empty);
    assert_eq!(tree.extract_brute_force(0, 0.).unwrap(), empty);
    assert_eq!(tree.extract(2, f64::INFINITY).unwrap(), vec![0, 1, 3]);
    assert_eq!(tree.extract(2, f64::MAX).unwrap(), vec![0, 1, 3]);
}

#[test]
fn depth_cap_stops_splitting() {
    let points: Vec<(f64, f64)> = (0..40)
        .map(|i| (i as f64 * 0.1, (i * i % 17) as f64))
        .collect();
    let tree = make_tree(&points, QuadTreeOptions::default().with_max_depth(0));

    let root = tree.root().unwrap();
    assert!(root.is_parent());
    for (_, child) in root.children() {
        assert!(child.is_leaf());
        assert_eq!(child.depth(), 1);
    }
    let stored: usize = root.children().map(|(_, child)| child.keys().len()).sum();
    assert_eq!(stored, points.len());

    for key in 0..points.len() as u32 {
        assert_eq!(
            tree.extract(key, 3.).unwrap(),
            tree.extract_brute_force(key, 3.).unwrap()
        );
    }
}

#[test]
fn neighbors_threshold_keeps_small_leaves() {
    let tree = make_tree(&corners(), QuadTreeOptions::default().with_neighbors(4));
    let root = tree.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.keys(), &[0, 1, 2, 3]);
    assert_eq!(tree.to_string(), "QuadTree([0, 1, 2, 3])");
    assert!(tree.leaf_path(2).unwrap().is_empty());
    assert_eq!(tree.extract(0, 1.2).unwrap(), vec![1, 2]);
}

#[test]
fn invalid_paths() {
    let tree = make_tree(&corners(), QuadTreeOptions::default());

    // below a leaf
    let path: Path = [Quadrant::NorthEast, Quadrant::NorthEast].into_iter().collect();
    assert!(matches!(tree.access(&path), Err(QuadTreeError::InvalidPath(_))));

    // the algebraic square does not need the node to exist
    assert_eq!(
        tree.square(&path).unwrap(),
        Square::new(0.875, 0.875, 0.125)
    );

    let tree = make_tree(&[(0., 0.), (1., 1.)], QuadTreeOptions::default());
    let path: Path = [Quadrant::NorthWest].into_iter().collect();
    assert!(matches!(tree.access(&path), Err(QuadTreeError::InvalidPath(_))));
}

#[test]
fn empty_tree() {
    let tree = make_tree(&[], QuadTreeOptions::default());
    assert_eq!(tree.num_items(), 0);
    assert_eq!(tree.num_nodes().unwrap(), 0);
    assert_eq!(tree.root_square().unwrap(), None);
    assert_eq!(tree.to_string(), "QuadTree(empty)");
    assert_eq!(tree.extract(0, 1.), Err(QuadTreeError::KeyNotFound(0)));
    assert!(matches!(tree.root(), Err(QuadTreeError::InvalidPath(_))));
    assert_eq!(tree.extract_all(1.).unwrap(), Vec::<Vec<u32>>::new());

    let mut sink = RecordingSink::default();
    tree.render(&mut sink, Color::WHITE).unwrap();
    assert!(sink.polylines.is_empty() && sink.markers.is_empty());
}

#[test]
fn single_point() {
    let tree = make_tree(&[(3., -2.)], QuadTreeOptions::default());
    let root = tree.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.keys(), &[0]);
    assert_eq!(root.square(), Square::new(3., -2., 0.));
    assert_eq!(tree.extract(0, 10.).unwrap(), Vec::<u32>::new());
}

#[test]
fn exhausted_squares_become_leaves() {
    // the two points are one ulp apart, so halving stops separating them
    let points = [(1., 0.), (1. + f64::EPSILON, 0.)];
    let tree = make_tree(&points, QuadTreeOptions::default());

    let root = tree.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.keys(), &[0, 1]);
    assert_eq!(tree.extract(0, 1e-9).unwrap(), vec![1]);
}

#[test]
fn rounded_child_squares_do_not_hide_neighbors() {
    // the coordinate ulp here is 0.5, so the south east child center 576.46875 rounds to 576.5
    // and its square no longer reaches back to the split line at 576.0
    let points = [
        (2610934575644575.5, 0.),
        (2610934575644576.0, 0.),
        (2610934575644576.5, 1.875),
    ];
    let tree = make_tree(&points, QuadTreeOptions::default());

    let root = tree.root_square().unwrap().unwrap();
    assert_eq!(root.center_x(), 2610934575644576.0);
    assert_eq!(root.half_length(), 0.9375);
    assert_eq!(
        tree.square(tree.leaf_path(1).unwrap()).unwrap().center_x(),
        2610934575644576.5
    );

    assert_eq!(tree.extract(0, 0.5).unwrap(), vec![1]);
    assert_eq!(tree.extract(1, 0.5).unwrap(), vec![0]);
    for key in 0..3 {
        for r in [0.5, 1., 2.] {
            assert_eq!(
                tree.extract(key, r).unwrap(),
                tree.extract_brute_force(key, r).unwrap()
            );
        }
    }
}

#[test]
fn extent_of_the_whole_float_range() {
    let points = [(-1e308, 0.), (1e308, 0.), (0., 1.), (1e308, 1.), (1e307, 1.)];
    let tree = make_tree(&points, QuadTreeOptions::default());

    let root = tree.root_square().unwrap().unwrap();
    assert_eq!(root.center_x(), 0.);
    assert_eq!(root.half_length(), 1e308);
    for (_, square) in tree.squares().unwrap() {
        assert!(square.center_x().is_finite() && square.half_length().is_finite());
    }

    assert_eq!(tree.extract(3, 1.).unwrap(), vec![1]);
    for key in 0..5 {
        for r in [1., 1e307, f64::MAX, f64::INFINITY] {
            assert_eq!(
                tree.extract(key, r).unwrap(),
                tree.extract_brute_force(key, r).unwrap()
            );
        }
    }

    let points = [(-f64::MAX, -f64::MAX), (f64::MAX, f64::MAX), (0., 0.)];
    let tree = make_tree(&points, QuadTreeOptions::default());
    assert_eq!(tree.root_square().unwrap().unwrap().half_length(), f64::MAX);
    // (0, 0) sits on the center and goes north east along with (MAX, MAX)
    assert_eq!(tree.root().unwrap().children().count(), 2);
    assert_eq!(tree.extract(2, f64::MAX).unwrap(), vec![0, 1]);
    assert_eq!(tree.extract(2, 1.).unwrap(), Vec::<u32>::new());
}

#[test]
fn renders_every_node_once() {
    let points = [(-1., -1.), (1., 1.), (0., 0.), (-0.5, 0.75)];
    let tree = make_tree(&points, QuadTreeOptions::default());
    let color = Color::new(0, 255, 0);

    let mut sink = RecordingSink::default();
    tree.render(&mut sink, color).unwrap();

    assert_eq!(sink.polylines.len(), tree.num_nodes().unwrap());
    assert!(sink.colors.iter().all(|c| *c == color));
    assert_eq!(sink.markers, points.to_vec());
    for ring in sink.polylines.iter() {
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last(), "outlines are closed");
    }

    let root = tree.root_square().unwrap().unwrap();
    assert_eq!(sink.polylines[0], root.ring().to_vec());
}

#[test]
fn manual_traversal_reaches_every_key_once() {
    let points: Vec<(f64, f64)> = (0..64)
        .map(|i| ((i % 8) as f64, (i / 8) as f64 * 1.5))
        .collect();
    let tree = make_tree(&points, QuadTreeOptions::default().with_neighbors(3));

    let mut seen = vec![0; points.len()];
    let mut stack = vec![tree.root().unwrap()];
    while let Some(node) = stack.pop() {
        if node.is_leaf() {
            assert!(!node.keys().is_empty(), "empty quadrants are not materialized");
            assert!(node.keys().len() <= 3);
            for &key in node.keys() {
                seen[key as usize] += 1;
            }
        } else {
            assert!(node.keys().is_empty());
            for (_, child) in node.children() {
                assert_eq!(child.depth(), node.depth() + 1);
                stack.push(child);
            }
        }
    }
    assert!(seen.iter().all(|&count| count == 1));
}

#[test]
fn squares_are_rects() {
    let square = Square::new(1., 2., 0.5);
    assert_eq!(square.length(), 1.);
    assert_eq!(square.min().x(), 0.5);
    assert_eq!(square.min().y(), 1.5);
    assert_eq!(square.max().x(), 1.5);
    assert_eq!(square.max().y(), 2.5);

    let tree = make_tree(&corners(), QuadTreeOptions::default());
    let root = tree.root().unwrap();
    assert_eq!(root.min().x(), 0.);
    assert_eq!(root.max().y(), 1.);
}

#[test]
fn path_display() {
    let path: Path = [Quadrant::NorthEast, Quadrant::SouthWest].into_iter().collect();
    assert_eq!(path.to_string(), "NE/SW");
    assert_eq!(Path::new().to_string(), "<root>");

    let mut path = path;
    assert_eq!(path.pop(), Some(Quadrant::SouthWest));
    assert_eq!(path.child(Quadrant::SouthEast).to_string(), "NE/SE");
}

#[test]
fn single_precision() {
    let points: Vec<(f32, f32)> = vec![(0.5, 0.5), (-0.5, 0.25), (0.1, -0.9), (0.45, 0.55)];
    let mut tree = QuadTree::try_new(&points, QuadTreeOptions::default()).unwrap();
    tree.compute();
    assert_eq!(tree.extract(0, 0.1).unwrap(), vec![3]);
    assert_eq!(tree.extract(1, 2.).unwrap(), vec![0, 2, 3]);
}
