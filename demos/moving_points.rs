//! Bodies bouncing in a box, with the quadtree rebuilt every tick.
//!
//! Each tick collects the current positions, builds and computes a fresh tree, counts the pairs
//! of bodies closer than the contact radius and "draws" the tree into a canvas that only counts
//! what it is asked to draw.

use std::time::Instant;

use quad_index::quadtree::{Color, DrawSink, QuadTree, QuadTreeOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_BODIES: usize = 200;
const NUM_TICKS: usize = 100;
const DT: f64 = 0.01;
const CONTACT_RADIUS: f64 = 0.05;

struct Body {
    position: (f64, f64),
    velocity: (f64, f64),
}

impl Body {
    fn random(rng: &mut StdRng) -> Self {
        Self {
            position: (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            velocity: (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
        }
    }

    /// Move and bounce off the walls of the `[-1, 1]` box.
    fn update(&mut self, dt: f64) {
        let (mut x, mut y) = self.position;
        let (mut vx, mut vy) = self.velocity;
        x += vx * dt;
        y += vy * dt;
        if !(-1.0..=1.0).contains(&x) {
            vx = -vx;
            x = x.clamp(-1.0, 1.0);
        }
        if !(-1.0..=1.0).contains(&y) {
            vy = -vy;
            y = y.clamp(-1.0, 1.0);
        }
        self.position = (x, y);
        self.velocity = (vx, vy);
    }
}

#[derive(Default)]
struct CountingCanvas {
    outlines: usize,
    markers: usize,
}

impl DrawSink<f64> for CountingCanvas {
    fn polyline(&mut self, _coords: &[(f64, f64)], _color: Color) {
        self.outlines += 1;
    }

    fn marker(&mut self, _x: f64, _y: f64) {
        self.markers += 1;
    }
}

fn main() -> quad_index::Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut bodies: Vec<Body> = (0..NUM_BODIES).map(|_| Body::random(&mut rng)).collect();

    let start = Instant::now();
    let mut canvas = CountingCanvas::default();
    let mut contacts = 0;
    for tick in 0..NUM_TICKS {
        for body in bodies.iter_mut() {
            body.update(DT);
        }

        let positions: Vec<(f64, f64)> = bodies.iter().map(|b| b.position).collect();
        let mut tree = match QuadTree::try_new(&positions, QuadTreeOptions::default()) {
            Ok(tree) => tree,
            Err(err) => {
                // two bodies clamped onto the same corner
                println!("tick {}: skipped ({})", tick, err);
                continue;
            }
        };
        tree.compute();

        let neighbors = tree.extract_all(CONTACT_RADIUS)?;
        let pairs: usize = neighbors.iter().map(|found| found.len()).sum::<usize>() / 2;
        contacts += pairs;

        tree.render(&mut canvas, Color::WHITE)?;
        if tick % 20 == 0 {
            println!(
                "tick {:3}: {} nodes, {} pairs in contact",
                tick,
                tree.num_nodes()?,
                pairs
            );
        }
    }

    println!(
        "{} ticks in {:?}: {} contacts, {} outlines and {} markers drawn",
        NUM_TICKS,
        start.elapsed(),
        contacts,
        canvas.outlines,
        canvas.markers
    );
    Ok(())
}
