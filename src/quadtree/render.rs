//! Drawing the tree through an external canvas.

use crate::error::Result;
use crate::quadtree::QuadTree;
use crate::r#type::IndexableNum;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// The default outline color.
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// A color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The drawing primitives [`QuadTree::render`] needs.
pub trait DrawSink<N: IndexableNum> {
    /// Draw a line through `coords`, in order.
    fn polyline(&mut self, coords: &[(N, N)], color: Color);

    /// Draw a point marker.
    fn marker(&mut self, x: N, y: N);
}

impl<N: IndexableNum> QuadTree<N> {
    /// Draw the outline of every node once, then a marker on every point.
    ///
    /// Outlines are closed: each polyline ends on its first corner.
    pub fn render(&self, sink: &mut impl DrawSink<N>, color: Color) -> Result<()> {
        let partition = self.partition()?;
        for node in partition.nodes.iter() {
            sink.polyline(&node.square.ring(), color);
        }
        for &(x, y) in self.coords.iter() {
            sink.marker(x, y);
        }
        Ok(())
    }
}
