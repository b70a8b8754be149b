//! Connector shape joining two nodes.

use super::{generate_name, ShapeId};
use crate::broadcast::Broadcast;
use crate::geometry::Vertex;
use kurbo::Point;
use uuid::Uuid;

/// A polyline joining two node centers.
///
/// The outline is recomputed by the board whenever either endpoint node
/// moves; a connector never owns its geometry independently.
#[derive(Debug)]
pub struct Connector {
    pub(crate) id: ShapeId,
    /// Display label, generated at construction. Not required unique.
    pub name: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) selected: bool,
    pub(crate) node1: ShapeId,
    pub(crate) node2: ShapeId,
    /// Fires after the outline is replaced.
    pub moved: Broadcast<()>,
    /// Fires after every selection change.
    pub selection_changed: Broadcast<()>,
}

impl Connector {
    /// Number of points in the interpolated chain.
    pub const POINT_COUNT: usize = 10;

    pub(crate) fn new(node1: ShapeId, node2: ShapeId, c1: Point, c2: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: generate_name("line"),
            vertices: Self::interpolate(c1, c2),
            selected: false,
            node1,
            node2,
            moved: Broadcast::new(),
            selection_changed: Broadcast::new(),
        }
    }

    /// Chain of [`Self::POINT_COUNT`] points stepping from `c1` toward `c2`.
    ///
    /// The per-step interval carries a +1 offset in each axis, so the chain
    /// is an approximate subdivision of the center line rather than an exact
    /// one. Consumers position against these points as-is; keep the formula.
    pub(crate) fn interpolate(c1: Point, c2: Point) -> Vec<Vertex> {
        let step_x = (c1.x - c2.x) / Self::POINT_COUNT as f64 + 1.0;
        let step_y = (c1.y - c2.y) / Self::POINT_COUNT as f64 + 1.0;
        (0..Self::POINT_COUNT)
            .map(|i| Vertex::new(c1.x - i as f64 * step_x, c1.y - i as f64 * step_y))
            .collect()
    }

    /// Get the unique identifier.
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Boundary vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Current selection flag.
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// The first joined node.
    pub fn node1(&self) -> ShapeId {
        self.node1
    }

    /// The second joined node.
    pub fn node2(&self) -> ShapeId {
        self.node2
    }

    /// Both endpoint node ids, in `(node1, node2)` order.
    pub fn endpoints(&self) -> (ShapeId, ShapeId) {
        (self.node1, self.node2)
    }

    /// Coordinate equality against the first point of the chain.
    pub fn is_start_point(&self, p: Point) -> bool {
        self.vertices.first().is_some_and(|v| v.pos == p)
    }

    /// Coordinate equality against the last point of the chain.
    pub fn is_end_point(&self, p: Point) -> bool {
        self.vertices.last().is_some_and(|v| v.pos == p)
    }

    pub(crate) fn set_outline(&mut self, vertices: Vec<Vertex>) {
        self.vertices = vertices;
        self.moved.publish(&());
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.selection_changed.publish(&());
    }
}
