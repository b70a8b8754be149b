//! Shape definitions for the board.

mod connector;
mod node;

pub use connector::Connector;
pub use node::{Node, Operator, ParseOperatorError};

use crate::broadcast::Broadcast;
use crate::geometry::{centroid, outlines_intersect, Vertex};
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Generate a short display name like `node-52d72a8f`.
///
/// A process-wide counter mixed through a splitmix-style hash: the names
/// look random without needing a time source, so generation behaves the
/// same on every platform.
pub(crate) fn generate_name(prefix: &str) -> String {
    static NAME_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut x = counter.wrapping_mul(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    format!("{prefix}-{x:08x}")
}

/// Enum wrapper for everything the board can own.
#[derive(Debug)]
pub enum Shape {
    Node(Node),
    Connector(Connector),
}

impl Shape {
    /// Get the unique identifier.
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Node(s) => s.id,
            Shape::Connector(s) => s.id,
        }
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        match self {
            Shape::Node(s) => &s.name,
            Shape::Connector(s) => &s.name,
        }
    }

    /// Boundary vertices, in the order they were supplied.
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            Shape::Node(s) => &s.vertices,
            Shape::Connector(s) => &s.vertices,
        }
    }

    /// Current selection flag.
    pub fn selected(&self) -> bool {
        match self {
            Shape::Node(s) => s.selected,
            Shape::Connector(s) => s.selected,
        }
    }

    /// Centroid of the outline.
    pub fn center(&self) -> Vertex {
        centroid(self.vertices())
    }

    /// Vertex-containment test against another shape's outline.
    pub fn intersects(&self, other: &Shape) -> bool {
        outlines_intersect(self.vertices(), other.vertices())
    }

    /// Broadcast fired after the outline is replaced.
    pub fn moved_mut(&mut self) -> &mut Broadcast<()> {
        match self {
            Shape::Node(s) => &mut s.moved,
            Shape::Connector(s) => &mut s.moved,
        }
    }

    /// Broadcast fired after every selection change, including forced
    /// deselects that did not flip the flag.
    pub fn selection_changed_mut(&mut self) -> &mut Broadcast<()> {
        match self {
            Shape::Node(s) => &mut s.selection_changed,
            Shape::Connector(s) => &mut s.selection_changed,
        }
    }

    /// Check if this shape is a node.
    pub fn is_node(&self) -> bool {
        matches!(self, Shape::Node(_))
    }

    /// Get the node if this shape is a node.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Shape::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Get the mutable node if this shape is a node.
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Shape::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Get the connector if this shape is a connector.
    pub fn as_connector(&self) -> Option<&Connector> {
        match self {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }

    /// Get the mutable connector if this shape is a connector.
    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match self {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }

    /// Replace the outline wholesale and announce the move.
    pub(crate) fn set_outline(&mut self, vertices: Vec<Vertex>) {
        match self {
            Shape::Node(s) => s.set_outline(vertices),
            Shape::Connector(s) => s.set_outline(vertices),
        }
    }

    /// Overwrite the selection flag and announce the change.
    pub(crate) fn set_selected(&mut self, selected: bool) {
        match self {
            Shape::Node(s) => s.set_selected(selected),
            Shape::Connector(s) => s.set_selected(selected),
        }
    }
}
