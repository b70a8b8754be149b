//! Tree node shape.

use super::{generate_name, ShapeId};
use crate::broadcast::Broadcast;
use crate::geometry::{centroid, Vertex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Comparison operator carried by a node.
///
/// Serializes as its symbol, matching what the diagram displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl Operator {
    /// The operator's symbol as written on the diagram.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error for unrecognized operator symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operator: {0}")]
pub struct ParseOperatorError(String);

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterEqual),
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            _ => Err(ParseOperatorError(s.to_string())),
        }
    }
}

/// A tree vertex carrying a comparison operator and value.
///
/// The outline is an axis-aligned rectangle in top-left, top-right,
/// bottom-right, bottom-left order. Tree links and attached connectors are
/// stored as ids; the board resolves them.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: ShapeId,
    /// Display label, generated at construction. Not required unique.
    pub name: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) selected: bool,
    /// Comparison operator shown on the node, if any.
    pub operator: Option<Operator>,
    /// Comparison value shown on the node, if any.
    pub value: Option<f64>,
    pub(crate) parent: Option<ShapeId>,
    pub(crate) children: Vec<ShapeId>,
    pub(crate) lines: Vec<ShapeId>,
    /// Fires after the outline is replaced.
    pub moved: Broadcast<()>,
    /// Fires after every selection change.
    pub selection_changed: Broadcast<()>,
}

impl Node {
    /// Default node width.
    pub const WIDTH: f64 = 200.0;
    /// Default node height.
    pub const HEIGHT: f64 = 100.0;
    /// Vertical offset of a fresh child below its parent.
    pub const CHILD_OFFSET: f64 = 200.0;
    /// Horizontal gap kept between sibling rectangles.
    pub const SIBLING_GAP: f64 = 10.0;

    pub(crate) fn new(
        vertices: Vec<Vertex>,
        operator: Option<Operator>,
        value: Option<f64>,
        parent: Option<ShapeId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: generate_name("node"),
            vertices,
            selected: false,
            operator,
            value,
            parent,
            children: Vec::new(),
            lines: Vec::new(),
            moved: Broadcast::new(),
            selection_changed: Broadcast::new(),
        }
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

    /// True for the tree root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Parent node id, if any.
    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    /// Child nodes, in creation order.
    pub fn children(&self) -> &[ShapeId] {
        &self.children
    }

    /// Connectors touching this node.
    pub fn lines(&self) -> &[ShapeId] {
        &self.lines
    }

    /// Rectangle width, read off the top edge.
    pub fn width(&self) -> f64 {
        self.vertices[1].pos.x - self.vertices[0].pos.x
    }

    /// Centroid of the rectangle.
    pub fn center(&self) -> Vertex {
        centroid(&self.vertices)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::rect_outline;
    use kurbo::Rect;

    fn default_rect() -> Vec<Vertex> {
        rect_outline(Rect::new(0.0, 0.0, Node::WIDTH, Node::HEIGHT))
    }

    #[test]
    fn test_operator_symbols_round_trip() {
        for op in [
            Operator::Less,
            Operator::LessEqual,
            Operator::Greater,
            Operator::GreaterEqual,
            Operator::Equal,
            Operator::NotEqual,
        ] {
            assert_eq!(op.symbol().parse::<Operator>(), Ok(op));
            assert_eq!(op.to_string(), op.symbol());
        }
        assert!("~".parse::<Operator>().is_err());
    }

    #[test]
    fn test_new_node_is_root_without_parent() {
        let node = Node::new(default_rect(), None, None, None);
        assert!(node.is_root());
        assert!(node.children().is_empty());
        assert!(node.lines().is_empty());
        assert!(!node.selected());
    }

    #[test]
    fn test_width_reads_the_top_edge() {
        let node = Node::new(default_rect(), None, None, None);
        assert!((node.width() - Node::WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_center_of_default_rect() {
        let node = Node::new(default_rect(), None, None, None);
        let c = node.center();
        assert!((c.x() - 100.0).abs() < f64::EPSILON);
        assert!((c.y() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_outline_announces_the_move() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut node = Node::new(default_rect(), None, None, None);
        let moves = Rc::new(RefCell::new(0));
        let m = Rc::clone(&moves);
        node.moved.subscribe(move |_| *m.borrow_mut() += 1);
        node.set_outline(rect_outline(Rect::new(50.0, 50.0, 250.0, 150.0)));
        assert_eq!(*moves.borrow(), 1);
        assert!((node.vertices()[0].x() - 50.0).abs() < f64::EPSILON);
    }
}
