//! Geometry primitives shared by every shape on the board.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for vertices.
pub type VertexId = Uuid;

/// A boundary point with its own identity.
///
/// Two vertices with equal coordinates are still distinct entities. Moving a
/// shape produces a fresh vertex sequence instead of rewriting coordinates
/// in place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub(crate) id: VertexId,
    /// Position in board coordinates.
    pub pos: Point,
}

impl Vertex {
    /// Create a vertex at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            pos: Point::new(x, y),
        }
    }

    /// Get the unique identifier.
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    /// A new vertex (fresh identity) offset by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.pos.x + delta.x, self.pos.y + delta.y)
    }
}

/// Outline of an axis-aligned rectangle in top-left, top-right,
/// bottom-right, bottom-left order.
pub fn rect_outline(rect: Rect) -> Vec<Vertex> {
    vec![
        Vertex::new(rect.x0, rect.y0),
        Vertex::new(rect.x1, rect.y0),
        Vertex::new(rect.x1, rect.y1),
        Vertex::new(rect.x0, rect.y1),
    ]
}

/// Translate an outline, producing fresh vertices.
pub fn translate_outline(outline: &[Vertex], delta: Vec2) -> Vec<Vertex> {
    outline.iter().map(|v| v.translated(delta)).collect()
}

/// Arithmetic mean of the outline's coordinates, as a fresh vertex.
///
/// The outline must be non-empty; board operations never leave a shape
/// without vertices.
pub fn centroid(outline: &[Vertex]) -> Vertex {
    debug_assert!(!outline.is_empty());
    let n = outline.len() as f64;
    let sum = outline
        .iter()
        .fold(Vec2::ZERO, |acc, v| acc + v.pos.to_vec2());
    Vertex::new(sum.x / n, sum.y / n)
}

/// Ray-casting parity test.
///
/// Edges are taken pairwise, last-to-first included. Points exactly on an
/// edge may report either way. Polygons with fewer than three vertices
/// contain nothing.
pub fn point_in_polygon(point: Point, polygon: &[Vertex]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i].pos, polygon[j].pos);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Vertex-containment intersection test: true iff a vertex of either outline
/// lies inside the polygon traced by the other.
///
/// Crossing overlaps where neither outline contributes a contained vertex
/// are missed. Reliable for the axis-aligned rectangles the board places;
/// this is not a polygon clipper.
pub fn outlines_intersect(a: &[Vertex], b: &[Vertex]) -> bool {
    a.iter().any(|v| point_in_polygon(v.pos, b)) || b.iter().any(|v| point_in_polygon(v.pos, a))
}
