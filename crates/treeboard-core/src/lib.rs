//! Treeboard Core Library
//!
//! Platform-agnostic scene-graph model for a tree diagram editor: a board
//! owning nodes and connectors, synchronous change broadcasts, collision
//! avoiding child placement, and subtree export.

pub mod board;
pub mod broadcast;
pub mod export;
pub mod geometry;
pub mod shapes;

pub use board::{Board, BoardError, BoardResult};
pub use broadcast::{Broadcast, ListenerId};
pub use export::{serialize, TreeRecord};
pub use geometry::{
    centroid, outlines_intersect, point_in_polygon, rect_outline, translate_outline, Vertex,
    VertexId,
};
pub use shapes::{Connector, Node, Operator, ParseOperatorError, Shape, ShapeId};
