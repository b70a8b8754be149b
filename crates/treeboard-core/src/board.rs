//! Board: owner and mediator of all shapes in one editing session.

use crate::broadcast::Broadcast;
use crate::geometry::{
    outlines_intersect, point_in_polygon, rect_outline, translate_outline, Vertex,
};
use crate::shapes::{Connector, Node, Operator, Shape, ShapeId};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;
use thiserror::Error;

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape {0} is not a node")]
    NotANode(ShapeId),
    #[error("Shape outline cannot be empty")]
    EmptyOutline,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// The owning container for every shape in one editing session.
///
/// Shapes live in a flat store keyed by id; `order` preserves insertion
/// order for deterministic iteration. Nodes and connectors refer to each
/// other by id and the board resolves the references, so removal is a
/// matter of deleting entries and dropping the ids that pointed at them.
///
/// Invariant: at most one shape is selected at any time.
#[derive(Debug, Default)]
pub struct Board {
    shapes: HashMap<ShapeId, Shape>,
    order: Vec<ShapeId>,
    /// Fires after a shape is added; payload is the shape id.
    pub shape_added: Broadcast<ShapeId>,
    /// Fires after every removal request, including requests for ids no
    /// longer on the board.
    pub shape_removed: Broadcast<ShapeId>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the board.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        log::debug!("add {} ({id})", shape.name());
        self.order.push(id);
        self.shapes.insert(id, shape);
        self.shape_added.publish(&id);
        id
    }

    /// Remove a shape by id.
    ///
    /// Removing an id that is not on the board is a no-op apart from the
    /// `shape_removed` event, which is published either way; listeners must
    /// tolerate repeats.
    pub fn remove_shape(&mut self, id: ShapeId) {
        if self.shapes.remove(&id).is_some() {
            self.order.retain(|&sid| sid != id);
            log::debug!("remove {id}");
        }
        self.shape_removed.publish(&id);
    }

    /// Get a shape by id.
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get a mutable shape by id.
    ///
    /// Intended for payload edits and broadcast subscriptions. Geometry and
    /// selection changes go through [`Board::move_shape`], [`Board::select`]
    /// and [`Board::deselect`] so dependent shapes stay in sync.
    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Get a node by id, rejecting unknown ids and connectors.
    pub fn node(&self, id: ShapeId) -> BoardResult<&Node> {
        self.shape(id)
            .ok_or(BoardError::ShapeNotFound(id))?
            .as_node()
            .ok_or(BoardError::NotANode(id))
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Shape ids in insertion order.
    pub fn ids(&self) -> &[ShapeId] {
        &self.order
    }

    /// Number of shapes on the board.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the board is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Check whether an id is on the board.
    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Topmost shape whose outline contains `point`.
    pub fn shape_at(&self, point: Point) -> Option<ShapeId> {
        self.order
            .iter()
            .rev()
            .find(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|s| point_in_polygon(point, s.vertices()))
            })
            .copied()
    }

    /// Currently selected shape, if any.
    pub fn selected(&self) -> Option<ShapeId> {
        self.shapes().find(|s| s.selected()).map(Shape::id)
    }

    /// Select a shape, deselecting every other shape first.
    ///
    /// The target's flag is then toggled: selecting an already-selected
    /// shape deselects it again. Every shape touched publishes its
    /// selection event, whether or not its flag actually changed.
    pub fn select(&mut self, id: ShapeId) -> BoardResult<()> {
        if !self.shapes.contains_key(&id) {
            return Err(BoardError::ShapeNotFound(id));
        }
        for other in self.order.clone() {
            if other == id {
                continue;
            }
            if let Some(shape) = self.shapes.get_mut(&other) {
                shape.set_selected(false);
            }
        }
        if let Some(shape) = self.shapes.get_mut(&id) {
            let toggled = !shape.selected();
            shape.set_selected(toggled);
        }
        Ok(())
    }

    /// Force a shape to deselected, whatever its prior state.
    pub fn deselect(&mut self, id: ShapeId) -> BoardResult<()> {
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(BoardError::ShapeNotFound(id))?;
        shape.set_selected(false);
        Ok(())
    }

    /// Replace a shape's outline wholesale.
    ///
    /// Publishes the shape's `moved` event and, for a node, recomputes
    /// every attached connector before returning; callers observe no stale
    /// geometry afterwards. The new outline may change the vertex count
    /// but must not be empty.
    pub fn move_shape(&mut self, id: ShapeId, vertices: Vec<Vertex>) -> BoardResult<()> {
        if vertices.is_empty() {
            return Err(BoardError::EmptyOutline);
        }
        let shape = self
            .shapes
            .get_mut(&id)
            .ok_or(BoardError::ShapeNotFound(id))?;
        shape.set_outline(vertices);
        let lines = match shape {
            Shape::Node(node) => node.lines.clone(),
            Shape::Connector(_) => Vec::new(),
        };
        for line in lines {
            self.refresh_connector(line);
        }
        Ok(())
    }

    /// Recompute a connector's chain from its endpoints' current centers.
    fn refresh_connector(&mut self, id: ShapeId) {
        let Some((n1, n2)) = self
            .shape(id)
            .and_then(Shape::as_connector)
            .map(Connector::endpoints)
        else {
            return;
        };
        let (Some(c1), Some(c2)) = (
            self.shape(n1).map(Shape::center),
            self.shape(n2).map(Shape::center),
        ) else {
            return;
        };
        log::trace!("refresh connector {id}");
        if let Some(connector) = self.shapes.get_mut(&id).and_then(Shape::as_connector_mut) {
            connector.set_outline(Connector::interpolate(c1.pos, c2.pos));
        }
    }

    /// Add a node with its lifecycle geometry: the default rectangle at the
    /// origin for a root, or the parent's rectangle shifted down for a
    /// parented node. A parented node gets a connector to its parent in the
    /// same operation.
    ///
    /// No collision avoidance happens here; [`Board::add_child`] is the
    /// placement path.
    pub fn add_node(
        &mut self,
        operator: Option<Operator>,
        value: Option<f64>,
        parent: Option<ShapeId>,
    ) -> BoardResult<ShapeId> {
        let outline = match parent {
            Some(pid) => translate_outline(
                self.node(pid)?.vertices(),
                Vec2::new(0.0, Node::CHILD_OFFSET),
            ),
            None => rect_outline(Rect::new(0.0, 0.0, Node::WIDTH, Node::HEIGHT)),
        };
        self.insert_node(outline, operator, value, parent)
    }

    /// Add a child below `parent`, shifted right until it overlaps no
    /// existing node, and record it in the parent's child list.
    pub fn add_child(&mut self, parent: ShapeId) -> BoardResult<ShapeId> {
        let candidate = translate_outline(
            self.node(parent)?.vertices(),
            Vec2::new(0.0, Node::CHILD_OFFSET),
        );
        let outline = self.resolve_overlap(candidate);
        let id = self.insert_node(outline, None, None, Some(parent))?;
        if let Some(node) = self.shapes.get_mut(&parent).and_then(Shape::as_node_mut) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Shift `outline` right past every node it overlaps.
    ///
    /// Each shift is the overlapped node's width plus the sibling gap; the
    /// scan repeats until no node intersects. Placement is one-shot: later
    /// moves do not re-run avoidance.
    fn resolve_overlap(&self, mut outline: Vec<Vertex>) -> Vec<Vertex> {
        loop {
            let hit = self.shapes().find_map(|s| match s {
                Shape::Node(n) if outlines_intersect(n.vertices(), &outline) => Some(n.width()),
                _ => None,
            });
            match hit {
                Some(width) => {
                    outline =
                        translate_outline(&outline, Vec2::new(width + Node::SIBLING_GAP, 0.0));
                }
                None => return outline,
            }
        }
    }

    fn insert_node(
        &mut self,
        outline: Vec<Vertex>,
        operator: Option<Operator>,
        value: Option<f64>,
        parent: Option<ShapeId>,
    ) -> BoardResult<ShapeId> {
        let parent_center = match parent {
            Some(pid) => Some(self.node(pid)?.center()),
            None => None,
        };
        let node = Node::new(outline, operator, value, parent);
        let child_center = node.center();
        let id = self.add_shape(Shape::Node(node));
        if let (Some(pid), Some(c1)) = (parent, parent_center) {
            let connector = Connector::new(pid, id, c1.pos, child_center.pos);
            let cid = connector.id();
            self.add_shape(Shape::Connector(connector));
            for nid in [pid, id] {
                if let Some(n) = self.shapes.get_mut(&nid).and_then(Shape::as_node_mut) {
                    n.lines.push(cid);
                }
            }
        }
        Ok(id)
    }

    /// Remove a node and cascade: its connectors, then its whole subtree.
    ///
    /// Afterwards the board contains none of the node, its descendants, or
    /// any connector that touched them, and the parent's child list no
    /// longer carries the removed id. Unknown and non-node ids are ignored.
    pub fn remove_node(&mut self, id: ShapeId) {
        let Some((parent, lines, children)) = self
            .shape(id)
            .and_then(Shape::as_node)
            .map(|n| (n.parent, n.lines.clone(), n.children.clone()))
        else {
            return;
        };
        self.remove_shape(id);
        for line in lines {
            self.remove_connector(line);
        }
        for child in children {
            self.remove_node(child);
        }
        if let Some(node) = parent
            .and_then(|pid| self.shapes.get_mut(&pid))
            .and_then(Shape::as_node_mut)
        {
            node.children.retain(|&cid| cid != id);
        }
    }

    /// Remove a connector and detach it from both endpoints' line lists.
    fn remove_connector(&mut self, id: ShapeId) {
        let endpoints = self
            .shape(id)
            .and_then(Shape::as_connector)
            .map(Connector::endpoints);
        self.remove_shape(id);
        if let Some((n1, n2)) = endpoints {
            for nid in [n1, n2] {
                if let Some(node) = self.shapes.get_mut(&nid).and_then(Shape::as_node_mut) {
                    node.lines.retain(|&lid| lid != id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    fn corners(board: &Board, id: ShapeId) -> Vec<(f64, f64)> {
        board
            .shape(id)
            .unwrap()
            .vertices()
            .iter()
            .map(|v| (v.x(), v.y()))
            .collect()
    }

    #[test]
    fn test_root_node_geometry() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        assert_eq!(
            corners(&board, root),
            vec![(0.0, 0.0), (200.0, 0.0), (200.0, 100.0), (0.0, 100.0)]
        );
        assert!(board.node(root).unwrap().is_root());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_parented_node_gets_a_connector() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_node(None, None, Some(root)).unwrap();
        assert_eq!(board.len(), 3);
        let lines = board.node(child).unwrap().lines().to_vec();
        assert_eq!(lines.len(), 1);
        assert_eq!(board.node(root).unwrap().lines(), lines.as_slice());
        let connector = board.shape(lines[0]).unwrap().as_connector().unwrap();
        assert_eq!(connector.endpoints(), (root, child));
        assert_eq!(connector.vertices().len(), Connector::POINT_COUNT);
        // child bookkeeping belongs to add_child, not to raw construction
        assert!(board.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_add_child_places_below_parent() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_child(root).unwrap();
        assert_eq!(
            corners(&board, child),
            vec![(0.0, 200.0), (200.0, 200.0), (200.0, 300.0), (0.0, 300.0)]
        );
        assert_eq!(board.node(root).unwrap().children(), [child]);
        assert_eq!(board.node(child).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_siblings_shift_right_past_occupied_slots() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let first = board.add_child(root).unwrap();
        let second = board.add_child(root).unwrap();
        let third = board.add_child(root).unwrap();
        // the first child occupies [0, 200] at y = 200, so the next slot
        // starts at 210, the one after at 420
        assert_eq!(corners(&board, second)[0], (210.0, 200.0));
        assert_eq!(corners(&board, third)[0], (420.0, 200.0));
        let a = board.shape(first).unwrap();
        let b = board.shape(second).unwrap();
        let c = board.shape(third).unwrap();
        assert!(!a.intersects(b));
        assert!(!b.intersects(c));
        assert!(!a.intersects(c));
    }

    #[test]
    fn test_selection_is_exclusive() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let a = board.add_child(root).unwrap();
        let b = board.add_child(root).unwrap();
        board.select(a).unwrap();
        assert_eq!(board.selected(), Some(a));
        board.select(b).unwrap();
        assert_eq!(board.selected(), Some(b));
        assert!(!board.shape(a).unwrap().selected());
        assert_eq!(board.shapes().filter(|s| s.selected()).count(), 1);
    }

    #[test]
    fn test_selecting_twice_toggles_off() {
        // current behavior, kept on purpose: reselecting flips the flag
        // back off
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        board.select(root).unwrap();
        assert!(board.shape(root).unwrap().selected());
        board.select(root).unwrap();
        assert!(!board.shape(root).unwrap().selected());
        assert_eq!(board.selected(), None);
    }

    #[test]
    fn test_deselect_is_idempotent_and_always_announces() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let events = Rc::new(RefCell::new(0));
        let e = Rc::clone(&events);
        board
            .shape_mut(root)
            .unwrap()
            .selection_changed_mut()
            .subscribe(move |_| *e.borrow_mut() += 1);
        board.deselect(root).unwrap();
        board.deselect(root).unwrap();
        assert!(!board.shape(root).unwrap().selected());
        assert_eq!(*events.borrow(), 2);
    }

    #[test]
    fn test_move_updates_attached_connectors_before_returning() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_child(root).unwrap();
        let line = board.node(child).unwrap().lines()[0];

        let outline = translate_outline(
            board.shape(child).unwrap().vertices(),
            Vec2::new(300.0, 40.0),
        );
        board.move_shape(child, outline).unwrap();

        let c1 = board.shape(root).unwrap().center();
        let c2 = board.shape(child).unwrap().center();
        let expected = Connector::interpolate(c1.pos, c2.pos);
        let actual = board.shape(line).unwrap().vertices();
        assert_eq!(actual.len(), expected.len());
        for (got, want) in actual.iter().zip(&expected) {
            assert!((got.x() - want.x()).abs() < f64::EPSILON);
            assert!((got.y() - want.y()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_connector_announces_its_own_move_during_a_node_move() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_child(root).unwrap();
        let line = board.node(child).unwrap().lines()[0];
        let moves = Rc::new(RefCell::new(0));
        let m = Rc::clone(&moves);
        board
            .shape_mut(line)
            .unwrap()
            .moved_mut()
            .subscribe(move |_| *m.borrow_mut() += 1);

        let outline = translate_outline(
            board.shape(child).unwrap().vertices(),
            Vec2::new(0.0, 50.0),
        );
        board.move_shape(child, outline).unwrap();
        assert_eq!(*moves.borrow(), 1);
    }

    #[test]
    fn test_move_rejects_an_empty_outline() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        assert!(matches!(
            board.move_shape(root, Vec::new()),
            Err(BoardError::EmptyOutline)
        ));
        assert_eq!(board.shape(root).unwrap().vertices().len(), 4);
    }

    #[test]
    fn test_remove_node_cascades_through_the_subtree() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let keep = board.add_child(root).unwrap();
        let doomed = board.add_child(root).unwrap();
        let grandchild = board.add_child(doomed).unwrap();
        let doomed_lines = board.node(doomed).unwrap().lines().to_vec();
        assert_eq!(doomed_lines.len(), 2);

        board.remove_node(doomed);

        for id in [doomed, grandchild, doomed_lines[0], doomed_lines[1]] {
            assert!(!board.contains(id));
        }
        assert!(board.contains(root));
        assert!(board.contains(keep));
        assert_eq!(board.node(root).unwrap().children(), [keep]);
        assert_eq!(board.node(root).unwrap().lines().len(), 1);
        // root, the surviving child, and its connector
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_remove_shape_is_idempotent_but_still_announces() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let removals = Rc::new(RefCell::new(Vec::new()));
        let r = Rc::clone(&removals);
        board
            .shape_removed
            .subscribe(move |id: &ShapeId| r.borrow_mut().push(*id));
        board.remove_shape(root);
        board.remove_shape(root);
        assert_eq!(*removals.borrow(), vec![root, root]);
        assert!(board.is_empty());
    }

    #[test]
    fn test_shape_added_reports_node_and_connector() {
        let mut board = Board::new();
        let added = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&added);
        board
            .shape_added
            .subscribe(move |id: &ShapeId| a.borrow_mut().push(*id));
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_child(root).unwrap();
        let line = board.node(child).unwrap().lines()[0];
        assert_eq!(*added.borrow(), vec![root, child, line]);
    }

    #[test]
    fn test_shape_at_picks_topmost() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        assert_eq!(board.shape_at(Point::new(100.0, 50.0)), Some(root));
        assert_eq!(board.shape_at(Point::new(500.0, 500.0)), None);
        // a later node over the same spot wins the pick
        let over = board.add_node(None, None, None).unwrap();
        assert_eq!(board.shape_at(Point::new(100.0, 50.0)), Some(over));
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut board = Board::new();
        let ghost = Uuid::new_v4();
        assert!(matches!(
            board.select(ghost),
            Err(BoardError::ShapeNotFound(_))
        ));
        assert!(matches!(
            board.deselect(ghost),
            Err(BoardError::ShapeNotFound(_))
        ));
        assert!(matches!(
            board.add_child(ghost),
            Err(BoardError::ShapeNotFound(_))
        ));
        board.remove_node(ghost);
        assert!(board.is_empty());
    }

    #[test]
    fn test_add_child_rejects_a_connector_parent() {
        let mut board = Board::new();
        let root = board.add_node(None, None, None).unwrap();
        let child = board.add_child(root).unwrap();
        let line = board.node(child).unwrap().lines()[0];
        assert!(matches!(
            board.add_child(line),
            Err(BoardError::NotANode(_))
        ));
    }
}
