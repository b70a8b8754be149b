//! Tree export into a plain nested record.

use crate::board::{Board, BoardError, BoardResult};
use crate::shapes::{Operator, ShapeId};
use serde::{Deserialize, Serialize};

/// Plain nested record describing a node subtree.
///
/// JSON-representable; internal nodes carry a `children` list, leaves omit
/// the field entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub operator: Option<Operator>,
    pub id: ShapeId,
    pub value: Option<f64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeRecord>>,
}

impl TreeRecord {
    /// Render the record as pretty-printed JSON.
    pub fn to_json(&self) -> BoardResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BoardError::Serialization(e.to_string()))
    }
}

/// Export the subtree rooted at `id`.
///
/// A pure read: nothing on the board changes, and only the node and its
/// descendants are visited.
pub fn serialize(board: &Board, id: ShapeId) -> BoardResult<TreeRecord> {
    let node = board.node(id)?;
    let children = if node.children().is_empty() {
        None
    } else {
        Some(
            node.children()
                .iter()
                .map(|&child| serialize(board, child))
                .collect::<BoardResult<Vec<_>>>()?,
        )
    };
    Ok(TreeRecord {
        operator: node.operator,
        id: node.id(),
        value: node.value,
        name: node.name.clone(),
        children,
    })
}
