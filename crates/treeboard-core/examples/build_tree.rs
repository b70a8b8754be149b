//! Builds a small comparison tree through the board API, moves a node to
//! show connectors following it, and prints the exported record as JSON.
//!
//! Run with `RUST_LOG=debug` to watch the board's lifecycle logging.

use kurbo::Vec2;
use treeboard_core::{serialize, translate_outline, Board, Operator, Shape};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut board = Board::new();
    board
        .shape_added
        .subscribe(|id| log::info!("shape added: {id}"));
    board
        .shape_removed
        .subscribe(|id| log::info!("shape removed: {id}"));

    let root = board.add_node(Some(Operator::Less), Some(10.0), None)?;
    let left = board.add_child(root)?;
    let right = board.add_child(root)?;
    let grandchild = board.add_child(left)?;

    if let Some(node) = board.shape_mut(left).and_then(Shape::as_node_mut) {
        node.operator = Some(Operator::GreaterEqual);
        node.value = Some(3.5);
    }
    if let Some(node) = board.shape_mut(right).and_then(Shape::as_node_mut) {
        node.operator = Some(Operator::Equal);
        node.value = Some(7.0);
    }

    board.select(right)?;
    println!(
        "selected: {}",
        board
            .selected()
            .and_then(|id| board.shape(id).map(|s| s.name().to_string()))
            .unwrap_or_default()
    );

    // Drag the left child; its two connectors re-interpolate before
    // move_shape returns.
    let dragged = translate_outline(
        board.shape(left).ok_or("left child missing")?.vertices(),
        Vec2::new(-120.0, 30.0),
    );
    board.move_shape(left, dragged)?;

    board.remove_node(grandchild);

    let record = serialize(&board, root)?;
    println!("{}", record.to_json()?);
    Ok(())
}
