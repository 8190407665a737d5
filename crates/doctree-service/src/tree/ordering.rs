//! Fractional sibling ordering.
//!
//! Siblings carry an `f64` `sort_order`. Placing a node between two
//! neighbours takes their midpoint, so a reorder touches exactly one row.
//! Repeated inserts at the same boundary eventually exhaust float precision;
//! the startup sweep renumbers groups where collisions appear.

use thiserror::Error;

use doctree_entity::node::{Node, Placement};

/// The reference node is not among the siblings being ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("reference node {0} is not a sibling")]
pub struct ReferenceNotSibling(pub i64);

/// A sibling's identity and position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiblingSlot {
    pub id: i64,
    pub sort_order: f64,
}

impl SiblingSlot {
    pub fn new(id: i64, sort_order: f64) -> Self {
        Self { id, sort_order }
    }
}

impl From<&Node> for SiblingSlot {
    fn from(node: &Node) -> Self {
        Self::new(node.id, node.sort_order)
    }
}

/// Siblings in `(sort_order, id)` order, without `exclude_id`.
fn ordered(siblings: &[SiblingSlot], exclude_id: Option<i64>) -> Vec<SiblingSlot> {
    let mut slots: Vec<SiblingSlot> = siblings
        .iter()
        .copied()
        .filter(|s| Some(s.id) != exclude_id)
        .collect();
    slots.sort_by(|a, b| a.sort_order.total_cmp(&b.sort_order).then(a.id.cmp(&b.id)));
    slots
}

/// One past a maximum sort order, or `1.0` when there is none.
pub fn next_after(max: Option<f64>) -> f64 {
    max.map_or(1.0, |m| m + 1.0)
}

/// Sort order placing a node after every sibling.
pub fn at_end(siblings: &[SiblingSlot]) -> f64 {
    next_after(siblings.iter().map(|s| s.sort_order).reduce(f64::max))
}

/// Sort order placing a node immediately before `reference_id`.
pub fn before_reference(
    siblings: &[SiblingSlot],
    reference_id: i64,
    exclude_id: Option<i64>,
) -> Result<f64, ReferenceNotSibling> {
    let slots = ordered(siblings, exclude_id);
    let index = slots
        .iter()
        .position(|s| s.id == reference_id)
        .ok_or(ReferenceNotSibling(reference_id))?;
    let reference = slots[index].sort_order;

    if index == 0 {
        let half = reference / 2.0;
        // Halving zero or a negative value would not move below it.
        return Ok(if half > 0.0 { half } else { reference - 1.0 });
    }
    Ok(midpoint(slots[index - 1].sort_order, reference))
}

/// Sort order placing a node immediately after `reference_id`.
pub fn after_reference(
    siblings: &[SiblingSlot],
    reference_id: i64,
    exclude_id: Option<i64>,
) -> Result<f64, ReferenceNotSibling> {
    let slots = ordered(siblings, exclude_id);
    let index = slots
        .iter()
        .position(|s| s.id == reference_id)
        .ok_or(ReferenceNotSibling(reference_id))?;
    let reference = slots[index].sort_order;

    match slots.get(index + 1) {
        Some(next) => Ok(midpoint(reference, next.sort_order)),
        None => Ok(reference + 1.0),
    }
}

/// Sort order for `node_id` at `placement` among `siblings`.
///
/// `siblings` may include the node itself; it is ignored.
pub fn position_for(
    siblings: &[SiblingSlot],
    node_id: i64,
    placement: Placement,
) -> Result<f64, ReferenceNotSibling> {
    match placement {
        Placement::End => Ok(at_end(&ordered(siblings, Some(node_id)))),
        Placement::Before(reference_id) => before_reference(siblings, reference_id, Some(node_id)),
        Placement::After(reference_id) => after_reference(siblings, reference_id, Some(node_id)),
    }
}

/// Whether `node_id` already sits where `placement` asks for, in which case
/// a reorder has nothing to write.
pub fn is_already_at_position(siblings: &[SiblingSlot], node_id: i64, placement: Placement) -> bool {
    let slots = ordered(siblings, None);
    let Some(index) = slots.iter().position(|s| s.id == node_id) else {
        return false;
    };
    let index_of = |id: i64| slots.iter().position(|s| s.id == id);

    match placement {
        Placement::End => index + 1 == slots.len(),
        Placement::Before(reference_id) => index_of(reference_id) == Some(index + 1),
        Placement::After(reference_id) => {
            index_of(reference_id).is_some_and(|r| r + 1 == index)
        }
    }
}

fn midpoint(low: f64, high: f64) -> f64 {
    low + (high - low) / 2.0
}
