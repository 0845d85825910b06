//! Lifecycle actions for the Order actor.

use crate::model::OrderLine;

/// Custom actions for Order entities. Every action answers with the order as it stands
/// after the action.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Appends a validated line. Requires a pending order.
    AddLine(OrderLine),
    /// Removes the line at the given 0-based index.
    RemoveLine(usize),
    /// Takes units off a line, dropping the line once nothing is left.
    ReduceLine { index: usize, units: i64 },
    /// Decrements stock for every line in one catalog transaction, then commits.
    Confirm,
    Cancel,
}
