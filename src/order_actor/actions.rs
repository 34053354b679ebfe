use crate::domain::OrderStatus;

/// Custom actions for Order entities.
///
/// Orders are never edited or deleted; vendors only move them forward.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to the next status.
    Advance,
    /// Jumps forward to the given status.
    ///
    /// # Errors
    /// Fails if the target is not strictly after the current status.
    AdvanceTo(OrderStatus),
}
