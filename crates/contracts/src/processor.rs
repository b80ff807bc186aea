//! GestureProcessor trait - polled by the dispatch loop once per tick

use crate::GestureMessage;

/// Gesture decision unit
///
/// Cycles `Idle -> Ready -> Idle`: `run` reports readiness, `next_action`
/// consumes it. Neither call may fail; a processor whose device never sent
/// data simply stays idle.
pub trait GestureProcessor: Send {
    /// Processor name (used for logging)
    fn name(&self) -> &str;

    /// True iff new data arrived since the last emission and the decision
    /// predicate holds.
    fn run(&mut self) -> bool;

    /// Build the outbound message from the current state and mark it sent.
    ///
    /// Returns `None` when the predicate no longer holds.
    fn next_action(&mut self) -> Option<GestureMessage>;

    /// Last emitted message, if any
    fn last_action(&self) -> Option<&GestureMessage>;
}
