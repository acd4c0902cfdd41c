//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate that is rebuilt by replaying its event stream.
///
/// `apply` must be a pure state transition: replaying the same stream twice
/// yields the same aggregate.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the stream identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Applies a persisted event during reconstitution.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events produced by command handling that are not yet stored.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);
}
