//! Observable events emitted by the model layer
//!
//! Events are explicit and typed; every registry operation and bulk
//! persistence pass logs exactly one of these per outcome.

use std::fmt;

/// Observable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A record passed construction and entered its registry.
    RecordCreated,
    /// An update transaction committed with at least one changed attribute.
    RecordUpdated,
    /// An update transaction committed without changing anything.
    NoChanges,
    /// A record was removed from its registry.
    RecordDeleted,
    /// A destroy targeted a key with no live record.
    RecordMissing,
    /// A candidate record was discarded because a check failed.
    RecordRejected,
    /// A stored row failed construction during bulk load and was skipped.
    RowRejected,
    /// A subtype row had no matching supertype row during a split-load join.
    JoinFailed,
    /// A whole collection was read from its storage slot.
    CollectionLoaded,
    /// A whole collection was written to its storage slot.
    CollectionSaved,
    /// A storage slot was reset to an empty collection.
    SlotCleared,
}

impl Event {
    /// Stable event name used as the log line's event field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::NoChanges => "NO_CHANGES",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordMissing => "RECORD_MISSING",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RowRejected => "ROW_REJECTED",
            Event::JoinFailed => "JOIN_FAILED",
            Event::CollectionLoaded => "COLLECTION_LOADED",
            Event::CollectionSaved => "COLLECTION_SAVED",
            Event::SlotCleared => "SLOT_CLEARED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
