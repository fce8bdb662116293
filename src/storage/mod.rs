//! Whole-collection persistence against named storage slots
//!
//! Each entity type owns one slot holding the JSON mapping from primary-key
//! string to flat row. Loads and saves are whole-slot operations; the
//! Person family additionally splits supertype and subtype attributes
//! across slots (see [`split`]).

mod errors;
mod slot;
pub mod split;

pub use errors::{StorageError, StorageResult};
pub use slot::{FileSlotStore, MemorySlotStore, SlotStore};

use std::collections::BTreeMap;

use crate::model::Row;

/// Decodes a slot payload into its key-to-row collection.
pub(crate) fn decode_collection(slot: &str, payload: &str) -> StorageResult<BTreeMap<String, Row>> {
    serde_json::from_str(payload).map_err(|e| StorageError::MalformedSlot {
        slot: slot.to_string(),
        source: e,
    })
}

/// Encodes a key-to-row collection into a slot payload. Keys serialize in
/// sorted order, so equal collections produce equal payloads.
pub(crate) fn encode_collection(slot: &str, rows: &BTreeMap<String, Row>) -> StorageResult<String> {
    serde_json::to_string(rows).map_err(|e| StorageError::EncodeFailed {
        slot: slot.to_string(),
        source: e,
    })
}

/// Reads a slot's collection, seeding an absent slot with an empty one.
pub(crate) fn read_collection_or_seed(
    store: &dyn SlotStore,
    slot: &str,
) -> StorageResult<BTreeMap<String, Row>> {
    match store.read_slot(slot)? {
        Some(payload) => decode_collection(slot, &payload),
        None => {
            store.write_slot(slot, "{}")?;
            Ok(BTreeMap::new())
        }
    }
}
