//! Instance registries: one in-memory key-to-record map per entity type
//!
//! The registry is the unit of "the current database". Create and update
//! follow a snapshot discipline: every requested change is applied to a
//! working copy which replaces the live entry only if all checks pass, so
//! no reader ever observes a partially updated record.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::model::{KeyLookup, Record, Row, Slots};
use crate::observability::{Event, Logger};
use crate::storage::{encode_collection, read_collection_or_seed, SlotStore, StorageResult};
use crate::validation::Violation;

/// Errors surfaced by registry operations beyond plain violations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The slots carry no primary key; the caller composed a bad request.
    #[error("the slots carry no {entity} key")]
    MissingKey { entity: &'static str },

    /// Update targeted a key with no live record; a caller precondition, not
    /// a validated state.
    #[error("no {entity} record with key '{key}'")]
    NotFound { entity: &'static str, key: String },

    #[error(transparent)]
    Violation(#[from] Violation),
}

/// Result of a committed update transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one attribute changed; the names are listed.
    Changed(Vec<&'static str>),
    /// Every requested value matched the current state.
    Unchanged,
}

/// Result of a destroy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Removed,
    /// Missing keys are reported, not raised: destroying a record that is
    /// already gone is not fatal.
    Missing,
}

/// Outcome counts of one bulk load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// In-memory mapping from primary key to live record for one entity type.
pub struct Registry<R: Record> {
    entries: BTreeMap<String, R>,
}

impl<R: Record> Default for Registry<R> {
    fn default() -> Self {
        Registry {
            entries: BTreeMap::new(),
        }
    }
}

impl<R: Record> KeyLookup for Registry<R> {
    fn is_taken(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<R: Record> Registry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &R)> {
        self.entries.iter()
    }

    /// Constructs a record from raw slots and inserts it. Any violation
    /// discards the candidate and leaves the registry untouched.
    pub fn create(&mut self, slots: &Slots) -> Result<&R, Violation> {
        let keys: &dyn KeyLookup = &*self;
        let record = match R::from_slots(slots, keys) {
            Ok(record) => record,
            Err(v) => {
                Logger::warn(
                    Event::RecordRejected,
                    &[
                        ("entity", R::ENTITY),
                        ("violation", v.kind()),
                        ("message", v.message()),
                    ],
                );
                return Err(v);
            }
        };
        let key = record.key();
        if self.entries.contains_key(&key) {
            let v = Violation::Uniqueness(format!(
                "There is already a {} record with key '{key}'!",
                R::ENTITY
            ));
            Logger::warn(
                Event::RecordRejected,
                &[
                    ("entity", R::ENTITY),
                    ("violation", v.kind()),
                    ("message", v.message()),
                ],
            );
            return Err(v);
        }
        Logger::info(Event::RecordCreated, &[("record", &record.describe())]);
        Ok(self.entries.entry(key).or_insert(record))
    }

    /// Applies the updatable attributes in `slots` to the record keyed by
    /// the slots' primary key. All-or-nothing: the live entry is replaced
    /// only if every requested change validates.
    pub fn update(&mut self, slots: &Slots) -> Result<UpdateOutcome, RegistryError> {
        let key = R::key_slot(slots).ok_or(RegistryError::MissingKey { entity: R::ENTITY })?;
        let current = match self.entries.get(&key) {
            Some(record) => record,
            None => {
                Logger::error(
                    Event::RecordMissing,
                    &[("entity", R::ENTITY), ("key", &key)],
                );
                return Err(RegistryError::NotFound {
                    entity: R::ENTITY,
                    key,
                });
            }
        };
        let mut working = current.clone();
        match working.update_from_slots(slots) {
            Ok(properties) if properties.is_empty() => {
                Logger::info(Event::NoChanges, &[("record", &working.describe())]);
                Ok(UpdateOutcome::Unchanged)
            }
            Ok(properties) => {
                let description = working.describe();
                self.entries.insert(key, working);
                Logger::info(
                    Event::RecordUpdated,
                    &[
                        ("record", &description),
                        ("properties", &properties.join(",")),
                    ],
                );
                Ok(UpdateOutcome::Changed(properties))
            }
            Err(v) => {
                Logger::warn(
                    Event::RecordRejected,
                    &[
                        ("entity", R::ENTITY),
                        ("key", &key),
                        ("violation", v.kind()),
                        ("message", v.message()),
                    ],
                );
                Err(v.into())
            }
        }
    }

    /// Removes the record keyed by `key` if present.
    pub fn destroy(&mut self, key: &str) -> DestroyOutcome {
        match self.entries.remove(key) {
            Some(record) => {
                Logger::info(Event::RecordDeleted, &[("record", &record.describe())]);
                DestroyOutcome::Removed
            }
            None => {
                Logger::warn(Event::RecordMissing, &[("entity", R::ENTITY), ("key", key)]);
                DestroyOutcome::Missing
            }
        }
    }

    /// Inserts an already-validated record, last write wins. Used by the
    /// bulk loaders.
    pub(crate) fn restore(&mut self, record: R) {
        self.entries.insert(record.key(), record);
    }

    /// Reads this entity type's whole collection from its storage slot and
    /// populates the registry. A row that fails construction is logged and
    /// skipped; it never aborts the rest of the load. An absent slot is
    /// seeded with an empty collection.
    pub fn load_all(&mut self, store: &dyn SlotStore) -> StorageResult<LoadReport> {
        let rows = read_collection_or_seed(store, R::SLOT)?;
        let mut report = LoadReport::default();
        for (key, row) in rows {
            match R::from_row(&row) {
                Ok(record) => {
                    self.restore(record);
                    report.loaded += 1;
                }
                Err(v) => {
                    Logger::warn(
                        Event::RowRejected,
                        &[
                            ("slot", R::SLOT),
                            ("key", &key),
                            ("violation", v.kind()),
                            ("message", v.message()),
                        ],
                    );
                    report.skipped += 1;
                }
            }
        }
        Logger::info(
            Event::CollectionLoaded,
            &[("slot", R::SLOT), ("count", &report.loaded.to_string())],
        );
        Ok(report)
    }

    /// Serializes every live record to its flat row and writes the whole
    /// collection back in one operation.
    pub fn save_all(&self, store: &dyn SlotStore) -> StorageResult<()> {
        let mut rows: BTreeMap<String, Row> = BTreeMap::new();
        for (key, record) in &self.entries {
            rows.insert(key.clone(), record.to_row());
        }
        store.write_slot(R::SLOT, &encode_collection(R::SLOT, &rows)?)?;
        Logger::info(
            Event::CollectionSaved,
            &[("slot", R::SLOT), ("count", &rows.len().to_string())],
        );
        Ok(())
    }

    /// Resets this entity type's storage slot to an empty collection.
    pub fn clear_slot(store: &dyn SlotStore) -> StorageResult<()> {
        store.write_slot(R::SLOT, "{}")?;
        Logger::info(Event::SlotCleared, &[("slot", R::SLOT)]);
        Ok(())
    }
}
