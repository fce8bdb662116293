//! Split-table persistence for the Person family
//!
//! Supertype-owned attributes (person id, name) live in the shared
//! `persons` slot; each subtype registry persists only its own attributes,
//! keyed by the same person id. Saving derives `persons` as the union over
//! all subtype registries; loading joins each subtype row with its
//! supertype row. A subtype row with no matching person row is a
//! join-integrity failure: that record is logged and skipped.

use std::collections::BTreeMap;

use crate::model::{Author, Employee, Record, Row};
use crate::observability::{Event, Logger};
use crate::registry::{LoadReport, Registry};
use crate::validation::Violation;

use super::{encode_collection, read_collection_or_seed, SlotStore, StorageResult};

/// Slot holding the supertype-owned rows of the Person family.
pub const PERSONS_SLOT: &str = "persons";

/// Writes the whole Person family: the subtype slots with supertype fields
/// stripped, and the `persons` slot as the union of the supertype-owned
/// fields over all subtype registries.
pub fn save_person_family(
    employees: &Registry<Employee>,
    authors: &Registry<Author>,
    store: &dyn SlotStore,
) -> StorageResult<()> {
    let mut persons: BTreeMap<String, Row> = BTreeMap::new();
    let mut employee_rows: BTreeMap<String, Row> = BTreeMap::new();
    for (key, employee) in employees.iter() {
        persons
            .entry(key.clone())
            .or_insert_with(|| employee.person_row());
        employee_rows.insert(key.clone(), employee.subtype_row());
    }
    let mut author_rows: BTreeMap<String, Row> = BTreeMap::new();
    for (key, author) in authors.iter() {
        persons
            .entry(key.clone())
            .or_insert_with(|| author.person_row());
        author_rows.insert(key.clone(), author.subtype_row());
    }

    store.write_slot(PERSONS_SLOT, &encode_collection(PERSONS_SLOT, &persons)?)?;
    Logger::info(
        Event::CollectionSaved,
        &[("slot", PERSONS_SLOT), ("count", &persons.len().to_string())],
    );
    store.write_slot(
        Employee::SLOT,
        &encode_collection(Employee::SLOT, &employee_rows)?,
    )?;
    Logger::info(
        Event::CollectionSaved,
        &[
            ("slot", Employee::SLOT),
            ("count", &employee_rows.len().to_string()),
        ],
    );
    store.write_slot(Author::SLOT, &encode_collection(Author::SLOT, &author_rows)?)?;
    Logger::info(
        Event::CollectionSaved,
        &[
            ("slot", Author::SLOT),
            ("count", &author_rows.len().to_string()),
        ],
    );
    Ok(())
}

/// Loads the whole Person family, joining each subtype row with its
/// supertype row by person id.
pub fn load_person_family(
    employees: &mut Registry<Employee>,
    authors: &mut Registry<Author>,
    store: &dyn SlotStore,
) -> StorageResult<(LoadReport, LoadReport)> {
    let persons = read_collection_or_seed(store, PERSONS_SLOT)?;
    let employee_report = load_joined(employees, &persons, store, Employee::from_joined)?;
    let author_report = load_joined(authors, &persons, store, Author::from_joined)?;
    Ok((employee_report, author_report))
}

fn load_joined<R, F>(
    registry: &mut Registry<R>,
    persons: &BTreeMap<String, Row>,
    store: &dyn SlotStore,
    join: F,
) -> StorageResult<LoadReport>
where
    R: Record,
    F: Fn(&Row, &Row) -> Result<R, Violation>,
{
    let rows = read_collection_or_seed(store, R::SLOT)?;
    let mut report = LoadReport::default();
    for (key, subtype_row) in rows {
        let person_row = match persons.get(&key) {
            Some(row) => row,
            None => {
                Logger::warn(Event::JoinFailed, &[("slot", R::SLOT), ("key", &key)]);
                report.skipped += 1;
                continue;
            }
        };
        match join(person_row, &subtype_row) {
            Ok(record) => {
                registry.restore(record);
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
