//! Split-table persistence tests for the Person family
//!
//! - The `persons` slot is derived as the union of supertype-owned fields
//!   over all subtype registries.
//! - Subtype slots carry subtype-owned fields only.
//! - Loading joins subtype rows with their supertype rows by person id; an
//!   orphaned subtype row is skipped, not fatal.

use catalogdb::model::{Author, Employee, Slots};
use catalogdb::storage::split::{load_person_family, save_person_family, PERSONS_SLOT};
use catalogdb::storage::{MemorySlotStore, SlotStore};
use catalogdb::Registry;
use serde_json::{json, Value};

// =============================================================================
// Test Utilities
// =============================================================================

fn slots(v: Value) -> Slots {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected an object"),
    }
}

fn seeded_family() -> (Registry<Employee>, Registry<Author>) {
    let mut employees: Registry<Employee> = Registry::new();
    employees
        .create(&slots(json!({
            "personId": 1001, "name": "Harry Wagner", "empNo": 21328,
            "subtype": 1, "department": "Engineering"
        })))
        .unwrap();
    employees
        .create(&slots(json!({
            "personId": 1002, "name": "Peter Boss", "empNo": 23509
        })))
        .unwrap();

    let mut authors: Registry<Author> = Registry::new();
    authors
        .create(&slots(json!({
            "personId": 2001, "name": "Douglas Hofstadter",
            "biography": "Cognitive scientist and author."
        })))
        .unwrap();
    (employees, authors)
}

fn collection(store: &MemorySlotStore, slot: &str) -> serde_json::Map<String, Value> {
    let payload = store.read_slot(slot).unwrap().expect("slot must exist");
    match serde_json::from_str(&payload).unwrap() {
        Value::Object(m) => m,
        _ => panic!("slot payload must be an object"),
    }
}

// =============================================================================
// Save: Split
// =============================================================================

#[test]
fn persons_slot_is_the_union_of_supertype_fields() {
    let store = MemorySlotStore::new();
    let (employees, authors) = seeded_family();
    save_person_family(&employees, &authors, &store).unwrap();

    let persons = collection(&store, PERSONS_SLOT);
    assert_eq!(persons.len(), 3);
    assert_eq!(
        persons.get("1001"),
        Some(&json!({ "personId": 1001, "name": "Harry Wagner" }))
    );
    assert_eq!(
        persons.get("2001"),
        Some(&json!({ "personId": 2001, "name": "Douglas Hofstadter" }))
    );
}

#[test]
fn subtype_slots_strip_supertype_fields() {
    let store = MemorySlotStore::new();
    let (employees, authors) = seeded_family();
    save_person_family(&employees, &authors, &store).unwrap();

    let employee_rows = collection(&store, "employees");
    assert_eq!(
        employee_rows.get("1001"),
        Some(&json!({ "empNo": 21328, "subtype": 1, "department": "Engineering" }))
    );
    assert_eq!(employee_rows.get("1002"), Some(&json!({ "empNo": 23509 })));

    let author_rows = collection(&store, "authors");
    assert_eq!(
        author_rows.get("2001"),
        Some(&json!({ "biography": "Cognitive scientist and author." }))
    );
}

// =============================================================================
// Load: Join
// =============================================================================

#[test]
fn load_joins_subtype_rows_with_their_person_rows() {
    let store = MemorySlotStore::new();
    let (employees, authors) = seeded_family();
    save_person_family(&employees, &authors, &store).unwrap();

    let mut employees_reloaded: Registry<Employee> = Registry::new();
    let mut authors_reloaded: Registry<Author> = Registry::new();
    let (employee_report, author_report) =
        load_person_family(&mut employees_reloaded, &mut authors_reloaded, &store).unwrap();

    assert_eq!(employee_report.loaded, 2);
    assert_eq!(author_report.loaded, 1);
    for (key, employee) in employees.iter() {
        assert_eq!(employees_reloaded.get(key), Some(employee));
    }
    for (key, author) in authors.iter() {
        assert_eq!(authors_reloaded.get(key), Some(author));
    }
    // the name came back through the join
    assert_eq!(
        employees_reloaded.get("1001").unwrap().name(),
        "Harry Wagner"
    );
}

#[test]
fn an_orphaned_subtype_row_is_skipped() {
    let store = MemorySlotStore::new();
    store.write_slot(PERSONS_SLOT, "{}").unwrap();
    store
        .write_slot("employees", &json!({ "9": { "empNo": 1 } }).to_string())
        .unwrap();
    store.write_slot("authors", "{}").unwrap();

    let mut employees: Registry<Employee> = Registry::new();
    let mut authors: Registry<Author> = Registry::new();
    let (employee_report, author_report) =
        load_person_family(&mut employees, &mut authors, &store).unwrap();

    assert_eq!(employee_report.loaded, 0);
    assert_eq!(employee_report.skipped, 1);
    assert_eq!(author_report.loaded, 0);
    assert!(employees.is_empty());
}

#[test]
fn a_person_in_two_subtype_registries_appears_once_in_persons() {
    let store = MemorySlotStore::new();
    let mut employees: Registry<Employee> = Registry::new();
    employees
        .create(&slots(json!({
            "personId": 3001, "name": "Gerd Wagner", "empNo": 10001
        })))
        .unwrap();
    let mut authors: Registry<Author> = Registry::new();
    authors
        .create(&slots(json!({
            "personId": 3001, "name": "Gerd Wagner",
            "biography": "Teaches internet technology."
        })))
        .unwrap();
    save_person_family(&employees, &authors, &store).unwrap();

    let persons = collection(&store, PERSONS_SLOT);
    assert_eq!(persons.len(), 1);
    assert_eq!(
        persons.get("3001"),
        Some(&json!({ "personId": 3001, "name": "Gerd Wagner" }))
    );
}
