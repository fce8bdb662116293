//! Entity model with segmented single-table inheritance
//!
//! Each entity family lives in its own module: attribute check functions,
//! setters, and the flat-row mapping used by bulk persistence. Subtype
//! segments are closed sum types, so "which fields are legal" is enforced by
//! the type system; the runtime checks only guard the boundary where raw
//! slot values enter.

pub mod author;
pub mod book;
pub mod employee;
pub mod movie;
pub mod person;

pub use author::Author;
pub use book::{Book, BookExtra, BookSubtype};
pub use employee::{Employee, EmployeeRole, EmployeeSubtype};
pub use movie::Movie;
pub use person::PersonBase;

use serde_json::Value;

use crate::validation::{ValidationResult, Violation};

/// Raw field values supplied by the embedder, keyed by attribute name.
///
/// Values arrive as JSON since the collaborating UI layer works with form
/// input; the checks decide what is admissible, never the carrier type.
pub type Slots = serde_json::Map<String, Value>;

/// Flat serialized form of an entity as persisted in a storage slot.
pub type Row = serde_json::Map<String, Value>;

/// Key occupancy test against an instance registry.
///
/// The as-id checks take this instead of a concrete registry so they work
/// both inside `create` and standalone during live form validation.
pub trait KeyLookup {
    fn is_taken(&self, key: &str) -> bool;
}

/// Lookup with no live keys, for deserialization and standalone checks.
pub struct NoKeys;

impl KeyLookup for NoKeys {
    fn is_taken(&self, _key: &str) -> bool {
        false
    }
}

/// A fixed enumeration of named integer codes.
///
/// Codes are contiguous in `[1, MAX]`; code 0 or an absent value means
/// "no subtype assigned" (the segmentations are incomplete).
pub trait CodeList: Sized + Copy {
    const MAX: u8;
    const NAMES: &'static [&'static str];

    fn from_code(code: u8) -> Option<Self>;
    fn code(self) -> u8;

    fn name(self) -> &'static str {
        Self::NAMES[(self.code() - 1) as usize]
    }
}

/// An entity type managed by a [`crate::registry::Registry`].
pub trait Record: Clone {
    /// Storage slot holding this entity type's collection.
    const SLOT: &'static str;
    /// Display name used in log lines and error messages.
    const ENTITY: &'static str;

    /// Full-record construction: every slot is routed through its check in
    /// dependency order (base attributes, discriminator, then segment
    /// attributes). Any violation aborts construction.
    fn from_slots(slots: &Slots, keys: &dyn KeyLookup) -> Result<Self, Violation>;

    /// Applies the updatable attributes present in `slots` through the
    /// setters, returning the names of the attributes that changed. The
    /// caller provides transaction semantics (clone, apply, swap).
    fn update_from_slots(&mut self, slots: &Slots) -> Result<Vec<&'static str>, Violation>;

    /// Primary key of this record, string-normalized.
    fn key(&self) -> String;

    /// Primary key extracted from raw slots, string-normalized the same way
    /// as [`Record::key`] so lookups match.
    fn key_slot(slots: &Slots) -> Option<String>;

    /// Shallow structural copy into the flat row form. No validation.
    fn to_row(&self) -> Row;

    /// Full-record construction from a stored row.
    fn from_row(row: &Row) -> Result<Self, Violation> {
        Self::from_slots(row, &NoKeys)
    }

    /// One-line rendering used by outcome log messages.
    fn describe(&self) -> String;
}

/// Whether a candidate counts as "no value supplied": absent, null, the
/// empty string, or the number zero.
pub(crate) fn is_missing(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_i64() == Some(0) || n.as_u64() == Some(0),
        _ => false,
    }
}

/// The candidate as a string, if it is one.
pub(crate) fn text_of(v: Option<&Value>) -> Option<&str> {
    match v {
        Some(Value::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// The candidate as an integer: a JSON integer, or a string holding one.
pub(crate) fn int_of(v: Option<&Value>) -> Option<i64> {
    match v {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Mandatory non-empty string rule shared by name-like attributes.
pub(crate) fn check_required_text(v: Option<&Value>, missing_msg: &str, malformed_msg: &str) -> ValidationResult {
    if is_missing(v) {
        return Err(Violation::MandatoryValue(missing_msg.to_string()));
    }
    match text_of(v) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(Violation::Range(malformed_msg.to_string())),
    }
}

/// Optional string rule: absent is fine, present must be a non-blank string.
pub(crate) fn check_optional_text(v: Option<&Value>, malformed_msg: &str) -> ValidationResult {
    if is_missing(v) {
        return Ok(());
    }
    match text_of(v) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(Violation::Range(malformed_msg.to_string())),
    }
}
