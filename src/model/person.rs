//! Supertype attributes of the Person family
//!
//! Employee and Author embed [`PersonBase`]; persistence splits these
//! supertype-owned attributes into the shared `persons` slot (see
//! `storage::split`). Registry keys are the canonical decimal string of the
//! person id, so numeric and string-typed id slots land on the same key.

use serde_json::{json, Value};

use super::{check_required_text, int_of, text_of, KeyLookup, Row, Slots};
use crate::validation::{ValidationResult, Violation};

/// Supertype-owned attributes: identity and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonBase {
    person_id: u32,
    name: String,
}

/// Syntax check for person ids: absent is admissible, anything present must
/// parse as a positive integer.
pub fn check_person_id(id: Option<&Value>) -> ValidationResult {
    if id.is_none() {
        return Ok(());
    }
    match int_of(id) {
        Some(n) if n >= 1 => Ok(()),
        _ => Err(Violation::Range(
            "The person ID must be a positive integer!".into(),
        )),
    }
}

fn person_id_as_id(
    id: Option<&Value>,
    entity: &str,
    keys: &dyn KeyLookup,
) -> Result<u32, Violation> {
    let n = match int_of(id) {
        Some(n) => n,
        None => {
            return Err(Violation::MandatoryValue(
                "A value for the person ID is required!".into(),
            ))
        }
    };
    if n < 1 || u32::try_from(n).is_err() {
        return Err(Violation::Range(
            "The person ID must be a positive integer!".into(),
        ));
    }
    if keys.is_taken(&n.to_string()) {
        return Err(Violation::Uniqueness(format!(
            "There is already a {entity} record with this person ID!"
        )));
    }
    Ok(n as u32)
}

/// Identity check for person ids against the registry of the concrete
/// subtype (`entity` names it in the violation message).
pub fn check_person_id_as_id(
    id: Option<&Value>,
    entity: &str,
    keys: &dyn KeyLookup,
) -> ValidationResult {
    person_id_as_id(id, entity, keys).map(|_| ())
}

pub fn check_name(name: Option<&Value>) -> ValidationResult {
    check_required_text(
        name,
        "A name must be provided!",
        "The name must be a non-empty string!",
    )
}

impl PersonBase {
    /// Constructs the supertype segment from raw slots, validating the
    /// person id as an identity against `keys`.
    pub fn from_slots(slots: &Slots, entity: &str, keys: &dyn KeyLookup) -> Result<Self, Violation> {
        let person_id = person_id_as_id(slots.get("personId"), entity, keys)?;
        check_name(slots.get("name"))?;
        let name = text_of(slots.get("name")).unwrap_or("").to_string();
        Ok(PersonBase { person_id, name })
    }

    pub fn person_id(&self) -> u32 {
        self.person_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: Option<&Value>) -> ValidationResult {
        check_name(name)?;
        if let Some(s) = text_of(name) {
            self.name = s.to_string();
        }
        Ok(())
    }

    /// Canonical registry key: the decimal rendering of the person id.
    pub fn key(&self) -> String {
        self.person_id.to_string()
    }

    /// Key extraction from raw slots, normalized like [`PersonBase::key`].
    pub fn key_slot(slots: &Slots) -> Option<String> {
        int_of(slots.get("personId")).map(|n| n.to_string())
    }

    /// The supertype-owned row persisted in the `persons` slot.
    pub fn person_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("personId".into(), json!(self.person_id));
        row.insert("name".into(), json!(self.name));
        row
    }

    /// Checks whether `slots` updates the name, applying it if so.
    pub(crate) fn update_name(&mut self, slots: &Slots) -> Result<bool, Violation> {
        if let Some(v) = slots.get("name") {
            if text_of(Some(v)) != Some(self.name.as_str()) {
                self.set_name(Some(v))?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
