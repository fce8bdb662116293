//! The Author entity, the second member of the Person family
//!
//! Authors embed the Person supertype and add a mandatory biography. No
//! subtype dimension of their own; they exist mainly to exercise the shared
//! `persons` slot from more than one subtype registry.

use serde_json::{json, Value};

use super::person::PersonBase;
use super::{check_required_text, text_of, KeyLookup, Record, Row, Slots};
use crate::validation::{ValidationResult, Violation};

/// An author record: person base plus a biography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    base: PersonBase,
    biography: String,
}

impl Author {
    pub fn person_id(&self) -> u32 {
        self.base.person_id()
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn biography(&self) -> &str {
        &self.biography
    }

    pub fn check_biography(biography: Option<&Value>) -> ValidationResult {
        check_required_text(
            biography,
            "A biography must be provided!",
            "The biography must be a non-empty string!",
        )
    }

    pub fn set_name(&mut self, name: Option<&Value>) -> ValidationResult {
        self.base.set_name(name)
    }

    pub fn set_biography(&mut self, biography: Option<&Value>) -> ValidationResult {
        Self::check_biography(biography)?;
        if let Some(s) = text_of(biography) {
            self.biography = s.to_string();
        }
        Ok(())
    }

    /// The subtype-owned row persisted in the `authors` slot.
    pub fn subtype_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("biography".into(), json!(self.biography));
        row
    }

    /// The supertype-owned row persisted in the shared `persons` slot.
    pub fn person_row(&self) -> Row {
        self.base.person_row()
    }

    /// Reconstructs an author by joining its subtype row with the matching
    /// supertype row.
    pub fn from_joined(person_row: &Row, subtype_row: &Row) -> Result<Self, Violation> {
        let mut merged = subtype_row.clone();
        if let Some(id) = person_row.get("personId") {
            merged.insert("personId".into(), id.clone());
        }
        if let Some(name) = person_row.get("name") {
            merged.insert("name".into(), name.clone());
        }
        Self::from_row(&merged)
    }
}

impl Record for Author {
    const SLOT: &'static str = "authors";
    const ENTITY: &'static str = "author";

    fn from_slots(slots: &Slots, keys: &dyn KeyLookup) -> Result<Self, Violation> {
        let base = PersonBase::from_slots(slots, Self::ENTITY, keys)?;
        Self::check_biography(slots.get("biography"))?;
        let biography = text_of(slots.get("biography")).unwrap_or("").to_string();
        Ok(Author { base, biography })
    }

    fn update_from_slots(&mut self, slots: &Slots) -> Result<Vec<&'static str>, Violation> {
        let mut changed = Vec::new();
        if self.base.update_name(slots)? {
            changed.push("name");
        }
        if let Some(v) = slots.get("biography") {
            if text_of(Some(v)) != Some(self.biography.as_str()) {
                self.set_biography(Some(v))?;
                changed.push("biography");
            }
        }
        Ok(changed)
    }

    fn key(&self) -> String {
        self.base.key()
    }

    fn key_slot(slots: &Slots) -> Option<String> {
        PersonBase::key_slot(slots)
    }

    fn to_row(&self) -> Row {
        let mut row = self.base.person_row();
        row.insert("biography".into(), json!(self.biography));
        row
    }

    fn describe(&self) -> String {
        format!(
            "Author{{ persID: {}, name: {}, biography: {} }}",
            self.person_id(),
            self.name(),
            self.biography
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoKeys;
    use serde_json::json;

    fn slots(v: Value) -> Slots {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn biography_is_mandatory() {
        let missing = slots(json!({ "personId": 2001, "name": "Douglas Hofstadter" }));
        assert!(matches!(
            Author::from_slots(&missing, &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));
        let ok = slots(json!({
            "personId": 2001, "name": "Douglas Hofstadter",
            "biography": "Cognitive scientist and author."
        }));
        let author = Author::from_slots(&ok, &NoKeys).unwrap();
        assert_eq!(author.key(), "2001");
    }

    #[test]
    fn join_round_trip() {
        let ok = slots(json!({
            "personId": 2001, "name": "Douglas Hofstadter",
            "biography": "Cognitive scientist and author."
        }));
        let author = Author::from_slots(&ok, &NoKeys).unwrap();
        let joined = Author::from_joined(&author.person_row(), &author.subtype_row()).unwrap();
        assert_eq!(joined, author);
    }
}
