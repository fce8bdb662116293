//! The Movie entity
//!
//! Title-keyed, no subtype segmentation. The descriptive attributes are
//! free-form; only the title carries identity constraints and the release
//! year must parse as an integer when supplied. Field names are the
//! canonical set (`poster`, `released`) rather than the drifting aliases
//! the legacy data used.

use serde_json::{json, Value};

use super::{check_optional_text, check_required_text, int_of, is_missing, text_of, KeyLookup, Record, Row, Slots};
use crate::validation::{ValidationResult, Violation};

/// A movie record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    title: String,
    genre: Option<String>,
    summary: Option<String>,
    director: Option<String>,
    poster: Option<String>,
    released: Option<i32>,
}

impl Movie {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn director(&self) -> Option<&str> {
        self.director.as_deref()
    }

    pub fn poster(&self) -> Option<&str> {
        self.poster.as_deref()
    }

    pub fn released(&self) -> Option<i32> {
        self.released
    }

    pub fn check_title(title: Option<&Value>) -> ValidationResult {
        check_required_text(
            title,
            "A title must be provided!",
            "The title must be a non-empty string!",
        )
    }

    /// Identity check for titles: mandatory, unique.
    pub fn check_title_as_id(title: Option<&Value>, keys: &dyn KeyLookup) -> ValidationResult {
        Self::check_title(title)?;
        if let Some(s) = text_of(title) {
            if keys.is_taken(s) {
                return Err(Violation::Uniqueness(
                    "There is already a movie record with this title!".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn check_genre(genre: Option<&Value>) -> ValidationResult {
        check_optional_text(genre, "The genre must be a non-empty string!")
    }

    pub fn check_summary(summary: Option<&Value>) -> ValidationResult {
        check_optional_text(summary, "The summary must be a non-empty string!")
    }

    pub fn check_director(director: Option<&Value>) -> ValidationResult {
        check_optional_text(director, "The director must be a non-empty string!")
    }

    pub fn check_poster(poster: Option<&Value>) -> ValidationResult {
        check_optional_text(poster, "The poster must be a non-empty string!")
    }

    pub fn check_released(released: Option<&Value>) -> ValidationResult {
        if is_missing(released) {
            return Ok(());
        }
        match int_of(released) {
            Some(_) => Ok(()),
            None => Err(Violation::Range(
                "The release year must be an integer!".into(),
            )),
        }
    }

    fn optional_field(
        slots: &Slots,
        field: &str,
        check: fn(Option<&Value>) -> ValidationResult,
    ) -> Result<Option<String>, Violation> {
        let v = slots.get(field);
        check(v)?;
        if is_missing(v) {
            return Ok(None);
        }
        Ok(text_of(v).map(str::to_string))
    }
}

impl Record for Movie {
    const SLOT: &'static str = "movies";
    const ENTITY: &'static str = "movie";

    fn from_slots(slots: &Slots, keys: &dyn KeyLookup) -> Result<Self, Violation> {
        Self::check_title_as_id(slots.get("title"), keys)?;
        let title = text_of(slots.get("title")).unwrap_or("").to_string();
        let genre = Self::optional_field(slots, "genre", Self::check_genre)?;
        let summary = Self::optional_field(slots, "summary", Self::check_summary)?;
        let director = Self::optional_field(slots, "director", Self::check_director)?;
        let poster = Self::optional_field(slots, "poster", Self::check_poster)?;
        let released = match slots.get("released") {
            v if is_missing(v) => None,
            v => {
                Self::check_released(v)?;
                int_of(v).map(|n| n as i32)
            }
        };
        Ok(Movie { title, genre, summary, director, poster, released })
    }

    fn update_from_slots(&mut self, slots: &Slots) -> Result<Vec<&'static str>, Violation> {
        let mut changed = Vec::new();
        if let Some(v) = slots.get("genre") {
            if text_of(Some(v)) != self.genre.as_deref() {
                Self::check_genre(Some(v))?;
                self.genre = text_of(Some(v)).map(str::to_string);
                changed.push("genre");
            }
        }
        if let Some(v) = slots.get("summary") {
            if text_of(Some(v)) != self.summary.as_deref() {
                Self::check_summary(Some(v))?;
                self.summary = text_of(Some(v)).map(str::to_string);
                changed.push("summary");
            }
        }
        if let Some(v) = slots.get("director") {
            if text_of(Some(v)) != self.director.as_deref() {
                Self::check_director(Some(v))?;
                self.director = text_of(Some(v)).map(str::to_string);
                changed.push("director");
            }
        }
        if let Some(v) = slots.get("poster") {
            if text_of(Some(v)) != self.poster.as_deref() {
                Self::check_poster(Some(v))?;
                self.poster = text_of(Some(v)).map(str::to_string);
                changed.push("poster");
            }
        }
        if let Some(v) = slots.get("released") {
            if int_of(Some(v)) != self.released.map(i64::from) {
                Self::check_released(Some(v))?;
                self.released = int_of(Some(v)).map(|n| n as i32);
                changed.push("released");
            }
        }
        Ok(changed)
    }

    fn key(&self) -> String {
        self.title.clone()
    }

    fn key_slot(slots: &Slots) -> Option<String> {
        text_of(slots.get("title")).map(str::to_string)
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("title".into(), json!(self.title));
        if let Some(genre) = &self.genre {
            row.insert("genre".into(), json!(genre));
        }
        if let Some(summary) = &self.summary {
            row.insert("summary".into(), json!(summary));
        }
        if let Some(director) = &self.director {
            row.insert("director".into(), json!(director));
        }
        if let Some(poster) = &self.poster {
            row.insert("poster".into(), json!(poster));
        }
        if let Some(released) = self.released {
            row.insert("released".into(), json!(released));
        }
        row
    }

    fn describe(&self) -> String {
        format!("Movie{{ title: {} }}", self.title)
    }
}

/// Seed slots for a demo catalog, mirroring the legacy test data.
pub fn demo_slots() -> Vec<Slots> {
    let records = [
        json!({
            "title": "Dr. No",
            "summary": "A resourceful British government agent seeks answers in a case \
                        involving the disappearance of a colleague.",
            "genre": "Action",
            "director": "Terence Young",
            "released": 1962
        }),
        json!({
            "title": "Arrival",
            "genre": "Science fiction",
            "director": "Denis Villeneuve",
            "released": 2016
        }),
    ];
    records
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .collect()
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
    fn title_carries_identity() {
        assert!(matches!(
            Movie::check_title_as_id(None, &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));
        let m = slots(json!({ "title": "Dr. No", "released": "1962" }));
        let movie = Movie::from_slots(&m, &NoKeys).unwrap();
        assert_eq!(movie.key(), "Dr. No");
        assert_eq!(movie.released(), Some(1962));
    }

    #[test]
    fn released_must_be_an_integer_when_present() {
        let bad = slots(json!({ "title": "Dr. No", "released": "nineteen62" }));
        assert!(matches!(
            Movie::from_slots(&bad, &NoKeys),
            Err(Violation::Range(_))
        ));
    }

    #[test]
    fn row_round_trip() {
        for m in demo_slots() {
            let movie = Movie::from_slots(&m, &NoKeys).unwrap();
            assert_eq!(Movie::from_row(&movie.to_row()).unwrap(), movie);
        }
    }
}
