//! The Book entity with the incomplete disjoint segmentation
//! {Textbook, Biography}
//!
//! The segment is a closed sum type carried as `Option<BookExtra>`: a book
//! either has no subtype, or exactly the attributes its subtype owns. The
//! discriminator is write-once.

use std::sync::OnceLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde_json::{json, Value};

use super::{
    check_required_text, int_of, is_missing, text_of, CodeList, KeyLookup, Record, Row, Slots,
};
use crate::validation::{ValidationResult, Violation};

/// Earliest admissible publication year (the Gutenberg era floor).
pub const FIRST_YEAR: i32 = 1459;

fn isbn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{9}(\d|X)$").expect("ISBN pattern is valid"))
}

/// Publication years are bounded by next year, from the system clock.
pub fn next_year() -> i32 {
    Utc::now().year() + 1
}

/// Enumeration of book subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSubtype {
    Textbook = 1,
    Biography = 2,
}

impl CodeList for BookSubtype {
    const MAX: u8 = 2;
    const NAMES: &'static [&'static str] = &["Textbook", "Biography"];

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BookSubtype::Textbook),
            2 => Some(BookSubtype::Biography),
            _ => None,
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

/// Subtype-owned attribute segment of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookExtra {
    Textbook { subject_area: String },
    Biography { about: String },
}

impl BookExtra {
    /// The discriminator value this segment belongs to.
    pub fn subtype(&self) -> BookSubtype {
        match self {
            BookExtra::Textbook { .. } => BookSubtype::Textbook,
            BookExtra::Biography { .. } => BookSubtype::Biography,
        }
    }
}

/// A book record: ISBN identity, base attributes, optional subtype segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    isbn: String,
    title: String,
    year: i32,
    extra: Option<BookExtra>,
}

impl Book {
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn subtype(&self) -> Option<BookSubtype> {
        self.extra.as_ref().map(BookExtra::subtype)
    }

    pub fn extra(&self) -> Option<&BookExtra> {
        self.extra.as_ref()
    }

    pub fn subject_area(&self) -> Option<&str> {
        match &self.extra {
            Some(BookExtra::Textbook { subject_area }) => Some(subject_area),
            _ => None,
        }
    }

    pub fn about(&self) -> Option<&str> {
        match &self.extra {
            Some(BookExtra::Biography { about }) => Some(about),
            _ => None,
        }
    }

    /// Syntax check for ISBN values. An absent/empty value is admissible
    /// here; identity concerns are handled by [`Book::check_isbn_as_id`].
    pub fn check_isbn(isbn: Option<&Value>) -> ValidationResult {
        if is_missing(isbn) {
            return Ok(());
        }
        let s = match text_of(isbn) {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                return Err(Violation::Range(
                    "The ISBN must be a non-empty string!".into(),
                ))
            }
        };
        if !isbn_pattern().is_match(s) {
            return Err(Violation::Pattern(
                "The ISBN must be a 10-digit string or a 9-digit string followed by 'X'!".into(),
            ));
        }
        Ok(())
    }

    fn isbn_as_id(isbn: Option<&Value>, keys: &dyn KeyLookup) -> Result<String, Violation> {
        Self::check_isbn(isbn)?;
        if is_missing(isbn) {
            return Err(Violation::MandatoryValue(
                "A value for the ISBN must be provided!".into(),
            ));
        }
        let s = match text_of(isbn) {
            Some(s) => s,
            None => {
                return Err(Violation::Range(
                    "The ISBN must be a non-empty string!".into(),
                ))
            }
        };
        if keys.is_taken(s) {
            return Err(Violation::Uniqueness(
                "There is already a book record with this ISBN!".into(),
            ));
        }
        Ok(s.to_string())
    }

    /// Identity check for ISBN values: syntax, mandatory, unique.
    pub fn check_isbn_as_id(isbn: Option<&Value>, keys: &dyn KeyLookup) -> ValidationResult {
        Self::isbn_as_id(isbn, keys).map(|_| ())
    }

    pub fn check_title(title: Option<&Value>) -> ValidationResult {
        check_required_text(
            title,
            "A title must be provided!",
            "The title must be a non-empty string!",
        )
    }

    fn year_of(year: Option<&Value>) -> Result<i32, Violation> {
        if is_missing(year) {
            return Err(Violation::MandatoryValue(
                "A publication year must be provided!".into(),
            ));
        }
        let y = int_of(year).ok_or_else(|| {
            Violation::Range("The value of year must be an integer!".into())
        })?;
        if y < i64::from(FIRST_YEAR) || y > i64::from(next_year()) {
            return Err(Violation::Interval(
                "The value of year must be between 1459 and next year!".into(),
            ));
        }
        Ok(y as i32)
    }

    pub fn check_year(year: Option<&Value>) -> ValidationResult {
        Self::year_of(year).map(|_| ())
    }

    fn subtype_of(subtype: Option<&Value>) -> Result<Option<BookSubtype>, Violation> {
        if is_missing(subtype) {
            return Ok(None);
        }
        int_of(subtype)
            .and_then(|code| u8::try_from(code).ok())
            .and_then(BookSubtype::from_code)
            .map(Some)
            .ok_or_else(|| {
                Violation::Range("The value of subtype must represent a book subtype!".into())
            })
    }

    /// Checks that the candidate is a valid subtype code. Absent means
    /// "no subtype assigned" and is admissible.
    pub fn check_subtype(subtype: Option<&Value>) -> ValidationResult {
        Self::subtype_of(subtype).map(|_| ())
    }

    /// Checks the subject area against a discriminator value. With no
    /// discriminator the check assumes Textbook, so a form field can be
    /// validated on its own; commit-time construction is strict instead.
    pub fn check_subject_area(
        subject_area: Option<&Value>,
        subtype: Option<BookSubtype>,
    ) -> ValidationResult {
        let subtype = subtype.unwrap_or(BookSubtype::Textbook);
        if subtype == BookSubtype::Textbook && is_missing(subject_area) {
            return Err(Violation::MandatoryValue(
                "A subject area must be provided for a textbook!".into(),
            ));
        }
        if subtype != BookSubtype::Textbook && !is_missing(subject_area) {
            return Err(Violation::Other(
                "A subject area must not be provided if the book is not a textbook!".into(),
            ));
        }
        if !is_missing(subject_area) && text_of(subject_area).map(str::trim).unwrap_or("").is_empty()
        {
            return Err(Violation::Range(
                "The subject area must be a non-empty string!".into(),
            ));
        }
        Ok(())
    }

    /// Checks the biography subject against a discriminator value. With no
    /// discriminator the check assumes Biography (see
    /// [`Book::check_subject_area`]).
    pub fn check_about(about: Option<&Value>, subtype: Option<BookSubtype>) -> ValidationResult {
        let subtype = subtype.unwrap_or(BookSubtype::Biography);
        if subtype == BookSubtype::Biography && is_missing(about) {
            return Err(Violation::MandatoryValue(
                "A biography subject must be provided for a biography!".into(),
            ));
        }
        if subtype != BookSubtype::Biography && !is_missing(about) {
            return Err(Violation::Other(
                "A biography subject must not be provided if the book is not a biography!".into(),
            ));
        }
        if !is_missing(about) && text_of(about).map(str::trim).unwrap_or("").is_empty() {
            return Err(Violation::Range(
                "The biography subject's name must be a non-empty string!".into(),
            ));
        }
        Ok(())
    }

    pub fn set_title(&mut self, title: Option<&Value>) -> ValidationResult {
        Self::check_title(title)?;
        if let Some(s) = text_of(title) {
            self.title = s.to_string();
        }
        Ok(())
    }

    pub fn set_year(&mut self, year: Option<&Value>) -> ValidationResult {
        self.year = Self::year_of(year)?;
        Ok(())
    }

    /// Assigns the subtype segment, pulling the segment attribute from
    /// `segment`. Write-once: once a segment exists any further assignment
    /// fails with a frozen-value violation, before the code is even looked
    /// at. Returns the attribute names that were assigned.
    pub fn set_subtype(
        &mut self,
        subtype: Option<&Value>,
        segment: &Slots,
    ) -> Result<Vec<&'static str>, Violation> {
        if self.extra.is_some() {
            return Err(Violation::FrozenValue("The subtype cannot be changed!".into()));
        }
        let subtype = match Self::subtype_of(subtype)? {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };
        let (extra, segment_attr) = match subtype {
            BookSubtype::Textbook => {
                Self::check_subject_area(segment.get("subjectArea"), Some(subtype))?;
                Self::check_about(segment.get("about"), Some(subtype))?;
                let subject_area = text_of(segment.get("subjectArea")).unwrap_or("").to_string();
                (BookExtra::Textbook { subject_area }, "subjectArea")
            }
            BookSubtype::Biography => {
                Self::check_subject_area(segment.get("subjectArea"), Some(subtype))?;
                Self::check_about(segment.get("about"), Some(subtype))?;
                let about = text_of(segment.get("about")).unwrap_or("").to_string();
                (BookExtra::Biography { about }, "about")
            }
        };
        self.extra = Some(extra);
        Ok(vec!["subtype", segment_attr])
    }

    pub fn set_subject_area(&mut self, subject_area: Option<&Value>) -> ValidationResult {
        match &mut self.extra {
            Some(BookExtra::Textbook { subject_area: current }) => {
                Self::check_subject_area(subject_area, Some(BookSubtype::Textbook))?;
                if let Some(s) = text_of(subject_area) {
                    *current = s.to_string();
                }
                Ok(())
            }
            _ => Err(Violation::Other(
                "A subject area must not be provided if the book is not a textbook!".into(),
            )),
        }
    }

    pub fn set_about(&mut self, about: Option<&Value>) -> ValidationResult {
        match &mut self.extra {
            Some(BookExtra::Biography { about: current }) => {
                Self::check_about(about, Some(BookSubtype::Biography))?;
                if let Some(s) = text_of(about) {
                    *current = s.to_string();
                }
                Ok(())
            }
            _ => Err(Violation::Other(
                "A biography subject must not be provided if the book is not a biography!".into(),
            )),
        }
    }
}

impl Record for Book {
    const SLOT: &'static str = "books";
    const ENTITY: &'static str = "book";

    fn from_slots(slots: &Slots, keys: &dyn KeyLookup) -> Result<Self, Violation> {
        let isbn = Self::isbn_as_id(slots.get("isbn"), keys)?;
        Self::check_title(slots.get("title"))?;
        let title = text_of(slots.get("title")).unwrap_or("").to_string();
        let year = Self::year_of(slots.get("year"))?;
        let extra = match Self::subtype_of(slots.get("subtype"))? {
            Some(subtype) => {
                Self::check_subject_area(slots.get("subjectArea"), Some(subtype))?;
                Self::check_about(slots.get("about"), Some(subtype))?;
                Some(match subtype {
                    BookSubtype::Textbook => BookExtra::Textbook {
                        subject_area: text_of(slots.get("subjectArea")).unwrap_or("").to_string(),
                    },
                    BookSubtype::Biography => BookExtra::Biography {
                        about: text_of(slots.get("about")).unwrap_or("").to_string(),
                    },
                })
            }
            None => {
                if !is_missing(slots.get("subjectArea")) {
                    return Err(Violation::Other(
                        "A subject area must not be provided if the book has no subtype!".into(),
                    ));
                }
                if !is_missing(slots.get("about")) {
                    return Err(Violation::Other(
                        "A biography subject must not be provided if the book has no subtype!"
                            .into(),
                    ));
                }
                None
            }
        };
        Ok(Book { isbn, title, year, extra })
    }

    fn update_from_slots(&mut self, slots: &Slots) -> Result<Vec<&'static str>, Violation> {
        let mut changed = Vec::new();
        if let Some(v) = slots.get("title") {
            if text_of(Some(v)) != Some(self.title.as_str()) {
                self.set_title(Some(v))?;
                changed.push("title");
            }
        }
        if let Some(v) = slots.get("year") {
            if int_of(Some(v)) != Some(i64::from(self.year)) {
                self.set_year(Some(v))?;
                changed.push("year");
            }
        }
        if let Some(v) = slots.get("subtype") {
            match &self.extra {
                None => {
                    changed.extend(self.set_subtype(Some(v), slots)?);
                }
                Some(extra) => {
                    if Self::subtype_of(Some(v))? != Some(extra.subtype()) {
                        return Err(Violation::FrozenValue(
                            "The subtype cannot be changed!".into(),
                        ));
                    }
                }
            }
        }
        if let Some(v) = slots.get("subjectArea") {
            if let Some(BookExtra::Textbook { subject_area }) = &self.extra {
                if text_of(Some(v)) != Some(subject_area.as_str()) {
                    self.set_subject_area(Some(v))?;
                    changed.push("subjectArea");
                }
            }
        }
        if let Some(v) = slots.get("about") {
            if let Some(BookExtra::Biography { about }) = &self.extra {
                if text_of(Some(v)) != Some(about.as_str()) {
                    self.set_about(Some(v))?;
                    changed.push("about");
                }
            }
        }
        Ok(changed)
    }

    fn key(&self) -> String {
        self.isbn.clone()
    }

    fn key_slot(slots: &Slots) -> Option<String> {
        text_of(slots.get("isbn")).map(str::to_string)
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("isbn".into(), json!(self.isbn));
        row.insert("title".into(), json!(self.title));
        row.insert("year".into(), json!(self.year));
        if let Some(extra) = &self.extra {
            row.insert("subtype".into(), json!(extra.subtype().code()));
            match extra {
                BookExtra::Textbook { subject_area } => {
                    row.insert("subjectArea".into(), json!(subject_area));
                }
                BookExtra::Biography { about } => {
                    row.insert("about".into(), json!(about));
                }
            }
        }
        row
    }

    fn describe(&self) -> String {
        let mut s = format!(
            "Book{{ ISBN: {}, title: {}, year: {}",
            self.isbn, self.title, self.year
        );
        match &self.extra {
            Some(BookExtra::Textbook { subject_area }) => {
                s.push_str(&format!(", textbook subject area: {subject_area}"));
            }
            Some(BookExtra::Biography { about }) => {
                s.push_str(&format!(", biography about: {about}"));
            }
            None => {}
        }
        s.push_str(" }");
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoKeys;
    use serde_json::json;

    struct Taken(&'static str);

    impl KeyLookup for Taken {
        fn is_taken(&self, key: &str) -> bool {
            key == self.0
        }
    }

    fn slots(v: Value) -> Slots {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn isbn_syntax() {
        assert!(Book::check_isbn(None).is_ok());
        assert!(Book::check_isbn(Some(&json!(""))).is_ok());
        assert!(Book::check_isbn(Some(&json!("0136019701"))).is_ok());
        assert!(Book::check_isbn(Some(&json!("013601970X"))).is_ok());
        assert!(matches!(
            Book::check_isbn(Some(&json!("013601970"))),
            Err(Violation::Pattern(_))
        ));
        assert!(matches!(
            Book::check_isbn(Some(&json!("X136019701"))),
            Err(Violation::Pattern(_))
        ));
        assert!(matches!(
            Book::check_isbn(Some(&json!("0136019701X"))),
            Err(Violation::Pattern(_))
        ));
        assert!(matches!(
            Book::check_isbn(Some(&json!(136019701))),
            Err(Violation::Range(_))
        ));
    }

    #[test]
    fn isbn_as_id_adds_identity_concerns() {
        assert!(matches!(
            Book::check_isbn_as_id(None, &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));
        assert!(matches!(
            Book::check_isbn_as_id(Some(&json!("")), &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));
        assert!(Book::check_isbn_as_id(Some(&json!("0136019701")), &NoKeys).is_ok());
        assert!(matches!(
            Book::check_isbn_as_id(Some(&json!("0136019701")), &Taken("0136019701")),
            Err(Violation::Uniqueness(_))
        ));
    }

    #[test]
    fn year_interval() {
        assert!(matches!(Book::check_year(None), Err(Violation::MandatoryValue(_))));
        assert!(matches!(
            Book::check_year(Some(&json!(0))),
            Err(Violation::MandatoryValue(_))
        ));
        assert!(matches!(
            Book::check_year(Some(&json!("abc"))),
            Err(Violation::Range(_))
        ));
        assert!(matches!(
            Book::check_year(Some(&json!(1458))),
            Err(Violation::Interval(_))
        ));
        assert!(Book::check_year(Some(&json!(1459))).is_ok());
        assert!(Book::check_year(Some(&json!(next_year()))).is_ok());
        assert!(matches!(
            Book::check_year(Some(&json!(next_year() + 1))),
            Err(Violation::Interval(_))
        ));
        assert!(Book::check_year(Some(&json!("2014"))).is_ok());
    }

    #[test]
    fn subtype_codes_are_contiguous() {
        assert!(Book::check_subtype(None).is_ok());
        assert!(Book::check_subtype(Some(&json!(0))).is_ok());
        assert!(Book::check_subtype(Some(&json!(1))).is_ok());
        assert!(Book::check_subtype(Some(&json!(2))).is_ok());
        assert!(matches!(
            Book::check_subtype(Some(&json!(3))),
            Err(Violation::Range(_))
        ));
        assert!(matches!(
            Book::check_subtype(Some(&json!("x"))),
            Err(Violation::Range(_))
        ));
        assert_eq!(BookSubtype::Textbook.name(), "Textbook");
        assert_eq!(BookSubtype::from_code(BookSubtype::MAX), Some(BookSubtype::Biography));
    }

    #[test]
    fn segment_checks_assume_owning_subtype_when_standalone() {
        assert!(Book::check_subject_area(Some(&json!("Web development")), None).is_ok());
        assert!(matches!(
            Book::check_subject_area(None, None),
            Err(Violation::MandatoryValue(_))
        ));
        assert!(Book::check_about(Some(&json!("Steve Jobs")), None).is_ok());
        assert!(matches!(
            Book::check_about(Some(&json!("x")), Some(BookSubtype::Textbook)),
            Err(Violation::Other(_))
        ));
        assert!(matches!(
            Book::check_subject_area(Some(&json!("x")), Some(BookSubtype::Biography)),
            Err(Violation::Other(_))
        ));
    }

    #[test]
    fn construction_enforces_segment_exclusivity() {
        let textbook = slots(json!({
            "isbn": "0136019701", "title": "Core Servlets", "year": 2014,
            "subtype": 1, "subjectArea": "Web development"
        }));
        let book = Book::from_slots(&textbook, &NoKeys).unwrap();
        assert_eq!(book.subject_area(), Some("Web development"));
        assert_eq!(book.subtype(), Some(BookSubtype::Textbook));

        let wrong_segment = slots(json!({
            "isbn": "0136019701", "title": "Core Servlets", "year": 2014,
            "subtype": 1, "about": "x"
        }));
        assert!(matches!(
            Book::from_slots(&wrong_segment, &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));

        let both = slots(json!({
            "isbn": "0136019701", "title": "Core Servlets", "year": 2014,
            "subtype": 2, "subjectArea": "x", "about": "y"
        }));
        assert!(matches!(
            Book::from_slots(&both, &NoKeys),
            Err(Violation::Other(_))
        ));

        let no_subtype_with_segment = slots(json!({
            "isbn": "0136019701", "title": "Core Servlets", "year": 2014,
            "subjectArea": "x"
        }));
        assert!(matches!(
            Book::from_slots(&no_subtype_with_segment, &NoKeys),
            Err(Violation::Other(_))
        ));
    }

    #[test]
    fn subtype_is_write_once() {
        let base = slots(json!({
            "isbn": "0553345842", "title": "The Mind's I", "year": 1982
        }));
        let mut book = Book::from_slots(&base, &NoKeys).unwrap();
        let assign = slots(json!({ "subtype": 2, "about": "Hofstadter" }));
        assert_eq!(
            book.set_subtype(assign.get("subtype"), &assign).unwrap(),
            vec!["subtype", "about"]
        );
        let again = slots(json!({ "subtype": 2, "about": "Dennett" }));
        assert!(matches!(
            book.set_subtype(again.get("subtype"), &again),
            Err(Violation::FrozenValue(_))
        ));
        // invalid code on the second call still reports the frozen value
        let invalid = slots(json!({ "subtype": 99 }));
        assert!(matches!(
            book.set_subtype(invalid.get("subtype"), &invalid),
            Err(Violation::FrozenValue(_))
        ));
    }

    #[test]
    fn row_round_trip() {
        let textbook = slots(json!({
            "isbn": "0136019701", "title": "Core Servlets", "year": "2014",
            "subtype": 1, "subjectArea": "Web development"
        }));
        let book = Book::from_slots(&textbook, &NoKeys).unwrap();
        let row = book.to_row();
        assert_eq!(row.get("year"), Some(&json!(2014)));
        assert_eq!(row.get("subtype"), Some(&json!(1)));
        assert_eq!(Book::from_row(&row).unwrap(), book);

        let plain = slots(json!({
            "isbn": "0553345842", "title": "The Mind's I", "year": 1982
        }));
        let book = Book::from_slots(&plain, &NoKeys).unwrap();
        let row = book.to_row();
        assert!(!row.contains_key("subtype"));
        assert!(!row.contains_key("subjectArea"));
        assert_eq!(Book::from_row(&row).unwrap(), book);
    }

    #[test]
    fn describe_mentions_the_segment() {
        let biography = slots(json!({
            "isbn": "1451648537", "title": "Steve Jobs", "year": 2011,
            "subtype": 2, "about": "Steve Jobs"
        }));
        let book = Book::from_slots(&biography, &NoKeys).unwrap();
        assert_eq!(
            book.describe(),
            "Book{ ISBN: 1451648537, title: Steve Jobs, year: 2011, biography about: Steve Jobs }"
        );
    }
}
