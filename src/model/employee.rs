//! The Employee entity with the incomplete segmentation {Manager}
//!
//! Employees embed the Person supertype and add an employee number plus an
//! optional role segment. Only managers carry a department; the role
//! discriminator is write-once, like every subtype discriminator here.

use serde_json::{json, Value};

use super::person::{check_name, PersonBase};
use super::{int_of, is_missing, text_of, CodeList, KeyLookup, Record, Row, Slots};
use crate::validation::{ValidationResult, Violation};

/// Enumeration of employee subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSubtype {
    Manager = 1,
}

impl CodeList for EmployeeSubtype {
    const MAX: u8 = 1;
    const NAMES: &'static [&'static str] = &["Manager"];

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EmployeeSubtype::Manager),
            _ => None,
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

/// Subtype-owned attribute segment of an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeRole {
    Manager { department: String },
}

impl EmployeeRole {
    pub fn subtype(&self) -> EmployeeSubtype {
        match self {
            EmployeeRole::Manager { .. } => EmployeeSubtype::Manager,
        }
    }
}

/// An employee record: person base, employee number, optional role segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    base: PersonBase,
    emp_no: u32,
    role: Option<EmployeeRole>,
}

impl Employee {
    pub fn person_id(&self) -> u32 {
        self.base.person_id()
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn emp_no(&self) -> u32 {
        self.emp_no
    }

    pub fn subtype(&self) -> Option<EmployeeSubtype> {
        self.role.as_ref().map(EmployeeRole::subtype)
    }

    pub fn role(&self) -> Option<&EmployeeRole> {
        self.role.as_ref()
    }

    pub fn department(&self) -> Option<&str> {
        match &self.role {
            Some(EmployeeRole::Manager { department }) => Some(department),
            None => None,
        }
    }

    fn emp_no_of(emp_no: Option<&Value>) -> Result<u32, Violation> {
        let n = match int_of(emp_no) {
            Some(n) => n,
            None => {
                return Err(Violation::MandatoryValue(
                    "A value for the employee number is required!".into(),
                ))
            }
        };
        if n < 1 || u32::try_from(n).is_err() {
            return Err(Violation::Range(
                "The employee number must be a positive integer!".into(),
            ));
        }
        Ok(n as u32)
    }

    pub fn check_emp_no(emp_no: Option<&Value>) -> ValidationResult {
        Self::emp_no_of(emp_no).map(|_| ())
    }

    fn subtype_of(subtype: Option<&Value>) -> Result<Option<EmployeeSubtype>, Violation> {
        if is_missing(subtype) {
            return Ok(None);
        }
        int_of(subtype)
            .and_then(|code| u8::try_from(code).ok())
            .and_then(EmployeeSubtype::from_code)
            .map(Some)
            .ok_or_else(|| {
                Violation::Range("The value of subtype must represent an employee type!".into())
            })
    }

    pub fn check_subtype(subtype: Option<&Value>) -> ValidationResult {
        Self::subtype_of(subtype).map(|_| ())
    }

    /// Checks a department against a discriminator value. With no
    /// discriminator the check assumes Manager (standalone-admissibility
    /// mode for live form validation); commit paths are strict.
    pub fn check_department(
        department: Option<&Value>,
        subtype: Option<EmployeeSubtype>,
    ) -> ValidationResult {
        let subtype = subtype.unwrap_or(EmployeeSubtype::Manager);
        if subtype == EmployeeSubtype::Manager && is_missing(department) {
            return Err(Violation::MandatoryValue(
                "A department must be provided for a manager!".into(),
            ));
        }
        if !is_missing(department) && text_of(department).map(str::trim).unwrap_or("").is_empty() {
            return Err(Violation::Range(
                "The department must be a non-empty string!".into(),
            ));
        }
        Ok(())
    }

    pub fn set_name(&mut self, name: Option<&Value>) -> ValidationResult {
        self.base.set_name(name)
    }

    pub fn set_emp_no(&mut self, emp_no: Option<&Value>) -> ValidationResult {
        self.emp_no = Self::emp_no_of(emp_no)?;
        Ok(())
    }

    /// Assigns the role segment, pulling the department from `segment`.
    /// Write-once; returns the attribute names that were assigned.
    pub fn set_subtype(
        &mut self,
        subtype: Option<&Value>,
        segment: &Slots,
    ) -> Result<Vec<&'static str>, Violation> {
        if self.role.is_some() {
            return Err(Violation::FrozenValue("The subtype cannot be changed!".into()));
        }
        let subtype = match Self::subtype_of(subtype)? {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };
        match subtype {
            EmployeeSubtype::Manager => {
                Self::check_department(segment.get("department"), Some(subtype))?;
                let department = text_of(segment.get("department")).unwrap_or("").to_string();
                self.role = Some(EmployeeRole::Manager { department });
                Ok(vec!["subtype", "department"])
            }
        }
    }

    pub fn set_department(&mut self, department: Option<&Value>) -> ValidationResult {
        match &mut self.role {
            Some(EmployeeRole::Manager { department: current }) => {
                Self::check_department(department, Some(EmployeeSubtype::Manager))?;
                if let Some(s) = text_of(department) {
                    *current = s.to_string();
                }
                Ok(())
            }
            None => Err(Violation::Other(
                "A department must not be provided if the employee is not a manager!".into(),
            )),
        }
    }

    /// The subtype-owned row persisted in the `employees` slot. Supertype
    /// fields (person id, name) are stripped; the map key carries identity.
    pub fn subtype_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("empNo".into(), json!(self.emp_no));
        if let Some(EmployeeRole::Manager { department }) = &self.role {
            row.insert("subtype".into(), json!(EmployeeSubtype::Manager.code()));
            row.insert("department".into(), json!(department));
        }
        row
    }

    /// The supertype-owned row persisted in the shared `persons` slot.
    pub fn person_row(&self) -> Row {
        self.base.person_row()
    }

    /// Reconstructs an employee by joining its subtype row with the matching
    /// supertype row (both keyed by the same person id).
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

impl Record for Employee {
    const SLOT: &'static str = "employees";
    const ENTITY: &'static str = "employee";

    fn from_slots(slots: &Slots, keys: &dyn KeyLookup) -> Result<Self, Violation> {
        let base = PersonBase::from_slots(slots, Self::ENTITY, keys)?;
        let emp_no = Self::emp_no_of(slots.get("empNo"))?;
        let role = match Self::subtype_of(slots.get("subtype"))? {
            Some(EmployeeSubtype::Manager) => {
                Self::check_department(slots.get("department"), Some(EmployeeSubtype::Manager))?;
                Some(EmployeeRole::Manager {
                    department: text_of(slots.get("department")).unwrap_or("").to_string(),
                })
            }
            None => {
                if !is_missing(slots.get("department")) {
                    return Err(Violation::Other(
                        "A department must not be provided if the employee is not a manager!"
                            .into(),
                    ));
                }
                None
            }
        };
        Ok(Employee { base, emp_no, role })
    }

    fn update_from_slots(&mut self, slots: &Slots) -> Result<Vec<&'static str>, Violation> {
        let mut changed = Vec::new();
        if self.base.update_name(slots)? {
            changed.push("name");
        }
        if let Some(v) = slots.get("empNo") {
            if int_of(Some(v)) != Some(i64::from(self.emp_no)) {
                self.set_emp_no(Some(v))?;
                changed.push("empNo");
            }
        }
        if let Some(v) = slots.get("subtype") {
            match &self.role {
                None => {
                    changed.extend(self.set_subtype(Some(v), slots)?);
                }
                Some(role) => {
                    if Self::subtype_of(Some(v))? != Some(role.subtype()) {
                        return Err(Violation::FrozenValue(
                            "The subtype cannot be changed!".into(),
                        ));
                    }
                }
            }
        }
        if let Some(v) = slots.get("department") {
            if let Some(EmployeeRole::Manager { department }) = &self.role {
                if text_of(Some(v)) != Some(department.as_str()) {
                    self.set_department(Some(v))?;
                    changed.push("department");
                }
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
        for (k, v) in self.subtype_row() {
            row.insert(k, v);
        }
        row
    }

    fn describe(&self) -> String {
        format!(
            "Employee{{ persID: {}, name: {}, empNo: {} }}",
            self.person_id(),
            self.name(),
            self.emp_no
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
    fn emp_no_is_a_mandatory_positive_integer() {
        assert!(matches!(
            Employee::check_emp_no(None),
            Err(Violation::MandatoryValue(_))
        ));
        assert!(matches!(
            Employee::check_emp_no(Some(&json!(-1))),
            Err(Violation::Range(_))
        ));
        assert!(Employee::check_emp_no(Some(&json!(21328))).is_ok());
        assert!(Employee::check_emp_no(Some(&json!("21328"))).is_ok());
    }

    #[test]
    fn manager_requires_department() {
        let manager = slots(json!({
            "personId": 1001, "name": "Harry Wagner", "empNo": 21328,
            "subtype": 1, "department": "Engineering"
        }));
        let emp = Employee::from_slots(&manager, &NoKeys).unwrap();
        assert_eq!(emp.department(), Some("Engineering"));

        let missing_dept = slots(json!({
            "personId": 1001, "name": "Harry Wagner", "empNo": 21328, "subtype": 1
        }));
        assert!(matches!(
            Employee::from_slots(&missing_dept, &NoKeys),
            Err(Violation::MandatoryValue(_))
        ));

        let dept_without_role = slots(json!({
            "personId": 1001, "name": "Harry Wagner", "empNo": 21328,
            "department": "Engineering"
        }));
        assert!(matches!(
            Employee::from_slots(&dept_without_role, &NoKeys),
            Err(Violation::Other(_))
        ));
    }

    #[test]
    fn role_is_write_once() {
        let plain = slots(json!({
            "personId": 1002, "name": "Peter Boss", "empNo": 23509
        }));
        let mut emp = Employee::from_slots(&plain, &NoKeys).unwrap();
        let assign = slots(json!({ "subtype": 1, "department": "Sales" }));
        assert_eq!(
            emp.set_subtype(assign.get("subtype"), &assign).unwrap(),
            vec!["subtype", "department"]
        );
        assert!(matches!(
            emp.set_subtype(assign.get("subtype"), &assign),
            Err(Violation::FrozenValue(_))
        ));
    }

    #[test]
    fn subtype_row_strips_supertype_fields() {
        let manager = slots(json!({
            "personId": 1001, "name": "Harry Wagner", "empNo": 21328,
            "subtype": 1, "department": "Engineering"
        }));
        let emp = Employee::from_slots(&manager, &NoKeys).unwrap();
        let row = emp.subtype_row();
        assert!(!row.contains_key("personId"));
        assert!(!row.contains_key("name"));
        assert_eq!(row.get("empNo"), Some(&json!(21328)));
        assert_eq!(row.get("subtype"), Some(&json!(1)));

        let joined = Employee::from_joined(&emp.person_row(), &row).unwrap();
        assert_eq!(joined, emp);
    }
}
