//! catalogdb - a strict, validating record store for in-app catalogs
//!
//! The model layer owns every invariant: per-attribute check functions,
//! write-once subtype discriminators, transactional updates, and
//! whole-collection persistence against named storage slots. The embedding
//! application supplies raw field values as slots and renders whatever the
//! model reports back; it never bypasses the checks.

pub mod model;
pub mod observability;
pub mod registry;
pub mod storage;
pub mod validation;

pub use registry::{DestroyOutcome, LoadReport, Registry, RegistryError, UpdateOutcome};
pub use validation::{ValidationResult, Violation};
