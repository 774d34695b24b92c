//! Domain layer: core entities and business rules.

pub mod draft;
pub mod events;
pub mod message;
pub mod presence;
pub mod typing;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
