pub mod bootstrap;
pub mod context;
pub mod draft_autosave;
pub mod send_chat;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
