//! Realtime synchronization core: the live connection, event fan-out, and
//! the reconciliation machinery that keeps local views converging on server
//! state.

pub mod dedup;
pub mod dispatch;
pub mod policy;
pub mod presence_sync;
pub mod registry;
pub mod service;
pub mod status;
pub mod transport;

/// Returns the sync module name for smoke checks.
pub fn module_name() -> &'static str {
    "sync"
}
