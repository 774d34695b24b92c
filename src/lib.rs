//! Realtime synchronization core for a team chat client.
//!
//! The crate keeps a client's local views (messages, presence, typing,
//! drafts) converging on authoritative server state: one live socket
//! connection delivers push events, a fan-out registry distributes them,
//! and reconciliation re-reads server state instead of patching local
//! copies. The binary wraps the core in a headless runner.

pub mod api;
pub mod app;
pub mod cli;
pub mod diagnostics;
pub mod domain;
pub mod infra;
pub mod sync;
pub mod usecases;
