//! Application layer orchestrating local persistence against the gateway.
//!
//! Storing a record never talks to the gateway on its own: every network
//! effect goes through an explicit `SyncService` call, so a failed push is
//! visible at the call site and leaves no half-synchronized row behind.

pub mod sync;
