//! Request orchestration: single dispatches and batches.
//!
//! The dispatcher runs one logical chat-or-analyze request end to end
//! against a resolved provider client; the batch orchestrator fans a shared
//! prompt out over an ordered sequence of image references with per-item
//! failure isolation.

pub(crate) mod batch;
pub(crate) mod dispatcher;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchOptions, BatchOrchestrator};
pub use dispatcher::Dispatcher;
