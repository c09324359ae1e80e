//! Command helpers for async operations + event emission.
//!
//! Each command decides synchronously, under the state lock, whether work is
//! needed. When it is, the command spawns the data source call on the tokio
//! runtime and returns the task handle; the completion is applied back through
//! [`StateHandle::update`](crate::state::StateHandle::update) after checking it
//! is still relevant. Callers may await the handle or drop it to let the task
//! run detached.

pub struct AppCommands;

mod connections;
mod metadata;
mod queries;
