//! Data source access.
//!
//! This module provides:
//! - `DataSource`: the async port every driver adapter implements
//! - `collaborators`: clipboard and file-save ports used by query sessions
//! - `sql`: dialect-aware statements generated by the engine

pub mod collaborators;
pub mod source;
pub mod sql;

pub use collaborators::{Clipboard, FileSaver, FsFileSaver};
pub use source::DataSource;
pub use sql::{quote_identifier, select_top_query};
