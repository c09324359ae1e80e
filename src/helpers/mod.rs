pub mod format;

pub use format::{CopyFormat, format_number, format_rows};
