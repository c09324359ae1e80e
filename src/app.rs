//! View controllers and command routing.

pub mod menus;
pub mod query_browser;

pub use menus::{MenuAction, MenuCommand, MenuHandler, MenuRegistry, ViewId};
pub use query_browser::QueryBrowser;
