//! Status message updates derived from events.

use crate::helpers::format_number;
use crate::models::ScopeKey;
use crate::state::StatusMessage;
use crate::state::events::AppEvent;

use super::AppState;

impl AppState {
    pub(crate) fn update_status_from_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Connecting { .. } => {
                self.set_status_message(Some(StatusMessage::info("Connecting...")));
            }
            AppEvent::Connected { .. } => {
                self.set_status_message(Some(StatusMessage::info("Connected")));
            }
            AppEvent::Disconnected(_) => {
                self.set_status_message(Some(StatusMessage::info("Disconnected")));
            }
            AppEvent::ConnectionFailed(error) => {
                self.set_status_message(Some(StatusMessage::error(format!(
                    "Connection failed: {error}"
                ))));
            }
            AppEvent::ServerUpdated => {
                self.set_status_message(Some(StatusMessage::info("Server updated")));
            }
            AppEvent::ServerRemoved => {
                self.set_status_message(Some(StatusMessage::info("Server removed")));
            }
            AppEvent::MetadataLoaded { kind, scope, count } => {
                let text = match scope {
                    ScopeKey::Server => format!("Loaded {count} {kind}"),
                    scope => format!("Loaded {count} {kind} for {scope}"),
                };
                self.set_status_message(Some(StatusMessage::info(text)));
            }
            AppEvent::MetadataFailed { kind, error, .. } => {
                self.set_status_message(Some(StatusMessage::error(format!(
                    "Loading {kind} failed: {error}"
                ))));
            }
            AppEvent::QueryStarted(_) => {
                self.set_status_message(Some(StatusMessage::info("Executing query...")));
            }
            AppEvent::QueryCompleted { rows, .. } => {
                self.set_status_message(Some(StatusMessage::info(format!(
                    "Query returned {} row(s)",
                    format_number(*rows as u64)
                ))));
            }
            AppEvent::QueryFailed { error, .. } => {
                self.set_status_message(Some(StatusMessage::error(format!(
                    "Query failed: {error}"
                ))));
            }
            AppEvent::QuerySaved { path, .. } => {
                self.set_status_message(Some(StatusMessage::info(format!(
                    "Saved {}",
                    path.display()
                ))));
            }
            AppEvent::QuerySaveFailed { error, .. } => {
                self.set_status_message(Some(StatusMessage::error(format!(
                    "Save failed: {error}"
                ))));
            }
            AppEvent::CopiedToClipboard { rows } => {
                self.set_status_message(Some(StatusMessage::info(format!(
                    "Copied {} row(s)",
                    format_number(*rows as u64)
                ))));
            }
            AppEvent::CopyFailed { error } => {
                self.set_status_message(Some(StatusMessage::error(format!(
                    "Copy failed: {error}"
                ))));
            }
            AppEvent::ServerAdded
            | AppEvent::MetadataInvalidated { .. }
            | AppEvent::QueryCreated(_)
            | AppEvent::QuerySelected(_)
            | AppEvent::QueryRemoved(_)
            | AppEvent::QueryTextChanged(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::models::ScopeKey;
    use crate::state::app_state::MetadataKind;
    use crate::state::{AppEvent, AppState, StatusLevel};

    use crate::testing::UnreachableSource;

    #[test]
    fn metadata_events_name_kind_and_scope() {
        let mut state = AppState::new(Arc::new(UnreachableSource));

        state.update_status_from_event(&AppEvent::MetadataLoaded {
            kind: MetadataKind::Tables,
            scope: ScopeKey::database("db1"),
            count: 1200,
        });
        let message = state.status_message().unwrap();
        assert_eq!(message.level, StatusLevel::Info);
        assert_eq!(message.text, "Loaded 1200 tables for db1");

        state.update_status_from_event(&AppEvent::ConnectionFailed("refused".into()));
        let message = state.status_message().unwrap();
        assert!(message.is_error());
        assert_eq!(message.text, "Connection failed: refused");
    }
}
