use serde::{Deserialize, Serialize};

use crate::agent::NewAgent;
use crate::notification::NewNotification;
use crate::session::User;
use crate::theme::ThemePatch;
use crate::training::NewTrainingFile;

/// A named store mutation, one variant per action.
///
/// Presentation code translates user intents into these 1:1 and hands them
/// to [`AppStore::dispatch`](super::AppStore::dispatch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreAction {
    SetUser {
        #[serde(default)]
        user: Option<User>,
    },
    Logout,
    AddNotification {
        notification: NewNotification,
    },
    MarkNotificationAsRead {
        id: String,
    },
    ClearNotifications,
    SetTheme {
        patch: ThemePatch,
    },
    ToggleSidebar,
    SetSidebarCollapsed {
        collapsed: bool,
    },
    AddAgent {
        agent: NewAgent,
    },
    ToggleAgentStatus {
        id: String,
    },
    AddTrainingFile {
        file: NewTrainingFile,
    },
    RemoveTrainingFile {
        id: String,
    },
    ClearTrainingFiles,
}

impl StoreAction {
    /// Stable action name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::SetUser { .. } => "set_user",
            StoreAction::Logout => "logout",
            StoreAction::AddNotification { .. } => "add_notification",
            StoreAction::MarkNotificationAsRead { .. } => "mark_notification_as_read",
            StoreAction::ClearNotifications => "clear_notifications",
            StoreAction::SetTheme { .. } => "set_theme",
            StoreAction::ToggleSidebar => "toggle_sidebar",
            StoreAction::SetSidebarCollapsed { .. } => "set_sidebar_collapsed",
            StoreAction::AddAgent { .. } => "add_agent",
            StoreAction::ToggleAgentStatus { .. } => "toggle_agent_status",
            StoreAction::AddTrainingFile { .. } => "add_training_file",
            StoreAction::RemoveTrainingFile { .. } => "remove_training_file",
            StoreAction::ClearTrainingFiles => "clear_training_files",
        }
    }
}

/// Result of dispatching a [`StoreAction`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Whether the store state changed.
    pub changed: bool,
    /// Identifier generated by an add action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ActionOutcome {
    pub fn changed(changed: bool) -> Self {
        Self { changed, id: None }
    }

    pub fn created(id: String) -> Self {
        Self {
            changed: true,
            id: Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;

    #[test]
    fn test_tagged_json() {
        let action: StoreAction = serde_json::from_str(
            r#"{"type": "add_notification", "notification": {"title": "Hi", "kind": "warning"}}"#,
        )
        .unwrap();
        match &action {
            StoreAction::AddNotification { notification } => {
                assert_eq!(notification.kind, NotificationKind::Warning);
                assert!(notification.message.is_empty());
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(action.name(), "add_notification");
    }

    #[test]
    fn test_unit_variant_json() {
        let json = serde_json::to_string(&StoreAction::ToggleSidebar).unwrap();
        assert_eq!(json, r#"{"type":"toggle_sidebar"}"#);
        let back: StoreAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StoreAction::ToggleSidebar);
    }

    #[test]
    fn test_name_matches_tag() {
        let action = StoreAction::RemoveTrainingFile { id: "f1".into() };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], action.name());
    }
}
