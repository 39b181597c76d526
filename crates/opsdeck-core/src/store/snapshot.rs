use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::notification::Notification;
use crate::session::Session;
use crate::theme::ThemeConfig;
use crate::training::TrainingFile;

/// Immutable copy of the whole store at one revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Bumped on every effective mutation.
    pub revision: u64,
    pub session: Session,
    pub theme: ThemeConfig,
    pub sidebar_collapsed: bool,
    /// Most recent first.
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    /// Most recently added first.
    pub agents: Vec<Agent>,
    pub training_files: Vec<TrainingFile>,
}

impl StoreSnapshot {
    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn notification(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }
}
