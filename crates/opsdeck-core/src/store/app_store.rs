use chrono::Utc;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{ActionOutcome, StoreAction, StoreSnapshot};
use crate::agent::{Agent, NewAgent};
use crate::config::StoreConfig;
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::notification::{NewNotification, Notification, NotificationLog};
use crate::session::{Session, User};
use crate::theme::{ThemeConfig, ThemePatch};
use crate::training::{NewTrainingFile, TrainingFile};

/// Generator draws tried before falling back to a UUID.
const MAX_ID_ATTEMPTS: usize = 16;

/// Single source of truth for dashboard state.
///
/// All actions are synchronous and total: unknown ids and invalid transitions
/// are no-ops. Every action that changes state bumps the revision and
/// publishes a fresh [`StoreSnapshot`] to subscribers; no-ops publish nothing.
///
/// # Example
///
/// ```
/// use opsdeck_core::config::StoreConfig;
/// use opsdeck_core::notification::NewNotification;
/// use opsdeck_core::store::AppStore;
///
/// let mut store = AppStore::new(StoreConfig::default());
/// let id = store.add_notification(NewNotification::info("Welcome", "Hello"));
/// assert_eq!(store.unread_count(), 1);
/// store.mark_notification_as_read(&id);
/// assert_eq!(store.unread_count(), 0);
/// ```
pub struct AppStore {
    session: Session,
    theme: ThemeConfig,
    sidebar_collapsed: bool,
    notifications: NotificationLog,
    agents: Vec<Agent>,
    training_files: Vec<TrainingFile>,
    ids: Arc<dyn IdGenerator>,
    revision: u64,
    updates: watch::Sender<StoreSnapshot>,
}

impl AppStore {
    /// Creates a store seeded from `config`, drawing ids from UUID v4.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_id_generator(config, Arc::new(UuidIdGenerator))
    }

    pub fn with_id_generator(config: StoreConfig, ids: Arc<dyn IdGenerator>) -> Self {
        let (updates, _) = watch::channel(StoreSnapshot::default());
        let store = Self {
            session: Session::new(),
            theme: config.theme,
            sidebar_collapsed: false,
            notifications: NotificationLog::new(config.max_notifications),
            agents: unique_by_id(config.seed_agents),
            training_files: Vec::new(),
            ids,
            revision: 0,
            updates,
        };
        store.updates.send_replace(store.snapshot());
        store
    }

    // ===== Reads =====

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            revision: self.revision,
            session: self.session.clone(),
            theme: self.theme.clone(),
            sidebar_collapsed: self.sidebar_collapsed,
            notifications: self.notifications.items().to_vec(),
            unread_count: self.notifications.unread_count(),
            agents: self.agents.clone(),
            training_files: self.training_files.clone(),
        }
    }

    /// Receives a new snapshot after every effective mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.updates.subscribe()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.items()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn training_files(&self) -> &[TrainingFile] {
        &self.training_files
    }

    // ===== Session =====

    /// Sets (or clears, with `None`) the signed-in user.
    pub fn set_user(&mut self, user: Option<User>) -> bool {
        if self.session.user() == user.as_ref() {
            return false;
        }
        match &user {
            Some(u) => info!(user_id = %u.id, "user signed in"),
            None => info!("user cleared"),
        }
        self.session.set_user(user);
        self.publish();
        true
    }

    /// Clears the session and every notification. Idempotent.
    pub fn logout(&mut self) -> bool {
        if !self.session.is_authenticated() && self.notifications.is_empty() {
            return false;
        }
        info!(
            dropped_notifications = self.notifications.len(),
            "user logged out"
        );
        self.session.clear();
        self.notifications.clear();
        self.publish();
        true
    }

    // ===== Notifications =====

    /// Prepends an unread notification and returns its id.
    pub fn add_notification(&mut self, notification: NewNotification) -> String {
        let id = self.fresh_id(|store, id| store.notifications.contains(id));
        debug!(notification_id = %id, kind = %notification.kind, "adding notification");
        let evicted = self
            .notifications
            .push(notification.into_notification(id.clone(), Utc::now()));
        if evicted > 0 {
            debug!(evicted, "notification retention cap reached");
        }
        self.publish();
        id
    }

    /// Marks one notification read. Unknown or already-read ids are no-ops.
    pub fn mark_notification_as_read(&mut self, id: &str) -> bool {
        if !self.notifications.mark_read(id) {
            return false;
        }
        debug!(notification_id = %id, "notification marked read");
        self.publish();
        true
    }

    pub fn clear_notifications(&mut self) -> bool {
        if self.notifications.is_empty() {
            return false;
        }
        debug!(count = self.notifications.len(), "clearing notifications");
        self.notifications.clear();
        self.publish();
        true
    }

    // ===== Theme / layout =====

    pub fn set_theme(&mut self, patch: ThemePatch) -> bool {
        if !self.theme.apply(patch) {
            return false;
        }
        debug!("theme updated");
        self.publish();
        true
    }

    /// Flips the sidebar flag and returns the new collapsed state.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        debug!(collapsed = self.sidebar_collapsed, "sidebar toggled");
        self.publish();
        self.sidebar_collapsed
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) -> bool {
        if self.sidebar_collapsed == collapsed {
            return false;
        }
        self.sidebar_collapsed = collapsed;
        self.publish();
        true
    }

    // ===== Agents =====

    /// Prepends a new agent and returns its id.
    pub fn add_agent(&mut self, agent: NewAgent) -> String {
        let id = self.fresh_id(|store, id| store.agent(id).is_some());
        debug!(agent_id = %id, name = %agent.name, "adding agent");
        self.agents.insert(0, agent.into_agent(id.clone()));
        self.publish();
        id
    }

    /// Flips an agent between online and offline. Unknown ids are no-ops.
    pub fn toggle_agent_status(&mut self, id: &str) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        let previous = agent.status;
        agent.status = previous.toggled();
        debug!(agent_id = %id, from = %previous, to = %agent.status, "agent status toggled");
        self.publish();
        true
    }

    // ===== Training files =====

    pub fn add_training_file(&mut self, file: NewTrainingFile) -> String {
        let id = self.fresh_id(|store, id| store.training_files.iter().any(|f| f.id == id));
        debug!(file_id = %id, kind = %file.kind, "adding training file");
        self.training_files.push(file.into_file(id.clone()));
        self.publish();
        id
    }

    /// Removes a training file. Unknown ids are no-ops.
    pub fn remove_training_file(&mut self, id: &str) -> bool {
        let before = self.training_files.len();
        self.training_files.retain(|f| f.id != id);
        if self.training_files.len() == before {
            return false;
        }
        debug!(file_id = %id, "training file removed");
        self.publish();
        true
    }

    pub fn clear_training_files(&mut self) -> bool {
        if self.training_files.is_empty() {
            return false;
        }
        self.training_files.clear();
        self.publish();
        true
    }

    // ===== Dispatch =====

    /// Applies a [`StoreAction`].
    pub fn dispatch(&mut self, action: StoreAction) -> ActionOutcome {
        debug!(action = action.name(), "dispatching store action");
        match action {
            StoreAction::SetUser { user } => ActionOutcome::changed(self.set_user(user)),
            StoreAction::Logout => ActionOutcome::changed(self.logout()),
            StoreAction::AddNotification { notification } => {
                ActionOutcome::created(self.add_notification(notification))
            }
            StoreAction::MarkNotificationAsRead { id } => {
                ActionOutcome::changed(self.mark_notification_as_read(&id))
            }
            StoreAction::ClearNotifications => ActionOutcome::changed(self.clear_notifications()),
            StoreAction::SetTheme { patch } => ActionOutcome::changed(self.set_theme(patch)),
            StoreAction::ToggleSidebar => {
                self.toggle_sidebar();
                ActionOutcome::changed(true)
            }
            StoreAction::SetSidebarCollapsed { collapsed } => {
                ActionOutcome::changed(self.set_sidebar_collapsed(collapsed))
            }
            StoreAction::AddAgent { agent } => ActionOutcome::created(self.add_agent(agent)),
            StoreAction::ToggleAgentStatus { id } => {
                ActionOutcome::changed(self.toggle_agent_status(&id))
            }
            StoreAction::AddTrainingFile { file } => {
                ActionOutcome::created(self.add_training_file(file))
            }
            StoreAction::RemoveTrainingFile { id } => {
                ActionOutcome::changed(self.remove_training_file(&id))
            }
            StoreAction::ClearTrainingFiles => ActionOutcome::changed(self.clear_training_files()),
        }
    }

    // ===== Internals =====

    /// Draws an id not yet used in the target collection.
    fn fresh_id(&self, taken: impl Fn(&Self, &str) -> bool) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !taken(self, &id) {
                return id;
            }
        }
        loop {
            let id = UuidIdGenerator.next_id();
            if !taken(self, &id) {
                return id;
            }
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.updates.send_replace(self.snapshot());
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl fmt::Debug for AppStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStore")
            .field("revision", &self.revision)
            .field("authenticated", &self.session.is_authenticated())
            .field("notifications", &self.notifications.len())
            .field("unread_count", &self.notifications.unread_count())
            .field("agents", &self.agents.len())
            .field("training_files", &self.training_files.len())
            .finish()
    }
}

/// Keeps the first agent for each id.
fn unique_by_id(agents: Vec<Agent>) -> Vec<Agent> {
    let mut seen = HashSet::new();
    agents
        .into_iter()
        .filter(|agent| {
            let fresh = seen.insert(agent.id.clone());
            if !fresh {
                warn!(agent_id = %agent.id, "duplicate seed agent id ignored");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentStatus;
    use crate::id::SequentialIdGenerator;
    use crate::notification::NotificationKind;

    fn store() -> AppStore {
        AppStore::with_id_generator(
            StoreConfig::default(),
            Arc::new(SequentialIdGenerator::new("")),
        )
    }

    #[test]
    fn test_set_user_and_logout() {
        let mut store = store();
        assert!(store.set_user(Some(User::new("u1", "Dana", "dana@example.com"))));
        assert!(store.is_authenticated());
        store.add_notification(NewNotification::info("hi", ""));

        assert!(store.logout());
        assert!(!store.is_authenticated());
        assert!(store.notifications().is_empty());
        assert_eq!(store.unread_count(), 0);
        assert!(!store.logout());
    }

    #[test]
    fn test_set_same_user_is_noop() {
        let mut store = store();
        let user = User::new("u1", "Dana", "dana@example.com");
        store.set_user(Some(user.clone()));
        let revision = store.revision();
        assert!(!store.set_user(Some(user)));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_add_notification_prepends_unread() {
        let mut store = store();
        let first = store.add_notification(NewNotification::info("one", ""));
        let second = store.add_notification(NewNotification::new(
            NotificationKind::Error,
            "two",
            "boom",
        ));

        assert_ne!(first, second);
        assert_eq!(store.notifications()[0].id, second);
        assert!(store.notifications().iter().all(|n| !n.read));
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn test_generated_ids_skip_seed_ids() {
        let mut store = store();
        let id = store.add_agent(NewAgent::named("Charlie"));
        assert_ne!(id, "1");
        assert_ne!(id, "2");
        assert_eq!(store.agents()[0].id, id);
    }

    #[test]
    fn test_toggle_unknown_agent_is_noop() {
        let mut store = store();
        let revision = store.revision();
        assert!(!store.toggle_agent_status("nope"));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.agent("1").map(|a| a.status), Some(AgentStatus::Online));
    }

    #[test]
    fn test_sidebar() {
        let mut store = store();
        assert!(store.toggle_sidebar());
        assert!(store.is_sidebar_collapsed());
        assert!(!store.set_sidebar_collapsed(true));
        assert!(store.set_sidebar_collapsed(false));
        assert!(!store.is_sidebar_collapsed());
    }

    #[test]
    fn test_training_files() {
        let mut store = store();
        let a = store.add_training_file(NewTrainingFile::pdf("a.pdf", "1 MB"));
        store.add_training_file(NewTrainingFile::url("https://example.com/docs"));
        assert_eq!(store.training_files().len(), 2);

        assert!(store.remove_training_file(&a));
        assert!(!store.remove_training_file(&a));
        assert_eq!(store.training_files().len(), 1);

        assert!(store.clear_training_files());
        assert!(!store.clear_training_files());
    }

    #[test]
    fn test_dispatch_reports_generated_id() {
        let mut store = store();
        let outcome = store.dispatch(StoreAction::AddAgent {
            agent: NewAgent::named("Delta"),
        });
        assert!(outcome.changed);
        let id = outcome.id.unwrap();
        assert_eq!(store.agent(&id).map(|a| a.name.as_str()), Some("Delta"));

        let outcome = store.dispatch(StoreAction::MarkNotificationAsRead { id: "x".into() });
        assert_eq!(outcome, ActionOutcome::changed(false));
    }

    #[test]
    fn test_subscriber_sees_effective_changes_only() {
        let mut store = store();
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        store.toggle_agent_status("missing");
        assert!(!rx.has_changed().unwrap());

        store.toggle_agent_status("1");
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.revision, store.revision());
        assert_eq!(snapshot.agent("1").map(|a| a.status), Some(AgentStatus::Offline));
    }

    #[test]
    fn test_debug_is_summary() {
        let store = store();
        let text = format!("{:?}", store);
        assert!(text.contains("agents: 2"));
    }

    #[test]
    fn test_duplicate_seed_ids_keep_first() {
        let mut config = StoreConfig::empty();
        config.seed_agents = vec![
            NewAgent::named("Alpha").into_agent("a1".into()),
            NewAgent::named("Beta").into_agent("b1".into()),
            NewAgent::named("Alpha copy").into_agent("a1".into()),
        ];
        let mut store =
            AppStore::with_id_generator(config, Arc::new(SequentialIdGenerator::new("")));

        assert_eq!(store.agents().len(), 2);
        assert_eq!(store.agent("a1").map(|a| a.name.as_str()), Some("Alpha"));
        assert!(store.toggle_agent_status("a1"));
        assert_eq!(store.agents().iter().filter(|a| a.id == "a1").count(), 1);
    }
}
