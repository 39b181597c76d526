use super::Notification;

/// Most-recent-first notification list with an unread counter.
///
/// The counter is maintained incrementally. Every mutation keeps
/// `unread_count == items.iter().filter(|n| !n.read).count()`.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    items: Vec<Notification>,
    unread_count: usize,
    /// Retention cap; 0 means unbounded.
    max_len: usize,
}

impl NotificationLog {
    pub fn new(max_len: usize) -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            max_len,
        }
    }

    // ===== Getters =====

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    // ===== Mutations =====

    /// Prepends an unread notification and evicts the oldest entries beyond the cap.
    ///
    /// Returns the number of evicted entries.
    pub fn push(&mut self, notification: Notification) -> usize {
        debug_assert!(!notification.read);
        self.items.insert(0, notification);
        self.unread_count += 1;

        let mut evicted = 0;
        while self.max_len > 0 && self.items.len() > self.max_len {
            if let Some(oldest) = self.items.pop() {
                if !oldest.read {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
                evicted += 1;
            }
        }
        evicted
    }

    /// Marks a notification read. Returns false when absent or already read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.unread_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NewNotification;
    use chrono::Utc;

    fn note(id: &str) -> Notification {
        NewNotification::info(format!("title {}", id), "").into_notification(id.to_string(), Utc::now())
    }

    fn recount(log: &NotificationLog) -> usize {
        log.items().iter().filter(|n| !n.read).count()
    }

    #[test]
    fn test_push_prepends() {
        let mut log = NotificationLog::new(0);
        log.push(note("a"));
        log.push(note("b"));
        assert_eq!(log.items()[0].id, "b");
        assert_eq!(log.unread_count(), 2);
    }

    #[test]
    fn test_mark_read_twice_counts_once() {
        let mut log = NotificationLog::new(0);
        log.push(note("a"));
        log.push(note("b"));
        assert!(log.mark_read("a"));
        assert!(!log.mark_read("a"));
        assert_eq!(log.unread_count(), 1);
        assert_eq!(recount(&log), 1);
    }

    #[test]
    fn test_mark_read_missing_is_noop() {
        let mut log = NotificationLog::new(0);
        assert!(!log.mark_read("ghost"));
        assert_eq!(log.unread_count(), 0);
    }

    #[test]
    fn test_cap_evicts_oldest_and_keeps_counter() {
        let mut log = NotificationLog::new(2);
        log.push(note("a"));
        log.push(note("b"));
        log.mark_read("b");
        let evicted = log.push(note("c"));

        assert_eq!(evicted, 1);
        assert_eq!(log.len(), 2);
        assert!(!log.contains("a"));
        assert_eq!(log.unread_count(), 1);
        assert_eq!(recount(&log), 1);
    }

    #[test]
    fn test_evicting_read_entry_keeps_counter() {
        let mut log = NotificationLog::new(1);
        log.push(note("a"));
        log.mark_read("a");
        log.push(note("b"));
        assert_eq!(log.unread_count(), 1);
        assert_eq!(recount(&log), 1);
    }

    #[test]
    fn test_clear_resets() {
        let mut log = NotificationLog::new(0);
        log.push(note("a"));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.unread_count(), 0);
    }
}
