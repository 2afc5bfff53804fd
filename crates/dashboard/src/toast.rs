use std::sync::Arc;

use chrono::{DateTime, Utc};
use client::{Clock, Notice, Notifier};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    notice: Notice,
    expires_at: DateTime<Utc>,
}

/// On-screen notices that dismiss themselves once their duration passes.
pub struct ToastTray {
    clock: Arc<dyn Clock>,
    toasts: Mutex<Vec<Toast>>,
}

impl ToastTray {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            toasts: Mutex::new(Vec::new()),
        }
    }

    /// Notices still on screen, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Notice> {
        let now = self.clock.now();
        let mut toasts = self.toasts.lock();
        toasts.retain(|t| t.expires_at > now);
        toasts.iter().map(|t| t.notice.clone()).collect()
    }

    /// Dismiss the notice at `index` of [`ToastTray::active`] early.
    pub fn dismiss(&self, index: usize) {
        let mut toasts = self.toasts.lock();
        if index < toasts.len() {
            toasts.remove(index);
        }
    }
}

impl Notifier for ToastTray {
    fn notify(&self, notice: Notice) {
        let expires_at = chrono::Duration::from_std(notice.duration)
            .map(|d| self.clock.now() + d)
            .unwrap_or_else(|_| self.clock.now());
        tracing::debug!(level = ?notice.level, text = %notice.message, "toast");
        self.toasts.lock().push(Toast { notice, expires_at });
    }
}
