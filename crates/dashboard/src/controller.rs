//! Tab controller shared by every dashboard.
//!
//! A [`Page`] says which tabs exist and how to load each one; the
//! [`Controller`] owns the tab state machine, the loading markers and the
//! error policy. Loads never fail outward: errors are logged, surfaced as a
//! notice where the HTTP layer has not already done so, and the tab keeps
//! showing an empty state.

use std::future::Future;
use std::sync::Arc;

use client::Notifier;
use parking_lot::Mutex;
use shared_types::{AppError, RealtimeEvent};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::pages::present_error;
use crate::render::Content;
use crate::tabs::{TabKind, TabState};
use crate::view::View;

pub trait Page: Send + Sync {
    type Tab: TabKind;

    fn name(&self) -> &'static str;

    /// Fetch and format the content of one tab.
    fn load(&self, tab: Self::Tab) -> impl Future<Output = Result<Content, AppError>> + Send;

    fn empty_message(&self, tab: Self::Tab) -> &'static str;

    /// Whether `tab` shows data the event may have changed.
    fn is_related(&self, tab: Self::Tab, event: &RealtimeEvent) -> bool;

    /// Hook run for every pushed event before any refresh, e.g. to drop
    /// cached aggregates.
    fn on_event(&self, _event: &RealtimeEvent) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Rendered(usize),
    Empty,
    /// A newer activation started while this load was in flight; its
    /// result was dropped.
    Stale,
    Failed(AppError),
}

pub struct Controller<P: Page> {
    page: P,
    view: Arc<dyn View>,
    notifier: Arc<dyn Notifier>,
    tabs: Mutex<TabState<P::Tab>>,
}

impl<P: Page> Controller<P> {
    /// `query` is the page's URL query, which may select the initial tab.
    pub fn new(
        page: P,
        view: Arc<dyn View>,
        notifier: Arc<dyn Notifier>,
        query: Option<&str>,
    ) -> Self {
        Self {
            page,
            view,
            notifier,
            tabs: Mutex::new(TabState::from_query(query)),
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn current_tab(&self) -> P::Tab {
        self.tabs.lock().current()
    }

    /// Show and load the initial tab.
    pub async fn start(&self) -> LoadOutcome {
        let tab = self.current_tab();
        self.activate(tab).await
    }

    /// Activate `tab`, deactivating every other one, and load it. Activating
    /// the current tab reloads it into the same state.
    #[tracing::instrument(skip(self), fields(page = self.page.name()))]
    pub async fn activate(&self, tab: P::Tab) -> LoadOutcome {
        let generation = self.tabs.lock().activate(tab);
        for other in P::Tab::ALL {
            self.view.set_tab_active(other.id(), *other == tab);
        }
        self.load(tab, generation).await
    }

    /// Activate a tab by its id; unknown ids are ignored.
    pub async fn activate_id(&self, id: &str) -> Option<LoadOutcome> {
        match P::Tab::parse(id) {
            Some(tab) => Some(self.activate(tab).await),
            None => {
                tracing::warn!(page = self.page.name(), tab = id, "unknown tab");
                None
            }
        }
    }

    /// Reload the current tab without touching the tab buttons.
    pub async fn refresh(&self) -> LoadOutcome {
        let (tab, generation) = {
            let mut tabs = self.tabs.lock();
            (tabs.current(), tabs.bump())
        };
        self.load(tab, generation).await
    }

    async fn load(&self, tab: P::Tab, generation: u64) -> LoadOutcome {
        let region = tab.id();
        self.view.set_loading(region, true);
        self.view.render(region, Content::placeholder());

        let result = self.page.load(tab).await;

        let current = {
            let tabs = self.tabs.lock();
            (tabs.is_current(generation), tabs.current())
        };
        match current {
            (true, _) => {}
            (false, now) => {
                tracing::debug!(
                    page = self.page.name(),
                    tab = region,
                    generation,
                    "discarding stale tab load"
                );
                // The newer load owns the marker when it targets the same tab.
                if now != tab {
                    self.view.set_loading(region, false);
                }
                return LoadOutcome::Stale;
            }
        }

        self.view.set_loading(region, false);
        match result {
            Ok(content) if content.is_empty() => {
                self.view
                    .render(region, Content::Empty(self.page.empty_message(tab).to_string()));
                LoadOutcome::Empty
            }
            Ok(content) => {
                let items = content.item_count();
                self.view.render(region, content);
                LoadOutcome::Rendered(items)
            }
            Err(err) => {
                tracing::warn!(
                    page = self.page.name(),
                    tab = region,
                    error = %err,
                    "tab load failed"
                );
                // Transport and HTTP failures were already surfaced by the client.
                present_error(self.notifier.as_ref(), &err);
                self.view
                    .render(region, Content::Empty(self.page.empty_message(tab).to_string()));
                LoadOutcome::Failed(err)
            }
        }
    }

    /// React to a pushed event: always tell the user, and reload the current
    /// tab only when it shows related data. Returns whether a reload ran.
    pub async fn handle_event(&self, event: &RealtimeEvent) -> bool {
        self.page.on_event(event);
        self.notifier.info(&event.summary());
        let tab = self.current_tab();
        if !self.page.is_related(tab, event) {
            tracing::debug!(
                page = self.page.name(),
                tab = tab.id(),
                kind = ?event.kind(),
                "event not related to active tab"
            );
            return false;
        }
        self.refresh().await;
        true
    }

    /// Consume events until the bus closes.
    pub async fn run_events(&self, mut events: broadcast::Receiver<RealtimeEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_event(&event).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(page = self.page.name(), skipped, "event consumer lagged");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(page = self.page.name(), "event bus closed");
                    break;
                }
            }
        }
    }
}
