use std::sync::Arc;
use std::time::Duration;

use shared_types::{AppConfig, AppError};

use crate::api::{AdminApi, AuthApi, ParentApi, StudentApi, TeacherApi};
use crate::bus::EventBus;
use crate::cache::SessionCache;
use crate::clock::{Clock, SystemClock};
use crate::http::HttpClient;
use crate::navigate::{LogNavigator, Navigator};
use crate::notify::{LogNotifier, Notifier};
use crate::realtime::{ReconnectPolicy, RealtimeListener};
use crate::session::Session;
use crate::storage::{KeyValueStore, MemoryStore};

/// Everything a dashboard needs, built once at startup and handed to the
/// controllers.
#[derive(Clone)]
pub struct SchoolClient {
    config: AppConfig,
    http: Arc<HttpClient>,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    auth: AuthApi,
    teacher: TeacherApi,
    student: StudentApi,
    parent: ParentApi,
    admin: AdminApi,
}

impl SchoolClient {
    pub fn builder(config: AppConfig) -> SchoolClientBuilder {
        SchoolClientBuilder::new(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn teacher(&self) -> &TeacherApi {
        &self.teacher
    }

    pub fn student(&self) -> &StudentApi {
        &self.student
    }

    pub fn parent(&self) -> &ParentApi {
        &self.parent
    }

    pub fn admin(&self) -> &AdminApi {
        &self.admin
    }

    /// Start the notification stream, unless disabled in config.
    pub fn start_realtime(&self) -> Option<RealtimeListener> {
        let realtime = &self.config.realtime;
        if !realtime.enabled {
            tracing::info!("realtime updates disabled");
            return None;
        }
        Some(RealtimeListener::spawn(
            self.http.transport().clone(),
            self.http.url(&realtime.path),
            Arc::clone(&self.session),
            self.bus.clone(),
            Arc::clone(&self.notifier),
            ReconnectPolicy::from_config(realtime),
        ))
    }
}

/// Wires the client's collaborators. Anything not supplied gets an
/// in-memory or logging default.
pub struct SchoolClientBuilder {
    config: AppConfig,
    persistent: Option<Arc<dyn KeyValueStore>>,
    scoped: Option<Arc<dyn KeyValueStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    clock: Option<Arc<dyn Clock>>,
    bus: Option<EventBus>,
}

impl SchoolClientBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            persistent: None,
            scoped: None,
            notifier: None,
            navigator: None,
            clock: None,
            bus: None,
        }
    }

    pub fn persistent_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.persistent = Some(store);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.scoped = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn build(self) -> Result<SchoolClient, AppError> {
        let persistent = self
            .persistent
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let scoped = self.scoped.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let bus = self.bus.unwrap_or_default();

        let session = Arc::new(Session::new(persistent, Arc::clone(&scoped)));
        let http = Arc::new(HttpClient::new(
            &self.config.api,
            Arc::clone(&session),
            Arc::clone(&notifier),
            Arc::clone(&navigator),
        )?);
        let cache = Arc::new(SessionCache::new(
            scoped,
            Arc::clone(&clock),
            Duration::from_secs(self.config.cache.stats_ttl_secs),
        ));

        tracing::info!(base_url = http.base_url(), "school client ready");

        Ok(SchoolClient {
            auth: AuthApi::new(Arc::clone(&http), Arc::clone(&navigator)),
            teacher: TeacherApi::new(Arc::clone(&http), cache, Arc::clone(&clock)),
            student: StudentApi::new(Arc::clone(&http)),
            parent: ParentApi::new(Arc::clone(&http)),
            admin: AdminApi::new(Arc::clone(&http)),
            config: self.config,
            http,
            session,
            notifier,
            navigator,
            clock,
            bus,
        })
    }
}
