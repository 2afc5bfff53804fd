use parking_lot::Mutex;
use shared_types::UserRole;

pub const LOGIN_PATH: &str = "/html/login.html";

/// Top-level destinations the client can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard(UserRole),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Dashboard(role) => role.dashboard_path(),
        }
    }
}

/// Page navigation performed by the host.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Logs navigation requests without acting on them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(path = route.path(), "navigate");
    }
}

/// Records every navigation, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes.lock().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}
