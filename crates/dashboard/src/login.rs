use std::sync::Arc;

use client::{Route, SchoolClient};
use shared_types::{AppError, Credentials, UserRole};

use crate::pages::present_error;
use crate::view::View;

pub const LOGIN_FORM: &str = "login";

/// Login page behaviour.
pub struct LoginController {
    client: SchoolClient,
    view: Arc<dyn View>,
}

impl LoginController {
    pub fn new(client: SchoolClient, view: Arc<dyn View>) -> Self {
        Self { client, view }
    }

    /// Called when the page opens. A signed-in user goes straight to their
    /// dashboard; otherwise a remembered email is filled in. Returns the
    /// role redirected to, if any.
    pub fn start(&self) -> Option<UserRole> {
        let session = self.client.session();
        if session.is_authenticated() {
            if let Some(role) = session.role() {
                tracing::debug!(role = role.as_str(), "already signed in");
                self.client.navigator().navigate(Route::Dashboard(role));
                return Some(role);
            }
        }
        if let Some(email) = session.remembered_email() {
            self.view.set_field_value(LOGIN_FORM, "email", &email);
            self.view.set_field_value(LOGIN_FORM, "remember", "true");
        }
        None
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn submit(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<UserRole, AppError> {
        self.view.clear_field_errors(LOGIN_FORM);
        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        match self.client.auth().login(&credentials, remember).await {
            Ok(role) => {
                self.client.notifier().success("Login successful! Redirecting...");
                self.client.navigator().navigate(Route::Dashboard(role));
                Ok(role)
            }
            Err(err) => {
                for (field, message) in &err.field_errors {
                    self.view.set_field_error(LOGIN_FORM, field, message);
                }
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    pub fn logout(&self) {
        self.client.auth().logout();
    }
}
