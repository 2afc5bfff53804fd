use std::sync::Arc;

use shared_types::{AppError, Credentials, NewPerson, TokenResponse, User, UserRole};

use crate::http::{ApiRequest, HttpClient};
use crate::navigate::{Navigator, Route};

/// Code on the error returned when the token response names no known role.
pub const UNKNOWN_ROLE: &str = "unknown_role";

/// Login, logout and the current account.
#[derive(Clone)]
pub struct AuthApi {
    http: Arc<HttpClient>,
    navigator: Arc<dyn Navigator>,
}

impl AuthApi {
    pub fn new(http: Arc<HttpClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self { http, navigator }
    }

    /// Exchange credentials for a token and store it. Returns the role the
    /// backend reported; an unknown role is an error and nothing is stored.
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(
        &self,
        credentials: &Credentials,
        remember: bool,
    ) -> Result<UserRole, AppError> {
        credentials.check()?;
        let request = ApiRequest::post("/auth/token").anonymous().form(vec![
            ("username".to_string(), credentials.email.trim().to_string()),
            ("password".to_string(), credentials.password.clone()),
        ]);
        let token: TokenResponse = self.http.fetch(request).await?;
        let role = token.role().ok_or_else(|| {
            AppError::bad_request("Invalid user role received from server").with_code(UNKNOWN_ROLE)
        })?;
        self.http
            .session()
            .store_login(&token, credentials.email.trim(), remember);
        tracing::info!(role = role.as_str(), "login succeeded");
        Ok(role)
    }

    /// `/auth/me`, cached in the session on success.
    pub async fn me(&self) -> Result<User, AppError> {
        let user: User = self.http.get("/auth/me").await?;
        self.http.session().set_current_user(&user);
        Ok(user)
    }

    /// Current user from the session cache, falling back to `/auth/me`.
    pub async fn current_user(&self) -> Result<User, AppError> {
        match self.http.session().current_user() {
            Some(user) => Ok(user),
            None => self.me().await,
        }
    }

    pub async fn register(&self, person: NewPerson, role: UserRole) -> Result<User, AppError> {
        person.check()?;
        if person.password.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(AppError::field("password", "Password is required"));
        }
        let mut person = person;
        person.role = Some(role.as_str().to_string());
        self.http
            .fetch(ApiRequest::post("/auth/register").anonymous().json(&person))
            .await
    }

    /// Forget the session locally and return to the login page.
    pub fn logout(&self) {
        self.http.session().clear_credentials();
        self.navigator.navigate(Route::Login);
    }

    pub fn is_authenticated(&self) -> bool {
        self.http.session().is_authenticated()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.http.session().role()
    }
}
