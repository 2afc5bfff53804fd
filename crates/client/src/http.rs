//! Request/response plumbing shared by every API client.
//!
//! [`HttpClient::send`] attaches the bearer token, bounds the whole exchange
//! by the configured timeout and classifies the outcome. Authentication
//! failures clear the stored credentials and send the user to the login
//! page. Every failure is surfaced once through the [`Notifier`], except
//! application errors carrying a `code`, which the caller presents.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{ApiConfig, AppError, UploadFile};
use uuid::Uuid;

use crate::navigate::{Navigator, Route};
use crate::notify::{Notice, Notifier};
use crate::session::Session;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<(String, UploadFile)>,
    },
}

impl Body {
    /// Whether the transport sets its own content type for this body.
    fn sets_own_content_type(&self) -> bool {
        matches!(self, Body::Form(_) | Body::Multipart { .. })
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
    /// Attach the bearer token; off for the login endpoints.
    pub authenticated: bool,
    encode_error: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
            authenticated: true,
            encode_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// JSON body. A value that cannot be serialized fails the request when
    /// it is sent.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Body::Json(value),
            Err(e) => self.encode_error = Some(e.to_string()),
        }
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Body::Form(pairs);
        self
    }

    pub fn multipart(
        mut self,
        fields: Vec<(String, String)>,
        files: Vec<(String, UploadFile)>,
    ) -> Self {
        self.body = Body::Multipart { fields, files };
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// JSON when the server says so, raw text otherwise. An empty JSON body
    /// reads as `null`.
    pub fn from_body(content_type: Option<&str>, body: String) -> Result<Self, AppError> {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        if !is_json {
            return Ok(ApiResponse::Text(body));
        }
        if body.trim().is_empty() {
            return Ok(ApiResponse::Json(Value::Null));
        }
        serde_json::from_str(&body)
            .map(ApiResponse::Json)
            .map_err(|e| AppError::decode(format!("Malformed JSON response: {e}")))
    }

    /// Parse into a typed record.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AppError> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| AppError::decode(format!("Unexpected response format: {e}"))),
            ApiResponse::Text(text) => serde_json::from_str(&text)
                .map_err(|_| AppError::decode("Expected a JSON response")),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Text(text) => Value::String(text),
        }
    }
}

/// HTTP client bound to one backend and one session.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl HttpClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let inner = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            session,
            notifier,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Underlying transport, shared with the realtime listener.
    pub fn transport(&self) -> &reqwest::Client {
        &self.inner
    }

    /// Issue a request and classify the response.
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let anonymous = !request.authenticated;
        let result = self.exchange(request).await;
        if let Err(err) = &result {
            self.report(err, anonymous);
        }
        result
    }

    /// Send and decode into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, AppError> {
        let response = self.send(request).await?;
        response.decode().inspect_err(|err| self.report(err, false))
    }

    /// Send and ignore the body.
    pub async fn execute(&self, request: ApiRequest) -> Result<(), AppError> {
        self.send(request).await.map(|_| ())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.fetch(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(ApiRequest::post(path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(ApiRequest::put(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.execute(ApiRequest::delete(path)).await
    }

    async fn exchange(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        if let Some(e) = &request.encode_error {
            return Err(AppError::bad_request(format!("Could not encode request: {e}")));
        }

        let token = if request.authenticated {
            match self.session.token() {
                Some(token) => Some(token),
                None => {
                    tracing::warn!("no stored token, redirecting to login");
                    self.expire_session();
                    return Err(AppError::unauthorized("Please log in to continue"));
                }
            }
        } else {
            None
        };

        let method = request.method.clone();
        let path = request.path.clone();
        let authenticated = request.authenticated;
        let builder = self.build(request, token.as_deref())?;

        let exchange = async {
            let response = builder.send().await.map_err(transport_error)?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.map_err(transport_error)?;
            Ok::<_, AppError>((status, content_type, body))
        };

        let (status, content_type, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                AppError::timeout(format!(
                    "Request timed out after {}s: {} {}",
                    self.timeout.as_secs(),
                    method,
                    path
                ))
            })??;

        let auth_rejected = status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;
        if auth_rejected && authenticated {
            tracing::warn!(status = status.as_u16(), "authentication rejected");
            self.expire_session();
            return Err(AppError::from_status(
                status.as_u16(),
                &body,
                method.as_str(),
                &path,
            ));
        }

        if !status.is_success() {
            return Err(AppError::from_status(
                status.as_u16(),
                &body,
                method.as_str(),
                &path,
            ));
        }

        tracing::debug!(status = status.as_u16(), "request succeeded");
        ApiResponse::from_body(content_type.as_deref(), body)
    }

    fn build(
        &self,
        request: ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, AppError> {
        let mut builder = self
            .inner
            .request(request.method, self.url(&request.path))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if !request.body.sets_own_content_type() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.body(value.to_string()),
            Body::Form(pairs) => builder.form(&pairs),
            Body::Multipart { fields, files } => builder.multipart(multipart_form(fields, files)?),
        };
        Ok(builder)
    }

    fn expire_session(&self) {
        self.session.clear_credentials();
        self.navigator.navigate(Route::Login);
    }

    fn report(&self, err: &AppError, anonymous: bool) {
        if err.code.is_some() {
            tracing::info!(error = %err, code = ?err.code, "application error left to caller");
            return;
        }
        tracing::warn!(error = %err, "request failed");
        // Login rejections carry the server's own wording.
        let text = if anonymous && err.kind.is_auth() {
            err.message.clone()
        } else {
            err.friendly_message()
        };
        self.notifier.notify(Notice::error(text));
    }
}

fn multipart_form(
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadFile)>,
) -> Result<Form, AppError> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for (name, file) in files {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime_type)
            .map_err(|e| AppError::bad_request(format!("Invalid file type: {e}")))?;
        form = form.part(name, part);
    }
    Ok(form)
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::timeout(e.to_string())
    } else if e.is_decode() || e.is_body() {
        AppError::network(format!("Failed to read response: {e}"))
    } else {
        AppError::network(e.to_string())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
