//! HTTP gateway
//!
//! Talks to a hosted backend exposing a GoTrue-style auth API under
//! `/auth/v1` and a PostgREST-style row API under `/rest/v1`.

use crate::auth::{AuthUser, Credentials, Session, SignUp};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::persist::SessionFile;
use crate::query::{Filter, Query};
use async_trait::async_trait;
use mindcare_model::Collection;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Connection settings for [`HttpGateway`]
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Project URL, without a trailing path
    pub base_url: String,
    /// Public (anon) API key
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Where the signed-in session is kept between runs
    pub session_file: Option<PathBuf>,
}

impl HttpGatewayConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            session_file: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}

/// Which API a response came from; decides how error statuses read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    SignUp,
    Token,
    Logout,
    Rows {
        collection: Collection,
        id: Option<Uuid>,
    },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let mut session = Session::new(
            token.access_token,
            token.user,
            chrono::Duration::seconds(token.expires_in),
        );
        session.refresh_token = token.refresh_token;
        session
    }
}

/// Gateway over a hosted REST backend
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
    store: Option<SessionFile>,
    cached: Mutex<Option<Session>>,
}

impl HttpGateway {
    /// Build the HTTP client
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.trim().is_empty() {
            return Err(GatewayError::Config("gateway URL is empty".to_string()));
        }
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Config("gateway API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| GatewayError::Config(format!("invalid API key: {e}")))?;
        headers.insert("apikey", key);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            store: config.session_file.map(SessionFile::new),
            cached: Mutex::new(None),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rows_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table())
    }

    fn remember(&self, session: &Session) -> Result<(), GatewayError> {
        *self.cached.lock() = Some(session.clone());
        if let Some(store) = &self.store {
            store.save(session)?;
        }
        Ok(())
    }

    fn forget(&self) -> Result<(), GatewayError> {
        *self.cached.lock() = None;
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, endpoint: Endpoint) -> Result<Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = classify(status.as_u16(), &error_message(&body), endpoint);
        tracing::warn!(status = status.as_u16(), error = %err, "gateway request failed");
        Err(err)
    }

    fn rows_request(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, GatewayError> {
        let request = self
            .client
            .post(self.auth_url("signup"))
            .bearer_auth(&self.api_key)
            .json(credentials);
        let body: Value = self.send(request, Endpoint::SignUp).await?.json().await?;
        let signed_up = parse_sign_up(body)?;
        if let Some(session) = &signed_up.session {
            self.remember(session)?;
        }
        tracing::info!(user = %signed_up.user.id, confirmed = signed_up.session.is_some(), "signed up");
        Ok(signed_up)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, GatewayError> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .bearer_auth(&self.api_key)
            .json(credentials);
        let token: TokenResponse = self.send(request, Endpoint::Token).await?.json().await?;
        let session = Session::from(token);
        self.remember(&session)?;
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        self.forget()?;
        let request = self
            .client
            .post(self.auth_url("logout"))
            .bearer_auth(&session.access_token);
        self.send(request, Endpoint::Logout).await?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        let cached = self.cached.lock().clone();
        let session = match cached {
            Some(session) => Some(session),
            None => match &self.store {
                Some(store) => store.load()?,
                None => None,
            },
        };
        let session = session.filter(|s| !s.is_expired());
        *self.cached.lock() = session.clone();
        Ok(session)
    }

    async fn insert(
        &self,
        session: &Session,
        collection: Collection,
        row: Value,
    ) -> Result<Value, GatewayError> {
        let request = self.rows_request(self.client.post(self.rows_url(collection)), session);
        let response = self
            .send(request.json(&row), Endpoint::Rows { collection, id: None })
            .await?;
        let rows: Vec<Value> = response.json().await?;
        inserted_row(rows, collection)
    }

    async fn update(
        &self,
        session: &Session,
        collection: Collection,
        id: Uuid,
        patch: Value,
    ) -> Result<Value, GatewayError> {
        let request = self
            .rows_request(self.client.patch(self.rows_url(collection)), session)
            .query(&[Filter::eq("id", id).to_param()]);
        let response = self
            .send(request.json(&patch), Endpoint::Rows { collection, id: Some(id) })
            .await?;
        let rows: Vec<Value> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or(GatewayError::NotFound { collection, id })
    }

    async fn select(
        &self,
        session: &Session,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .client
            .get(self.rows_url(collection))
            .bearer_auth(&session.access_token)
            .query(&query.to_params());
        let response = self.send(request, Endpoint::Rows { collection, id: None }).await?;
        Ok(response.json().await?)
    }

    async fn count(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<u64, GatewayError> {
        let mut params = vec![("select".to_string(), "id".to_string())];
        params.extend(filters.iter().map(Filter::to_param));
        let request = self
            .client
            .get(self.rows_url(collection))
            .bearer_auth(&session.access_token)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .query(&params);
        let response = self.send(request, Endpoint::Rows { collection, id: None }).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| GatewayError::Rejected {
                status: response.status().as_u16(),
                message: "response carried no row count".to_string(),
            })
    }
}

/// Sign-up answers with a token response when confirmation is off and with
/// the bare user otherwise
fn parse_sign_up(body: Value) -> Result<SignUp, GatewayError> {
    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body)?;
        let user = token.user.clone();
        return Ok(SignUp {
            user,
            session: Some(token.into()),
        });
    }
    let user = match body.get("user") {
        Some(user) => serde_json::from_value(user.clone())?,
        None => serde_json::from_value(body)?,
    };
    Ok(SignUp { user, session: None })
}

/// Row echoed back by an insert
///
/// An empty representation means the row was written but the caller may not
/// read it back.
fn inserted_row(rows: Vec<Value>, collection: Collection) -> Result<Value, GatewayError> {
    rows.into_iter().next().ok_or_else(|| GatewayError::Rejected {
        status: 201,
        message: format!("{} insert returned no visible row", collection.table()),
    })
}

/// Total from a `Content-Range` header such as `0-4/12` or `*/0`
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.parse().ok()
}

/// Best human-readable message from an error body
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map_or_else(|| body.trim().to_string(), str::to_string)
}

fn classify(status: u16, message: &str, endpoint: Endpoint) -> GatewayError {
    match (endpoint, status) {
        (Endpoint::Token, 400 | 401) => GatewayError::InvalidCredentials,
        (Endpoint::SignUp, 400 | 409 | 422) if message.to_lowercase().contains("registered") => {
            GatewayError::AlreadyRegistered(message.to_string())
        }
        (_, 401) => GatewayError::SessionExpired,
        (Endpoint::Rows { .. }, 403) => GatewayError::PolicyViolation(message.to_string()),
        (Endpoint::Rows { collection, id: Some(id) }, 404 | 406) => {
            GatewayError::NotFound { collection, id }
        }
        _ => GatewayError::Rejected {
            status,
            message: message.to_string(),
        },
    }
}
