//! Supabase-compatible HTTP client.
//!
//! Auth goes to GoTrue under `/auth/v1`, the todo procedures go to PostgREST
//! under `/rest/v1/rpc/{name}`. Every request carries the public `apikey`
//! header; the bearer is the caller's access token when there is one and
//! the public key otherwise.

use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Provider;
use super::types::{Credential, ProviderError, Session, SignUpOutcome, TodoId, TodoItem, User};
use crate::config::{AppConfig, Timeouts};

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Build a client for `base_url` authenticated with the public `anon_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, anon_key: String, timeouts: Timeouts) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), anon_key })
    }

    /// Build a client from parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(&config.supabase_url, config.anon_key.clone(), config.timeouts)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&Credential>,
        body: Option<&Value>,
    ) -> Result<(u16, String), ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let token = bearer.map_or(self.anon_key.as_str(), |c| c.access_token.as_str());
        let mut request = self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok((status, text))
    }

    /// Send and turn any non-2xx status into [`ProviderError::Api`].
    async fn send_ok(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&Credential>,
        body: Option<&Value>,
    ) -> Result<String, ProviderError> {
        let (status, text) = self.send(method, path, bearer, body).await?;
        if !(200..300).contains(&status) {
            return Err(ProviderError::Api { status, message: error_message(status, &text) });
        }
        Ok(text)
    }

    async fn rpc(&self, name: &str, credential: &Credential, args: &Value) -> Result<String, ProviderError> {
        let path = format!("/rest/v1/rpc/{name}");
        self.send_ok(Method::POST, &path, Some(credential), Some(args))
            .await
    }
}

#[async_trait::async_trait]
impl Provider for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ProviderError> {
        let body = serde_json::to_value(PasswordBody { email, password }).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let text = self
            .send_ok(Method::POST, "/auth/v1/signup", None, Some(&body))
            .await?;
        parse_sign_up(&text)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let body = serde_json::to_value(PasswordBody { email, password }).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let text = self
            .send_ok(Method::POST, "/auth/v1/token?grant_type=password", None, Some(&body))
            .await?;
        parse_session(&text)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let text = self
            .send_ok(Method::POST, "/auth/v1/token?grant_type=refresh_token", None, Some(&body))
            .await?;
        parse_session(&text)
    }

    async fn sign_out(&self, credential: &Credential) -> Result<(), ProviderError> {
        self.send_ok(Method::POST, "/auth/v1/logout", Some(credential), None)
            .await?;
        Ok(())
    }

    async fn get_user(&self, credential: &Credential) -> Result<Option<User>, ProviderError> {
        let (status, text) = self
            .send(Method::GET, "/auth/v1/user", Some(credential), None)
            .await?;
        match status {
            200..=299 => serde_json::from_str::<User>(&text)
                .map(Some)
                .map_err(|e| ProviderError::Parse(e.to_string())),
            401 | 403 => Ok(None),
            _ => Err(ProviderError::Api { status, message: error_message(status, &text) }),
        }
    }

    async fn select_todo(&self, credential: &Credential) -> Result<Vec<TodoItem>, ProviderError> {
        let text = self
            .rpc("select_todo", credential, &serde_json::json!({}))
            .await?;
        parse_rows(&text)
    }

    async fn insert_todo(&self, credential: &Credential, title: &str) -> Result<TodoItem, ProviderError> {
        let text = self
            .rpc("insert_todo", credential, &serde_json::json!({ "p_title": title }))
            .await?;
        parse_single_row("insert_todo", &text)
    }

    async fn toggle_todo(&self, credential: &Credential, id: &TodoId) -> Result<TodoItem, ProviderError> {
        let text = self
            .rpc("toggle_todo", credential, &serde_json::json!({ "p_id": id }))
            .await?;
        parse_single_row("toggle_todo", &text)
    }

    async fn delete_todo(&self, credential: &Credential, id: &TodoId) -> Result<(), ProviderError> {
        self.rpc("delete_todo", credential, &serde_json::json!({ "p_id": id }))
            .await?;
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct PasswordBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: User,
}

impl From<TokenResponse> for Session {
    fn from(resp: TokenResponse) -> Self {
        let expires_at = resp.expires_at.or_else(|| {
            resp.expires_in
                .map(|secs| time::OffsetDateTime::now_utc().unix_timestamp() + secs)
        });
        Self {
            user: resp.user,
            credential: Credential::new(resp.access_token),
            refresh_token: resp.refresh_token,
            expires_at,
        }
    }
}

/// Error body fields used by GoTrue (`msg`, `error_description`, `error`)
/// and PostgREST (`message`).
#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a token-grant response into a session.
pub(crate) fn parse_session(text: &str) -> Result<Session, ProviderError> {
    serde_json::from_str::<TokenResponse>(text)
        .map(Session::from)
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Sign-up answers with a full session when the project auto-confirms and
/// with the bare user object when a confirmation mail went out.
pub(crate) fn parse_sign_up(text: &str) -> Result<SignUpOutcome, ProviderError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))?;
    if value.get("access_token").is_some() {
        let resp: TokenResponse = serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        return Ok(SignUpOutcome::AutoConfirmed(resp.into()));
    }
    let user = serde_json::from_value::<User>(value).ok();
    Ok(SignUpOutcome::ConfirmationRequired { user })
}

pub(crate) fn parse_rows(text: &str) -> Result<Vec<TodoItem>, ProviderError> {
    serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Procedures declared `RETURNS SETOF` come back as an array; take the
/// first row. A plain object is accepted too.
pub(crate) fn parse_single_row(procedure: &'static str, text: &str) -> Result<TodoItem, ProviderError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ProviderError::Parse(e.to_string()))?;
    let row = match value {
        Value::Array(mut rows) => {
            if rows.is_empty() {
                return Err(ProviderError::EmptyResponse(procedure));
            }
            rows.swap_remove(0)
        }
        other => other,
    };
    serde_json::from_value(row).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Pull the provider's own message out of an error body, falling back to
/// the raw body and then the status code.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() { format!("request failed with status {status}") } else { trimmed.to_owned() }
        })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
