//! Provider types: sessions, users, todo rows and errors.
//!
//! Wire shapes follow the GoTrue auth API and the PostgREST rows returned by
//! the `*_todo` procedures. Everything here is provider-neutral enough that
//! the controllers never see raw JSON.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request never produced a response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status. `message` is the
    /// provider's own wording and is shown to the user as-is.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A procedure that must return a row returned an empty set.
    #[error("{0} returned no rows")]
    EmptyResponse(&'static str),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// AUTH
// =============================================================================

/// Bearer credential attached to every authenticated call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
}

impl Credential {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into() }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Identity of the signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session issued by the provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub credential: Credential,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds at which the access token expires, when known.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("credential", &self.credential)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Session {
    /// Seconds before `expires_at` at which the access token is treated as
    /// already expired.
    pub const EXPIRY_MARGIN_SECS: i64 = 60;

    /// Whether the access token is expired, or about to be, at unix time `now`.
    /// Sessions without a known expiry never count as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|at| at <= now + Self::EXPIRY_MARGIN_SECS)
    }
}

/// Result of a successful sign-up call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The provider sent a confirmation link; no session was issued.
    ConfirmationRequired { user: Option<User> },
    /// The provider auto-confirmed the account and issued a session.
    AutoConfirmed(Session),
}

// =============================================================================
// TODO ROWS
// =============================================================================

/// Provider-assigned row identifier.
///
/// Opaque to the client: it is read from rows and sent back as `p_id`
/// exactly as received, whether the table keys on a UUID, text or an
/// integer sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TodoId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<Uuid> for TodoId {
    fn from(id: Uuid) -> Self {
        Self::Text(id.to_string())
    }
}

/// One todo row, as returned by `select_todo`, `insert_todo` and `toggle_todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
