//! Provider: the backend-as-a-service seam.
//!
//! DESIGN
//! ======
//! Auth and todo storage live entirely on the provider. The client never
//! holds a global handle: a `SupabaseClient` is built once in `main` and
//! handed to both controllers as `Arc<dyn Provider>`, so tests can swap in
//! a mock. The credential is an explicit argument on every call that needs
//! one instead of hidden client state.

pub mod client;
pub mod types;

pub use client::SupabaseClient;
pub use types::{Credential, ProviderError, Session, SignUpOutcome, TodoId, TodoItem, User};

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Auth endpoints plus the four todo procedures. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Register a new email/password account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ProviderError>;

    /// Exchange email/password for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Trade a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError>;

    /// Revoke the session behind `credential`.
    async fn sign_out(&self, credential: &Credential) -> Result<(), ProviderError>;

    /// Resolve the user behind `credential`. `Ok(None)` when the provider
    /// no longer accepts the token.
    async fn get_user(&self, credential: &Credential) -> Result<Option<User>, ProviderError>;

    /// `select_todo()` returns every row visible to the user, in server order.
    async fn select_todo(&self, credential: &Credential) -> Result<Vec<TodoItem>, ProviderError>;

    /// `insert_todo(p_title)` returns the created row.
    async fn insert_todo(&self, credential: &Credential, title: &str) -> Result<TodoItem, ProviderError>;

    /// `toggle_todo(p_id)` returns the updated row.
    async fn toggle_todo(&self, credential: &Credential, id: &TodoId) -> Result<TodoItem, ProviderError>;

    /// `delete_todo(p_id)`.
    async fn delete_todo(&self, credential: &Credential, id: &TodoId) -> Result<(), ProviderError>;
}
