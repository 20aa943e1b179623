//! Session controller: anonymous / pending-confirmation / authenticated.
//!
//! DESIGN
//! ======
//! The provider is the source of truth for who is signed in; this type only
//! mirrors its answers. Transitions:
//!
//! - Anonymous → PendingConfirmation on successful registration
//! - Anonymous → Authenticated on login or a recovered session
//! - Authenticated → Authenticated when an expired token is refreshed
//! - Authenticated → Anonymous on logout (always, even if sign-out fails)
//! - PendingConfirmation → Anonymous on "back to login"
//!
//! Anything else is refused before a remote call is made.

use std::sync::Arc;

use crate::provider::{Credential, Provider, ProviderError, Session, SignUpOutcome};
use crate::session_store::SessionStore;

pub const CONFIRMATION_NOTICE: &str = "Check your email. Please confirm your account before logging in.";
pub const AUTO_CONFIRMED_NOTICE: &str = "Account created and confirmed. You can log in now.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    PendingConfirmation { notice: String },
    Authenticated(Session),
}

impl AuthPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "signed out",
            Self::PendingConfirmation { .. } => "awaiting confirmation",
            Self::Authenticated(_) => "signed in",
        }
    }
}

pub struct SessionController {
    provider: Arc<dyn Provider>,
    store: Arc<dyn SessionStore>,
    phase: AuthPhase,
}

impl SessionController {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>, store: Arc<dyn SessionStore>) -> Self {
        Self { provider, store, phase: AuthPhase::Anonymous }
    }

    #[must_use]
    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            AuthPhase::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.session().map(|s| &s.credential)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Recover a previously stored session and check it with the provider.
    ///
    /// Returns `true` when the controller is now authenticated. An expired
    /// or rejected access token is traded for a new one with the stored
    /// refresh token. A session the provider refuses outright is discarded;
    /// one that could not be checked (network, server error) is kept for the
    /// next start.
    pub async fn restore(&mut self) -> bool {
        if !matches!(self.phase, AuthPhase::Anonymous) {
            return self.is_authenticated();
        }

        let stored = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable, discarding");
                self.forget_stored();
                return false;
            }
        };

        let session = if stored.is_expired_at(now_unix()) {
            tracing::debug!("stored access token expired, refreshing");
            self.renew(&stored).await
        } else {
            match self.provider.get_user(&stored.credential).await {
                Ok(Some(user)) => Renewal::Renewed(Session { user, ..stored }),
                Ok(None) => {
                    tracing::debug!("stored access token rejected, refreshing");
                    self.renew(&stored).await
                }
                Err(e) => Renewal::Unavailable(e),
            }
        };

        match session {
            Renewal::Renewed(session) => {
                tracing::info!(user_id = %session.user.id, "session recovered");
                self.persist(&session);
                self.phase = AuthPhase::Authenticated(session);
                true
            }
            Renewal::Rejected => {
                tracing::info!("stored session rejected by provider");
                self.forget_stored();
                false
            }
            Renewal::Unavailable(e) => {
                tracing::warn!(error = %e, "session recovery failed");
                false
            }
        }
    }

    /// Credential for the next authenticated call, refreshing the session
    /// first when its access token has expired.
    ///
    /// A failed refresh keeps the current credential; the call it is used for
    /// then reports the provider's error.
    pub async fn fresh_credential(&mut self) -> Option<Credential> {
        let current = self.session()?.clone();
        if current.is_expired_at(now_unix()) {
            match self.renew(&current).await {
                Renewal::Renewed(session) => {
                    tracing::info!(user_id = %session.user.id, "session refreshed");
                    self.persist(&session);
                    self.phase = AuthPhase::Authenticated(session);
                }
                Renewal::Rejected => tracing::warn!("refresh token rejected"),
                Renewal::Unavailable(e) => tracing::warn!(error = %e, "session refresh failed"),
            }
        }
        self.credential().cloned()
    }

    /// Register a new account. On success the controller waits for the
    /// user to confirm and returns the notice to show.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged, or `InvalidTransition` when
    /// not anonymous.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<&'static str, AuthError> {
        self.require_anonymous("register")?;

        let outcome = self.provider.sign_up(email, password).await.map_err(|e| {
            tracing::error!(error = %e, "registration failed");
            AuthError::from(e)
        })?;

        let notice = match outcome {
            SignUpOutcome::ConfirmationRequired { .. } => CONFIRMATION_NOTICE,
            SignUpOutcome::AutoConfirmed(_) => AUTO_CONFIRMED_NOTICE,
        };
        tracing::info!("registration accepted");
        self.phase = AuthPhase::PendingConfirmation { notice: notice.to_owned() };
        Ok(notice)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged (state stays anonymous), or
    /// `InvalidTransition` when not anonymous.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        self.require_anonymous("log in")?;

        let session = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "login failed");
                AuthError::from(e)
            })?;

        self.persist(&session);
        tracing::info!(user_id = %session.user.id, "logged in");
        self.phase = AuthPhase::Authenticated(session);
        Ok(())
    }

    /// Sign out. Local state is cleared whatever the provider answers.
    pub async fn logout(&mut self) {
        let phase = std::mem::replace(&mut self.phase, AuthPhase::Anonymous);
        if let AuthPhase::Authenticated(session) = phase {
            if let Err(e) = self.provider.sign_out(&session.credential).await {
                tracing::warn!(error = %e, "sign-out call failed, clearing local session anyway");
            }
        }
        self.forget_stored();
        tracing::info!("logged out");
    }

    /// Leave the confirmation notice and return to the login form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless a confirmation notice is showing.
    pub fn back_to_login(&mut self) -> Result<(), AuthError> {
        if !matches!(self.phase, AuthPhase::PendingConfirmation { .. }) {
            return Err(AuthError::InvalidTransition { action: "go back to login", phase: self.phase.name() });
        }
        self.phase = AuthPhase::Anonymous;
        Ok(())
    }

    fn require_anonymous(&self, action: &'static str) -> Result<(), AuthError> {
        if matches!(self.phase, AuthPhase::Anonymous) {
            Ok(())
        } else {
            Err(AuthError::InvalidTransition { action, phase: self.phase.name() })
        }
    }

    /// Trade the session's refresh token for a new session.
    async fn renew(&self, session: &Session) -> Renewal {
        let Some(refresh_token) = session.refresh_token.as_deref() else {
            return Renewal::Rejected;
        };
        match self.provider.refresh_session(refresh_token).await {
            Ok(fresh) => Renewal::Renewed(fresh),
            Err(ProviderError::Api { status: 400 | 401 | 403, .. }) => Renewal::Rejected,
            Err(e) => Renewal::Unavailable(e),
        }
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn forget_stored(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }
}

/// Outcome of checking or refreshing a session with the provider.
enum Renewal {
    Renewed(Session),
    /// The provider refused the token; the session is dead.
    Rejected,
    /// The provider could not be asked.
    Unavailable(ProviderError),
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
