//! App: form state plus intent routing into the two controllers.
//!
//! DESIGN
//! ======
//! The view never talks to the provider. It emits an [`Intent`], `dispatch`
//! routes it to the session or todo controller, and the next render reads
//! the updated state. Failures become the user-visible `status` line.
//!
//! The new-todo field is cleared after every create attempt, successful or
//! not.

use std::fmt;
use std::sync::Arc;

use crate::provider::{Credential, Provider, TodoId};
use crate::session_store::SessionStore;
use crate::state::{AuthPhase, SessionController, TodoController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }
}

/// Controlled form fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub new_todo: String,
}

// Passwords stay out of logs.
impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("mode", &self.mode)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("new_todo", &self.new_todo)
            .finish()
    }
}

/// A user action emitted by the view.
#[derive(Clone, PartialEq, Eq)]
pub enum Intent {
    SetEmail(String),
    SetPassword(String),
    SetNewTodo(String),
    ToggleAuthMode,
    /// Login or register, depending on the current [`AuthMode`].
    SubmitAuth,
    BackToLogin,
    AddTodo,
    ToggleTodo(TodoId),
    DeleteTodo(TodoId),
    Refresh,
    Logout,
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetEmail(email) => f.debug_tuple("SetEmail").field(email).finish(),
            Self::SetPassword(_) => f.debug_tuple("SetPassword").field(&"<redacted>").finish(),
            Self::SetNewTodo(text) => f.debug_tuple("SetNewTodo").field(text).finish(),
            Self::ToggleAuthMode => f.write_str("ToggleAuthMode"),
            Self::SubmitAuth => f.write_str("SubmitAuth"),
            Self::BackToLogin => f.write_str("BackToLogin"),
            Self::AddTodo => f.write_str("AddTodo"),
            Self::ToggleTodo(id) => f.debug_tuple("ToggleTodo").field(id).finish(),
            Self::DeleteTodo(id) => f.debug_tuple("DeleteTodo").field(id).finish(),
            Self::Refresh => f.write_str("Refresh"),
            Self::Logout => f.write_str("Logout"),
        }
    }
}

pub struct App {
    session: SessionController,
    todos: TodoController,
    form: FormState,
    status: Option<String>,
}

impl App {
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            session: SessionController::new(provider.clone(), store),
            todos: TodoController::new(provider),
            form: FormState::default(),
            status: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    #[must_use]
    pub fn todos(&self) -> &TodoController {
        &self.todos
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Show a message on the next render.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Recover a stored session and load its todos.
    pub async fn start(&mut self) {
        if self.session.restore().await {
            self.load_todos().await;
        }
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        tracing::debug!(?intent, "dispatch");
        match intent {
            Intent::SetEmail(email) => self.form.email = email,
            Intent::SetPassword(password) => self.form.password = password,
            Intent::SetNewTodo(text) => self.form.new_todo = text,
            Intent::ToggleAuthMode => {
                self.form.mode = self.form.mode.toggled();
                self.status = None;
            }
            Intent::SubmitAuth => self.submit_auth().await,
            Intent::BackToLogin => match self.session.back_to_login() {
                Ok(()) => {
                    self.form.mode = AuthMode::Login;
                    self.status = None;
                }
                Err(e) => self.status = Some(e.to_string()),
            },
            Intent::AddTodo => self.add_todo().await,
            Intent::ToggleTodo(id) => self.toggle_todo(&id).await,
            Intent::DeleteTodo(id) => self.delete_todo(&id).await,
            Intent::Refresh => self.load_todos().await,
            Intent::Logout => self.logout().await,
        }
    }

    async fn submit_auth(&mut self) {
        self.status = None;
        let email = self.form.email.trim().to_owned();
        if email.is_empty() || self.form.password.is_empty() {
            self.status = Some("Email and password are required.".to_owned());
            return;
        }

        match self.form.mode {
            AuthMode::Login => match self.session.login(&email, &self.form.password).await {
                Ok(()) => {
                    self.form.password.clear();
                    self.load_todos().await;
                }
                Err(e) => self.status = Some(e.to_string()),
            },
            AuthMode::Register => match self.session.register(&email, &self.form.password).await {
                Ok(_) => self.form.password.clear(),
                Err(e) => self.status = Some(e.to_string()),
            },
        }
    }

    async fn credential(&mut self) -> Option<Credential> {
        self.session.fresh_credential().await
    }

    async fn load_todos(&mut self) {
        let Some(credential) = self.credential().await else {
            return;
        };
        if let Err(e) = self.todos.fetch_all(&credential).await {
            self.status = Some(format!("Could not load todos: {e}"));
        }
    }

    async fn add_todo(&mut self) {
        let Some(credential) = self.credential().await else {
            return;
        };
        let title = std::mem::take(&mut self.form.new_todo);
        match self.todos.create(&credential, &title).await {
            Ok(_) => self.status = None,
            Err(e) => self.status = Some(format!("Could not add todo: {e}")),
        }
    }

    async fn toggle_todo(&mut self, id: &TodoId) {
        let Some(credential) = self.credential().await else {
            return;
        };
        if let Err(e) = self.todos.toggle_complete(&credential, id).await {
            self.status = Some(format!("Could not update todo: {e}"));
        }
    }

    async fn delete_todo(&mut self, id: &TodoId) {
        let Some(credential) = self.credential().await else {
            return;
        };
        if let Err(e) = self.todos.delete(&credential, id).await {
            self.status = Some(format!("Could not remove todo: {e}"));
        }
    }

    async fn logout(&mut self) {
        self.session.logout().await;
        self.todos.clear();
        self.form = FormState { mode: AuthMode::Login, email: self.form.email.clone(), ..FormState::default() };
        self.status = None;
    }

    /// Which screen the current phase maps to.
    #[must_use]
    pub fn phase(&self) -> &AuthPhase {
        self.session.phase()
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
