//! View renderer: pure mapping from app state to a screen.
//!
//! Three mutually exclusive screens: the confirmation notice, the
//! login/register form, and the todo list. `render` never mutates anything;
//! `Display` turns a screen into terminal text.

use std::fmt;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::{App, AuthMode};
use crate::provider::TodoItem;
use crate::state::AuthPhase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    /// 1-based position, used by `toggle <n>` and `rm <n>`.
    pub index: usize,
    pub title: String,
    pub completed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Confirmation { notice: String },
    Auth { mode: AuthMode, email: String, status: Option<String> },
    Todos { email: Option<String>, rows: Vec<TodoRow>, new_todo: String, status: Option<String> },
}

#[must_use]
pub fn render(app: &App) -> Screen {
    let status = app.status().map(str::to_owned);
    match app.phase() {
        AuthPhase::PendingConfirmation { notice } => Screen::Confirmation { notice: notice.clone() },
        AuthPhase::Anonymous => Screen::Auth { mode: app.form().mode, email: app.form().email.clone(), status },
        AuthPhase::Authenticated(session) => Screen::Todos {
            email: session.user.email.clone(),
            rows: app
                .todos()
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| todo_row(i + 1, item))
                .collect(),
            new_todo: app.form().new_todo.clone(),
            status,
        },
    }
}

fn todo_row(index: usize, item: &TodoItem) -> TodoRow {
    TodoRow { index, title: item.title.clone(), completed: item.completed, created_at: format_timestamp(item.created_at) }
}

/// `YYYY-MM-DD HH:MM UTC`.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let utc = ts.to_offset(time::UtcOffset::UTC);
    match utc.format(&format) {
        Ok(text) => format!("{text} UTC"),
        Err(_) => utc.to_string(),
    }
}

// =============================================================================
// TERMINAL TEXT
// =============================================================================

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmation { notice } => {
                writeln!(f, "== Check your email ==")?;
                writeln!(f, "{notice}")?;
                write!(f, "commands: back (return to login) | quit")
            }
            Self::Auth { mode, email, status } => {
                let (title, other) = match mode {
                    AuthMode::Login => ("Login", "Need an account? `mode` to register"),
                    AuthMode::Register => ("Register", "Already have an account? `mode` to log in"),
                };
                writeln!(f, "== {title} ==")?;
                if !email.is_empty() {
                    writeln!(f, "email: {email}")?;
                }
                writeln!(f, "{other}")?;
                if let Some(status) = status {
                    writeln!(f, "! {status}")?;
                }
                let verb = if *mode == AuthMode::Login { "login" } else { "register" };
                write!(f, "commands: {verb} <email> <password> | mode | help | quit")
            }
            Self::Todos { email, rows, new_todo, status } => {
                match email {
                    Some(email) => writeln!(f, "== Your Todos ({email}) ==")?,
                    None => writeln!(f, "== Your Todos ==")?,
                }
                if rows.is_empty() {
                    writeln!(f, "  (nothing yet)")?;
                }
                for row in rows {
                    let check = if row.completed { "x" } else { " " };
                    let title = if row.completed { strike(&row.title) } else { row.title.clone() };
                    writeln!(f, "{:>3}. [{check}] {title}  ({})", row.index, row.created_at)?;
                }
                if !new_todo.is_empty() {
                    writeln!(f, "new: {new_todo}  (`add` to save)")?;
                }
                if let Some(status) = status {
                    writeln!(f, "! {status}")?;
                }
                write!(f, "commands: add <title> | new <title> | toggle <n> | rm <n> | refresh | logout | quit")
            }
        }
    }
}

/// Strike-through using combining long stroke overlay.
fn strike(text: &str) -> String {
    text.chars().flat_map(|c| [c, '\u{0336}']).collect()
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
