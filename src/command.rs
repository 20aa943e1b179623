//! Terminal command parsing.
//!
//! Turns one input line into the intents the current screen accepts. List
//! positions (`toggle 2`) are resolved to todo ids here, so the app only
//! ever sees ids.

use crate::app::{App, AuthMode, Intent};
use crate::provider::TodoId;
use crate::state::AuthPhase;

pub const HELP: &str = "\
login screen:   login <email> <password> | register <email> <password>
                email <addr> | password <pw> | submit | mode
confirmation:   back
todo list:      add <title> | new <title> (stage) | add (submit staged)
                toggle <n> | rm <n> | refresh | logout
anywhere:       help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Intent>),
    Help,
    Quit,
    /// Blank line; just re-render.
    Nothing,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("no todo at position {0}")]
    NoSuchTodo(usize),
}

/// Parse `line` against the screen `app` is currently showing.
///
/// # Errors
///
/// Returns a [`CommandError`] for unknown verbs, missing arguments, or a
/// list position that does not exist.
pub fn parse(line: &str, app: &App) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let verb = verb.to_ascii_lowercase();

    match verb.as_str() {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    match app.phase() {
        AuthPhase::Anonymous => parse_auth(&verb, rest, app.form().mode),
        AuthPhase::PendingConfirmation { .. } => match verb.as_str() {
            "back" => Ok(Command::Dispatch(vec![Intent::BackToLogin])),
            _ => Err(CommandError::Unknown(verb)),
        },
        AuthPhase::Authenticated(_) => parse_todos(&verb, rest, app),
    }
}

fn parse_auth(verb: &str, rest: &str, mode: AuthMode) -> Result<Command, CommandError> {
    let intents = match verb {
        "login" | "register" => {
            let wanted = if verb == "login" { AuthMode::Login } else { AuthMode::Register };
            let mut args = rest.split_whitespace();
            let (Some(email), Some(password), None) = (args.next(), args.next(), args.next()) else {
                return Err(CommandError::Usage(if wanted == AuthMode::Login {
                    "login <email> <password>"
                } else {
                    "register <email> <password>"
                }));
            };
            let mut intents = Vec::with_capacity(4);
            if wanted != mode {
                intents.push(Intent::ToggleAuthMode);
            }
            intents.push(Intent::SetEmail(email.to_owned()));
            intents.push(Intent::SetPassword(password.to_owned()));
            intents.push(Intent::SubmitAuth);
            intents
        }
        "email" if !rest.is_empty() => vec![Intent::SetEmail(rest.to_owned())],
        "email" => return Err(CommandError::Usage("email <addr>")),
        "password" if !rest.is_empty() => vec![Intent::SetPassword(rest.to_owned())],
        "password" => return Err(CommandError::Usage("password <pw>")),
        "submit" => vec![Intent::SubmitAuth],
        "mode" => vec![Intent::ToggleAuthMode],
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Command::Dispatch(intents))
}

fn parse_todos(verb: &str, rest: &str, app: &App) -> Result<Command, CommandError> {
    let intents = match verb {
        // Bare `add` submits whatever was staged; blank titles still reach
        // the controller, which ignores them.
        "add" if rest.is_empty() => vec![Intent::AddTodo],
        "add" => vec![Intent::SetNewTodo(rest.to_owned()), Intent::AddTodo],
        "new" => vec![Intent::SetNewTodo(rest.to_owned())],
        "toggle" | "done" => vec![Intent::ToggleTodo(resolve(rest, app, "toggle <n>")?)],
        "rm" | "delete" | "remove" => vec![Intent::DeleteTodo(resolve(rest, app, "rm <n>")?)],
        "refresh" => vec![Intent::Refresh],
        "logout" => vec![Intent::Logout],
        other => return Err(CommandError::Unknown(other.to_owned())),
    };
    Ok(Command::Dispatch(intents))
}

fn resolve(arg: &str, app: &App, usage: &'static str) -> Result<TodoId, CommandError> {
    let position: usize = arg.parse().map_err(|_| CommandError::Usage(usage))?;
    position
        .checked_sub(1)
        .and_then(|i| app.todos().items().get(i))
        .map(|item| item.id.clone())
        .ok_or(CommandError::NoSuchTodo(position))
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
