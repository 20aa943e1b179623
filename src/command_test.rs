use std::sync::Arc;

use super::*;
use crate::provider::test_helpers::{MockProvider, TEST_EMAIL, TEST_PASSWORD, todo};
use crate::session_store::MemorySessionStore;
use crate::view::render;

fn anonymous() -> App {
    App::new(Arc::new(MockProvider::new(Vec::new())), Arc::new(MemorySessionStore::new()))
}

async fn signed_in(titles: &[&str]) -> App {
    let rows = titles.iter().map(|t| todo(t, false)).collect();
    let mut app = App::new(Arc::new(MockProvider::new(rows)), Arc::new(MemorySessionStore::new()));
    app.dispatch(Intent::SetEmail(TEST_EMAIL.into())).await;
    app.dispatch(Intent::SetPassword(TEST_PASSWORD.into())).await;
    app.dispatch(Intent::SubmitAuth).await;
    app
}

// =============================================================================
// any screen
// =============================================================================

#[test]
fn blank_help_and_quit() {
    let app = anonymous();
    assert_eq!(parse("   ", &app), Ok(Command::Nothing));
    assert_eq!(parse("HELP", &app), Ok(Command::Help));
    assert_eq!(parse("exit", &app), Ok(Command::Quit));
}

// =============================================================================
// auth screen
// =============================================================================

#[test]
fn login_sets_fields_and_submits() {
    let app = anonymous();
    let cmd = parse("login a@b.co secret", &app).unwrap();
    assert_eq!(
        cmd,
        Command::Dispatch(vec![
            Intent::SetEmail("a@b.co".into()),
            Intent::SetPassword("secret".into()),
            Intent::SubmitAuth,
        ])
    );
}

#[test]
fn register_from_login_mode_switches_mode_first() {
    let app = anonymous();
    let Command::Dispatch(intents) = parse("register a@b.co secret", &app).unwrap() else {
        panic!("expected dispatch");
    };
    assert_eq!(intents.first(), Some(&Intent::ToggleAuthMode));
    assert_eq!(intents.last(), Some(&Intent::SubmitAuth));
}

#[test]
fn login_with_missing_password_is_usage_error() {
    let app = anonymous();
    assert_eq!(parse("login a@b.co", &app), Err(CommandError::Usage("login <email> <password>")));
    assert_eq!(parse("login a b c", &app), Err(CommandError::Usage("login <email> <password>")));
}

#[test]
fn todo_verbs_unknown_on_auth_screen() {
    let app = anonymous();
    assert_eq!(parse("add milk", &app), Err(CommandError::Unknown("add".into())));
}

// =============================================================================
// todo screen
// =============================================================================

#[tokio::test]
async fn add_keeps_full_title() {
    let app = signed_in(&[]).await;
    assert_eq!(
        parse("add Buy  oat milk", &app),
        Ok(Command::Dispatch(vec![Intent::SetNewTodo("Buy  oat milk".into()), Intent::AddTodo]))
    );
}

#[tokio::test]
async fn new_stages_text_and_bare_add_submits_it() {
    let mut app = signed_in(&[]).await;

    let Command::Dispatch(intents) = parse("new Buy milk", &app).unwrap() else {
        panic!("expected dispatch");
    };
    assert_eq!(intents, vec![Intent::SetNewTodo("Buy milk".into())]);
    for intent in intents {
        app.dispatch(intent).await;
    }
    assert!(render(&app).to_string().contains("new: Buy milk"));

    assert_eq!(parse("add", &app), Ok(Command::Dispatch(vec![Intent::AddTodo])));
    app.dispatch(Intent::AddTodo).await;
    assert_eq!(app.todos().items()[0].title, "Buy milk");
    assert!(!render(&app).to_string().contains("new: "));
}

#[tokio::test]
async fn toggle_and_rm_resolve_positions_to_ids() {
    let app = signed_in(&["a", "b"]).await;
    let second = app.todos().items()[1].id.clone();

    assert_eq!(parse("toggle 2", &app), Ok(Command::Dispatch(vec![Intent::ToggleTodo(second.clone())])));
    assert_eq!(parse("rm 2", &app), Ok(Command::Dispatch(vec![Intent::DeleteTodo(second)])));
}

#[tokio::test]
async fn out_of_range_and_bad_positions() {
    let app = signed_in(&["a"]).await;
    assert_eq!(parse("toggle 0", &app), Err(CommandError::NoSuchTodo(0)));
    assert_eq!(parse("rm 5", &app), Err(CommandError::NoSuchTodo(5)));
    assert_eq!(parse("toggle x", &app), Err(CommandError::Usage("toggle <n>")));
}

#[tokio::test]
async fn logout_and_refresh() {
    let app = signed_in(&[]).await;
    assert_eq!(parse("logout", &app), Ok(Command::Dispatch(vec![Intent::Logout])));
    assert_eq!(parse("refresh", &app), Ok(Command::Dispatch(vec![Intent::Refresh])));
}
