//! Single-user todo list on top of a Supabase-style backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Auth, storage and the `*_todo` procedures live on the provider. This
//! crate is the client: a provider seam, a session controller, a todo
//! controller, and a pure view over their state, driven by the terminal
//! front end in `main.rs`.

pub mod app;
pub mod command;
pub mod config;
pub mod provider;
pub mod session_store;
pub mod state;
pub mod view;
