//! Client state: the session and todo controllers.

pub mod session;
pub mod todos;

pub use session::{AuthError, AuthPhase, SessionController};
pub use todos::TodoController;
