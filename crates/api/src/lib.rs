//! HTTP and WebSocket API layer for tablevote.

pub mod notify;
pub mod response;
pub mod routes;
pub mod state;

pub use notify::{Notifier, SessionEvent};
pub use routes::router;
pub use state::AppState;
