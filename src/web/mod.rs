//! JSON-over-HTTP surface.
//!
//! Handlers are thin: they extract the session user and request data, call
//! into [`crate::actions`] and serialize the result.

pub mod admin;
pub mod extract;
pub mod pages;
pub mod server;
pub mod session;

pub use server::{AppState, build_router, start_server};
pub use session::CurrentUser;
