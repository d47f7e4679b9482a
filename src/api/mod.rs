//! HTTP layer over the resolver engine.
//!
//! A thin axum adapter: every route delegates to the registry, matcher,
//! dispatcher or batch coordinator held in [`AppState`]. Request validation
//! lives here; resolution semantics do not.

mod error;
mod handlers;
pub mod models;
mod server;
mod state;

pub use error::ApiError;
pub use server::{router, run};
pub use state::AppState;
