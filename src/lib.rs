//! Croxy Exim back-office backend
//!
//! Catalog, inquiry intake and the authenticated admin API. Exposed as a
//! library so the binary and the integration tests build the same router.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod store;

pub use api::{build_router, AppState};
pub use auth::{AccountStore, AuthState, TokenService};
pub use config::Config;
pub use store::Database;
