//! Authentication Module
//! Mission: Secure back-office access with signed bearer tokens and role checks

pub mod account_store;
pub mod api;
pub mod bearer;
pub mod middleware;
pub mod models;
pub mod token;

pub use account_store::AccountStore;
pub use api::AuthState;
pub use middleware::auth_middleware;
pub use token::{TokenError, TokenService};
