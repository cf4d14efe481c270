//! HTTP surface: catalog, inquiry form and back-office endpoints

pub mod admin;
pub mod error;
pub mod inquiries;
pub mod products;
pub mod routes;

pub use error::ApiError;
pub use routes::build_router;

use crate::store::Database;

/// State for resource handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
