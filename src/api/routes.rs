//! Router assembly

use super::{admin, inquiries, products, AppState};
use crate::auth::{api as auth_api, auth_middleware, AuthState};
use crate::middleware::request_logging;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Build the full application router.
///
/// Public routes and auth routes are open; everything else sits behind the
/// bearer gate and checks roles inside the handler. Static product paths
/// (`featured`, `categories`) take priority over `/api/products/:id`.
pub fn build_router(app_state: AppState, auth_state: AuthState, frontend_url: Option<&str>) -> Router {
    let tokens = auth_state.tokens.clone();

    // Build auth routes (separate router with auth state)
    let auth_router = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .route("/api/admin/login", post(auth_api::login))
        .route("/api/auth/register", post(auth_api::register))
        .route("/api/auth/logout", post(auth_api::logout))
        .with_state(auth_state.clone());

    let protected_auth_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_user))
        .route("/api/admin/verify", get(auth_api::verify_token))
        .route(
            "/api/admin/users",
            get(auth_api::list_users).post(auth_api::create_user),
        )
        .route("/api/admin/users/:id", delete(auth_api::delete_user))
        .route("/api/admin/users/:id/status", patch(auth_api::set_user_status))
        .route("/api/admin/users/:id/role", patch(auth_api::set_user_role))
        .route_layer(middleware::from_fn_with_state(
            auth_state.tokens.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // Protected resource routes
    let protected_routes = Router::new()
        .route("/api/products", post(products::create_product))
        .route(
            "/api/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/inquiries/mine", get(inquiries::my_inquiries))
        .route("/api/admin/inquiries", get(inquiries::list_inquiries))
        .route(
            "/api/admin/inquiries/:id",
            get(inquiries::get_inquiry)
                .put(inquiries::update_inquiry)
                .delete(inquiries::delete_inquiry),
        )
        .route("/api/admin/inquiries/:id/notes", post(inquiries::add_note))
        .route("/api/admin/statistics", get(admin::statistics))
        .route("/api/admin/export", get(admin::export_inquiries))
        .route_layer(middleware::from_fn_with_state(
            tokens,
            auth_middleware,
        ))
        .with_state(app_state.clone());

    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(admin::health_check))
        .route("/api/products", get(products::list_products))
        .route("/api/products/featured", get(products::featured_products))
        .route("/api/products/categories", get(products::category_stats))
        .route("/api/products/:id", get(products::get_product))
        .route("/api/inquiries", post(inquiries::submit_inquiry))
        .with_state(app_state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_router)
        .merge(protected_auth_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_url))
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let Some(origin) = frontend_url else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("⚠️  FRONTEND_URL is not a valid origin, falling back to permissive CORS");
            CorsLayer::permissive()
        }
    }
}
