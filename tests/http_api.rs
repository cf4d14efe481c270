//! End-to-end tests for the HTTP surface.
//!
//! Each test builds the full router over a private in-memory database and
//! drives it with `oneshot`, without binding a socket.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use croxy_backend::{
    auth::{bearer::RawAuthorization, models::{Claims, Role}},
    build_router, AccountStore, AppState, AuthState, Database, TokenService,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "admin-pass-123";
const SECRET: &str = "integration-test-secret";

struct TestApp {
    router: Router,
    tokens: Arc<TokenService>,
}

impl TestApp {
    fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let accounts = Arc::new(AccountStore::with_hash_cost(db.clone(), ADMIN_PASSWORD, 4).unwrap());
        let tokens = Arc::new(TokenService::new(SECRET).unwrap());

        let router = build_router(
            AppState::new(db),
            AuthState::new(accounts, tokens.clone()),
            None,
        );

        Self { router, tokens }
    }

    fn token_for(&self, id: i64, role: Option<Role>) -> String {
        let mut claims = Claims::new(id).with_login_name(format!("user{}", id));
        if let Some(role) = role {
            claims = claims.with_role(role);
        }
        self.tokens.issue(&claims).unwrap()
    }

    fn admin_token(&self) -> String {
        // The seeded admin is the first account
        self.token_for(1, Some(Role::Admin))
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_without_token_is_401() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_valid_token_exposes_identity() {
    let app = TestApp::new();
    let token = app.token_for(42, Some(Role::Staff));

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], 42);
    assert_eq!(body["user"]["loginName"], "user42");
    assert_eq!(body["user"]["role"], "staff");
}

#[tokio::test]
async fn test_invalid_tokens_are_401() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/auth/me", Some("garbage.garbage.garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = TokenService::new("some-other-secret")
        .unwrap()
        .issue(&Claims::new(1))
        .unwrap();
    let (status, _) = app.get("/api/auth/me", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = app
        .tokens
        .issue_at(&Claims::new(1), 60, Utc::now().timestamp() - 3600)
        .unwrap();
    let (status, body) = app.get("/api/auth/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_scheme_is_case_sensitive() {
    let app = TestApp::new();
    let token = app.admin_token();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_raw_authorization_extension_is_honored() {
    let app = TestApp::new();
    let token = app.admin_token();

    let mut request = Request::builder()
        .uri("/api/admin/verify")
        .body(Body::empty())
        .unwrap();
    request
        .extensions_mut()
        .insert(RawAuthorization(format!("Bearer {}", token)));

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_login_flow() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": "admin", "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["expiresIn"], 86_400);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password").is_none());

    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.split('.').count(), 3);

    let (status, body) = app.get("/api/admin/verify", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["loginName"], "admin");

    // Admin login alias accepts the email as login name
    let (status, _) = app
        .json(
            Method::POST,
            "/api/admin/login",
            None,
            json!({ "email": "admin@croxy-exim.com", "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": "admin", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .json(Method::POST, "/api/auth/login", None, json!({ "username": "admin" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_inquiry_submission_reaches_admin_queue() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/inquiries",
            None,
            json!({
                "name": "Asha Rao",
                "email": "asha@example.com",
                "company": "Rao Traders",
                "certifications": ["ISO 9001", "FSSAI"],
                "message": "Quote for 50 MT basmati",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let reference = body["data"]["referenceNumber"].as_str().unwrap().to_string();
    assert!(reference.starts_with("ENQ"));

    let token = app.token_for(7, Some(Role::Staff));
    let (status, body) = app.get("/api/admin/inquiries", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["referenceNumber"], reference.as_str());
    assert_eq!(body["data"][0]["certifications"], "ISO 9001, FSSAI");

    let id = body["data"][0]["id"].as_i64().unwrap();
    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/admin/inquiries/{}", id),
            Some(&token),
            json!({ "status": "in-progress", "note": "Called back" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in-progress");
    assert_eq!(body["data"]["notes"][0]["note"], "Called back");
}

#[tokio::test]
async fn test_inquiry_validation() {
    let app = TestApp::new();
    let (status, body) = app
        .json(Method::POST, "/api/inquiries", None, json!({ "name": "Asha" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and email are required");
}

#[tokio::test]
async fn test_role_checks_are_403() {
    let app = TestApp::new();

    let customer = app.token_for(9, Some(Role::Customer));
    let (status, body) = app.get("/api/admin/inquiries", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized");

    let staff = app.token_for(7, Some(Role::Staff));
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/inquiries/1")
        .header(header::AUTHORIZATION, format!("Bearer {}", staff))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/admin/users", Some(&staff)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Role-less tokens act as admin
    let legacy = app.token_for(1, None);
    let (status, _) = app.get("/api/admin/users", Some(&legacy)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_catalog_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin_token();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/products",
            None,
            json!({ "name": "Rice", "description": "Rice", "category": "export", "originCountry": "India" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/products",
            Some(&admin),
            json!({ "name": "Rice", "description": "Rice", "category": "spices", "originCountry": "India" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/products",
            Some(&admin),
            json!({
                "name": "Premium Basmati Rice",
                "description": "Long grain",
                "category": "export",
                "originCountry": "India",
                "featured": true,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app.get("/api/products?category=export&featured=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/products/{}", id),
            Some(&admin),
            json!({ "price": "$450 per MT" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], "$450 per MT");

    let (status, body) = app.get(&format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 1);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/products/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get(&format!("/api/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_statistics_and_export() {
    let app = TestApp::new();
    let token = app.token_for(7, Some(Role::Staff));

    app.json(
        Method::POST,
        "/api/inquiries",
        None,
        json!({ "name": "Ben, Jr.", "email": "ben@example.com" }),
    )
    .await;

    let (status, body) = app.get("/api/admin/statistics", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalInquiries"], 1);

    let request = Request::builder()
        .uri("/api/admin/export")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=inquiries.csv"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("Reference,"));
    assert!(csv.contains("\"Ben, Jr.\""));
}

#[tokio::test]
async fn test_user_management() {
    let app = TestApp::new();
    let admin = app.admin_token();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/admin/users",
            Some(&admin),
            json!({ "username": "ops", "password": "short", "role": "staff" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/admin/users",
            Some(&admin),
            json!({ "username": "ops", "password": "long-enough-1", "role": "staff" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let ops_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/admin/users",
            Some(&admin),
            json!({ "username": "ops", "password": "long-enough-2", "role": "staff" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/admin/users/{}/status", ops_id),
            Some(&admin),
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    // Deactivated accounts cannot log in
    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "username": "ops", "password": "long-enough-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            Method::PATCH,
            "/api/admin/users/1/role",
            Some(&admin),
            json!({ "role": "staff" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/admin/users/{}", ops_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_customer_registration_and_own_inquiries() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "asha@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "long-enough-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({
                "email": "asha@example.com",
                "password": "long-enough-1",
                "firstName": "Asha",
                "role": "admin",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "customer");
    assert_eq!(body["user"]["username"], "asha");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({ "email": "asha@example.com", "password": "long-enough-2" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Customers get no back-office access
    let (status, _) = app.get("/api/admin/inquiries", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for (name, email) in [("Asha", "asha@example.com"), ("Ben", "ben@example.com")] {
        let (status, _) = app
            .json(Method::POST, "/api/inquiries", None, json!({ "name": name, "email": email }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app.get("/api/inquiries/mine", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/inquiries/mine", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Asha");

    // Registered customers log in like everyone else
    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "asha@example.com", "password": "long-enough-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_storefront_featured_and_categories() {
    let app = TestApp::new();
    let admin = app.admin_token();

    for (name, category, featured) in [
        ("Premium Basmati Rice", "export", true),
        ("Cotton Fabric", "export", false),
        ("Freight Forwarding", "logistics", true),
    ] {
        let (status, _) = app
            .json(
                Method::POST,
                "/api/products",
                Some(&admin),
                json!({
                    "name": name,
                    "description": name,
                    "category": category,
                    "originCountry": "India",
                    "featured": featured,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/products/featured", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Freight Forwarding", "Premium Basmati Rice"]);

    let (status, body) = app.get("/api/products/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["label"], "export");
    assert_eq!(body["data"][0]["count"], 2);
    assert_eq!(body["data"][1]["label"], "logistics");

    // Numeric ids still reach the product page
    let (status, _) = app.get("/api/products/1", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_product_update_cannot_blank_required_fields() {
    let app = TestApp::new();
    let admin = app.admin_token();

    let (_, body) = app
        .json(
            Method::POST,
            "/api/products",
            Some(&admin),
            json!({ "name": "Rice", "description": "Rice", "category": "export", "originCountry": "India" }),
        )
        .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/products/{}", id),
            Some(&admin),
            json!({ "name": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product name is required");

    let (_, body) = app.get(&format!("/api/products/{}", id), None).await;
    assert_eq!(body["data"]["name"], "Rice");
}
