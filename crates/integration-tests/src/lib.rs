//! Integration test harness for the bookstore.
//!
//! [`TestApp`] wires the real router to an in-memory store. Tests either
//! drive the router in-process with [`TestApp::request`] or start a real
//! listener with [`TestApp::spawn`] for the HTTP client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bookstore-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use bookstore_core::{AUTH_HEADER, Book, BookDraft, Role};
use bookstore_storefront::{
    build_router,
    config::{StorefrontConfig, TokenConfig},
    db::memory::MemoryStore,
    models::User,
    services::{AuthService, CatalogService},
    state::AppState,
};

/// Signing secret used by every test app.
pub const TEST_TOKEN_SECRET: &str = "Tq8#rW2!vN5@kL9$zX3&mB7*hJ4^cP6%";

/// Password given to every account the harness creates.
pub const TEST_PASSWORD: &str = "correct horse";

/// A storefront over a fresh in-memory store.
#[derive(Clone)]
pub struct TestApp {
    pub state: AppState,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Default configuration: permissive status transitions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::config())
    }

    /// Status updates must follow the order lifecycle.
    #[must_use]
    pub fn strict() -> Self {
        let mut config = Self::config();
        config.strict_order_status = true;
        Self::with_config(config)
    }

    fn config() -> StorefrontConfig {
        StorefrontConfig::local(TokenConfig::new(SecretString::from(TEST_TOKEN_SECRET)))
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self {
            state: AppState::new(config, Arc::new(MemoryStore::new())),
        }
    }

    /// Send one request through the full router.
    pub async fn request(&self, request: Request<Body>) -> Response {
        build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Create an account directly in the store and return it with a token.
    pub async fn account(&self, email: &str, role: Role) -> (User, String) {
        let user = AuthService::new(self.state.store())
            .register_with_role(email, "Test User", TEST_PASSWORD, role)
            .await
            .expect("create account");
        let session = self.state.tokens().session(&user).expect("issue token");
        (user, session.token)
    }

    /// Token for a fresh admin account.
    pub async fn admin_token(&self) -> String {
        self.account("admin@example.com", Role::Admin).await.1
    }

    /// Token for a fresh non-admin account.
    pub async fn user_token(&self) -> String {
        self.account("reader@example.com", Role::User).await.1
    }

    /// Add a book directly to the catalog.
    pub async fn seed_book(&self, title: &str, price: &str, stock: u32) -> Book {
        let draft = BookDraft {
            title: Some(title.to_owned()),
            author: Some("Test Author".to_owned()),
            price: Some(price.into()),
            genre: Some("Fiction".to_owned()),
            rating: None,
            stock: Some(stock.into()),
            description: None,
            image: Some(format!("https://img.example/{title}.jpg")),
        };
        CatalogService::new(self.state.store())
            .create(&draft)
            .await
            .expect("seed book")
    }

    /// Serve the router on an ephemeral port until the test runtime ends.
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let app = build_router(self.state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        addr
    }
}

/// Build a JSON request, optionally authenticated.
#[must_use]
pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTH_HEADER, token);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Build a request without a body, optionally authenticated.
#[must_use]
pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTH_HEADER, token);
    }
    builder.body(Body::empty()).expect("request")
}

/// Decode a response body as JSON.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Assert the status and error code of a failed response.
pub async fn assert_error(response: Response, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status);
    let body: Value = read_json(response).await;
    assert_eq!(body["code"], code, "unexpected body: {body}");
    body
}
