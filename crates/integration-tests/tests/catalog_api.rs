//! Catalog endpoints through the full router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use bookstore_core::Book;
use bookstore_integration_tests::{
    TestApp, assert_error, empty_request, json_request, read_json,
};
use bookstore_storefront::db::BookStore;

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "price": "19.99",
        "genre": "Sci-Fi",
        "rating": "4.5",
        "stock": "3",
        "image": "https://img.example/dune.jpg"
    })
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = TestApp::new();

    let response = app.request(empty_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = app.request(empty_request("GET", "/health/ready", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new();
    let mut request = empty_request("GET", "/health", None);
    request
        .headers_mut()
        .insert("x-request-id", "abc-123".parse().unwrap());

    let response = app.request(request).await;
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn admin_creates_book_with_coerced_numerics() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(json_request("POST", "/books", Some(&admin), &dune()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = read_json(response).await;
    assert_eq!(created["price"], 19.99);
    assert_eq!(created["stock"], 3);
    assert_eq!(created["rating"], 4.5);

    let response = app.request(empty_request("GET", "/books", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = read_json(response).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
}

#[tokio::test]
async fn invalid_book_lists_every_field() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let body = json!({
        "title": "",
        "author": "Someone",
        "price": "cheap",
        "genre": "Poetry",
        "rating": 7,
        "stock": -1,
        "image": "cover.jpg"
    });
    let response = app
        .request(json_request("POST", "/books", Some(&admin), &body))
        .await;
    let body = assert_error(response, StatusCode::BAD_REQUEST, "ValidationError").await;

    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for field in ["title", "price", "rating", "stock"] {
        assert!(fields.contains(&field), "missing {field} in {fields:?}");
    }
    assert!(app.state.store().list_books().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/books")
        .header("content-type", "application/json")
        .header("x-auth-token", &admin)
        .body(axum::body::Body::from("{\"title\": "))
        .unwrap();
    let response = app.request(request).await;
    assert_error(response, StatusCode::BAD_REQUEST, "ValidationError").await;
}

#[tokio::test]
async fn catalog_mutations_require_admin() {
    let app = TestApp::new();
    let book = app.seed_book("Emma", "7.50", 2).await;
    let user = app.user_token().await;

    let response = app.request(json_request("POST", "/books", None, &dune())).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "Unauthenticated").await;

    let response = app
        .request(json_request("POST", "/books", Some(&user), &dune()))
        .await;
    assert_error(response, StatusCode::FORBIDDEN, "Forbidden").await;

    let response = app
        .request(empty_request("DELETE", &format!("/books/{}", book.id), Some(&user)))
        .await;
    assert_error(response, StatusCode::FORBIDDEN, "Forbidden").await;

    let books = app.state.store().list_books().await.unwrap();
    assert_eq!(books, vec![book]);
}

#[tokio::test]
async fn delete_book_then_not_found() {
    let app = TestApp::new();
    let book = app.seed_book("Emma", "7.50", 2).await;
    let admin = app.admin_token().await;
    let uri = format!("/books/{}", book.id);

    let response = app.request(empty_request("DELETE", &uri, Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert!(body["message"].is_string());

    let response = app.request(empty_request("DELETE", &uri, Some(&admin))).await;
    assert_error(response, StatusCode::NOT_FOUND, "NotFound").await;
    assert!(
        app.state
            .store()
            .get_book(book.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .request(empty_request("DELETE", "/books/64b7f0c2e1", Some(&admin)))
        .await;
    assert_error(response, StatusCode::NOT_FOUND, "NotFound").await;
}
