//! HTTP client for the storefront API.

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use bookstore_core::{
    AUTH_HEADER, AuthResponse, Book, BookDraft, BookId, ErrorBody, ErrorCode, LoginRequest,
    Message, Order, OrderDraft, OrderId, OrderStatus, SignupRequest, StatusUpdate, UserId,
    UserProfile,
};

use crate::error::ClientError;
use crate::session::{CheckoutDetails, ClientSession};
use crate::storage::LocalStore;

/// Thin typed wrapper over the storefront routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Client for the API rooted at `base_url`, e.g. `http://127.0.0.1:4001`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Same as [`ApiClient::new`] with a preconfigured `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        // Relative joins replace the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self { http, base })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ClientError> {
        let url = self.base.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.header(AUTH_HEADER, token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Turn a non-success response into `ClientError::Api`.
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| {
            ErrorBody::new(ErrorCode::ServerError, text.chars().take(200).collect::<String>())
        });
        tracing::debug!(status = %status, code = %body.code, "API request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        Self::send(self.request(Method::GET, path, token)?).await
    }

    async fn with_body<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::send(self.request(method, path, token)?.json(body)).await
    }

    /// `GET /books`
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport or server failure.
    pub async fn list_books(&self) -> Result<Vec<Book>, ClientError> {
        self.get("books", None).await
    }

    /// `POST /books` (admin)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `ValidationError` naming bad fields.
    pub async fn create_book(&self, token: &str, draft: &BookDraft) -> Result<Book, ClientError> {
        self.with_body(Method::POST, "books", Some(token), draft)
            .await
    }

    /// `DELETE /books/{id}` (admin)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `NotFound` if there is no such book.
    pub async fn delete_book(&self, token: &str, id: BookId) -> Result<Message, ClientError> {
        Self::send(self.request(Method::DELETE, &format!("books/{id}"), Some(token))?).await
    }

    /// `POST /user/signup`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `DuplicateIdentity` or `ValidationError`.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        self.with_body(Method::POST, "user/signup", None, request)
            .await
    }

    /// `POST /user/login`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `InvalidCredentials`.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.with_body(Method::POST, "user/login", None, request)
            .await
    }

    /// `GET /user/me`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `Unauthenticated` for a bad token.
    pub async fn me(&self, token: &str) -> Result<UserProfile, ClientError> {
        self.get("user/me", Some(token)).await
    }

    /// `PUT /user/promote/{id}` (admin)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `NotFound` if there is no such user.
    pub async fn promote(&self, token: &str, id: UserId) -> Result<UserProfile, ClientError> {
        Self::send(self.request(Method::PUT, &format!("user/promote/{id}"), Some(token))?).await
    }

    /// `POST /orders`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `ValidationError` naming bad fields.
    pub async fn place_order(&self, draft: &OrderDraft) -> Result<Order, ClientError> {
        self.with_body(Method::POST, "orders", None, draft).await
    }

    /// `GET /orders` (admin), newest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport or server failure.
    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ClientError> {
        self.get("orders", Some(token)).await
    }

    /// `PATCH /orders/{id}/status` (admin)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `NotFound` or `InvalidStatus`.
    pub async fn update_order_status(
        &self,
        token: &str,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        let body = StatusUpdate {
            status: status.as_str().to_owned(),
        };
        self.with_body(Method::PATCH, &format!("orders/{id}/status"), Some(token), &body)
            .await
    }

    /// `DELETE /orders/{id}` (admin)
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `NotFound` if there is no such order.
    pub async fn delete_order(&self, token: &str, id: OrderId) -> Result<Message, ClientError> {
        Self::send(self.request(Method::DELETE, &format!("orders/{id}"), Some(token))?).await
    }

    /// Log in and store the session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with `InvalidCredentials`; the session is
    /// left unchanged.
    #[instrument(skip(self, session, password))]
    pub async fn login_into<S: LocalStore>(
        &self,
        session: &mut ClientSession<S>,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let auth = self
            .login(&LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .await?;
        let user = auth.user.clone();
        session.sign_in(auth)?;
        Ok(user)
    }

    /// Place an order for the session's cart.
    ///
    /// The draft is checked locally first; nothing is sent if it fails. The
    /// cart is emptied only after the server returns the created order, so a
    /// failed or interrupted request leaves it intact for a retry.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` from the local check or
    /// `ClientError::Api` from the server.
    #[instrument(skip_all)]
    pub async fn checkout<S: LocalStore>(
        &self,
        session: &mut ClientSession<S>,
        details: &CheckoutDetails,
    ) -> Result<Order, ClientError> {
        let draft = session.checkout_draft(details)?;
        let order = self.place_order(&draft).await?;
        session.order_acknowledged()?;
        tracing::info!(order_id = %order.id, "order placed");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_prefix() {
        let api = ApiClient::new("http://localhost:4001/api").unwrap();
        assert_eq!(
            api.base.join("books").unwrap().as_str(),
            "http://localhost:4001/api/books"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::Url(_))
        ));
    }
}
