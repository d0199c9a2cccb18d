//! HTTP client for the Beating API's credential-acquisition endpoints.
//!
//! Only `/login` and `/register` live here: the session core never talks
//! to the network itself, it just commits the `{credential, identity}`
//! tuples this client produces.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::auth::session::Identity;

/// API failures the command layer maps to user-facing messages.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email is already registered")]
    EmailTaken,
    #[error("unexpected API response (HTTP {status}): {body}")]
    Unexpected { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// A successful login: exactly what `SessionManager::login` commits.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub credential: String,
    pub identity: Identity,
}

/// Thin client over the remote API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Exchanges email and password for a bearer credential and identity.
    ///
    /// # Errors
    /// `InvalidCredentials` on HTTP 401, `Unexpected` on other non-success
    /// statuses, `Transport` on connection or body failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        #[derive(Deserialize)]
        struct LoginResponse {
            token: String,
            user_id: Value,
            username: String,
        }

        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::InvalidCredentials),
            status if status.is_success() => {
                let data: LoginResponse = response.json().await?;
                Ok(LoginOutcome {
                    credential: data.token,
                    identity: Identity {
                        id: stringify_id(&data.user_id),
                        handle: data.username,
                    },
                })
            }
            status => Err(unexpected(status, response).await),
        }
    }

    /// Creates an account, returning the new user id.
    ///
    /// The request body uses the backend's own field names.
    ///
    /// # Errors
    /// `EmailTaken` on HTTP 409, `Unexpected` on other non-success
    /// statuses, `Transport` on connection or body failures.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        #[derive(Deserialize)]
        struct RegisterResponse {
            user_id: Value,
        }

        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&json!({
                "nombre_usuario": username,
                "correo": email,
                "contrasena": password,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(ApiError::EmailTaken),
            status if status.is_success() => {
                let data: RegisterResponse = response.json().await?;
                Ok(stringify_id(&data.user_id))
            }
            status => Err(unexpected(status, response).await),
        }
    }
}

/// The backend issues integer ids; tolerate strings too.
fn stringify_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn unexpected(status: StatusCode, response: reqwest::Response) -> ApiError {
    ApiError::Unexpected {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    }
}
