//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a three-segment bearer token with the claims the backend
/// issues. The signature is garbage; the client never verifies it.
pub fn make_token(user_id: u64, username: &str, exp_secs: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "user_id": user_id,
            "username": username,
            "email": format!("{username}@example.com"),
            "exp": exp_secs,
        })
        .to_string(),
    );
    format!("{header}.{payload}.sig")
}

/// Expiry comfortably in the future, in seconds since epoch.
pub fn far_future_secs() -> u64 {
    now_secs() + 3600
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Path of the state file inside a BEATING_HOME directory.
pub fn state_path(home: &Path) -> std::path::PathBuf {
    home.join("state.json")
}

/// Seeds a BEATING_HOME with a stored credential, as a previous login
/// would have left it.
pub fn write_credential(home: &Path, token: &str) {
    fs::write(
        state_path(home),
        json!({ "auth.credential": token }).to_string(),
    )
    .unwrap();
}

/// Mounts a successful POST /login returning the given tuple.
pub async fn mock_login(server: &MockServer, token: &str, user_id: u64, username: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "user_id": user_id,
            "username": username,
        })))
        .mount(server)
        .await;
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}
