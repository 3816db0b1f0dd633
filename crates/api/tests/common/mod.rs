#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use minutes_api::app::build_router;
use minutes_api::auth::directory::{DirectoryError, Personnel, PersonnelDirectory};
use minutes_api::auth::jwt::{JwtConfig, TokenService};
use minutes_api::auth::Identity;
use minutes_api::config::ServerConfig;
use minutes_api::state::AppState;
use minutes_core::roles::Role;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "minutes-test-boundary";

// ---------------------------------------------------------------------------
// Personnel directory stand-in
// ---------------------------------------------------------------------------

/// In-memory personnel directory keyed by username.
#[derive(Default)]
pub struct FakeDirectory {
    entries: HashMap<String, (String, Personnel)>,
    offline: bool,
}

impl FakeDirectory {
    pub fn with(mut self, username: &str, password: &str, fname: &str, lname: &str) -> Self {
        self.entries.insert(
            username.to_string(),
            (
                password.to_string(),
                Personnel {
                    username: username.to_string(),
                    prefix: Some("นาย".to_string()),
                    fname: Some(fname.to_string()),
                    lname: Some(lname.to_string()),
                },
            ),
        );
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PersonnelDirectory for FakeDirectory {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Personnel>, DirectoryError> {
        if self.offline {
            return Err(DirectoryError::Unavailable("offline".into()));
        }
        Ok(self
            .entries
            .get(username)
            .filter(|(expected, _)| expected == password)
            .map(|(_, personnel)| personnel.clone()))
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        if self.offline {
            Err(DirectoryError::Unavailable("offline".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and the given upload root.
pub fn test_config(uploads: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiry_hours: 24,
        },
        uploads_path: uploads.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        database_url: String::new(),
        directory_url: String::new(),
    }
}

/// The full router plus the handles tests inspect directly.
pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
    /// Upload root; removed when the test ends.
    pub uploads: TempDir,
}

impl TestApp {
    /// A valid bearer token for `username` with `role`.
    pub fn token(&self, username: &str, role: Role) -> String {
        self.tokens
            .issue(&Identity {
                username: username.to_string(),
                prefix: String::new(),
                fname: username.to_string(),
                lname: "Test".to_string(),
                role,
            })
            .expect("token should be issued")
    }

    pub fn secretary(&self) -> String {
        self.token("sec", Role::Secretary)
    }

    pub fn manager(&self, username: &str) -> String {
        self.token(username, Role::Manager)
    }

    pub fn user(&self) -> String {
        self.token("viewer", Role::User)
    }

    /// Names of the files currently in the upload root.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.uploads.path())
            .expect("upload root should exist")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Build the application exactly as `main.rs` does, against `pool` and the
/// given directory.
pub fn build_test_app_with(pool: PgPool, directory: FakeDirectory) -> TestApp {
    let uploads = tempfile::tempdir().expect("temp dir should be created");
    let config = test_config(&uploads);
    let state = AppState::new(pool, config, Arc::new(directory));
    let tokens = state.tokens.clone();
    let router = build_router(state).expect("router should build");
    TestApp {
        router,
        tokens,
        uploads,
    }
}

/// Build the application with a directory holding `alice` / `pw123`.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(
        pool,
        FakeDirectory::default().with("alice", "pw123", "Alice", "Smith"),
    )
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::GET, uri, token).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::DELETE, uri, token).body(Body::empty()).unwrap()
}

pub fn json(method: Method, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    builder(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json(Method::POST, uri, token, body)
}

pub fn put_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json(Method::PUT, uri, token, body)
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    /// Field name, file name, MIME type, bytes.
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

pub fn multipart(method: Method, uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, mime, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    builder(method, uri, token)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

/// An allowed content type too long for the `file_type` column, so the
/// attachment insert fails after the bytes are on disk.
pub fn overlong_pdf_mime() -> String {
    format!("application/pdf; name={}", "x".repeat(300))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Number of audit rows, optionally restricted to one action.
pub async fn audit_count(pool: &PgPool, action: Option<&str>) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM audit_logs WHERE $1::TEXT IS NULL OR action = $1",
    )
    .bind(action)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Create a meeting through the API and return its JSON representation.
pub async fn create_meeting(app: &TestApp, number: &str) -> serde_json::Value {
    let response = app
        .send(post_json(
            "/api/meetings",
            Some(&app.secretary()),
            serde_json::json!({
                "meeting_number": number,
                "meeting_title": format!("การประชุม {number}"),
                "meeting_date": "2025-03-14",
            }),
        ))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Create an agenda item through the API as `token`'s holder.
pub async fn create_agenda(app: &TestApp, token: &str, meeting_number: &str) -> serde_json::Value {
    let response = app
        .send(post_json(
            "/api/agendas",
            Some(token),
            serde_json::json!({
                "meeting_number": meeting_number,
                "agenda_number": "1",
                "agenda_topic": "รับรองรายงานการประชุม",
                "agenda_type": "เพื่อพิจารณา",
                "submitting_department": "IT",
            }),
        ))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
