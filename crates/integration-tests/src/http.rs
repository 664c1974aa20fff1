//! Drives the axum router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use api_adapters::web::{router, AppState, UploadPolicy, WebOptions};
use domains::Clock;
use storage_adapters::media::LocalMediaStorage;

use crate::{email, World, PASSWORD};

/// Smallest byte string `image` recognises as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

pub const MAX_FILES: usize = 3;
pub const MAX_FILE_SIZE: usize = 64 * 1024;

pub struct TestApp {
    pub world: World,
    pub router: Router,
    pub uploads: TempDir,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let world = World::new();
        let uploads = tempfile::tempdir().expect("upload dir");
        let media = LocalMediaStorage::new(uploads.path(), "/uploads", MAX_FILE_SIZE);
        let clock: Arc<dyn Clock> = world.clock.clone();
        let state = AppState::new(
            world.services.clone(),
            Arc::new(media),
            UploadPolicy {
                max_files: MAX_FILES,
                max_file_size: MAX_FILE_SIZE,
            },
        )
        .with_clock(clock);
        let router = router(
            state,
            WebOptions {
                cors_origins: vec!["http://localhost:3000".into()],
                uploads_dir: Some(uploads.path().to_path_buf()),
                uploads_url: "/uploads".into(),
            },
        );
        Self {
            world,
            router,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, token, body).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, token, body).await
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let request = request(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        form: Multipart,
    ) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        let request = request(method, uri, token)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Registers `name` over HTTP and returns `(token, user id)`.
    pub async fn register(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                None,
                serde_json::json!({ "name": name, "email": email(name), "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {name}: {body}");
        let token = body["data"]["token"].as_str().expect("token").to_owned();
        let id = body["data"]["user"]["id"].as_str().expect("id").to_owned();
        (token, id)
    }

    /// Registers an admin through the service layer and signs in over HTTP.
    pub async fn admin_token(&self, name: &str) -> String {
        self.world.admin(name).await;
        let (status, body) = self
            .post_json(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email(name), "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login: {body}");
        body["data"]["token"].as_str().expect("token").to_owned()
    }

    /// Creates a pet over JSON and returns its id.
    pub async fn create_pet(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post_json("/api/pets", Some(token), pet_body(name))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create pet: {body}");
        body["data"]["pet"]["id"].as_str().expect("pet id").to_owned()
    }

    pub async fn create_post(&self, token: &str, content: &str) -> String {
        let (status, body) = self
            .post_json("/api/posts", Some(token), serde_json::json!({ "content": content }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create post: {body}");
        body["data"]["post"]["id"].as_str().expect("post id").to_owned()
    }
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// A complete JSON pet command with one image path.
pub fn pet_body(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "type": "dog",
        "breed": "Labrador",
        "age": { "value": 2, "unit": "years" },
        "gender": "female",
        "size": "large",
        "color": "Black",
        "description": format!("{name} is a gentle dog"),
        "images": ["/uploads/images-seed.jpg"],
    })
}

/// Hand-rolled `multipart/form-data` body.
pub struct Multipart {
    boundary: String,
    body: Vec<u8>,
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

impl Multipart {
    pub fn new() -> Self {
        Self {
            boundary: "petconnect-test-boundary".into(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
