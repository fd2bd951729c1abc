#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use eventease::{
    blob_store::LocalBlobStore,
    config::{AppConfig, Config, DatabaseConfig, FeatureFlags, LogFormat, StorageConfig},
    middleware::{ANTIFORGERY_COOKIE, ANTIFORGERY_HEADER},
    models::{NewBooking, NewEvent, NewEventType, NewVenue},
    router,
    store::MemoryStore,
    AppState,
};

pub const BOUNDARY: &str = "----eventease-test-boundary";
pub const MAX_IMAGE_BYTES: usize = 1024;

pub fn test_config(dir: &TempDir, enable_antiforgery: bool) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            environment: "test".into(),
            rust_log: "eventease=debug".into(),
            log_format: LogFormat::Pretty,
        },
        database: DatabaseConfig {
            url: "memory".into(),
            pool_size: 1,
        },
        storage: StorageConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            public_url: "http://localhost:8000/images".into(),
            max_image_bytes: MAX_IMAGE_BYTES,
        },
        features: FeatureFlags { enable_antiforgery },
    }
}

/// The router over an in-memory store and a temporary image directory.
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub token: String,
    pub images: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(true).await
    }

    pub async fn without_antiforgery() -> Self {
        Self::build(false).await
    }

    async fn build(enable_antiforgery: bool) -> Self {
        let images = tempfile::tempdir().unwrap();
        let config = test_config(&images, enable_antiforgery);
        let blobs = LocalBlobStore::new(images.path(), config.storage.public_url.clone());
        let state = AppState::with_parts(Arc::new(MemoryStore::new()), Arc::new(blobs), config);
        let router = router(state.clone());

        let mut app = TestApp {
            router,
            state,
            token: String::new(),
            images,
        };
        let (status, body) = app.get("/antiforgery").await;
        assert_eq!(status, StatusCode::OK);
        app.token = body["token"].as_str().unwrap().to_string();
        app
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        let status = response.status();
        (status, body_json(response).await)
    }

    fn post(&self, uri: &str, content_type: &str) -> axum::http::request::Builder {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::COOKIE, format!("{}={}", ANTIFORGERY_COOKIE, self.token))
            .header(ANTIFORGERY_HEADER, &self.token)
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = self
            .post(uri, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<Upload<'_>>,
    ) -> Response<Body> {
        let request = self
            .post(uri, &format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(request).await
    }

    /// Files currently stored in the image directory.
    pub fn stored_images(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.images.path())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub async fn seed_event_type(&self, name: &str) -> i64 {
        self.state
            .store
            .insert_event_type(&NewEventType {
                event_type_name: name.into(),
            })
            .await
            .unwrap()
            .event_type_id
    }

    pub async fn seed_venue(&self, name: &str, availability: bool) -> i64 {
        self.state
            .store
            .insert_venue(&NewVenue {
                venue_name: name.into(),
                location: "Cape Town".into(),
                capacity: 100,
                availability,
                image_url: None,
            })
            .await
            .unwrap()
            .venue_id
    }

    pub async fn seed_event(&self, name: &str, date: &str, event_type_id: i64) -> i64 {
        self.state
            .store
            .insert_event(&NewEvent {
                event_name: name.into(),
                event_date: at(date),
                description: None,
                event_type_id,
            })
            .await
            .unwrap()
            .event_id
    }

    pub async fn seed_booking(&self, event_id: i64, venue_id: i64, date: &str) -> i64 {
        self.state
            .store
            .insert_booking(&NewBooking {
                event_id,
                venue_id,
                booking_date: at(date),
            })
            .await
            .unwrap()
            .booking_id
    }
}

pub struct Upload<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<Upload<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image_file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn at(value: &str) -> chrono::NaiveDateTime {
    eventease::forms::parse_datetime(value).unwrap()
}

pub fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn error_messages(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
