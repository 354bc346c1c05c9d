//! Common test utilities for integration tests
//!
//! Provides a [`TestContext`] that connects to the database named by
//! `DATABASE_URL`, runs the migrations, and builds the full router so tests
//! can drive it as a tower service. When `DATABASE_URL` is not set the
//! context constructor returns `None` and tests skip with a notice, so the
//! suite still passes without a running Postgres.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use shopadmin_api::app::{build_router, AppState};
use shopadmin_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, UploadConfig};
use shopadmin_api::uploads::UploadStore;

/// Signing secret shared by the test router and token assertions
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context holding the database pool and the app under test
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a context with authentication on write routes disabled
    ///
    /// Returns `None` (after printing a notice) when `DATABASE_URL` is not
    /// set.
    pub async fn new() -> Option<Self> {
        Self::with_auth(false).await
    }

    /// Creates a context with an explicit auth-on-writes setting
    pub async fn with_auth(require_auth_on_writes: bool) -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return None;
        };

        let db = PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");

        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("failed to run migrations");

        let upload_dir = std::env::temp_dir().join(format!("shopadmin-test-{}", Uuid::new_v4()));
        let uploads = UploadStore::new(&upload_dir)
            .await
            .expect("failed to create upload directory");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                require_auth_on_writes,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            uploads: UploadConfig {
                dir: upload_dir.to_string_lossy().into_owned(),
            },
        };

        let state = AppState::new(db.clone(), config, uploads);

        Some(Self {
            db,
            app: build_router(state),
        })
    }

    /// Sends a request and returns the status plus the JSON body (Null when
    /// the body is empty or not JSON)
    pub async fn send(&mut self, request: Request<Body>) -> (StatusCode, Value) {
        use tower::Service as _;

        let response = self.app.call(request).await.expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    pub async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(
        &mut self,
        uri: &str,
        body: Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn post_form(
        &mut self,
        uri: &str,
        form: MultipartForm,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        self.send_form("POST", uri, form, token).await
    }

    pub async fn put_form(
        &mut self,
        uri: &str,
        form: MultipartForm,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        self.send_form("PUT", uri, form, token).await
    }

    pub async fn delete(&mut self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn send_form(
        &mut self,
        method: &str,
        uri: &str,
        form: MultipartForm,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let (content_type, body) = form.into_body();
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(body).unwrap();
        self.send(request).await
    }

    /// Registers a fresh user and returns its id and bearer token
    pub async fn register_user(&mut self) -> (i64, String) {
        let suffix = Uuid::new_v4().simple().to_string();
        let (status, body) = self
            .post_json(
                "/api/auth/register",
                serde_json::json!({
                    "username": format!("admin-{}", suffix),
                    "email": format!("admin-{}@example.com", suffix),
                    "password": "correct_horse_battery",
                }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let user_id = body["user"]["id"].as_i64().expect("user id missing");
        let token = body["token"].as_str().expect("token missing").to_string();
        (user_id, token)
    }

    /// Creates a category and returns its id
    pub async fn create_category(&mut self, name: &str) -> i64 {
        let form = MultipartForm::new().text("name", name);
        let (status, body) = self.post_form("/api/categories", form, None).await;
        assert_eq!(status, StatusCode::CREATED, "create category failed: {}", body);
        body["id"].as_i64().expect("category id missing")
    }

    /// Creates a subcategory under a category and returns its id
    pub async fn create_subcategory(&mut self, name: &str, category_id: i64) -> i64 {
        let form = MultipartForm::new()
            .text("name", name)
            .text("category_id", &category_id.to_string());
        let (status, body) = self.post_form("/api/subcategories", form, None).await;
        assert_eq!(
            status,
            StatusCode::CREATED,
            "create subcategory failed: {}",
            body
        );
        body["id"].as_i64().expect("subcategory id missing")
    }

    /// Creates a product and returns its id
    pub async fn create_product(
        &mut self,
        name: &str,
        category_id: i64,
        subcategory_id: i64,
    ) -> i64 {
        let form = MultipartForm::new()
            .text("name", name)
            .text("price", "9.99")
            .text("category_id", &category_id.to_string())
            .text("subcategory_id", &subcategory_id.to_string());
        let (status, body) = self.post_form("/api/products", form, None).await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {}", body);
        body["id"].as_i64().expect("product id missing")
    }
}

/// Builder for multipart/form-data request bodies
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("----shopadmin-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finishes the body, returning the content-type header value and body
    pub fn into_body(mut self) -> (String, Body) {
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (content_type, Body::from(self.body))
    }
}

/// Returns a unique name with the given prefix
pub fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}
