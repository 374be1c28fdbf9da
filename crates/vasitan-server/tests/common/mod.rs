#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vasitan_server::auth::session::{SessionKeys, SESSION_COOKIE};
use vasitan_server::config::Config;
use vasitan_server::db::{self, DbPool};
use vasitan_server::routes::{create_router, AppState};

pub struct TestApp {
    pub router: Router,
    pub pool: DbPool,
    _dir: TempDir,
}

/// Full router over a throwaway SQLite file, rate limiting off.
pub fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.db");
    let pool = db::create_pool(path.to_str().expect("utf-8 path")).expect("pool");

    let config = Config {
        rate_limit: false,
        max_image_bytes: 64 * 1024,
        ..Config::default()
    };
    let state = AppState {
        db: pool.clone(),
        keys: SessionKeys::new(config.session_secret.as_bytes()).expect("keys"),
        config,
    };

    TestApp {
        router: create_router(state),
        pool,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn post_form(&self, uri: &str, body: String, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = builder.body(Body::from(body)).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Registers through the form action and returns the session cookie pair.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let body = form(&[
            ("email", email),
            ("password", password),
            ("passwordConfirm", password),
        ]);
        let response = self.post_form("/register", body, None).await;
        assert_eq!(location(&response), "/dashboard/listings");
        session_cookie(&response).expect("registration sets a session cookie")
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.pool.get().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// `name=value` of the session cookie set by `response`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{SESSION_COOKIE}=")))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn set_cookie_header(response: &Response<Body>) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn form(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("form pairs encode")
}

pub const COVER_URL: &str = "https://images.example/cover.jpg";

/// A complete create-listing submission.
pub fn listing_fields(title: &str) -> Vec<(&str, String)> {
    vec![
        ("title", title.to_string()),
        ("description", "Showroom condition, single owner.".to_string()),
        ("listingType", "FOR_SALE".to_string()),
        ("price", "1890000".to_string()),
        ("vehicleType", "AUTOMOBILE".to_string()),
        ("brand", "Tesla".to_string()),
        ("model", "Model 3".to_string()),
        ("year", "2020".to_string()),
        ("fuelType", "ELECTRIC".to_string()),
        ("gearType", "AUTOMATIC".to_string()),
        ("km", "42000".to_string()),
        ("city", "Istanbul".to_string()),
        ("uploadedImages", COVER_URL.to_string()),
    ]
}

pub fn listing_form(fields: &[(&str, String)]) -> String {
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    form(&pairs)
}

/// Id from a `/listings/{id}` redirect.
pub fn listing_id(response: &Response<Body>) -> i64 {
    location(response)
        .strip_prefix("/listings/")
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("unexpected redirect {:?}", location(response)))
}
