#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cinedex::{
    AppState, config::Config, db, entities::movie, repository::MovieRepository, router,
    uploads::UploadStore,
};
use sea_orm::EntityTrait;

const BOUNDARY: &str = "cinedex-test-boundary";

/// A router over a fresh SQLite file. Dropping it removes the files.
pub struct TestApp {
    pub router: Router,
    pub movies: MovieRepository,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

pub async fn spawn() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
    let upload_dir = dir.path().join("images");

    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: database_url.clone(),
        db_max_connections: 2,
        static_dir: dir.path().join("public"),
        upload_dir: upload_dir.clone(),
        max_upload_bytes: 1024 * 1024,
    };

    let conn = db::connect_and_migrate(&database_url, config.db_max_connections).await.unwrap();
    let uploads = UploadStore::new(&upload_dir);
    uploads.ensure_dir().await.unwrap();

    let movies = MovieRepository::new(conn);
    let state =
        Arc::new(AppState { config: Arc::new(config), movies: movies.clone(), uploads });

    TestApp { router: router(state), movies, upload_dir, _dir: dir }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, json)
    }

    pub async fn send_raw(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn seed(&self, rows: Vec<movie::Model>) {
        movie::Entity::insert_many(rows.into_iter().map(movie::ActiveModel::from))
            .exec(self.movies.db())
            .await
            .unwrap();
    }

    pub fn stored_uploads(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn sample(id: &str, title: &str, rating: f64) -> movie::Model {
    movie::Model {
        id: id.to_string(),
        title: title.to_string(),
        title_folded: movie::fold_title(title),
        genre: "Drama".to_string(),
        release_year: 2001,
        duration_minutes: 100,
        rating,
        image_path: None,
    }
}

pub fn draft(title: &str, rating: f64) -> Value {
    serde_json::json!({
        "title": title,
        "genre": "Drama",
        "releaseYear": 2001,
        "durationMinutes": 100,
        "rating": rating,
    })
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Percent-encodes `text` for a query string value.
pub fn encoded(text: &str) -> String {
    text.bytes()
        .map(|b| if b.is_ascii_alphanumeric() { char::from(b).to_string() } else { format!("%{b:02X}") })
        .collect()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
}

pub fn put_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `POST /create` with a `movies` field and one `image` part per `(filename, contents)`.
pub fn create_request(movies: &Value, images: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"movies\"\r\n\r\n{movies}\r\n"
        )
        .as_bytes(),
    );
    for (filename, contents) in images {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/create")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub fn ids(json: &Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}
