#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

/// Router поверх свежей SQLite базы во временной директории
pub async fn setup_app(dir: &tempfile::TempDir) -> Router {
    let db_path = dir.path().join("test.db");
    backend::shared::data::db::initialize_database(Some(&db_path.to_string_lossy()))
        .await
        .expect("database init");
    backend::routes::configure_routes(&dir.path().join("dist").to_string_lossy())
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn create_vehicle(app: &Router, code: &str, price: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/vehicle",
        Some(serde_json::json!({
            "id": null,
            "code": code,
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2022,
            "price": price,
            "color": "Blanco",
            "vin": null,
            "status": null,
            "comment": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create vehicle failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

pub async fn vehicle_status(app: &Router, id: &str) -> String {
    let (status, body) = send(app, "GET", &format!("/api/vehicle/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["status"].as_str().unwrap().to_string()
}
