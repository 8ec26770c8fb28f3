mod common;

use axum::http::StatusCode;
use common::{create_vehicle, send, setup_app};

// Глобальное подключение к БД инициализируется один раз на тестовый бинарник,
// поэтому сценарии выполняются последовательно в одном тесте.
#[tokio::test]
async fn vehicle_api_scenarios() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    // health
    let (status, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    // price endpoint returns the canonical price
    let id = create_vehicle(&app, "VEH-T01", 19999.9).await;
    let (status, body) = send(&app, "GET", &format!("/api/vehicle/{id}/price"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["price"].as_f64(), Some(19999.9));

    // prices are kept in cents, ties round up
    let cents = create_vehicle(&app, "VEH-T03", 10.125).await;
    let (_, body) = send(&app, "GET", &format!("/api/vehicle/{cents}/price"), None).await;
    assert_eq!(body["price"].as_f64(), Some(10.13));

    // unknown id -> 404, malformed id -> 400
    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/api/vehicle/{missing}/price"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, "GET", "/api/vehicle/not-a-uuid/price", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // newly created vehicles are available
    let (status, body) = send(&app, "GET", &format!("/api/vehicle/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "available");
    assert_eq!(body["description"], "Toyota Corolla 2022");

    // price update is visible through the price endpoint
    let (status, _) = send(
        &app,
        "POST",
        "/api/vehicle",
        Some(serde_json::json!({
            "id": id,
            "code": "VEH-T01",
            "brand": "Toyota",
            "model": "Corolla",
            "year": 2022,
            "price": 18500.0,
            "color": "Blanco",
            "vin": null,
            "status": null,
            "comment": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", &format!("/api/vehicle/{id}/price"), None).await;
    assert_eq!(body["price"].as_f64(), Some(18500.0));

    // negative price is rejected
    let (status, body) = send(
        &app,
        "POST",
        "/api/vehicle",
        Some(serde_json::json!({
            "id": null,
            "code": "VEH-T02",
            "brand": "Kia",
            "model": "Rio",
            "year": 2020,
            "price": -5.0,
            "color": "Azul",
            "vin": null,
            "status": null,
            "comment": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    // duplicate code is rejected
    let (status, _) = send(
        &app,
        "POST",
        "/api/vehicle",
        Some(serde_json::json!({
            "id": null,
            "code": "VEH-T01",
            "brand": "Kia",
            "model": "Rio",
            "year": 2020,
            "price": 100.0,
            "color": "Azul",
            "vin": null,
            "status": null,
            "comment": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // test data is idempotent
    let (status, _) = send(&app, "POST", "/api/vehicle/testdata", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/api/vehicle/testdata", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, list) = send(&app, "GET", "/api/vehicle", None).await;
    assert_eq!(list.as_array().map(|l| l.len()), Some(6));

    // soft delete hides the vehicle
    let (status, _) = send(&app, "DELETE", &format!("/api/vehicle/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/api/vehicle/{id}/price"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/vehicle/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
