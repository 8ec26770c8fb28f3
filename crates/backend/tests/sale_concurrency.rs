mod common;

use axum::http::StatusCode;
use common::{create_vehicle, send, setup_app, vehicle_status};
use serde_json::{json, Value};
use std::collections::HashSet;

fn active_sale(customer: &str, vehicle_id: &str) -> Value {
    json!({
        "id": null,
        "code": null,
        "customer_name": customer,
        "sale_date": "2024-06-01",
        "discount": 0.0,
        "status": "active",
        "lines": [{ "vehicle_id": vehicle_id, "quantity": 1 }],
        "comment": null
    })
}

// Две одновременные продажи одного автомобиля: проходит ровно одна.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_of_one_vehicle() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    const VEHICLES: usize = 10;
    let mut vehicles = Vec::with_capacity(VEHICLES);
    for i in 0..VEHICLES {
        vehicles.push(create_vehicle(&app, &format!("VEH-C{i:02}"), 1000.0 + i as f64).await);
    }

    for vehicle_id in &vehicles {
        let first = active_sale("Ana Pérez", vehicle_id);
        let second = active_sale("Luis Gómez", vehicle_id);
        let ((s1, b1), (s2, b2)) = tokio::join!(
            send(&app, "POST", "/api/sale", Some(first)),
            send(&app, "POST", "/api/sale", Some(second)),
        );

        let mut statuses = [s1, s2];
        statuses.sort();
        assert_eq!(
            statuses,
            [StatusCode::OK, StatusCode::UNPROCESSABLE_ENTITY],
            "unexpected outcome: {b1} / {b2}"
        );
        assert_eq!(vehicle_status(&app, vehicle_id).await, "sold");
    }

    let (status, list) = send(&app, "GET", "/api/sale", None).await;
    assert_eq!(status, StatusCode::OK);
    let sales = list.as_array().unwrap();
    assert_eq!(sales.len(), VEHICLES);

    let codes: HashSet<&str> = sales.iter().map(|s| s["code"].as_str().unwrap()).collect();
    assert_eq!(codes.len(), VEHICLES);

    let sold: HashSet<&str> = sales
        .iter()
        .map(|s| s["lines"][0]["vehicle_id"].as_str().unwrap())
        .collect();
    assert_eq!(sold.len(), VEHICLES);
}
