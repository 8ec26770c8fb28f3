use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::{handlers, system};

/// Конфигурация всех роутов приложения
pub fn configure_routes(static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Vehicle handlers
        .route(
            "/api/vehicle",
            get(handlers::a001_vehicle::list_all).post(handlers::a001_vehicle::upsert),
        )
        .route(
            "/api/vehicle/testdata",
            post(handlers::a001_vehicle::insert_test_data),
        )
        .route(
            "/api/vehicle/:id",
            get(handlers::a001_vehicle::get_by_id).delete(handlers::a001_vehicle::delete),
        )
        .route(
            "/api/vehicle/:id/price",
            get(handlers::a001_vehicle::get_price),
        )
        // A002 Sale handlers
        .route(
            "/api/sale",
            get(handlers::a002_sale::list_all).post(handlers::a002_sale::upsert),
        )
        .route("/api/sale/:id", get(handlers::a002_sale::get_by_id))
        .route("/api/sale/:id/cancel", post(handlers::a002_sale::cancel))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors)
}
