use axum::{extract::Path, http::StatusCode, Json};
use serde_json::json;

use crate::domain::a001_vehicle;
use crate::shared::error::{parse_uuid, DomainError};
use contracts::domain::a001_vehicle::aggregate::{Vehicle, VehicleDto, VehiclePriceDto};
use contracts::domain::common::AggregateRoot;

/// GET /api/vehicle
pub async fn list_all() -> Result<Json<Vec<Vehicle>>, DomainError> {
    Ok(Json(a001_vehicle::service::list_all().await?))
}

/// GET /api/vehicle/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Vehicle>, DomainError> {
    let uuid = parse_uuid(&id)?;
    match a001_vehicle::service::get_by_id(uuid).await? {
        Some(v) => Ok(Json(v)),
        None => Err(DomainError::NotFound(Vehicle::element_name().to_string())),
    }
}

/// GET /api/vehicle/:id/price
///
/// Каноническая цена автомобиля для пересчёта строк продажи
pub async fn get_price(Path(id): Path<String>) -> Result<Json<VehiclePriceDto>, DomainError> {
    let uuid = parse_uuid(&id)?;
    match a001_vehicle::service::get_price(uuid).await? {
        Some(price) => Ok(Json(price)),
        None => Err(DomainError::NotFound(Vehicle::element_name().to_string())),
    }
}

/// POST /api/vehicle
pub async fn upsert(Json(dto): Json<VehicleDto>) -> Result<Json<serde_json::Value>, DomainError> {
    let id = match dto.id.clone() {
        Some(id) => {
            a001_vehicle::service::update(dto).await?;
            id
        }
        None => a001_vehicle::service::create(dto).await?.to_string(),
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/vehicle/:id
pub async fn delete(Path(id): Path<String>) -> Result<StatusCode, DomainError> {
    let uuid = parse_uuid(&id)?;
    if a001_vehicle::service::delete(uuid).await? {
        Ok(StatusCode::OK)
    } else {
        Err(DomainError::NotFound(Vehicle::element_name().to_string()))
    }
}

/// POST /api/vehicle/testdata
pub async fn insert_test_data() -> StatusCode {
    match a001_vehicle::service::insert_test_data().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to insert test vehicles: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
