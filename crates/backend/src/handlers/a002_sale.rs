use axum::{extract::Path, Json};
use serde_json::json;

use crate::domain::a002_sale;
use crate::shared::error::{parse_uuid, DomainError};
use contracts::domain::a002_sale::aggregate::{CancelSaleResponse, Sale, SaleDto};
use contracts::domain::common::AggregateRoot;

/// GET /api/sale
pub async fn list_all() -> Result<Json<Vec<Sale>>, DomainError> {
    Ok(Json(a002_sale::service::list_all().await?))
}

/// GET /api/sale/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Sale>, DomainError> {
    let uuid = parse_uuid(&id)?;
    match a002_sale::service::get_by_id(uuid).await? {
        Some(sale) => Ok(Json(sale)),
        None => Err(DomainError::NotFound(Sale::element_name().to_string())),
    }
}

/// POST /api/sale
pub async fn upsert(Json(dto): Json<SaleDto>) -> Result<Json<serde_json::Value>, DomainError> {
    let id = a002_sale::service::save(dto).await?;
    Ok(Json(json!({ "id": id.to_string() })))
}

/// POST /api/sale/:id/cancel
pub async fn cancel(Path(id): Path<String>) -> Result<Json<CancelSaleResponse>, DomainError> {
    let uuid = parse_uuid(&id)?;
    Ok(Json(a002_sale::service::cancel(uuid).await?))
}
