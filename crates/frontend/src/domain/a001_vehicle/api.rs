use contracts::domain::a001_vehicle::aggregate::{Vehicle, VehiclePriceDto};
use contracts::shared::line_pricing::validate_price;
use gloo_net::http::Request;

use crate::shared::api_utils::api_url;

/// Fetch all vehicles
pub async fn fetch_vehicles() -> Result<Vec<Vehicle>, String> {
    let response = Request::get(&api_url("/api/vehicle"))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Failed to fetch vehicles: {}", response.status()));
    }

    response
        .json::<Vec<Vehicle>>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Fetch the canonical price of one vehicle
///
/// Any non-2xx status, malformed body or out-of-range price is an error.
pub async fn fetch_vehicle_price(id: &str) -> Result<VehiclePriceDto, String> {
    let response = Request::get(&api_url(&VehiclePriceDto::path(id)))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(format!("Failed to fetch price: {}", response.status()));
    }

    let dto = response
        .json::<VehiclePriceDto>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;
    validate_price(dto.price)?;
    Ok(dto)
}
