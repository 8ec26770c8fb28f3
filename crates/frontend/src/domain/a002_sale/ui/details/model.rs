use crate::shared::api_utils::{api_url, error_message};
use contracts::domain::a002_sale::aggregate::{CancelSaleResponse, Sale, SaleDto};
use gloo_net::http::{Request, Response};

async fn read_error(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_message(status, &body)
}

pub async fn fetch_by_id(id: String) -> Result<Sale, String> {
    let response = Request::get(&api_url(&format!("/api/sale/{}", id)))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(read_error(response).await);
    }

    response
        .json::<Sale>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Сохранить документ; сервер пересчитывает цены и возвращает id
pub async fn save_form(dto: &SaleDto) -> Result<String, String> {
    let response = Request::post(&api_url("/api/sale"))
        .json(dto)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(read_error(response).await);
    }

    let result: serde_json::Value = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    result["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "Response has no id".to_string())
}

pub async fn cancel_sale(id: String) -> Result<CancelSaleResponse, String> {
    let response = Request::post(&api_url(&format!("/api/sale/{}/cancel", id)))
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    if !response.ok() {
        return Err(read_error(response).await);
    }

    response
        .json::<CancelSaleResponse>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
