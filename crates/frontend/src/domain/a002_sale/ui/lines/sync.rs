use super::row::LineRow;
use crate::domain::a001_vehicle::api::fetch_vehicle_price;
use contracts::domain::a001_vehicle::aggregate::VehiclePriceDto;
use leptos::task::spawn_local;
use std::future::Future;

/// Синхронизировать цену и сумму строки с ценой выбранного автомобиля.
///
/// Один GET на вызов. Ошибки сети, статуса или формата ответа только
/// пишутся в консоль: поля строки остаются как были, повторов нет.
pub fn synchronize(row: LineRow) {
    let task = synchronize_with(row, |vehicle_id| async move {
        fetch_vehicle_price(&vehicle_id).await
    });
    if let Some(task) = task {
        spawn_local(async move {
            task.await;
        });
    }
}

/// Запрос цены через `fetch`. Без выбранного автомобиля `fetch` не вызывается
/// и возвращается `None`; иначе future, которая вернёт `true`, если поля
/// строки были перезаписаны.
fn synchronize_with<F, Fut>(row: LineRow, fetch: F) -> Option<impl Future<Output = bool>>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<VehiclePriceDto, String>>,
{
    let (vehicle_id, token) = row.begin_sync()?;
    let response = fetch(vehicle_id.clone());

    Some(async move {
        match response.await {
            Ok(dto) => {
                let applied = row.apply_price(token, dto.price);
                if !applied {
                    log::debug!(
                        "Price for vehicle {} discarded: row {} has a newer request",
                        vehicle_id,
                        row.key
                    );
                }
                applied
            }
            Err(e) => {
                log::debug!("Price sync for vehicle {} skipped: {}", vehicle_id, e);
                false
            }
        }
    })
}
