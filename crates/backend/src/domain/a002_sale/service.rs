use super::repository;
use crate::domain::a001_vehicle::repository as vehicle_repository;
use crate::shared::data::db::{get_connection, lock_writes};
use crate::shared::error::{parse_uuid, DomainError};
use crate::shared::format::format_money;
use contracts::domain::a001_vehicle::aggregate::{Vehicle, VehicleStatus};
use contracts::domain::a002_sale::aggregate::{
    CancelSaleResponse, Sale, SaleDto, SaleLine, SaleLineDto, SaleStatus,
};
use contracts::domain::common::AggregateRoot;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use std::collections::HashSet;
use uuid::Uuid;

/// Состояние автомобиля, которое задаёт продажа в данном статусе
fn vehicle_status_for(status: SaleStatus) -> VehicleStatus {
    match status {
        SaleStatus::Active => VehicleStatus::Sold,
        SaleStatus::Pending => VehicleStatus::Reserved,
        SaleStatus::Cancelled => VehicleStatus::Available,
    }
}

/// Создание или обновление продажи.
///
/// Цены строк всегда берутся из автомобилей, значения клиента игнорируются.
/// Проверка доступности, запись документа и статусы автомобилей
/// выполняются в одной транзакции.
pub async fn save(dto: SaleDto) -> Result<Uuid, DomainError> {
    if dto.status == Some(SaleStatus::Cancelled) {
        return Err(DomainError::Validation(
            "Отмена продажи выполняется отдельной командой".into(),
        ));
    }
    let existing_id = dto.id.as_deref().map(parse_uuid).transpose()?;

    let _guard = lock_writes().await;
    let txn = get_connection().begin().await?;
    let aggregate = match write_sale(&txn, &dto, existing_id).await {
        Ok(aggregate) => aggregate,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    };
    txn.commit().await?;

    tracing::info!(
        "Sale {} saved: {} line(s), total {}",
        aggregate.base.code,
        aggregate.lines.len(),
        format_money(aggregate.total)
    );
    Ok(aggregate.base.id.value())
}

async fn write_sale(
    txn: &DatabaseTransaction,
    dto: &SaleDto,
    existing_id: Option<Uuid>,
) -> Result<Sale, DomainError> {
    let existing = match existing_id {
        Some(id) => {
            let sale = repository::get_by_id_txn(txn, id)
                .await?
                .ok_or_else(|| DomainError::NotFound(Sale::element_name().to_string()))?;
            if sale.status == SaleStatus::Cancelled {
                return Err(DomainError::Conflict(
                    "Отменённую продажу нельзя изменить".into(),
                ));
            }
            Some(sale)
        }
        None => None,
    };

    let lines = price_lines(txn, &dto.lines, existing.as_ref()).await?;
    let previous_vehicles: Vec<String> = existing
        .as_ref()
        .map(|s| s.vehicle_ids())
        .unwrap_or_default();

    let is_new = existing.is_none();
    let mut aggregate = match existing {
        Some(mut sale) => {
            sale.update_header(dto);
            sale
        }
        None => {
            let code = match dto.code.clone() {
                Some(code) => code,
                None => format!("SALE-{:05}", repository::count_all_txn(txn).await? + 1),
            };
            Sale::new_for_insert(
                code,
                dto.customer_name.clone(),
                dto.sale_date.clone(),
                dto.discount,
                dto.status.unwrap_or_default(),
                dto.comment.clone(),
            )
        }
    };

    aggregate.set_lines(lines);
    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    if is_new {
        repository::insert_txn(txn, &aggregate).await?;
    } else {
        repository::update_txn(txn, &aggregate).await?;
    }

    sync_vehicle_statuses(txn, &aggregate, &previous_vehicles).await?;
    Ok(aggregate)
}

fn unavailable(vehicle: &Vehicle) -> DomainError {
    DomainError::Validation(format!(
        "Автомобиль {} (ID: {}) недоступен. Текущий статус: {}",
        vehicle.base.description,
        vehicle.to_string_id(),
        vehicle.status.label()
    ))
}

/// Пересчёт строк по текущим ценам автомобилей
async fn price_lines(
    txn: &DatabaseTransaction,
    lines: &[SaleLineDto],
    previous: Option<&Sale>,
) -> Result<Vec<SaleLine>, DomainError> {
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        let vehicle_uuid = Uuid::parse_str(&line.vehicle_id).map_err(|_| {
            DomainError::Validation(format!("Некорректный ID автомобиля: {}", line.vehicle_id))
        })?;
        let vehicle = vehicle_repository::get_by_id_txn(txn, vehicle_uuid)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(format!("Автомобиль {} не найден", line.vehicle_id))
            })?;

        let vehicle_id = vehicle.to_string_id();
        let already_in_sale = previous
            .map(|s| s.contains_vehicle(&vehicle_id))
            .unwrap_or(false);
        if !vehicle.is_available() && !already_in_sale {
            return Err(unavailable(&vehicle));
        }

        let sale_line = SaleLine::priced(vehicle_id, line.quantity, vehicle.price)
            .map_err(DomainError::Validation)?;
        priced.push(sale_line);
    }

    Ok(priced)
}

/// Автомобили документа получают статус по статусу продажи,
/// убранные из документа возвращаются в наличие.
/// Новый в документе автомобиль захватывается только из статуса "в наличии".
async fn sync_vehicle_statuses(
    txn: &DatabaseTransaction,
    sale: &Sale,
    previous: &[String],
) -> Result<(), DomainError> {
    let target = vehicle_status_for(sale.status);
    let current: HashSet<&str> = sale.lines.iter().map(|l| l.vehicle_id.as_str()).collect();

    for vehicle_id in &current {
        let uuid = parse_uuid(vehicle_id)?;
        if previous.iter().any(|p| p == vehicle_id) {
            vehicle_repository::set_status_txn(txn, uuid, target).await?;
        } else if !vehicle_repository::claim_txn(txn, uuid, target).await? {
            let vehicle = vehicle_repository::get_by_id_txn(txn, uuid)
                .await?
                .ok_or_else(|| {
                    DomainError::Validation(format!("Автомобиль {} не найден", vehicle_id))
                })?;
            return Err(unavailable(&vehicle));
        }
    }
    for vehicle_id in previous.iter().filter(|v| !current.contains(v.as_str())) {
        vehicle_repository::set_status_txn(txn, parse_uuid(vehicle_id)?, VehicleStatus::Available)
            .await?;
    }
    Ok(())
}

/// Отмена активной продажи с освобождением автомобилей
pub async fn cancel(id: Uuid) -> Result<CancelSaleResponse, DomainError> {
    let _guard = lock_writes().await;
    let txn = get_connection().begin().await?;
    let (sale, released_vehicles) = match cancel_sale(&txn, id).await {
        Ok(cancelled) => cancelled,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    };
    txn.commit().await?;

    tracing::info!(
        "Sale {} cancelled, {} vehicle(s) released",
        sale.base.code,
        released_vehicles
    );
    Ok(CancelSaleResponse {
        id: id.to_string(),
        released_vehicles,
    })
}

async fn cancel_sale(txn: &DatabaseTransaction, id: Uuid) -> Result<(Sale, usize), DomainError> {
    let mut sale = repository::get_by_id_txn(txn, id)
        .await?
        .ok_or_else(|| DomainError::NotFound(Sale::element_name().to_string()))?;

    if !sale.can_cancel() {
        return Err(DomainError::Conflict(format!(
            "Отменить можно только активную продажу (статус: {})",
            sale.status.label()
        )));
    }

    sale.status = SaleStatus::Cancelled;
    sale.before_write();
    repository::update_txn(txn, &sale).await?;

    let mut released_vehicles = 0;
    for vehicle_id in sale.vehicle_ids() {
        let uuid = parse_uuid(&vehicle_id)?;
        if vehicle_repository::set_status_txn(txn, uuid, VehicleStatus::Available).await? {
            released_vehicles += 1;
        }
    }
    Ok((sale, released_vehicles))
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Sale>, DomainError> {
    Ok(repository::get_by_id(id).await?)
}

pub async fn list_all() -> Result<Vec<Sale>, DomainError> {
    Ok(repository::list_all().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_status_follows_sale_status() {
        assert_eq!(vehicle_status_for(SaleStatus::Active), VehicleStatus::Sold);
        assert_eq!(vehicle_status_for(SaleStatus::Pending), VehicleStatus::Reserved);
        assert_eq!(
            vehicle_status_for(SaleStatus::Cancelled),
            VehicleStatus::Available
        );
    }
}
