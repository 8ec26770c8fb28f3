use super::repository;
use crate::domain::a002_sale::repository as sale_repository;
use crate::shared::data::db::{get_connection, lock_writes};
use crate::shared::error::DomainError;
use contracts::domain::a001_vehicle::aggregate::{
    Vehicle, VehicleDto, VehiclePriceDto, VehicleStatus,
};
use contracts::domain::a002_sale::aggregate::Sale;
use contracts::domain::common::AggregateRoot;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

/// Создание нового автомобиля
pub async fn create(dto: VehicleDto) -> Result<Uuid, DomainError> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("VEH-{}", &Uuid::new_v4().simple().to_string()[..8]));

    let _guard = lock_writes().await;
    if repository::get_by_code(&code).await?.is_some() {
        return Err(DomainError::Validation(format!(
            "код {} уже используется",
            code
        )));
    }

    let mut aggregate = Vehicle::new_for_insert(code, &dto);
    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    tracing::info!("Vehicle created: {} ({})", aggregate.base.description, id);
    Ok(id)
}

/// Продажа в работе, которая держит автомобиль
async fn holding_sale(
    txn: &DatabaseTransaction,
    vehicle: &Vehicle,
) -> Result<Option<Sale>, DomainError> {
    let open = sale_repository::find_open_by_vehicle_txn(txn, &vehicle.to_string_id()).await?;
    Ok(open.into_iter().next())
}

fn held_by(vehicle: &Vehicle, sale: &Sale) -> DomainError {
    DomainError::Conflict(format!(
        "Автомобиль {} используется в продаже {} ({})",
        vehicle.base.description,
        sale.base.code,
        sale.status.label()
    ))
}

/// Обновление существующего автомобиля.
///
/// Статус автомобиля из открытой продажи меняется только через продажу.
pub async fn update(dto: VehicleDto) -> Result<(), DomainError> {
    let raw_id = dto.id.clone().unwrap_or_default();
    let id = Uuid::parse_str(&raw_id).map_err(|_| DomainError::InvalidId(raw_id))?;

    let _guard = lock_writes().await;
    let txn = get_connection().begin().await?;
    let (aggregate, old_price) = match write_vehicle(&txn, id, &dto).await {
        Ok(updated) => updated,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    };
    txn.commit().await?;

    if (old_price - aggregate.price).abs() > f64::EPSILON {
        tracing::info!(
            "Vehicle {} price changed: {} -> {}",
            id,
            old_price,
            aggregate.price
        );
    }
    Ok(())
}

async fn write_vehicle(
    txn: &DatabaseTransaction,
    id: Uuid,
    dto: &VehicleDto,
) -> Result<(Vehicle, f64), DomainError> {
    let mut aggregate = repository::get_by_id_txn(txn, id)
        .await?
        .ok_or_else(|| DomainError::NotFound(Vehicle::element_name().to_string()))?;

    let old_price = aggregate.price;
    let old_status = aggregate.status;
    aggregate.update(dto);
    aggregate.validate().map_err(DomainError::Validation)?;

    if aggregate.status != old_status {
        if let Some(sale) = holding_sale(txn, &aggregate).await? {
            return Err(held_by(&aggregate, &sale));
        }
    }

    aggregate.before_write();
    repository::update_txn(txn, &aggregate).await?;
    Ok((aggregate, old_price))
}

/// Мягкое удаление автомобиля, если он не участвует в открытой продаже
pub async fn delete(id: Uuid) -> Result<bool, DomainError> {
    let _guard = lock_writes().await;
    let txn = get_connection().begin().await?;
    let deleted = match delete_vehicle(&txn, id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            txn.rollback().await?;
            return Err(e);
        }
    };
    txn.commit().await?;

    if deleted {
        tracing::info!("Vehicle {} deleted", id);
    }
    Ok(deleted)
}

async fn delete_vehicle(txn: &DatabaseTransaction, id: Uuid) -> Result<bool, DomainError> {
    let Some(vehicle) = repository::get_by_id_txn(txn, id).await? else {
        return Ok(false);
    };
    if let Some(sale) = holding_sale(txn, &vehicle).await? {
        return Err(held_by(&vehicle, &sale));
    }
    Ok(repository::soft_delete_txn(txn, id).await?)
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Vehicle>, DomainError> {
    Ok(repository::get_by_id(id).await?)
}

pub async fn list_all() -> Result<Vec<Vehicle>, DomainError> {
    Ok(repository::list_all().await?)
}

/// Каноническая цена для строки продажи
pub async fn get_price(id: Uuid) -> Result<Option<VehiclePriceDto>, DomainError> {
    let price = repository::get_price(id).await?;
    Ok(price.map(|price| VehiclePriceDto {
        id: id.to_string(),
        price,
    }))
}

/// Вставка тестовых данных
pub async fn insert_test_data() -> Result<(), DomainError> {
    let data = vec![
        ("VEH-001", "Toyota", "Corolla", 2022, 19999.9, "Blanco", Some("JTDBR32E720012345")),
        ("VEH-002", "Nissan", "Sentra", 2023, 21450.0, "Gris", Some("3N1AB8CV5PY123456")),
        ("VEH-003", "Chevrolet", "Onix", 2021, 15800.5, "Rojo", None),
        ("VEH-004", "Kia", "Sportage", 2024, 32990.0, "Negro", Some("KNDPM3AC1P7123456")),
    ];

    for (code, brand, model, year, price, color, vin) in data {
        if repository::get_by_code(code).await?.is_some() {
            continue;
        }
        create(VehicleDto {
            id: None,
            code: Some(code.into()),
            brand: brand.into(),
            model: model.into(),
            year,
            price,
            color: color.into(),
            vin: vin.map(Into::into),
            status: Some(VehicleStatus::Available),
            comment: None,
        })
        .await?;
    }

    Ok(())
}
