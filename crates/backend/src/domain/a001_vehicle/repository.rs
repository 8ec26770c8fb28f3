use chrono::Utc;
use contracts::domain::a001_vehicle::aggregate::{Vehicle, VehicleId, VehicleStatus};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub color: String,
    pub vin: Option<String>,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Vehicle {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let status = VehicleStatus::from_storage(&m.status).unwrap_or_else(|| {
            tracing::warn!("Unknown vehicle status '{}' for {}", m.status, m.id);
            VehicleStatus::Reserved
        });

        Vehicle {
            base: BaseAggregate::with_metadata(
                VehicleId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            brand: m.brand,
            model: m.model,
            year: m.year,
            price: m.price,
            color: m.color,
            vin: m.vin,
            status,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(aggregate: &Vehicle) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        brand: Set(aggregate.brand.clone()),
        model: Set(aggregate.model.clone()),
        year: Set(aggregate.year),
        price: Set(aggregate.price),
        color: Set(aggregate.color.clone()),
        vin: Set(aggregate.vin.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<Vehicle>> {
    let mut items: Vec<Vehicle> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| {
        a.base
            .description
            .to_lowercase()
            .cmp(&b.base.description.to_lowercase())
    });
    Ok(items)
}

async fn find_active<C>(db: &C, id: Uuid) -> anyhow::Result<Option<Vehicle>>
where
    C: ConnectionTrait,
{
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

/// Только не удалённые записи
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Vehicle>> {
    find_active(conn(), id).await
}

pub async fn get_by_id_txn(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> anyhow::Result<Option<Vehicle>> {
    find_active(txn, id).await
}

/// Цена без загрузки всего агрегата
pub async fn get_price(id: Uuid) -> anyhow::Result<Option<f64>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(|m| m.price))
}

pub async fn get_by_code(code: &str) -> anyhow::Result<Option<Vehicle>> {
    let result = Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Vehicle) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update_txn(txn: &DatabaseTransaction, aggregate: &Vehicle) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(txn).await?;
    Ok(())
}

/// Безусловная смена статуса
pub async fn set_status_txn(
    txn: &DatabaseTransaction,
    id: Uuid,
    status: VehicleStatus,
) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(status.as_str()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(txn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Смена статуса только у свободного автомобиля.
/// `false`, если автомобиль уже занят, удалён или не найден.
pub async fn claim_txn(
    txn: &DatabaseTransaction,
    id: Uuid,
    status: VehicleStatus,
) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::Status, Expr::value(status.as_str()))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::Status.eq(VehicleStatus::Available.as_str()))
        .filter(Column::IsDeleted.eq(false))
        .exec(txn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn soft_delete_txn(txn: &DatabaseTransaction, id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(txn)
        .await?;
    Ok(result.rows_affected > 0)
}
