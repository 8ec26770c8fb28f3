use chrono::Utc;
use contracts::domain::a002_sale::aggregate::{Sale, SaleId, SaleLine, SaleStatus};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_sale")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub customer_name: String,
    pub sale_date: String,
    pub discount: f64,
    pub status: String,
    /// JSON-массив строк табличной части
    pub lines_json: Option<String>,
    pub total: f64,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Sale {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let lines: Vec<SaleLine> = m
            .lines_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();

        Sale {
            base: BaseAggregate::with_metadata(
                SaleId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            customer_name: m.customer_name,
            sale_date: m.sale_date,
            discount: m.discount,
            status: SaleStatus::from_storage(&m.status).unwrap_or_default(),
            lines,
            total: m.total,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active(aggregate: &Sale) -> anyhow::Result<ActiveModel> {
    let lines_json = if aggregate.lines.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&aggregate.lines)?)
    };

    Ok(ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        customer_name: Set(aggregate.customer_name.clone()),
        sale_date: Set(aggregate.sale_date.clone()),
        discount: Set(aggregate.discount),
        status: Set(aggregate.status.as_str().to_string()),
        lines_json: Set(lines_json),
        total: Set(aggregate.total),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    })
}

/// Список продаж, новые сверху
pub async fn list_all() -> anyhow::Result<Vec<Sale>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::SaleDate)
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

async fn find_active<C>(db: &C, id: Uuid) -> anyhow::Result<Option<Sale>>
where
    C: ConnectionTrait,
{
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Sale>> {
    find_active(conn(), id).await
}

pub async fn get_by_id_txn(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> anyhow::Result<Option<Sale>> {
    find_active(txn, id).await
}

/// Количество продаж, включая отменённые (для нумерации)
pub async fn count_all_txn(txn: &DatabaseTransaction) -> anyhow::Result<u64> {
    Ok(Entity::find().count(txn).await?)
}

/// Активные и ожидающие продажи, в строках которых есть автомобиль
pub async fn find_open_by_vehicle_txn(
    txn: &DatabaseTransaction,
    vehicle_id: &str,
) -> anyhow::Result<Vec<Sale>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Status.is_in([
            SaleStatus::Active.as_str(),
            SaleStatus::Pending.as_str(),
        ]))
        .filter(Column::LinesJson.contains(vehicle_id))
        .all(txn)
        .await?
        .into_iter()
        .map(Sale::from)
        .filter(|sale| sale.contains_vehicle(vehicle_id))
        .collect();
    Ok(items)
}

pub async fn insert_txn(txn: &DatabaseTransaction, aggregate: &Sale) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate)?.insert(txn).await?;
    Ok(uuid)
}

pub async fn update_txn(txn: &DatabaseTransaction, aggregate: &Sale) -> anyhow::Result<()> {
    let mut active = to_active(aggregate)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(txn).await?;
    Ok(())
}
