use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::line_pricing::{LinePricing, DEFAULT_QUANTITY};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// ID типа для документа Продажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(pub Uuid);

impl SaleId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for SaleId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SaleId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Статус продажи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Active,
    Pending,
    Cancelled,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_storage(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SaleStatus::Active),
            "pending" => Some(SaleStatus::Pending),
            "cancelled" => Some(SaleStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SaleStatus::Active => "Активна",
            SaleStatus::Pending => "Ожидает",
            SaleStatus::Cancelled => "Отменена",
        }
    }
}

/// Строка табличной части «Автомобили» документа продажи
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleLine {
    /// UUID автомобиля (ссылка на a001_vehicle)
    pub vehicle_id: String,

    /// Количество
    pub quantity: u32,

    /// Цена за единицу (копируется из автомобиля при сохранении)
    pub unit_price: f64,

    /// Сумма строки = цена × количество
    pub subtotal: f64,
}

impl SaleLine {
    /// Строка с пересчитанной суммой
    pub fn priced(vehicle_id: String, quantity: u32, unit_price: f64) -> Result<Self, String> {
        let pricing = LinePricing::with_quantity(unit_price, quantity)?;
        Ok(Self {
            vehicle_id,
            quantity: pricing.quantity,
            unit_price: pricing.unit_price,
            subtotal: pricing.subtotal,
        })
    }
}

/// Документ Продажа (агрегат a002)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(flatten)]
    pub base: BaseAggregate<SaleId>,

    pub customer_name: String,

    /// Дата продажи (YYYY-MM-DD)
    pub sale_date: String,

    /// Скидка на весь документ
    pub discount: f64,

    pub status: SaleStatus,

    pub lines: Vec<SaleLine>,

    /// Итог = сумма строк − скидка
    pub total: f64,
}

impl Sale {
    pub fn new_for_insert(
        code: String,
        customer_name: String,
        sale_date: String,
        discount: f64,
        status: SaleStatus,
        comment: Option<String>,
    ) -> Self {
        let description = Self::compose_description(&code, &sale_date);
        let mut base = BaseAggregate::new(SaleId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            customer_name,
            sale_date,
            discount,
            status,
            lines: Vec::new(),
            total: 0.0,
        }
    }

    pub fn compose_description(code: &str, sale_date: &str) -> String {
        format!("{} от {}", code, sale_date)
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Сумма строк без скидки
    pub fn lines_amount(&self) -> f64 {
        self.lines.iter().map(|l| l.subtotal).sum()
    }

    /// Пересчитать итог документа
    pub fn recalculate_total(&mut self) {
        self.total = self.lines_amount() - self.discount;
    }

    /// Заменить строки и пересчитать итог
    pub fn set_lines(&mut self, lines: Vec<SaleLine>) {
        self.lines = lines;
        self.recalculate_total();
    }

    /// ID автомобилей документа
    pub fn vehicle_ids(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.vehicle_id.clone()).collect()
    }

    pub fn contains_vehicle(&self, vehicle_id: &str) -> bool {
        self.lines.iter().any(|l| l.vehicle_id == vehicle_id)
    }

    pub fn can_cancel(&self) -> bool {
        self.status == SaleStatus::Active
    }

    /// Обновить шапку документа из DTO (строки пересчитываются отдельно)
    pub fn update_header(&mut self, dto: &SaleDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.customer_name = dto.customer_name.clone();
        self.sale_date = dto.sale_date.clone();
        self.discount = dto.discount;
        if let Some(status) = dto.status {
            self.status = status;
        }
        self.base.comment = dto.comment.clone();
        self.base.description = Self::compose_description(&self.base.code, &self.sale_date);
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.customer_name.trim().is_empty() {
            return Err("Клиент не может быть пустым".into());
        }
        if NaiveDate::parse_from_str(&self.sale_date, "%Y-%m-%d").is_err() {
            return Err(format!("Некорректная дата продажи: {}", self.sale_date));
        }
        if !self.discount.is_finite() || self.discount < 0.0 {
            return Err("Скидка не может быть отрицательной".into());
        }
        if self.lines.is_empty() {
            return Err("Документ должен содержать хотя бы одну строку".into());
        }

        let mut seen = HashSet::new();
        for line in &self.lines {
            if line.quantity < DEFAULT_QUANTITY {
                return Err("Количество должно быть не меньше 1".into());
            }
            if !seen.insert(line.vehicle_id.as_str()) {
                return Err(format!(
                    "Автомобиль {} указан в документе несколько раз",
                    line.vehicle_id
                ));
            }
        }

        if self.discount > self.lines_amount() {
            return Err("Скидка превышает сумму документа".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.recalculate_total();
        self.base.metadata.mark_written();
    }
}

impl AggregateRoot for Sale {
    type Id = SaleId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "sale"
    }

    fn element_name() -> &'static str {
        "Продажа"
    }

    fn list_name() -> &'static str {
        "Продажи"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Строка формы: цена и сумма не передаются, сервер берёт их из автомобиля
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleLineDto {
    pub vehicle_id: String,
    pub quantity: u32,
}

/// DTO для создания/обновления продажи
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SaleDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub customer_name: String,
    pub sale_date: String,
    pub discount: f64,
    pub status: Option<SaleStatus>,
    pub lines: Vec<SaleLineDto>,
    pub comment: Option<String>,
}

/// Результат отмены продажи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSaleResponse {
    pub id: String,
    pub released_vehicles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale_with_lines(discount: f64, lines: Vec<SaleLine>) -> Sale {
        let mut sale = Sale::new_for_insert(
            "SALE-001".into(),
            "Juan Pérez".into(),
            "2024-05-10".into(),
            discount,
            SaleStatus::Active,
            None,
        );
        sale.set_lines(lines);
        sale
    }

    #[test]
    fn test_total_is_lines_minus_discount() {
        let sale = sale_with_lines(
            500.0,
            vec![
                SaleLine::priced("a".into(), 3, 19999.9).unwrap(),
                SaleLine::priced("b".into(), 1, 15000.0).unwrap(),
            ],
        );
        assert!((sale.lines_amount() - 74999.7).abs() < 1e-6);
        assert!((sale.total - 74499.7).abs() < 1e-6);
        assert!(sale.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_vehicle() {
        let sale = sale_with_lines(
            0.0,
            vec![
                SaleLine::priced("a".into(), 1, 100.0).unwrap(),
                SaleLine::priced("a".into(), 2, 100.0).unwrap(),
            ],
        );
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_lines_and_bad_date() {
        let sale = sale_with_lines(0.0, vec![]);
        assert!(sale.validate().is_err());

        let mut sale = sale_with_lines(0.0, vec![SaleLine::priced("a".into(), 1, 1.0).unwrap()]);
        sale.sale_date = "10/05/2024".into();
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_discount_above_amount() {
        let sale = sale_with_lines(200.0, vec![SaleLine::priced("a".into(), 1, 100.0).unwrap()]);
        assert!(sale.validate().is_err());
    }

    #[test]
    fn test_priced_line_clamps_zero_quantity() {
        let line = SaleLine::priced("a".into(), 0, 250.0).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.subtotal, 250.0);
    }

    #[test]
    fn test_priced_line_caps_huge_quantity() {
        let line = SaleLine::priced("a".into(), u32::MAX, 2.0).unwrap();
        assert_eq!(line.quantity, crate::shared::line_pricing::MAX_QUANTITY);
        assert_eq!(line.subtotal, 19998.0);
    }

    #[test]
    fn test_only_active_sale_can_be_cancelled() {
        let mut sale = sale_with_lines(0.0, vec![SaleLine::priced("a".into(), 1, 1.0).unwrap()]);
        assert!(sale.can_cancel());
        sale.status = SaleStatus::Pending;
        assert!(!sale.can_cancel());
    }
}
