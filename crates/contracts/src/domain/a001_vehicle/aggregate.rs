use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::line_pricing::{round_amount, validate_price};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор автомобиля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
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

impl AggregateId for VehicleId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(VehicleId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Status
// ============================================================================

/// Состояние автомобиля на складе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Sold => "sold",
        }
    }

    pub fn from_storage(s: &str) -> Option<Self> {
        match s {
            "available" => Some(VehicleStatus::Available),
            "reserved" => Some(VehicleStatus::Reserved),
            "sold" => Some(VehicleStatus::Sold),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "В наличии",
            VehicleStatus::Reserved => "Зарезервирован",
            VehicleStatus::Sold => "Продан",
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Автомобиль (позиция склада, источник цены для строк продажи)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(flatten)]
    pub base: BaseAggregate<VehicleId>,

    pub brand: String,
    pub model: String,
    pub year: i32,

    /// Каноническая цена за единицу
    pub price: f64,

    pub color: String,
    pub vin: Option<String>,
    pub status: VehicleStatus,
}

impl Vehicle {
    /// Создать новый автомобиль для вставки в БД
    pub fn new_for_insert(code: String, dto: &VehicleDto) -> Self {
        let mut base = BaseAggregate::new(
            VehicleId::new_v4(),
            code,
            Self::compose_description(&dto.brand, &dto.model, dto.year),
        );
        base.comment = dto.comment.clone();

        Self {
            base,
            brand: dto.brand.clone(),
            model: dto.model.clone(),
            year: dto.year,
            price: round_amount(dto.price),
            color: dto.color.clone(),
            vin: normalize_vin(dto.vin.as_deref()),
            status: dto.status.unwrap_or_default(),
        }
    }

    /// "Марка Модель Год": отображаемое наименование
    pub fn compose_description(brand: &str, model: &str, year: i32) -> String {
        format!("{} {} {}", brand.trim(), model.trim(), year)
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &VehicleDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.base.comment = dto.comment.clone();
        self.brand = dto.brand.clone();
        self.model = dto.model.clone();
        self.year = dto.year;
        self.price = round_amount(dto.price);
        self.color = dto.color.clone();
        self.vin = normalize_vin(dto.vin.as_deref());
        if let Some(status) = dto.status {
            self.status = status;
        }
        self.base.description = Self::compose_description(&self.brand, &self.model, self.year);
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.brand.trim().is_empty() {
            return Err("Марка не может быть пустой".into());
        }
        if self.model.trim().is_empty() {
            return Err("Модель не может быть пустой".into());
        }
        if !(1886..=2100).contains(&self.year) {
            return Err(format!("Недопустимый год выпуска: {}", self.year));
        }
        validate_price(self.price)?;
        if let Some(vin) = &self.vin {
            if vin.chars().count() > 17 {
                return Err("VIN не может быть длиннее 17 символов".into());
            }
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.metadata.mark_written();
    }
}

fn normalize_vin(vin: Option<&str>) -> Option<String> {
    vin.map(|v| v.trim().to_uppercase()).filter(|v| !v.is_empty())
}

impl AggregateRoot for Vehicle {
    type Id = VehicleId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "vehicle"
    }

    fn element_name() -> &'static str {
        "Автомобиль"
    }

    fn list_name() -> &'static str {
        "Автомобили"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления автомобиля
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VehicleDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub color: String,
    pub vin: Option<String>,
    pub status: Option<VehicleStatus>,
    pub comment: Option<String>,
}

/// Ответ ценового endpoint'а: только то, что нужно строке продажи
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePriceDto {
    pub id: String,
    pub price: f64,
}

impl VehiclePriceDto {
    /// Путь ценового endpoint'а для автомобиля
    pub fn path(vehicle_id: &str) -> String {
        format!("/api/vehicle/{}/price", vehicle_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dto() -> VehicleDto {
        VehicleDto {
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: 2022,
            price: 19999.9,
            color: "Blanco".into(),
            vin: Some(" jtdbr32e720012345 ".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_for_insert_composes_description() {
        let v = Vehicle::new_for_insert("VEH-001".into(), &sample_dto());
        assert_eq!(v.base.description, "Toyota Corolla 2022");
        assert_eq!(v.vin.as_deref(), Some("JTDBR32E720012345"));
        assert_eq!(v.status, VehicleStatus::Available);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let mut dto = sample_dto();
        dto.price = -1.0;
        let v = Vehicle::new_for_insert("VEH-001".into(), &dto);
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_price_is_stored_in_cents() {
        let mut dto = sample_dto();
        dto.price = 10.125;
        let mut v = Vehicle::new_for_insert("VEH-001".into(), &dto);
        assert_eq!(v.price, 10.13);

        dto.price = 15800.004;
        v.update(&dto);
        assert_eq!(v.price, 15800.0);
    }

    #[test]
    fn test_validate_rejects_long_vin() {
        let mut dto = sample_dto();
        dto.vin = Some("123456789012345678".into());
        let v = Vehicle::new_for_insert("VEH-001".into(), &dto);
        assert!(v.validate().is_err());
    }

    #[test]
    fn test_status_roundtrip_through_storage_text() {
        for status in [VehicleStatus::Available, VehicleStatus::Reserved, VehicleStatus::Sold] {
            assert_eq!(VehicleStatus::from_storage(status.as_str()), Some(status));
        }
        assert_eq!(VehicleStatus::from_storage("VENDIDO"), None);
    }

    #[test]
    fn test_json_shape() {
        let v = Vehicle::new_for_insert("VEH-001".into(), &sample_dto());
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["id"], v.to_string_id());
        assert_eq!(json["code"], "VEH-001");
        assert_eq!(json["status"], "available");

        let price: VehiclePriceDto =
            serde_json::from_str(r#"{"id":"abc","price":19999.9}"#).unwrap();
        assert_eq!(price.price, 19999.9);
    }

    #[test]
    fn test_price_path_and_table_name() {
        assert_eq!(VehiclePriceDto::path("abc"), "/api/vehicle/abc/price");
        assert_eq!(Vehicle::full_name(), "a001_vehicle");
    }
}
