use contracts::domain::a001_vehicle::aggregate::Vehicle;
use contracts::domain::common::AggregateRoot;
use contracts::shared::line_pricing::format_amount;

/// Вариант выбора автомобиля в строке продажи
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleChoice {
    pub id: String,
    pub label: String,
}

impl VehicleChoice {
    fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.to_string_id(),
            label: format!(
                "{} ({}) - {}",
                vehicle.base.description,
                vehicle.code(),
                format_amount(vehicle.price)
            ),
        }
    }
}

/// Автомобили, доступные для строки: в наличии, уже входящие в документ,
/// или выбранный в самой строке
pub fn vehicle_choices(vehicles: &[Vehicle], owned: &[String], current: &str) -> Vec<VehicleChoice> {
    vehicles
        .iter()
        .filter(|v| {
            let id = v.to_string_id();
            v.is_available() || id == current || owned.iter().any(|o| *o == id)
        })
        .map(VehicleChoice::from_vehicle)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_vehicle::aggregate::{VehicleDto, VehicleStatus};

    fn vehicle(code: &str, status: VehicleStatus) -> Vehicle {
        Vehicle::new_for_insert(
            code.to_string(),
            &VehicleDto {
                brand: "Toyota".into(),
                model: "Corolla".into(),
                year: 2022,
                price: 19999.9,
                status: Some(status),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_only_available_by_default() {
        let vehicles = vec![
            vehicle("VEH-001", VehicleStatus::Available),
            vehicle("VEH-002", VehicleStatus::Sold),
            vehicle("VEH-003", VehicleStatus::Reserved),
        ];
        let choices = vehicle_choices(&vehicles, &[], "");
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].id, vehicles[0].to_string_id());
        assert_eq!(choices[0].label, "Toyota Corolla 2022 (VEH-001) - 19999.90");
    }

    #[test]
    fn test_owned_and_current_vehicles_stay_selectable() {
        let vehicles = vec![
            vehicle("VEH-001", VehicleStatus::Sold),
            vehicle("VEH-002", VehicleStatus::Reserved),
        ];
        let owned = vec![vehicles[0].to_string_id()];
        let current = vehicles[1].to_string_id();
        assert_eq!(vehicle_choices(&vehicles, &owned, &current).len(), 2);
    }
}
