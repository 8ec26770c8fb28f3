use super::model;
use crate::domain::a001_vehicle::api::fetch_vehicles;
use crate::domain::a001_vehicle::choice::{vehicle_choices, VehicleChoice};
use crate::domain::a002_sale::ui::lines::LineRows;
use crate::shared::date_utils::today;
use contracts::domain::a001_vehicle::aggregate::Vehicle;
use contracts::domain::a002_sale::aggregate::{Sale, SaleDto, SaleStatus};
use contracts::domain::common::AggregateId;
use contracts::shared::line_pricing::format_amount;
use leptos::prelude::*;
use std::rc::Rc;

/// ViewModel for Sale details form
#[derive(Clone, Copy)]
pub struct SaleDetailsViewModel {
    pub id: RwSignal<Option<String>>,
    pub code: RwSignal<Option<String>>,
    pub customer_name: RwSignal<String>,
    pub sale_date: RwSignal<String>,
    pub discount: RwSignal<String>,
    pub status: RwSignal<SaleStatus>,
    pub comment: RwSignal<String>,
    pub lines: LineRows,
    pub vehicles: RwSignal<Vec<Vehicle>>,
    /// Автомобили сохранённого документа: остаются в списке выбора
    pub owned_vehicles: RwSignal<Vec<String>>,
    pub error: RwSignal<Option<String>>,
    pub info: RwSignal<Option<String>>,
    pub busy: RwSignal<bool>,
}

impl Default for SaleDetailsViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleDetailsViewModel {
    pub fn new() -> Self {
        let lines = LineRows::new();
        lines.push_empty();
        Self {
            id: RwSignal::new(None),
            code: RwSignal::new(None),
            customer_name: RwSignal::new(String::new()),
            sale_date: RwSignal::new(today()),
            discount: RwSignal::new("0.00".to_string()),
            status: RwSignal::new(SaleStatus::Active),
            comment: RwSignal::new(String::new()),
            lines,
            vehicles: RwSignal::new(Vec::new()),
            owned_vehicles: RwSignal::new(Vec::new()),
            error: RwSignal::new(None),
            info: RwSignal::new(None),
            busy: RwSignal::new(false),
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.id.get().is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.get() == SaleStatus::Cancelled
    }

    pub fn can_cancel(&self) -> bool {
        self.is_edit_mode() && self.status.get() == SaleStatus::Active
    }

    /// Скидка из поля ввода; пустое или нечисловое значение = 0
    pub fn discount_value(&self) -> f64 {
        self.discount
            .get()
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .unwrap_or(0.0)
    }

    /// Предварительный итог: Σ сумм строк минус скидка. Окончательный считает сервер.
    pub fn total_preview(&self) -> String {
        format_amount(self.lines.amount() - self.discount_value())
    }

    pub fn vehicle_choices(&self, current: &str) -> Vec<VehicleChoice> {
        let owned = self.owned_vehicles.get();
        self.vehicles
            .with(|vehicles| vehicle_choices(vehicles, &owned, current))
    }

    pub fn validate_form(&self) -> Result<(), String> {
        if self.customer_name.get_untracked().trim().is_empty() {
            return Err("Клиент обязателен для заполнения".to_string());
        }
        if self.sale_date.get_untracked().trim().is_empty() {
            return Err("Дата продажи обязательна для заполнения".to_string());
        }
        if self.discount_value() < 0.0 {
            return Err("Скидка не может быть отрицательной".to_string());
        }
        if self.lines.to_dto_lines().is_empty() {
            return Err("Добавьте хотя бы один автомобиль".to_string());
        }
        Ok(())
    }

    pub fn to_dto(&self) -> SaleDto {
        let comment = self.comment.get_untracked();
        SaleDto {
            id: self.id.get_untracked(),
            code: self.code.get_untracked(),
            customer_name: self.customer_name.get_untracked().trim().to_string(),
            sale_date: self.sale_date.get_untracked(),
            discount: self.discount_value(),
            status: Some(self.status.get_untracked()),
            lines: self.lines.to_dto_lines(),
            comment: if comment.trim().is_empty() { None } else { Some(comment) },
        }
    }

    /// Заполнить форму сохранённым документом
    pub fn apply_sale(&self, sale: &Sale) {
        self.id.set(Some(sale.base.id.as_string()));
        self.code.set(Some(sale.base.code.clone()));
        self.customer_name.set(sale.customer_name.clone());
        self.sale_date.set(sale.sale_date.clone());
        self.discount.set(format_amount(sale.discount));
        self.status.set(sale.status);
        self.comment.set(sale.base.comment.clone().unwrap_or_default());
        self.owned_vehicles.set(sale.vehicle_ids());
        self.lines.replace_with(&sale.lines);
    }

    pub fn load_vehicles(&self) {
        let vehicles = self.vehicles;
        let error = self.error;
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_vehicles().await {
                Ok(list) => vehicles.set(list),
                Err(e) => error.set(Some(format!("Ошибка загрузки автомобилей: {}", e))),
            }
        });
    }

    /// Load form data from server if ID is provided
    pub fn load_if_needed(&self, id: Option<String>) {
        if let Some(existing_id) = id {
            let this = *self;
            wasm_bindgen_futures::spawn_local(async move {
                match model::fetch_by_id(existing_id).await {
                    Ok(sale) => this.apply_sale(&sale),
                    Err(e) => this.error.set(Some(format!("Ошибка загрузки: {}", e))),
                }
            });
        }
    }

    /// Save form data to server
    pub fn save_command(&self, on_saved: Rc<dyn Fn(String)>) {
        if let Err(e) = self.validate_form() {
            self.error.set(Some(e));
            return;
        }

        let dto = self.to_dto();
        let this = *self;
        this.busy.set(true);
        this.error.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            match model::save_form(&dto).await {
                Ok(id) => {
                    // Цены могли измениться: перечитываем документ с сервера
                    this.load_if_needed(Some(id.clone()));
                    this.load_vehicles();
                    this.info.set(Some("Документ сохранён".to_string()));
                    (on_saved)(id);
                }
                Err(e) => this.error.set(Some(e)),
            }
            this.busy.set(false);
        });
    }

    pub fn cancel_command(&self) {
        let Some(id) = self.id.get_untracked() else {
            return;
        };
        let this = *self;
        this.busy.set(true);
        this.error.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            match model::cancel_sale(id.clone()).await {
                Ok(result) => {
                    this.info.set(Some(format!(
                        "Продажа отменена, освобождено автомобилей: {}",
                        result.released_vehicles
                    )));
                    this.load_if_needed(Some(id));
                    this.load_vehicles();
                }
                Err(e) => this.error.set(Some(e)),
            }
            this.busy.set(false);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a002_sale::aggregate::SaleLine;

    fn with_owner<T>(f: impl FnOnce() -> T) -> T {
        let owner = Owner::new();
        owner.with(f)
    }

    fn loaded_sale() -> Sale {
        let mut sale = Sale::new_for_insert(
            "SALE-00001".into(),
            "Ana Pérez".into(),
            "2024-05-10".into(),
            500.0,
            SaleStatus::Active,
            None,
        );
        sale.set_lines(vec![
            SaleLine::priced("veh-1".into(), 3, 19999.9).unwrap(),
            SaleLine::priced("veh-2".into(), 1, 15800.5).unwrap(),
        ]);
        sale.recalculate_total();
        sale
    }

    #[test]
    fn test_new_form_has_one_empty_row() {
        with_owner(|| {
            let vm = SaleDetailsViewModel::new();
            assert_eq!(vm.lines.rows.get_untracked().len(), 1);
            assert_eq!(vm.total_preview(), "0.00");
            assert!(vm.validate_form().is_err());
        });
    }

    #[test]
    fn test_total_preview_subtracts_discount() {
        with_owner(|| {
            let vm = SaleDetailsViewModel::new();
            vm.apply_sale(&loaded_sale());
            assert_eq!(vm.total_preview(), "75300.20");

            vm.discount.set("abc".into());
            assert_eq!(vm.total_preview(), "75800.20");
        });
    }

    #[test]
    fn test_loaded_sale_round_trips_to_dto() {
        with_owner(|| {
            let vm = SaleDetailsViewModel::new();
            let sale = loaded_sale();
            vm.apply_sale(&sale);

            assert!(vm.is_edit_mode());
            assert!(vm.can_cancel());
            assert_eq!(vm.owned_vehicles.get_untracked(), vec!["veh-1", "veh-2"]);

            let dto = vm.to_dto();
            assert_eq!(dto.id, Some(sale.base.id.as_string()));
            assert_eq!(dto.discount, 500.0);
            assert_eq!(dto.lines.len(), 2);
            assert_eq!(dto.lines[0].quantity, 3);
            assert!(vm.validate_form().is_ok());
        });
    }

    #[test]
    fn test_validation_requires_customer() {
        with_owner(|| {
            let vm = SaleDetailsViewModel::new();
            vm.apply_sale(&loaded_sale());
            vm.customer_name.set("  ".into());
            assert!(vm.validate_form().is_err());
        });
    }
}
