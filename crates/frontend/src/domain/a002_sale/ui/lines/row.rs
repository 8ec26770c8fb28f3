use contracts::domain::a002_sale::aggregate::{SaleLine, SaleLineDto};
use contracts::shared::line_pricing::{effective_quantity, format_amount, LinePricing, DEFAULT_QUANTITY};
use contracts::shared::request_token::{RequestSequencer, RequestToken};
use leptos::prelude::*;

/// Одна строка табличной части.
///
/// Все поля хранятся как текст поля ввода; сумма только перезаписывается
/// синхронизацией и никогда не читается ею.
#[derive(Clone, Copy)]
pub struct LineRow {
    pub key: usize,
    pub vehicle_id: RwSignal<String>,
    pub quantity: RwSignal<String>,
    pub unit_price: RwSignal<String>,
    pub subtotal: RwSignal<String>,
    requests: StoredValue<RequestSequencer>,
}

impl LineRow {
    fn new(key: usize, vehicle_id: String, quantity: String, unit_price: String, subtotal: String) -> Self {
        Self {
            key,
            vehicle_id: RwSignal::new(vehicle_id),
            quantity: RwSignal::new(quantity),
            unit_price: RwSignal::new(unit_price),
            subtotal: RwSignal::new(subtotal),
            requests: StoredValue::new(RequestSequencer::new()),
        }
    }

    /// Пустая строка, добавленная кнопкой
    pub fn empty(key: usize) -> Self {
        Self::new(
            key,
            String::new(),
            DEFAULT_QUANTITY.to_string(),
            String::new(),
            String::new(),
        )
    }

    /// Строка сохранённого документа
    pub fn from_line(key: usize, line: &SaleLine) -> Self {
        Self::new(
            key,
            line.vehicle_id.clone(),
            line.quantity.to_string(),
            format_amount(line.unit_price),
            format_amount(line.subtotal),
        )
    }

    /// Начать синхронизацию: без выбранного автомобиля ничего не делаем,
    /// иначе выдаём новый токен, и все ранее выданные устаревают
    pub fn begin_sync(&self) -> Option<(String, RequestToken)> {
        let vehicle_id = self.vehicle_id.get_untracked().trim().to_string();
        if vehicle_id.is_empty() {
            return None;
        }
        let token = self.requests.try_update_value(|seq| seq.issue())?;
        Some((vehicle_id, token))
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.requests
            .try_with_value(|seq| seq.is_current(token))
            .unwrap_or(false)
    }

    /// Записать цену из ответа сервера.
    ///
    /// Количество читается в момент ответа. Устаревший токен или
    /// некорректная цена не меняют ни одного поля.
    pub fn apply_price(&self, token: RequestToken, price: f64) -> bool {
        if !self.is_current(token) {
            return false;
        }
        let pricing = match LinePricing::compute(price, &self.quantity.get_untracked()) {
            Ok(pricing) => pricing,
            Err(_) => return false,
        };
        self.unit_price.set(pricing.unit_price_text());
        self.subtotal.set(pricing.subtotal_text());
        true
    }

    /// Сумма строки для предварительного итога; пустая или нечисловая = 0
    pub fn subtotal_value(&self) -> f64 {
        self.subtotal.get().trim().parse::<f64>().unwrap_or(0.0)
    }

    pub fn to_dto(&self) -> Option<SaleLineDto> {
        let vehicle_id = self.vehicle_id.get_untracked().trim().to_string();
        if vehicle_id.is_empty() {
            return None;
        }
        Some(SaleLineDto {
            vehicle_id,
            quantity: effective_quantity(&self.quantity.get_untracked()),
        })
    }
}

/// Группа строк документа
#[derive(Clone, Copy)]
pub struct LineRows {
    pub rows: RwSignal<Vec<LineRow>>,
    next_key: StoredValue<usize>,
}

impl Default for LineRows {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRows {
    pub fn new() -> Self {
        Self {
            rows: RwSignal::new(Vec::new()),
            next_key: StoredValue::new(0),
        }
    }

    fn take_key(&self) -> usize {
        self.next_key
            .try_update_value(|next| {
                let key = *next;
                *next += 1;
                key
            })
            .unwrap_or_default()
    }

    /// Добавить пустую строку в конец; существующие строки не пересоздаются
    pub fn push_empty(&self) -> LineRow {
        let row = LineRow::empty(self.take_key());
        self.rows.update(|rows| rows.push(row));
        row
    }

    /// Заменить все строки строками загруженного документа
    pub fn replace_with(&self, lines: &[SaleLine]) {
        let rows: Vec<LineRow> = lines
            .iter()
            .map(|line| LineRow::from_line(self.take_key(), line))
            .collect();
        self.rows.set(rows);
    }

    pub fn remove(&self, key: usize) {
        self.rows.update(|rows| rows.retain(|r| r.key != key));
    }

    pub fn keys_untracked(&self) -> Vec<usize> {
        self.rows.with_untracked(|rows| rows.iter().map(|r| r.key).collect())
    }

    /// Σ сумм строк (реактивно)
    pub fn amount(&self) -> f64 {
        self.rows.get().iter().map(|r| r.subtotal_value()).sum()
    }

    /// Строки с выбранным автомобилем для отправки на сервер
    pub fn to_dto_lines(&self) -> Vec<SaleLineDto> {
        self.rows
            .get_untracked()
            .iter()
            .filter_map(|r| r.to_dto())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_owner<T>(f: impl FnOnce() -> T) -> T {
        let owner = Owner::new();
        owner.with(f)
    }

    fn selected_row(vehicle_id: &str, quantity: &str) -> LineRow {
        let row = LineRow::empty(0);
        row.vehicle_id.set(vehicle_id.to_string());
        row.quantity.set(quantity.to_string());
        row
    }

    #[test]
    fn test_no_vehicle_is_noop() {
        with_owner(|| {
            let row = LineRow::empty(0);
            assert!(row.begin_sync().is_none());
            row.vehicle_id.set("   ".into());
            assert!(row.begin_sync().is_none());
            assert_eq!(row.unit_price.get_untracked(), "");
            assert_eq!(row.subtotal.get_untracked(), "");
        });
    }

    #[test]
    fn test_apply_price_writes_formatted_fields() {
        with_owner(|| {
            let row = selected_row("veh-1", "3");
            let (vehicle_id, token) = row.begin_sync().unwrap();
            assert_eq!(vehicle_id, "veh-1");
            assert!(row.apply_price(token, 19999.9));
            assert_eq!(row.unit_price.get_untracked(), "19999.90");
            assert_eq!(row.subtotal.get_untracked(), "59999.70");
        });
    }

    #[test]
    fn test_blank_or_invalid_quantity_counts_as_one() {
        with_owner(|| {
            for raw in ["", "abc", "0", "-2"] {
                let row = selected_row("veh-1", raw);
                let (_, token) = row.begin_sync().unwrap();
                assert!(row.apply_price(token, 250.5));
                assert_eq!(row.unit_price.get_untracked(), "250.50");
                assert_eq!(row.subtotal.get_untracked(), "250.50");
            }
        });
    }

    #[test]
    fn test_quantity_is_read_at_response_time() {
        with_owner(|| {
            let row = selected_row("veh-1", "1");
            let (_, token) = row.begin_sync().unwrap();
            row.quantity.set("2".into());
            assert!(row.apply_price(token, 100.0));
            assert_eq!(row.subtotal.get_untracked(), "200.00");
        });
    }

    #[test]
    fn test_stale_response_is_discarded() {
        with_owner(|| {
            let row = selected_row("veh-1", "1");
            let (_, first) = row.begin_sync().unwrap();
            row.vehicle_id.set("veh-2".into());
            let (_, second) = row.begin_sync().unwrap();

            assert!(row.apply_price(second, 300.0));
            assert!(!row.apply_price(first, 100.0));
            assert_eq!(row.unit_price.get_untracked(), "300.00");
            assert_eq!(row.subtotal.get_untracked(), "300.00");
        });
    }

    #[test]
    fn test_invalid_price_leaves_fields_unchanged() {
        with_owner(|| {
            let row = selected_row("veh-1", "2");
            row.unit_price.set("10.00".into());
            row.subtotal.set("20.00".into());
            for price in [f64::NAN, f64::INFINITY, -1.0] {
                let (_, token) = row.begin_sync().unwrap();
                assert!(!row.apply_price(token, price));
            }
            assert_eq!(row.unit_price.get_untracked(), "10.00");
            assert_eq!(row.subtotal.get_untracked(), "20.00");
        });
    }

    #[test]
    fn test_push_keeps_existing_rows() {
        with_owner(|| {
            let lines = LineRows::new();
            let first = lines.push_empty();
            first.vehicle_id.set("veh-1".into());

            let second = lines.push_empty();
            assert_ne!(first.key, second.key);
            assert_eq!(lines.keys_untracked(), vec![first.key, second.key]);

            let rows = lines.rows.get_untracked();
            assert_eq!(rows[0].vehicle_id.get_untracked(), "veh-1");
            assert_eq!(rows[1].quantity.get_untracked(), "1");
        });
    }

    #[test]
    fn test_loaded_rows_get_fresh_keys() {
        with_owner(|| {
            let lines = LineRows::new();
            let added = lines.push_empty();
            lines.replace_with(&[SaleLine {
                vehicle_id: "veh-1".into(),
                quantity: 2,
                unit_price: 100.0,
                subtotal: 200.0,
            }]);

            let rows = lines.rows.get_untracked();
            assert_eq!(rows.len(), 1);
            assert_ne!(rows[0].key, added.key);
            assert_eq!(rows[0].unit_price.get_untracked(), "100.00");
            assert_eq!(rows[0].subtotal.get_untracked(), "200.00");
        });
    }

    #[test]
    fn test_dto_lines_skip_empty_rows() {
        with_owner(|| {
            let lines = LineRows::new();
            let row = lines.push_empty();
            row.vehicle_id.set("veh-1".into());
            row.quantity.set("x".into());
            lines.push_empty();

            assert_eq!(
                lines.to_dto_lines(),
                vec![SaleLineDto {
                    vehicle_id: "veh-1".into(),
                    quantity: 1
                }]
            );
        });
    }

    #[test]
    fn test_remove_row() {
        with_owner(|| {
            let lines = LineRows::new();
            let first = lines.push_empty();
            let second = lines.push_empty();
            lines.remove(first.key);
            assert_eq!(lines.keys_untracked(), vec![second.key]);
        });
    }
}
