//! Расчёт цены и суммы строки документа продажи
//!
//! Общая логика для frontend (автозаполнение строки) и backend
//! (пересчёт строк при сохранении документа).

/// Количество, если поле пустое или не распознано
pub const DEFAULT_QUANTITY: u32 = 1;

/// Верхняя граница количества в строке
pub const MAX_QUANTITY: u32 = 9_999;

/// Эффективное количество строки.
///
/// Берётся целочисленный префикс строки (как `parseInt`): `"3"` → 3,
/// `" 2 шт"` → 2. Пустое, нечисловое или меньше 1 значение даёт
/// [`DEFAULT_QUANTITY`], слишком большое ограничивается [`MAX_QUANTITY`].
pub fn effective_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.chars().next() {
        Some('-') => (true, &trimmed[1..]),
        Some('+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: u32 = 0;
    let mut has_digits = false;
    for digit in digits.chars().map_while(|ch| ch.to_digit(10)) {
        has_digits = true;
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !has_digits || negative || value == 0 {
        return DEFAULT_QUANTITY;
    }
    value.min(MAX_QUANTITY)
}

/// Округление до копеек, половина от нуля (как `toFixed(2)`)
pub fn round_amount(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Форматирует сумму ровно с двумя знаками после запятой: `19999.9` → `"19999.90"`
pub fn format_amount(value: f64) -> String {
    let value = round_amount(value);
    // -0.0 не должен превращаться в "-0.00"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

/// Сумма строки: цена × количество, округлённая до копеек
pub fn subtotal(unit_price: f64, quantity: u32) -> f64 {
    round_amount(unit_price * f64::from(quantity))
}

/// Проверка цены, пришедшей с сервера или из формы.
///
/// Отклоняются только нечисловые и отрицательные значения,
/// верхняя граница не задана.
pub fn validate_price(price: f64) -> Result<f64, String> {
    if !price.is_finite() {
        return Err(format!("Цена не является числом: {}", price));
    }
    if price < 0.0 {
        return Err(format!("Цена не может быть отрицательной: {}", price));
    }
    Ok(price)
}

/// Рассчитанные значения строки: цена, количество, сумма
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePricing {
    pub unit_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

impl LinePricing {
    /// Рассчитать строку по цене и "сырому" тексту поля количества
    pub fn compute(unit_price: f64, raw_quantity: &str) -> Result<Self, String> {
        Self::with_quantity(unit_price, effective_quantity(raw_quantity))
    }

    /// Рассчитать строку по цене и уже разобранному количеству
    pub fn with_quantity(unit_price: f64, quantity: u32) -> Result<Self, String> {
        let unit_price = round_amount(validate_price(unit_price)?);
        let quantity = quantity.clamp(DEFAULT_QUANTITY, MAX_QUANTITY);
        Ok(Self {
            unit_price,
            quantity,
            subtotal: subtotal(unit_price, quantity),
        })
    }

    pub fn unit_price_text(&self) -> String {
        format_amount(self.unit_price)
    }

    pub fn subtotal_text(&self) -> String {
        format_amount(self.subtotal)
    }
}
