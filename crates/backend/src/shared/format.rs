//! Форматирование чисел для логов сервера

/// Целое число с разделителем тысяч (точка): `1234567` → `"1.234.567"`
pub fn format_number(n: usize) -> String {
    group_thousands(&n.to_string(), '.')
}

/// Денежная сумма для логов: два знака и пробел между тысячами,
/// `74499.7` → `"74 499.70"`
pub fn format_money(value: f64) -> String {
    let formatted = contracts::shared::line_pricing::format_amount(value);
    let (integer, fraction) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };
    format!("{}{}.{}", sign, group_thousands(digits, ' '), fraction)
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
