/// "2024-05-10" -> "10.05.2024"; anything else is returned as is
pub fn format_date(s: &str) -> String {
    if let Some((year, rest)) = s.split_once('-') {
        if let Some((month, day)) = rest.split_once('-') {
            return format!("{}.{}.{}", day, month, year);
        }
    }
    s.to_string()
}

/// Текущая дата в формате YYYY-MM-DD
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-10"), "10.05.2024");
    }

    #[test]
    fn test_invalid_format() {
        assert_eq!(format_date("invalid"), "invalid");
    }

    #[test]
    fn test_today_is_iso() {
        assert!(chrono::NaiveDate::parse_from_str(&today(), "%Y-%m-%d").is_ok());
    }
}
