// src/utils/formatter.rs
use serde_json::Value;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size with one decimal, binary units.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut exp = 0;
    while value >= 1024.0 && exp < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        exp += 1;
    }
    format!("{:.1} {}", value, SIZE_UNITS[exp])
}

pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

pub fn format_json(content: &str) -> crate::Result<String> {
    let value: Value = serde_json::from_str(content)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn plural(count: u64, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(120), "120.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_size_caps_at_terabytes() {
        let huge = 3 * 1024u64.pow(5);
        assert_eq!(format_size(huge), "3072.0 TB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(2_300_000), "2.3M");
    }

    #[test]
    fn test_format_json() {
        let input = r#"{"name":"test","value":123}"#;
        let result = format_json(input).unwrap();
        assert!(result.contains('\n'));
        assert!(format_json("{not json").is_err());
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "item"), "1 item");
        assert_eq!(plural(3, "item"), "3 items");
    }
}
