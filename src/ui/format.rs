//! Text formatting for tiles and chart labels.

/// Shown wherever a value is undefined for the current selection.
pub const NOT_AVAILABLE: &str = "n/a";

/// `1234567.891` with 2 decimals → `1,234,567.89`.
pub fn thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(f) = frac_part {
        grouped.push('.');
        grouped.push_str(f);
    }
    if value < 0.0 && grouped.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| thousands(v, decimals))
}

pub fn money(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("₹{}", thousands(v, decimals)))
}

pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}%"))
}

/// Bar label: `1.2K` from a thousand up, the plain integer below.
pub fn compact(value: f64) -> String {
    if value >= 1000.0 {
        format!("{:.1}K", value / 1000.0)
    } else {
        format!("{}", value as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(thousands(999.0, 0), "999");
        assert_eq!(thousands(1000.0, 0), "1,000");
        assert_eq!(thousands(-45_000.5, 1), "-45,000.5");
        assert_eq!(thousands(-0.001, 1), "0.0");
    }

    #[test]
    fn undefined_values_render_as_not_available() {
        assert_eq!(number(None, 0), "n/a");
        assert_eq!(money(None, 2), "n/a");
        assert_eq!(percent(None), "n/a");
        assert_eq!(percent(Some(42.5)), "42.50%");
        assert_eq!(money(Some(1500.0), 0), "₹1,500");
    }

    #[test]
    fn compact_labels() {
        assert_eq!(compact(12_500.0), "12.5K");
        assert_eq!(compact(640.0), "640");
    }
}
