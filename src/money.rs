/// Round a monetary value to 2 decimal places, half away from zero.
///
/// Every stored or derived amount in the system passes through this before it
/// is compared, summed into an aggregate, or shown to the user.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group the digits of an integer with thousands separators.
pub fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators.
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", round_currency(value));
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let negative = whole.starts_with('-');
    let digits = if negative { &whole[1..] } else { whole };
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Format a money amount rounded to whole units, right-aligned for tables.
pub fn format_whole_money(value: f64, currency_symbol: &str) -> String {
    let rounded = value.round() as i64;
    let grouped = format_grouped_int(rounded);
    format!("{}{:>6}", currency_symbol, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_currency(1234.5678), 1234.57);
        assert_eq!(round_currency(-1234.5678), -1234.57);
        assert_eq!(round_currency(50.0), 50.0);
        assert_eq!(round_currency(2.375), 2.38);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_grouped_int(0), "0");
        assert_eq!(format_grouped_int(999), "999");
        assert_eq!(format_grouped_int(47_500), "47,500");
        assert_eq!(format_grouped_int(-1_250_000), "-1,250,000");
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(47500.0), "47,500.00");
        assert_eq!(format_amount(1234.5678), "1,234.57");
        assert_eq!(format_amount(-950.5), "-950.50");
    }
}
