//! Amount formatting for Mauritius Rupees.

pub const CURRENCY_SYMBOL: &str = "Rs";
pub const CURRENCY_CODE: &str = "MUR";
pub const CURRENCY_NAME: &str = "Mauritius Rupees";

/// `Rs 1812.50`
pub fn format_currency(amount: f64) -> String {
    format!("{} {:.2}", CURRENCY_SYMBOL, amount)
}

/// `Rs 1.8K`, `Rs 2.5M`, or the full form below a thousand.
pub fn format_currency_compact(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("{} {:.1}M", CURRENCY_SYMBOL, amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("{} {:.1}K", CURRENCY_SYMBOL, amount / 1_000.0)
    } else {
        format_currency(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1812.5), "Rs 1812.50");
        assert_eq!(format_currency(0.0), "Rs 0.00");
    }

    #[test]
    fn test_format_currency_compact() {
        assert_eq!(format_currency_compact(999.0), "Rs 999.00");
        assert_eq!(format_currency_compact(1812.5), "Rs 1.8K");
        assert_eq!(format_currency_compact(2_500_000.0), "Rs 2.5M");
    }
}
