//! Human-readable byte counts
//!
//! Binary (1024-based) prefixes with four significant digits and trailing
//! zeros stripped: `1536` renders as `1.5 KiB`, `1023` as `1023 B`.

const PREFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const UNIT: u64 = 1024;
const SIGNIFICANT_DIGITS: usize = 4;

/// Render `bytes` with a binary prefix
pub fn human_readable_count(bytes: u64) -> String {
    human_readable_count_with_unit(bytes, "B")
}

/// Render `count` with a binary prefix and an arbitrary unit suffix
pub fn human_readable_count_with_unit(count: u64, unit: &str) -> String {
    if count < UNIT {
        return format!("{} {}", count, unit);
    }

    let mut exponent = 0usize;
    let mut scale = 1u64;
    while exponent < PREFIXES.len() && count / scale >= UNIT {
        scale *= UNIT;
        exponent += 1;
    }

    let value = count as f64 / scale as f64;
    format!(
        "{} {}{}",
        significant(value, SIGNIFICANT_DIGITS),
        PREFIXES[exponent - 1],
        unit
    )
}

/// Format `value` (>= 1) with `digits` significant digits, no trailing zeros
fn significant(value: f64, digits: usize) -> String {
    let integer_digits = (value.log10().floor() as i64 + 1).max(1) as usize;
    let decimals = digits.saturating_sub(integer_digits);
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_counts_are_plain() {
        assert_eq!(human_readable_count(0), "0 B");
        assert_eq!(human_readable_count(1023), "1023 B");
    }

    #[test]
    fn test_binary_prefixes() {
        assert_eq!(human_readable_count(1024), "1 KiB");
        assert_eq!(human_readable_count(1536), "1.5 KiB");
        assert_eq!(human_readable_count(10 * 1024 * 1024), "10 MiB");
        assert_eq!(human_readable_count(1_500_000), "1.431 MiB");
        assert_eq!(human_readable_count(3 << 30), "3 GiB");
    }

    #[test]
    fn test_largest_value() {
        assert_eq!(human_readable_count(u64::MAX), "16 EiB");
    }

    #[test]
    fn test_custom_unit() {
        assert_eq!(human_readable_count_with_unit(2048, "records"), "2 Kirecords");
    }
}
