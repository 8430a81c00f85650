//! Human-readable formatting helpers

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count for display (1024-based, up to two decimals)
///
/// `0` renders as `"0 Bytes"`; values beyond the GB range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    // Trailing zeros are trimmed: 1.50 KB → 1.5 KB, 2.00 MB → 2 MB
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", text, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bytes() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn test_small_values_stay_in_bytes() {
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_kilobytes_trim_trailing_zeros() {
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
    }

    #[test]
    fn test_megabytes_round_to_two_decimals() {
        // 2.3456 MB
        assert_eq!(format_file_size(2_459_565), "2.35 MB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50 MB");
    }

    #[test]
    fn test_terabyte_scale_stays_in_gb() {
        assert_eq!(format_file_size(1024u64.pow(4)), "1024 GB");
    }
}
