//! Byte size formatting.

const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units and at most two decimals.
///
/// `0` → `0 Bytes`, `1536` → `1.5 KB`, `2048` → `2 KB`.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exp = 0;
    let mut divisor = 1_u64;
    while exp + 1 < UNITS.len() && bytes / divisor >= 1024 {
        divisor *= 1024;
        exp += 1;
    }

    let scaled = bytes as f64 / divisor as f64;
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{rounded} {}", UNITS[exp])
}
