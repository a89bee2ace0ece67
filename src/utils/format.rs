const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Human-readable byte count using 1024-based units and two decimals.
///
/// Non-positive sizes render as `0 B`; anything past petabytes stays in PB.
pub fn format_bytes(size: i64) -> String {
    if size <= 0 {
        return "0 B".to_string();
    }

    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}
