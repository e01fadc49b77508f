const SUFFIXES: [&str; 5] = ["kB", "MB", "GB", "TB", "PB"];

/// Decimal byte count, rounded to the nearest whole unit (`999B`, `2kB`,
/// `33MB`). Stops at petabytes.
pub fn human_readable(value: u64) -> String {
    if value < 1000 {
        return format!("{value}B");
    }
    let mut level = 0usize;
    let mut scale = 1000u64;
    while level + 1 < SUFFIXES.len() && value / scale >= 1000 {
        scale *= 1000;
        level += 1;
    }
    format!("{:.0}{}", value as f64 / scale as f64, SUFFIXES[level])
}
