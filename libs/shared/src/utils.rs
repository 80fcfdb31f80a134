use chrono::{DateTime, Local};

/// Check if a name matches a pattern (supports wildcards)
pub fn matches_glob(name: &str, pattern: &str) -> bool {
    // Use glob pattern matching for better wildcard support
    if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
        glob_pattern.matches(name)
    } else {
        // Fallback to exact match if glob pattern is invalid
        name == pattern
    }
}

/// Render a byte count the way humans read file listings (B/KB/MB).
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let bytes_f = bytes as f64;
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes_f < MB {
        format!("{:.1}KB", bytes_f / KB)
    } else {
        format!("{:.1}MB", bytes_f / MB)
    }
}

/// Format a timestamp for file listings (`YYYY-MM-DD HH:MM`).
pub fn format_mtime(time: std::time::SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M").to_string()
}

/// Format an integer with thousands separators for stat output.
pub fn format_count(count: usize) -> String {
    let digits: Vec<char> = count.to_string().chars().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_glob() {
        assert!(matches_glob("context-backup", "context-*"));
        assert!(matches_glob("glog", "glog"));
        assert!(matches_glob("v2", "v?"));
        assert!(!matches_glob("stats", "context-*"));
        // Invalid pattern falls back to exact match
        assert!(matches_glob("[abc", "[abc"));
        assert!(!matches_glob("a", "[abc"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2048), "2.0KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0MB");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }
}
