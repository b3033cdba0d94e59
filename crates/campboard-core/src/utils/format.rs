/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// "occupied/capacity", with the percentage when the bunk has a capacity
pub fn format_occupancy(occupancy: u32, capacity: u32, percentage: u32) -> String {
    if capacity == 0 {
        format!("{}/0", occupancy)
    } else {
        format!("{}/{} ({}%)", occupancy, capacity, percentage)
    }
}

pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
