use std::collections::BTreeMap;

/// Format an optional monthly cost for display.
pub fn format_usd(cost: Option<f64>) -> String {
    match cost {
        Some(cost) => format!("${:.2}", cost),
        None => "Unknown".to_string(),
    }
}

/// Truncate a string to `max_len` characters, appending "..." when cut.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let truncated: String = s.chars().take(keep).collect();
    format!("{}...", truncated)
}

/// Render a details map as a single "k: v, k: v" line.
pub fn details_inline(details: &BTreeMap<String, String>) -> String {
    details
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
