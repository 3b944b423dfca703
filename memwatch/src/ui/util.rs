//! Small UI helpers: truncation, fallback labels.

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left = keep / 2;
    let right = keep - left;
    let head: String = s.chars().take(left).collect();
    let tail: String = s.chars().skip(n - right).collect();
    format!("{head}...{tail}")
}

pub fn mb_label(mb: u64) -> String {
    format!("{mb} MB")
}

pub fn seconds_label(secs: f64) -> String {
    format!("{} seconds", secs.round() as u64)
}
