// src/core/sanitize.rs

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Narrative text as the rule engine sees it: lowercase, single-spaced.
pub fn preprocess_narrative(s: &str) -> String {
    normalize_ws(&s.to_lowercase())
}

/// First `max` characters of `s` (char-safe), for example output.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}
