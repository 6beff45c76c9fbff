use strsim::sorensen_dice;

/// Lowercases a column name and folds `_`/`-` and repeated whitespace into
/// single spaces, so "hair_type" and "Type of Hair" compare on equal terms.
pub(crate) fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    let mut last_was_space = true;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !last_was_space {
                normalized.push(' ');
                last_was_space = true;
            }
        } else {
            for lower in ch.to_lowercase() {
                normalized.push(lower);
            }
            last_was_space = false;
        }
    }
    if normalized.ends_with(' ') {
        normalized.pop();
    }
    normalized
}

/// Normalized similarity between two column names on a 0-1 scale.
pub(crate) fn key_similarity(a: &str, b: &str) -> f64 {
    sorensen_dice(&normalize_key(a), &normalize_key(b))
}
