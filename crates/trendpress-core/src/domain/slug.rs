//! URL slugs.

/// Fallback when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "post";

/// Lowercase, dash-separated slug.
///
/// ASCII letters and digits are lowercased; non-ASCII letters and digits are
/// kept (lowercased) so Arabic titles still produce readable slugs. Any run
/// of other characters becomes a single `-`, with none at either end.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Candidate `n` for a base slug: `base`, `base-1`, `base-2`, ...
pub fn numbered(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}
