//! URL-safe event slugs.

/// Returns `true` if `slug` is non-empty and made only of lowercase ASCII
/// letters, digits, `-` and `_`.
#[must_use]
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
}

/// Derives a slug from a title: lowercase ASCII alphanumerics, with every
/// other run of characters collapsed to a single `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
