//! Path prefix matching.
//!
//! # Design Decisions
//! - A registered path covers a requested path if it is equal to it, or a
//!   literal prefix that ends on a segment boundary
//! - The root path `/` covers everything
//! - Matching is case-sensitive and regex free

/// `/a` covers `/a`, `/a/` and `/a/b` but not `/ab`.
pub fn matches_path_prefix(registered: &str, path: &str) -> bool {
    if registered == "/" || registered == path {
        return true;
    }
    match path.strip_prefix(registered) {
        Some(rest) => registered.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Non-empty segments of a path: `/a//b/` → `a`, `b`.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
