//! Account identifiers and the composite cache key.

/// Separator between user and org in a composite key.
/// GitHub logins never contain `_`, so the split is unambiguous.
pub const KEY_SEPARATOR: char = '_';

const MAX_LOGIN_LEN: usize = 39;

/// Build the cache key for a (user, org) pair.
///
/// Logins are case-insensitive, so the key is lowercased.
pub fn composite_key(user: &str, org: &str) -> String {
    normalize_key(&format!("{user}{KEY_SEPARATOR}{org}"))
}

/// Canonical form of an already joined key (seed entries, for instance).
pub fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Login shape accepted by the card endpoint: ASCII alphanumerics and `-`,
/// 1..=39 chars, not starting or ending with `-`.
pub fn is_valid_login(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_LOGIN_LEN
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_with_separator() {
        assert_eq!(composite_key("octocat", "github"), "octocat_github");
    }

    #[test]
    fn key_ignores_login_case() {
        assert_eq!(composite_key("OctoCat", "GitHub"), composite_key("octocat", "github"));
        assert_eq!(normalize_key("OctoCat_GitHub"), "octocat_github");
    }

    #[test]
    fn login_shapes() {
        assert!(is_valid_login("octocat"));
        assert!(is_valid_login("a-b-9"));
        assert!(!is_valid_login(""));
        assert!(!is_valid_login("-lead"));
        assert!(!is_valid_login("trail-"));
        assert!(!is_valid_login("under_score"));
        assert!(!is_valid_login("<script>"));
        assert!(!is_valid_login(&"x".repeat(40)));
    }
}
