//! Version parsing and ordering
//!
//! Theme headers are loose about versions (`1.2`, `v2.0.1`), so strings are
//! normalized into `semver::Version` before comparing.

use semver::Version;

/// Parse a version, padding missing minor/patch components with zero.
///
/// Returns `None` for anything that still is not a semantic version,
/// including four-component versions and leading zeros.
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let (core, suffix) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&format!("{}{}", parts.join("."), suffix)).ok()
}

/// Whether `candidate` is strictly newer than `current`.
///
/// `None` when either side cannot be parsed.
pub fn is_newer(candidate: &str, current: &str) -> Option<bool> {
    Some(parse_lenient(candidate)? > parse_lenient(current)?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_full_semver() {
        assert_eq!(parse_lenient("1.2.3"), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_padding() {
        assert_eq!(parse_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_lenient("3"), Some(Version::new(3, 0, 0)));
    }

    #[test]
    fn test_prefix_and_whitespace() {
        assert_eq!(parse_lenient(" v2.0.1 "), Some(Version::new(2, 0, 1)));
        assert_eq!(parse_lenient("V1.0"), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_prerelease_on_short_version() {
        let version = parse_lenient("2.0-beta.1").unwrap();
        assert_eq!(version.to_string(), "2.0.0-beta.1");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_lenient("").is_none());
        assert!(parse_lenient("latest").is_none());
        assert!(parse_lenient("1.2.3.4").is_none());
        assert!(parse_lenient("1..2").is_none());
    }

    #[test]
    fn test_is_newer() {
        assert_eq!(is_newer("1.2.0", "1.0.0"), Some(true));
        assert_eq!(is_newer("1.0.0", "1.0.0"), Some(false));
        assert_eq!(is_newer("1.0", "1.0.0"), Some(false));
        assert_eq!(is_newer("0.9.9", "1.0.0"), Some(false));
        assert_eq!(is_newer("1.10.0", "1.9.0"), Some(true));
        assert_eq!(is_newer("2.0.0", "2.0.0-rc.1"), Some(true));
        assert_eq!(is_newer("bogus", "1.0.0"), None);
    }

    proptest! {
        #[test]
        fn prop_padding_matches_explicit(major in 0u64..1000, minor in 0u64..1000) {
            let short = format!("{}.{}", major, minor);
            let full = format!("{}.{}.0", major, minor);
            prop_assert_eq!(parse_lenient(&short), parse_lenient(&full));
        }

        #[test]
        fn prop_ordering_matches_tuples(
            a in (0u64..50, 0u64..50, 0u64..50),
            b in (0u64..50, 0u64..50, 0u64..50),
        ) {
            let left = format!("{}.{}.{}", a.0, a.1, a.2);
            let right = format!("{}.{}.{}", b.0, b.1, b.2);
            prop_assert_eq!(is_newer(&left, &right), Some(a > b));
        }
    }
}
