// [libs/domain/region/src/common.rs]
use crate::errors::RegionError;
use once_cell::sync::Lazy;
use regex::Regex;

static SEMVER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+)").unwrap());

/// Pulls the first `d+.d+.d+` run out of arbitrary text. Every region's
/// version-discovery path ends up doing this against a different document
/// (a JSON field, an HTML page, a listing page), so the extraction itself
/// is shared.
pub fn first_semver(text: &str) -> Result<String, RegionError> {
    SEMVER_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .ok_or(RegionError::VersionNotFound)
}

pub fn join_url(base: &str, suffix: &str) -> String {
    let trimmed_base = base.trim_end_matches('/');
    let trimmed_suffix = suffix.trim_start_matches('/');
    format!("{trimmed_base}/{trimmed_suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_semver_finds_the_version_embedded_in_prose() {
        assert_eq!(first_semver("build 3.14.159 is live").unwrap(), "3.14.159");
    }

    #[test]
    fn first_semver_errors_when_nothing_matches() {
        assert!(matches!(first_semver("no version here"), Err(RegionError::VersionNotFound)));
    }

    #[test]
    fn join_url_normalizes_one_slash_between_segments() {
        assert_eq!(join_url("https://host/base/", "/manifest"), "https://host/base/manifest");
        assert_eq!(join_url("https://host/base", "manifest"), "https://host/base/manifest");
    }
}
