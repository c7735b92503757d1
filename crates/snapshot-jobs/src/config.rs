//! Configuration loading and resolution.

use std::collections::BTreeSet;

use crate::error::{Result, SnapshotError};

/// The only release tag the snapshot crawl understands.
pub const SUPPORTED_VERSION: &str = "SNAPSHOT";

/// Root of the snapshot target tree.
pub const DEFAULT_BASE_URL: &str = "https://downloads.openwrt.org/snapshots/targets/";

/// Environment variable that overrides [`DEFAULT_BASE_URL`].
pub const BASE_URL_ENV: &str = "SNAPSHOT_BASE_URL";

pub const DEFAULT_TARGETS: &[&str] = &["mediatek", "ramips", "x86", "armsr", "rockchip"];

pub const DEFAULT_SUBTARGETS: &[&str] = &[
    "filogic", "mt7622", "mt7623", "mt7629", "mt7620", "mt7621", "mt76x8", "64", "generic",
    "armv8",
];

/// Targets and subtargets that get a build job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowLists {
    pub targets: BTreeSet<String>,
    pub subtargets: BTreeSet<String>,
}

impl Default for AllowLists {
    fn default() -> Self {
        Self::new(DEFAULT_TARGETS, DEFAULT_SUBTARGETS)
    }
}

impl AllowLists {
    pub fn new<T, S>(targets: &[T], subtargets: &[S]) -> Self
    where
        T: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            targets: targets.iter().map(|t| t.as_ref().to_string()).collect(),
            subtargets: subtargets.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Build allow-lists from CLI overrides. An empty override keeps the default list.
    pub fn with_overrides(targets: &[String], subtargets: &[String]) -> Self {
        let defaults = Self::default();
        Self {
            targets: if targets.is_empty() {
                defaults.targets
            } else {
                targets.iter().cloned().collect()
            },
            subtargets: if subtargets.is_empty() {
                defaults.subtargets
            } else {
                subtargets.iter().cloned().collect()
            },
        }
    }

    /// Whether a (target, subtarget) pair gets a job. Both must be listed.
    pub fn permits(&self, target: &str, subtarget: &str) -> bool {
        self.targets.contains(target) && self.subtargets.contains(subtarget)
    }
}

/// Everything the pipeline needs, fixed at process start.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Validated version tag, copied into every job.
    pub version: String,
    /// Target tree root, always ending in `/`.
    pub base_url: String,
    pub allow: AllowLists,
    /// Skip the metadata lookup for pairs the allow-lists reject.
    pub listed_only: bool,
}

impl SnapshotConfig {
    pub fn new(version: String, base_url: String, allow: AllowLists) -> Self {
        Self {
            version,
            base_url,
            allow,
            listed_only: false,
        }
    }

    pub fn with_listed_only(mut self, listed_only: bool) -> Self {
        self.listed_only = listed_only;
        self
    }
}

/// Check the requested version tag. Only `SNAPSHOT` is crawlable.
pub fn validate_version(version: Option<&str>) -> Result<String> {
    match version {
        Some(v) if v == SUPPORTED_VERSION => Ok(v.to_string()),
        _ => Err(SnapshotError::UnsupportedVersion),
    }
}

/// Resolve the target tree root: explicit flag, then environment, then the default.
pub fn resolve_base_url(explicit: Option<&str>) -> Result<String> {
    if let Some(url) = explicit {
        return normalize_base_url(url);
    }

    if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
        if !env_url.trim().is_empty() {
            return normalize_base_url(&env_url);
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

/// Validate an absolute http(s) URL and make sure it ends with `/`.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = url::Url::parse(raw).map_err(|e| SnapshotError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SnapshotError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    let mut url = parsed.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_version_accepts_snapshot() {
        assert_eq!(validate_version(Some("SNAPSHOT")).unwrap(), "SNAPSHOT");
    }

    #[test]
    fn test_validate_version_rejects_everything_else() {
        for bad in [Some("24.10"), Some("snapshot"), Some(""), None] {
            let err = validate_version(bad).unwrap_err();
            assert!(matches!(err, SnapshotError::UnsupportedVersion));
        }
    }

    #[test]
    fn test_default_allow_lists() {
        let allow = AllowLists::default();
        assert!(allow.permits("mediatek", "filogic"));
        assert!(allow.permits("x86", "64"));
        assert!(allow.permits("armsr", "armv8"));
        assert!(!allow.permits("mediatek", "bar"));
        assert!(!allow.permits("foo", "filogic"));
    }

    #[test]
    fn test_allow_list_pairs_are_not_checked_jointly() {
        // Membership is per list, so cross pairs pass too.
        let allow = AllowLists::default();
        assert!(allow.permits("x86", "filogic"));
    }

    #[test]
    fn test_overrides_replace_only_given_list() {
        let allow = AllowLists::with_overrides(&["ath79".to_string()], &[]);
        assert!(allow.permits("ath79", "generic"));
        assert!(!allow.permits("mediatek", "filogic"));
        assert_eq!(allow.subtargets, AllowLists::default().subtargets);
    }

    #[test]
    fn test_normalize_base_url_appends_slash() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080/targets").unwrap(),
            "http://127.0.0.1:8080/targets/"
        );
        assert_eq!(
            normalize_base_url(DEFAULT_BASE_URL).unwrap(),
            DEFAULT_BASE_URL
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("ftp://downloads.openwrt.org/").is_err());
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let url = resolve_base_url(Some("https://mirror.example.org/snapshots/targets")).unwrap();
        assert_eq!(url, "https://mirror.example.org/snapshots/targets/");
    }
}
