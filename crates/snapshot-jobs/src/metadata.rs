//! Per-subtarget build metadata: kernel vermagic and package architecture.
//!
//! Both values are best-effort. The lookup walks three resources in order
//! (kmods listing, the first kmods archive's `index.json`, packages listing)
//! and stops at the first failure, keeping whatever it found so far.
//! Failures are logged, never returned.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::acquisition::{list_hrefs, HttpClient};
use crate::error::Result;

/// Metadata for one (target, subtarget) pair. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    pub vermagic: String,
    pub pkgarch: String,
}

fn kmods_archive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+-[0-9]+-[a-f0-9]{10,}\.tar\.xz$")
            .expect("kmods archive regex is valid")
    })
}

fn kernel_package_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"kernel-[0-9]+\.[0-9]+\.[0-9]+~([a-f0-9]{10,})(?:-r[0-9]+)?\.apk$")
            .expect("kernel package regex is valid")
    })
}

/// First kmods archive link (`<x.y.z>-<build>-<hash>.tar.xz`) in document order.
pub fn first_kmods_archive<S: AsRef<str>>(hrefs: &[S]) -> Option<&str> {
    hrefs
        .iter()
        .map(|h| h.as_ref())
        .find(|href| kmods_archive_re().is_match(href))
}

/// Vermagic from the kernel package links. The last matching link wins.
pub fn last_kernel_vermagic<S: AsRef<str>>(hrefs: &[S]) -> Option<&str> {
    let mut vermagic = None;
    for href in hrefs.iter().map(|h| h.as_ref()) {
        if !href.starts_with("kernel-") {
            continue;
        }
        if let Some(caps) = kernel_package_re().captures(href) {
            if let Some(m) = caps.get(1) {
                vermagic = Some(m.as_str());
            }
        }
    }
    vermagic
}

/// The `architecture` field of a kmods `index.json`, if present and non-empty.
pub fn architecture_of(index: &Value) -> Option<&str> {
    index
        .get("architecture")
        .and_then(Value::as_str)
        .filter(|arch| !arch.is_empty())
}

pub fn kmods_url(base_url: &str, target: &str, subtarget: &str) -> String {
    format!("{base_url}{target}/{subtarget}/kmods/")
}

pub fn packages_url(base_url: &str, target: &str, subtarget: &str) -> String {
    format!("{base_url}{target}/{subtarget}/packages/")
}

/// Look up metadata for one pair. Never fails; see the module docs.
pub async fn fetch_metadata(
    client: &HttpClient,
    base_url: &str,
    target: &str,
    subtarget: &str,
) -> BuildMetadata {
    let mut meta = BuildMetadata::default();

    if let Err(e) = collect_metadata(client, base_url, target, subtarget, &mut meta).await {
        tracing::warn!("Error fetching data for {target}/{subtarget}: {e}");
    }

    meta
}

async fn collect_metadata(
    client: &HttpClient,
    base_url: &str,
    target: &str,
    subtarget: &str,
    meta: &mut BuildMetadata,
) -> Result<()> {
    let kmods = kmods_url(base_url, target, subtarget);
    let kmods_hrefs = list_hrefs(client, &kmods).await?;

    if let Some(archive) = first_kmods_archive(&kmods_hrefs) {
        let index_url = format!("{kmods}{archive}/index.json");
        let index = client.get_json(&index_url).await?;
        match architecture_of(&index) {
            Some(arch) => {
                meta.pkgarch = arch.to_string();
                tracing::info!("Found pkgarch: {} for {target}/{subtarget}", meta.pkgarch);
            }
            None => tracing::debug!("No architecture in {index_url}"),
        }
    } else {
        tracing::debug!("No kmods archive listed for {target}/{subtarget}");
    }

    let packages = packages_url(base_url, target, subtarget);
    let package_hrefs = list_hrefs(client, &packages).await?;

    if let Some(vermagic) = last_kernel_vermagic(&package_hrefs) {
        meta.vermagic = vermagic.to_string();
        tracing::info!("Found vermagic: {} for {target}/{subtarget}", meta.vermagic);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kmods_pattern_accepts_archive() {
        let hrefs = ["5.15.150-1-abcdef1234.tar.xz"];
        assert_eq!(
            first_kmods_archive(&hrefs),
            Some("5.15.150-1-abcdef1234.tar.xz")
        );
    }

    #[test]
    fn test_kmods_pattern_rejects_near_misses() {
        let hrefs = [
            "5.15.0-foo.tar.xz",
            "5.15.150-1-abcdef123.tar.xz",      // hash too short
            "5.15.150-1-ABCDEF1234.tar.xz",     // uppercase hex
            "5.15-1-abcdef1234.tar.xz",         // two-part version
            "5.15.150-1-abcdef1234.tar.gz",     // wrong extension
            "x5.15.150-1-abcdef1234.tar.xz",    // leading junk
            "5.15.150-1-abcdef1234.tar.xz/",    // trailing junk
            "../",
        ];
        assert_eq!(first_kmods_archive(&hrefs), None);
    }

    #[test]
    fn test_kmods_first_match_wins() {
        let hrefs = [
            "../",
            "6.6.30-1-1111111111aa.tar.xz",
            "6.6.30-1-2222222222bb.tar.xz",
        ];
        assert_eq!(
            first_kmods_archive(&hrefs),
            Some("6.6.30-1-1111111111aa.tar.xz")
        );
    }

    #[test]
    fn test_kernel_vermagic_last_match_wins() {
        let hrefs = [
            "kernel-6.6.30~aaaaaaaaaa11-r1.apk",
            "kmod-foo-6.6.30-r1.apk",
            "kernel-6.6.31~bbbbbbbbbb22.apk",
        ];
        assert_eq!(last_kernel_vermagic(&hrefs), Some("bbbbbbbbbb22"));
    }

    #[test]
    fn test_kernel_vermagic_requires_kernel_prefix() {
        let hrefs = ["linux-kernel-6.6.30~aaaaaaaaaa11.apk"];
        assert_eq!(last_kernel_vermagic(&hrefs), None);
    }

    #[test]
    fn test_kernel_vermagic_ignores_non_matching_kernel_links() {
        let hrefs = [
            "kernel-6.6.30~aaaaaaaaaa11-r1.apk",
            "kernel-6.6.31~short-r1.apk",
            "kernel-headers.tar.xz",
        ];
        assert_eq!(last_kernel_vermagic(&hrefs), Some("aaaaaaaaaa11"));
    }

    #[test]
    fn test_kernel_vermagic_none_when_absent() {
        let hrefs: [&str; 0] = [];
        assert_eq!(last_kernel_vermagic(&hrefs), None);
    }

    #[test]
    fn test_architecture_of() {
        assert_eq!(
            architecture_of(&json!({"architecture": "aarch64_cortex-a53"})),
            Some("aarch64_cortex-a53")
        );
        assert_eq!(architecture_of(&json!({"architecture": ""})), None);
        assert_eq!(architecture_of(&json!({"architecture": 7})), None);
        assert_eq!(architecture_of(&json!({"packages": {}})), None);
        assert_eq!(architecture_of(&json!([])), None);
    }

    #[test]
    fn test_metadata_urls() {
        let base = "https://downloads.openwrt.org/snapshots/targets/";
        assert_eq!(
            kmods_url(base, "mediatek", "filogic"),
            "https://downloads.openwrt.org/snapshots/targets/mediatek/filogic/kmods/"
        );
        assert_eq!(
            packages_url(base, "x86", "64"),
            "https://downloads.openwrt.org/snapshots/targets/x86/64/packages/"
        );
    }

    #[test]
    fn test_build_metadata_default_is_empty() {
        let meta = BuildMetadata::default();
        assert!(meta.vermagic.is_empty());
        assert!(meta.pkgarch.is_empty());
    }
}
