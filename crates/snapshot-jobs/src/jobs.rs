//! Job descriptors and the allow-list filter.

use serde::Serialize;

use crate::config::AllowLists;
use crate::error::Result;
use crate::metadata::BuildMetadata;

/// A discovered (target, subtarget) pair with its metadata, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPair {
    pub target: String,
    pub subtarget: String,
    pub metadata: BuildMetadata,
}

/// One build job for the downstream workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDescriptor {
    pub tag: String,
    pub target: String,
    pub subtarget: String,
    pub vermagic: String,
    pub pkgarch: String,
}

impl JobDescriptor {
    pub fn new(tag: &str, pair: DiscoveredPair) -> Self {
        Self {
            tag: tag.to_string(),
            target: pair.target,
            subtarget: pair.subtarget,
            vermagic: pair.metadata.vermagic,
            pkgarch: pair.metadata.pkgarch,
        }
    }
}

/// Keep the allowed pairs and turn each into a job, preserving order.
pub fn select_jobs(
    tag: &str,
    discovered: Vec<DiscoveredPair>,
    allow: &AllowLists,
) -> Vec<JobDescriptor> {
    discovered
        .into_iter()
        .filter(|p| allow.permits(&p.target, &p.subtarget))
        .map(|p| JobDescriptor::new(tag, p))
        .collect()
}

/// Compact JSON array, the `job-config` output value.
pub fn job_config_json(jobs: &[JobDescriptor]) -> Result<String> {
    Ok(serde_json::to_string(jobs)?)
}
