//! The crawl: targets, then subtargets, then metadata, then the job filter.
//!
//! Strictly sequential. Listing failures abort the run; metadata failures
//! only leave empty fields behind.

use crate::acquisition::{list_directories, HttpClient};
use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::jobs::{job_config_json, select_jobs, JobDescriptor, DiscoveredPair};
use crate::metadata::{self, BuildMetadata};

/// List the hardware targets under the tree root.
pub async fn list_targets(client: &HttpClient, base_url: &str) -> Result<Vec<String>> {
    list_directories(client, base_url).await
}

/// List the subtargets of one target.
pub async fn list_subtargets(
    client: &HttpClient,
    base_url: &str,
    target: &str,
) -> Result<Vec<String>> {
    list_directories(client, &format!("{base_url}{target}/")).await
}

/// Walk the tree and return every discovered pair with its metadata.
pub async fn discover(client: &HttpClient, config: &SnapshotConfig) -> Result<Vec<DiscoveredPair>> {
    let base_url = config.base_url.as_str();
    let targets = list_targets(client, base_url).await?;
    tracing::info!("Discovered {} targets under {base_url}", targets.len());

    let mut discovered = Vec::new();
    for target in &targets {
        let subtargets = list_subtargets(client, base_url, target).await?;
        tracing::debug!("{target}: {} subtargets", subtargets.len());

        for subtarget in subtargets {
            let metadata = if config.listed_only && !config.allow.permits(target, &subtarget) {
                BuildMetadata::default()
            } else {
                metadata::fetch_metadata(client, base_url, target, &subtarget).await
            };

            discovered.push(DiscoveredPair {
                target: target.clone(),
                subtarget,
                metadata,
            });
        }
    }

    Ok(discovered)
}

/// Run the whole crawl and return the filtered job list.
pub async fn run(client: &HttpClient, config: &SnapshotConfig) -> Result<Vec<JobDescriptor>> {
    let discovered = discover(client, config).await?;
    let jobs = select_jobs(&config.version, discovered, &config.allow);

    tracing::info!("Job config: {}", job_config_json(&jobs)?);

    Ok(jobs)
}
