//! Snapshot job matrix: crawl the OpenWrt snapshot target tree and emit
//! one build job per allowed (target, subtarget) pair.
//!
//! The pipeline is sequential: list targets, list each target's
//! subtargets, look up each pair's kernel vermagic and package
//! architecture, then filter against the allow-lists.

pub mod acquisition;
pub mod config;
pub mod error;
pub mod jobs;
pub mod metadata;
pub mod output;
pub mod pipeline;

pub use acquisition::HttpClient;
pub use config::{AllowLists, SnapshotConfig};
pub use error::{Result, SnapshotError};
pub use jobs::{JobDescriptor, DiscoveredPair};
pub use metadata::BuildMetadata;
