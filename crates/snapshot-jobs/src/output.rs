//! Step outputs and failure reporting for the GitHub Actions runner.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` when the runner provides
//! one, and fall back to the `::set-output` workflow command on stdout.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Environment variable the runner sets to the step's output file.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// Name of the output consumed by the build matrix step.
pub const JOB_CONFIG_OUTPUT: &str = "job-config";

/// Where step outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionsOutput {
    file: Option<PathBuf>,
}

impl ActionsOutput {
    /// Explicit path first, then `GITHUB_OUTPUT`, then stdout.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let file = explicit.map(Path::to_path_buf).or_else(|| {
            std::env::var_os(OUTPUT_FILE_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        });
        Self { file }
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
        }
    }

    /// Publish a named step output.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        match &self.file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
                let entry = file_command(name, value, &delimiter);
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(entry.as_bytes())?;
                tracing::debug!("Wrote output '{name}' to {}", path.display());
            }
            None => {
                println!(
                    "::set-output name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
            }
        }
        Ok(())
    }
}

/// Mark the step as failed with a message.
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Heredoc-style entry for the output file.
pub fn file_command(name: &str, value: &str, delimiter: &str) -> String {
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escape a workflow command's message.
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command's property value.
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
