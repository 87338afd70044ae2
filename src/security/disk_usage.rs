//! Disk usage probes used by the size ceiling check

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Measures the recursive on-disk size of a directory
pub trait DiskUsageProbe: Send + Sync {
    fn size_bytes(&self, path: &Path) -> Result<u64>;
}

/// Runs `du -sk` once instead of walking the tree in-process.
///
/// This blocks the calling thread for the duration of the `du` run.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuProbe;

impl DuProbe {
    fn parse_output(stdout: &str) -> Result<u64> {
        let kilobytes = stdout
            .split_whitespace()
            .next()
            .ok_or_else(|| anyhow!("du produced no output"))?
            .parse::<u64>()
            .with_context(|| format!("Unexpected du output: {}", stdout.trim()))?;
        Ok(kilobytes * 1024)
    }
}

impl DiskUsageProbe for DuProbe {
    fn size_bytes(&self, path: &Path) -> Result<u64> {
        let output = Command::new("du")
            .arg("-sk")
            .arg(path)
            .output()
            .context("Failed to run du")?;

        if !output.status.success() {
            bail!(
                "du exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reports a preset size regardless of path
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeProbe(pub u64);

impl DiskUsageProbe for FixedSizeProbe {
    fn size_bytes(&self, _path: &Path) -> Result<u64> {
        Ok(self.0)
    }
}
