//! RPM version triples.

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;

/// An RPM `epoch:version-release` triple.
///
/// Epoch and release are optional: a missing epoch is only skipped when
/// comparing, and a missing release leaves the release unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub epoch: Option<u64>,
    pub ver: String,
    pub rel: Option<String>,
}

impl Version {
    /// A version with neither epoch nor release.
    pub fn new(ver: impl Into<String>) -> Self {
        Self {
            epoch: None,
            ver: ver.into(),
            rel: None,
        }
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_release(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.epoch {
            Some(epoch) if epoch > 0 => write!(f, "{}:{}", epoch, self.ver)?,
            _ => write!(f, "{}", self.ver)?,
        }
        match self.rel.as_deref() {
            Some(rel) if !rel.is_empty() => write!(f, "-{}", rel),
            _ => Ok(()),
        }
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    /// Parses `[epoch:]ver[-rel]`. The epoch ends at the first `:` and the
    /// release starts after the first `-`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut version = Version::default();
        let mut rest = input;
        if let Some((epoch, tail)) = rest.split_once(':') {
            let epoch = epoch
                .parse::<u64>()
                .with_context(|| format!("Failed to parse epoch from {:?}", input))?;
            version.epoch = Some(epoch);
            rest = tail;
        }
        match rest.split_once('-') {
            Some((ver, rel)) => {
                version.ver = ver.to_string();
                version.rel = Some(rel.to_string());
            }
            None => version.ver = rest.to_string(),
        }
        Ok(version)
    }
}
