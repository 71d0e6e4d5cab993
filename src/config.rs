use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::path::PathBuf;

use crate::http::HttpClient;
use crate::materialize::ServiceMode;
use crate::recipe::OverrideTable;
use crate::rpm::Version;
use crate::runtime::Runtime;
use crate::versions::DEFAULT_RELEASE_NOTES_URL;

pub const DEFAULT_REPOSITORY: &str = "https://packages.microsoft.com/opensuse/15/prod/";
pub const DEFAULT_PACKAGE: &str = "dotnet-sdk-9.0";
pub const USER_AGENT: &str = concat!("obs-repack/", env!("OBS_REPACK_VERSION"));

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the YUM repository.
    pub repository: String,
    /// Root package name.
    pub package: String,
    /// Exact root version; the newest one when absent.
    pub version: Option<Version>,
    /// Version preferred for the root's direct dependencies.
    pub pin: Option<Version>,
    /// .NET runtime version to derive the root version and pin from.
    pub runtime_version: Option<String>,
    pub release_notes_url: String,
    /// Directory receiving one sub-directory per package.
    pub output: PathBuf,
    /// JSON override rules used instead of the built-in ones.
    pub overrides: Option<PathBuf>,
    pub rpmrebuild: PathBuf,
    pub service_mode: ServiceMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            version: None,
            pin: None,
            runtime_version: None,
            release_notes_url: DEFAULT_RELEASE_NOTES_URL.to_string(),
            output: PathBuf::from("."),
            overrides: None,
            rpmrebuild: PathBuf::from("rpmrebuild"),
            service_mode: ServiceMode::default(),
        }
    }
}

impl Config {
    pub fn http_client(&self) -> Result<HttpClient> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpClient::new(client))
    }

    /// Loads the override rules, failing on any invalid rule.
    pub fn load_overrides(&self, runtime: &dyn Runtime) -> Result<OverrideTable> {
        match &self.overrides {
            Some(path) => {
                debug!("Loading override rules from {:?}", path);
                OverrideTable::from_file(runtime, path)
            }
            None => Ok(OverrideTable::builtin()?),
        }
    }
}
