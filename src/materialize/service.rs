//! The `_service` descriptor telling the build service how to refresh a
//! package.

use anyhow::{Context, Result};
use serde::Serialize;

/// How the build service obtains the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceMode {
    /// `download_url` with the resolved artifact URL as its `url` param.
    #[default]
    DownloadUrl,
    /// `download_files`, which resolves the URL named by the recipe source.
    DownloadFiles,
}

impl ServiceMode {
    pub fn service_name(self) -> &'static str {
        match self {
            ServiceMode::DownloadUrl => "download_url",
            ServiceMode::DownloadFiles => "download_files",
        }
    }
}

#[derive(Debug, Serialize)]
struct ServicesXml {
    service: Vec<ServiceXml>,
}

#[derive(Debug, Serialize)]
struct ServiceXml {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "param", skip_serializing_if = "Vec::is_empty")]
    params: Vec<ParamXml>,
}

#[derive(Debug, Serialize)]
struct ParamXml {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "$text")]
    value: String,
}

/// Renders the descriptor for an artifact at `url`.
pub fn render_service(mode: ServiceMode, url: &str) -> Result<String> {
    let params = match mode {
        ServiceMode::DownloadUrl => vec![ParamXml {
            name: "url",
            value: url.to_string(),
        }],
        ServiceMode::DownloadFiles => Vec::new(),
    };
    let services = ServicesXml {
        service: vec![
            ServiceXml {
                name: "format_spec_file",
                params: Vec::new(),
            },
            ServiceXml {
                name: mode.service_name(),
                params,
            },
        ],
    };

    let mut buffer = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut buffer, Some("services"))
        .context("Failed to create service serializer")?;
    serializer.indent(' ', 2);
    services
        .serialize(serializer)
        .context("Failed to serialize service descriptor")?;
    buffer.push('\n');
    Ok(buffer)
}
