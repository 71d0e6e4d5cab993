//! YUM repository metadata (`repodata/repomd.xml` and the primary index).

mod xml;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::{BufReader, Read};
use std::sync::Arc;

use crate::remote::{RemoteFs, read_all};
use crate::rpm::{Entry, NamedVersion, Version};
use xml::{MetadataXml, PackageXml, RepoMdXml};

/// Location of the repository metadata index within the repository.
pub const REPOMD_PATH: &str = "repodata/repomd.xml";

/// One data file advertised by `repomd.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMdData {
    pub kind: String,
    pub href: String,
}

/// Package checksum as published in the primary index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Checksum {
    pub kind: String,
    pub value: String,
}

/// Dependency and descriptive data of a package.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Format {
    pub license: String,
    pub vendor: String,
    pub group: String,
    pub source_rpm: String,
    pub provides: Vec<Entry>,
    pub requires: Vec<Entry>,
    pub conflicts: Vec<Entry>,
    pub obsoletes: Vec<Entry>,
    pub suggests: Vec<Entry>,
    pub recommends: Vec<Entry>,
    pub supplements: Vec<Entry>,
    pub enhances: Vec<Entry>,
}

/// A package record of the primary index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Package {
    pub name: String,
    pub arch: String,
    pub version: Version,
    pub checksum: Checksum,
    pub summary: String,
    pub description: String,
    pub url: Option<String>,
    /// Artifact path relative to the repository root.
    pub location: String,
    pub format: Format,
}

impl Package {
    /// Dependency entries across every relation that pulls packages into
    /// the closure, in a fixed order.
    pub fn wanted_entries(&self) -> impl Iterator<Item = &Entry> {
        self.format
            .requires
            .iter()
            .chain(&self.format.suggests)
            .chain(&self.format.recommends)
            .chain(&self.format.supplements)
            .chain(&self.format.enhances)
    }
}

impl NamedVersion for Package {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

impl TryFrom<PackageXml> for Package {
    type Error = anyhow::Error;

    fn try_from(xml: PackageXml) -> Result<Self> {
        let name = xml.name;
        let format = xml.format;
        let entries = |list: xml::EntryListXml, relation: &str| {
            list.into_entries()
                .with_context(|| format!("Invalid {} entry in package {}", relation, name))
        };
        let format = Format {
            license: format.license,
            vendor: format.vendor,
            group: format.group,
            source_rpm: format.sourcerpm,
            provides: entries(format.provides, "provides")?,
            requires: entries(format.requires, "requires")?,
            conflicts: entries(format.conflicts, "conflicts")?,
            obsoletes: entries(format.obsoletes, "obsoletes")?,
            suggests: entries(format.suggests, "suggests")?,
            recommends: entries(format.recommends, "recommends")?,
            supplements: entries(format.supplements, "supplements")?,
            enhances: entries(format.enhances, "enhances")?,
        };
        Ok(Package {
            arch: xml.arch,
            version: xml.version.into(),
            checksum: xml
                .checksum
                .map(|c| Checksum {
                    kind: c.kind,
                    value: c.value.trim().to_string(),
                })
                .unwrap_or_default(),
            summary: xml.summary,
            description: xml.description,
            url: xml.url,
            location: xml.location.href,
            format,
            name,
        })
    }
}

/// Source of every package known to a repository snapshot.
#[async_trait]
pub trait RepositoryIndex: Send + Sync {
    async fn list_packages(&self) -> Result<Vec<Package>>;
}

/// Repository index read from YUM metadata over a remote filesystem.
pub struct RepoMdIndex<F: RemoteFs> {
    fs: Arc<F>,
}

impl<F: RemoteFs> RepoMdIndex<F> {
    pub fn new(fs: Arc<F>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl<F: RemoteFs> RepositoryIndex for RepoMdIndex<F> {
    async fn list_packages(&self) -> Result<Vec<Package>> {
        parse_primary(self.fs.as_ref()).await
    }
}

/// Reads the data file list from `repodata/repomd.xml`.
#[tracing::instrument(skip(fs))]
pub async fn parse_repo_metadata<F: RemoteFs + ?Sized>(fs: &F) -> Result<Vec<RepoMdData>> {
    let mut file = fs
        .open(REPOMD_PATH)
        .await
        .context("Failed to open repo metadata")?;
    let content = read_all(file.as_mut())
        .await
        .context("Failed to read repo metadata")?;
    let metadata: RepoMdXml =
        decode(content.as_slice()).context("Failed to decode repo metadata")?;
    Ok(metadata
        .data
        .into_iter()
        .map(|data| RepoMdData {
            kind: data.kind,
            href: data.location.href,
        })
        .collect())
}

/// Reads every package record of the primary index.
#[tracing::instrument(skip(fs))]
pub async fn parse_primary<F: RemoteFs + ?Sized>(fs: &F) -> Result<Vec<Package>> {
    let data = parse_repo_metadata(fs)
        .await
        .context("Error parsing repo metadata")?;
    let href = data
        .into_iter()
        .find(|d| d.kind == "primary")
        .map(|d| d.href)
        .ok_or_else(|| anyhow!("Could not find primary data in repo metadata"))?;

    debug!("Reading primary index from {}", href);
    let mut file = fs
        .open(&href)
        .await
        .with_context(|| format!("Failed to open primary index {}", href))?;
    let content = read_all(file.as_mut())
        .await
        .with_context(|| format!("Failed to read primary index {}", href))?;

    let metadata: MetadataXml = if href.ends_with(".gz") {
        decode(GzDecoder::new(content.as_slice()))
    } else {
        decode(content.as_slice())
    }
    .with_context(|| format!("Failed to decode primary index {}", href))?;

    let packages = metadata
        .packages
        .into_iter()
        .map(Package::try_from)
        .collect::<Result<Vec<_>>>()?;
    info!("Repository lists {} packages", packages.len());
    Ok(packages)
}

fn decode<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(quick_xml::de::from_reader(BufReader::new(reader))?)
}
