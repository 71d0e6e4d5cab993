//! Wire shapes of `repomd.xml` and `primary.xml`.
//!
//! The `rpm:` elements of the format section are accepted with or
//! without their namespace prefix.

use serde::Deserialize;

use crate::rpm::{CompareOp, Entry, Version};

#[derive(Debug, Deserialize)]
pub(super) struct RepoMdXml {
    #[serde(rename = "data", default)]
    pub data: Vec<DataXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DataXml {
    #[serde(rename = "@type")]
    pub kind: String,
    pub location: LocationXml,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationXml {
    #[serde(rename = "@href")]
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct MetadataXml {
    #[serde(rename = "package", default)]
    pub packages: Vec<PackageXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PackageXml {
    pub name: String,
    #[serde(default)]
    pub arch: String,
    pub version: VersionXml,
    #[serde(default)]
    pub checksum: Option<ChecksumXml>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    pub location: LocationXml,
    #[serde(default)]
    pub format: FormatXml,
}

#[derive(Debug, Deserialize)]
pub(super) struct VersionXml {
    #[serde(rename = "@epoch", default)]
    pub epoch: Option<u64>,
    #[serde(rename = "@ver", default)]
    pub ver: String,
    #[serde(rename = "@rel", default)]
    pub rel: Option<String>,
}

impl From<VersionXml> for Version {
    fn from(xml: VersionXml) -> Self {
        Version {
            epoch: xml.epoch,
            ver: xml.ver,
            rel: xml.rel,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChecksumXml {
    #[serde(rename = "@type", default)]
    pub kind: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FormatXml {
    #[serde(default, alias = "rpm:license")]
    pub license: String,
    #[serde(default, alias = "rpm:vendor")]
    pub vendor: String,
    #[serde(default, alias = "rpm:group")]
    pub group: String,
    #[serde(default, alias = "rpm:sourcerpm")]
    pub sourcerpm: String,
    #[serde(default, alias = "rpm:provides")]
    pub provides: EntryListXml,
    #[serde(default, alias = "rpm:requires")]
    pub requires: EntryListXml,
    #[serde(default, alias = "rpm:conflicts")]
    pub conflicts: EntryListXml,
    #[serde(default, alias = "rpm:obsoletes")]
    pub obsoletes: EntryListXml,
    #[serde(default, alias = "rpm:suggests")]
    pub suggests: EntryListXml,
    #[serde(default, alias = "rpm:recommends")]
    pub recommends: EntryListXml,
    #[serde(default, alias = "rpm:supplements")]
    pub supplements: EntryListXml,
    #[serde(default, alias = "rpm:enhances")]
    pub enhances: EntryListXml,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct EntryListXml {
    #[serde(rename = "entry", alias = "rpm:entry", default)]
    pub entries: Vec<EntryXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct EntryXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@flags", default)]
    pub flags: Option<String>,
    #[serde(rename = "@epoch", default)]
    pub epoch: Option<u64>,
    #[serde(rename = "@ver", default)]
    pub ver: Option<String>,
    #[serde(rename = "@rel", default)]
    pub rel: Option<String>,
    #[serde(rename = "@pre", default)]
    pub pre: Option<String>,
}

impl EntryListXml {
    pub fn into_entries(self) -> anyhow::Result<Vec<Entry>> {
        self.entries.into_iter().map(Entry::try_from).collect()
    }
}

impl TryFrom<EntryXml> for Entry {
    type Error = anyhow::Error;

    fn try_from(xml: EntryXml) -> anyhow::Result<Self> {
        let flags = match xml.flags.as_deref() {
            Some(flags) => flags.parse::<CompareOp>()?,
            None => CompareOp::Any,
        };
        Ok(Entry {
            name: xml.name,
            version: Version {
                epoch: xml.epoch,
                ver: xml.ver.unwrap_or_default(),
                rel: xml.rel,
            },
            flags,
            pre: matches!(xml.pre.as_deref(), Some("1") | Some("true")),
        })
    }
}
