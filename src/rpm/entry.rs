//! Dependency entries and constraint matching.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{Version, compare};

/// Comparison operator of a dependency entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareOp {
    /// No constraint; any version satisfies.
    #[default]
    Any,
    Eq,
    Ge,
    Le,
    Lt,
    Gt,
}

impl CompareOp {
    /// Whether a comparison result satisfies this operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Any => true,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Gt => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Any => "",
            CompareOp::Eq => "EQ",
            CompareOp::Ge => "GE",
            CompareOp::Le => "LE",
            CompareOp::Lt => "LT",
            CompareOp::Gt => "GT",
        };
        f.write_str(s)
    }
}

impl FromStr for CompareOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(CompareOp::Any),
            "EQ" => Ok(CompareOp::Eq),
            "GE" => Ok(CompareOp::Ge),
            "LE" => Ok(CompareOp::Le),
            "LT" => Ok(CompareOp::Lt),
            "GT" => Ok(CompareOp::Gt),
            _ => anyhow::bail!(
                "Unknown comparison flag: {}. Expected EQ, GE, LE, LT or GT.",
                s
            ),
        }
    }
}

/// Something with a package name and a version.
pub trait NamedVersion {
    fn name(&self) -> &str;
    fn version(&self) -> &Version;
}

/// One edge of the dependency graph, optionally version constrained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub name: String,
    pub version: Version,
    pub flags: CompareOp,
    pub pre: bool,
}

impl Entry {
    /// An unconstrained entry for `name`.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An entry for `name` requiring exactly `version`.
    pub fn exact(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            flags: CompareOp::Eq,
            pre: false,
        }
    }

    /// The same entry, constrained to exactly `version`.
    pub fn pinned(&self, version: &Version) -> Self {
        Self {
            version: version.clone(),
            flags: CompareOp::Eq,
            ..self.clone()
        }
    }

    /// Whether `candidate` satisfies this entry.
    pub fn matches<P: NamedVersion + ?Sized>(&self, candidate: &P) -> bool {
        if candidate.name() != self.name {
            return false;
        }
        self.flags
            .accepts(compare(candidate.version(), &self.version))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flags {
            CompareOp::Any => write!(f, "{}", self.name),
            flags => write!(f, "{} {} {}", self.name, flags, self.version),
        }
    }
}
