//! Override rules spliced into extracted recipes.
//!
//! A rule targets the packages whose name matches a shell-style glob and
//! appends lines to one section of the recipe. Lines for a section are
//! emitted right before the marker that ends it, or at the end of the
//! document when the section is the last one.

use anyhow::{Context, Result};
use glob::Pattern;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::sections::{Recipe, Section};
use crate::runtime::Runtime;

/// Invalid override configuration, reported before any work starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownSection(String),
    InvalidGlob { pattern: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownSection(name) => {
                write!(f, "Unknown recipe section '{}' in override rule", name)
            }
            ConfigError::InvalidGlob { pattern, message } => {
                write!(f, "Invalid package pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// One override rule as written in an override file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverrideRule {
    /// Glob over package names.
    pub package: String,
    /// `preamble`, a section marker such as `%install`, or its bare name.
    pub section: String,
    #[serde(default)]
    pub weight: i32,
    pub lines: Vec<String>,
}

impl OverrideRule {
    pub fn new(package: &str, section: &str, weight: i32, lines: &[&str]) -> Self {
        Self {
            package: package.to_string(),
            section: section.to_string(),
            weight,
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Pattern,
    section: Section,
    weight: i32,
    lines: Vec<String>,
}

impl TryFrom<OverrideRule> for CompiledRule {
    type Error = ConfigError;

    fn try_from(rule: OverrideRule) -> Result<Self, ConfigError> {
        let pattern = Pattern::new(&rule.package).map_err(|e| ConfigError::InvalidGlob {
            pattern: rule.package.clone(),
            message: e.msg.to_string(),
        })?;
        let section = rule.section.parse::<Section>()?;
        Ok(Self {
            pattern,
            section,
            weight: rule.weight,
            lines: rule.lines,
        })
    }
}

/// Placeholder values expanded inside override lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Substitutions {
    /// `@RPM@`: file name of the downloaded artifact.
    pub rpm: String,
    /// `@SOURCE@`: what the recipe names as its source.
    pub source: String,
}

impl Substitutions {
    pub fn apply(&self, line: &str) -> String {
        line.replace("@RPM@", &self.rpm)
            .replace("@SOURCE@", &self.source)
    }
}

/// Validated set of override rules.
#[derive(Debug, Clone)]
pub struct OverrideTable {
    rules: Vec<CompiledRule>,
}

impl OverrideTable {
    /// Compiles `rules`, failing on the first bad glob or section name.
    pub fn new(rules: Vec<OverrideRule>) -> Result<Self, ConfigError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The rules every repackaged RPM needs: declare the artifact as the
    /// source and unpack it into the build root.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_rules())
    }

    /// Parses a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<OverrideRule> =
            serde_json::from_str(json).context("Failed to parse override rules")?;
        Ok(Self::new(rules)?)
    }

    #[tracing::instrument(skip(runtime))]
    pub fn from_file(runtime: &dyn Runtime, path: &Path) -> Result<Self> {
        let json = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read override rules from {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("Invalid override file {:?}", path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Lines to add per section for `package`, ordered by weight.
    fn blocks_for(&self, package: &str, vars: &Substitutions) -> HashMap<Section, Vec<String>> {
        let mut matching: Vec<&CompiledRule> = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.matches(package))
            .collect();
        matching.sort_by_key(|rule| rule.weight);

        let mut blocks: HashMap<Section, Vec<String>> = HashMap::new();
        for rule in matching {
            blocks
                .entry(rule.section)
                .or_default()
                .extend(rule.lines.iter().map(|line| vars.apply(line)));
        }
        blocks
    }

    /// Splices the overrides for `package` into `recipe`.
    pub fn merge(&self, package: &str, recipe: Recipe, vars: &Substitutions) -> Recipe {
        let mut pending = self.blocks_for(package, vars);
        if pending.is_empty() {
            return recipe;
        }
        debug!(
            "Applying overrides for {} to {} section(s)",
            package,
            pending.len()
        );

        let lines = recipe.into_lines();
        let mut merged = Vec::with_capacity(lines.len());
        let mut current = Section::Preamble;
        for line in lines {
            if let Some(next) = Section::starting_at(&line) {
                if let Some(block) = pending.remove(&current) {
                    merged.extend(block);
                }
                current = next;
            }
            merged.push(line);
        }
        if let Some(block) = pending.remove(&current) {
            merged.extend(block);
        }
        Recipe::from_lines(merged)
    }
}

fn builtin_rules() -> Vec<OverrideRule> {
    vec![
        OverrideRule::new(
            "*",
            "preamble",
            0,
            &["BuildRequires: rpm", "Source: @SOURCE@"],
        ),
        OverrideRule::new(
            "*",
            "%description",
            0,
            &[
                "%install",
                "set -x",
                "rpm2cpio %{_sourcedir}/@RPM@ | cpio --extract --make-directories --preserve-modification-time --verbose --directory %{buildroot}",
            ],
        ),
    ]
}
