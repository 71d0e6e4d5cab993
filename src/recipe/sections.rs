//! Spec file sections and the line-oriented recipe document.

use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// A named region of a spec file.
///
/// Every section except the preamble starts at a marker line whose first
/// word is the section's marker (`%build`, `%post -p /bin/sh`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// Everything before the first marker.
    Preamble,
    Description,
    Package,
    Prep,
    Build,
    Install,
    Check,
    Files,
    Changelog,
    VerifyScript,
    Pre,
    Post,
    PreUn,
    PostUn,
    PreTrans,
    PostTrans,
    TriggerPrein,
    TriggerIn,
    TriggerUn,
    TriggerPostUn,
    FileTriggerIn,
    FileTriggerUn,
    FileTriggerPostUn,
    TransFileTriggerIn,
    TransFileTriggerUn,
    TransFileTriggerPostUn,
}

impl Section {
    pub const ALL: [Section; 26] = [
        Section::Preamble,
        Section::Description,
        Section::Package,
        Section::Prep,
        Section::Build,
        Section::Install,
        Section::Check,
        Section::Files,
        Section::Changelog,
        Section::VerifyScript,
        Section::Pre,
        Section::Post,
        Section::PreUn,
        Section::PostUn,
        Section::PreTrans,
        Section::PostTrans,
        Section::TriggerPrein,
        Section::TriggerIn,
        Section::TriggerUn,
        Section::TriggerPostUn,
        Section::FileTriggerIn,
        Section::FileTriggerUn,
        Section::FileTriggerPostUn,
        Section::TransFileTriggerIn,
        Section::TransFileTriggerUn,
        Section::TransFileTriggerPostUn,
    ];

    /// The marker word opening this section; the preamble has none.
    pub fn marker(self) -> Option<&'static str> {
        let marker = match self {
            Section::Preamble => return None,
            Section::Description => "%description",
            Section::Package => "%package",
            Section::Prep => "%prep",
            Section::Build => "%build",
            Section::Install => "%install",
            Section::Check => "%check",
            Section::Files => "%files",
            Section::Changelog => "%changelog",
            Section::VerifyScript => "%verifyscript",
            Section::Pre => "%pre",
            Section::Post => "%post",
            Section::PreUn => "%preun",
            Section::PostUn => "%postun",
            Section::PreTrans => "%pretrans",
            Section::PostTrans => "%posttrans",
            Section::TriggerPrein => "%triggerprein",
            Section::TriggerIn => "%triggerin",
            Section::TriggerUn => "%triggerun",
            Section::TriggerPostUn => "%triggerpostun",
            Section::FileTriggerIn => "%filetriggerin",
            Section::FileTriggerUn => "%filetriggerun",
            Section::FileTriggerPostUn => "%filetriggerpostun",
            Section::TransFileTriggerIn => "%transfiletriggerin",
            Section::TransFileTriggerUn => "%transfiletriggerun",
            Section::TransFileTriggerPostUn => "%transfiletriggerpostun",
        };
        Some(marker)
    }

    /// The section a marker word opens.
    pub fn from_marker(word: &str) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|section| section.marker() == Some(word))
    }

    /// The section opened by `line`, judged by its first word.
    pub fn starting_at(line: &str) -> Option<Section> {
        line.split_whitespace().next().and_then(Section::from_marker)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker().unwrap_or("preamble"))
    }
}

impl FromStr for Section {
    type Err = ConfigError;

    /// Accepts `preamble`, a marker (`%install`) or a bare name (`install`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "preamble" {
            return Ok(Section::Preamble);
        }
        let marker = if s.starts_with('%') {
            s.to_string()
        } else {
            format!("%{}", s)
        };
        Section::from_marker(&marker).ok_or_else(|| ConfigError::UnknownSection(s.to_string()))
    }
}

/// A recipe held as lines, without line terminators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recipe {
    lines: Vec<String>,
}

impl Recipe {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Splits off everything after the first line equal to `marker`.
    ///
    /// The marker line stays in the recipe. Returns None, leaving the recipe
    /// untouched, when no line matches.
    pub fn split_after(&mut self, marker: &str) -> Option<Vec<String>> {
        let index = self.lines.iter().position(|line| line == marker)?;
        Some(self.lines.split_off(index + 1))
    }

    /// Splits off the changelog body.
    pub fn split_changelog(&mut self) -> Option<Vec<String>> {
        self.split_after("%changelog")
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<&str> for Recipe {
    fn from(text: &str) -> Self {
        Self::from_lines(text.split('\n').map(String::from).collect())
    }
}
