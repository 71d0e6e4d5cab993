use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Produces the raw recipe text of a binary package.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    async fn extract(&self, artifact: &Path) -> Result<String>;
}

/// Extracts recipes with the `rpmrebuild` tool.
///
/// The tool logs to stdout, so the recipe goes to a temporary file next to
/// the artifact and is read back once the tool exits.
#[derive(Debug, Clone)]
pub struct Rpmrebuild {
    program: PathBuf,
}

impl Rpmrebuild {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl RecipeExtractor for Rpmrebuild {
    #[tracing::instrument(skip(self))]
    async fn extract(&self, artifact: &Path) -> Result<String> {
        let dir = artifact.parent().unwrap_or_else(|| Path::new("."));
        let spec_path = tempfile::Builder::new()
            .prefix(".recipe-")
            .suffix(".spec")
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temporary recipe in {:?}", dir))?
            .into_temp_path();

        let output = Command::new(&self.program)
            .arg(format!("--spec-only={}", spec_path.display()))
            .arg("--package")
            .arg(artifact)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {:?}", self.program))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("{}: {}", self.program.display(), line);
        }
        if !output.status.success() {
            bail!(
                "{} failed on {:?} ({}): {}",
                self.program.display(),
                artifact,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        tokio::fs::read_to_string(&spec_path)
            .await
            .with_context(|| format!("Failed to read generated recipe for {:?}", artifact))
    }
}
