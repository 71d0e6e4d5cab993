//! Writing the build-service package for a repository package.
//!
//! Each claimed package gets `<output>/<name>/` holding the downloaded
//! RPM, `<name>.spec`, `<name>.changes`, `_service` and `<name>-rpmlintrc`.

mod lint;
mod service;

use anyhow::{Context, Result, bail};
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cleanup::PartialFile;
use crate::closure::Spawner;
use crate::recipe::{OverrideTable, Recipe, RecipeExtractor, Substitutions};
use crate::remote::RemoteFs;
use crate::repomd::Package;
use crate::runtime::Runtime;

pub use lint::{SUPPRESSED_CHECKS, render_lint_config};
pub use service::{ServiceMode, render_service};

pub struct Materializer {
    runtime: Arc<dyn Runtime>,
    fs: Arc<dyn RemoteFs>,
    extractor: Arc<dyn RecipeExtractor>,
    overrides: Arc<OverrideTable>,
    output: PathBuf,
    mode: ServiceMode,
}

impl Materializer {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        fs: Arc<dyn RemoteFs>,
        extractor: Arc<dyn RecipeExtractor>,
        overrides: Arc<OverrideTable>,
        output: PathBuf,
    ) -> Self {
        Self {
            runtime,
            fs,
            extractor,
            overrides,
            output,
            mode: ServiceMode::default(),
        }
    }

    pub fn with_service_mode(mut self, mode: ServiceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn package_dir(&self, package: &Package) -> PathBuf {
        self.output.join(&package.name)
    }

    /// Creates the package directory.
    pub fn prepare(&self, package: &Package) -> Result<PathBuf> {
        let dir = self.package_dir(package);
        self.runtime
            .create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory for {}", package))?;
        Ok(dir)
    }

    /// Starts the independent writes for `package` on `spawner`.
    pub fn schedule(self: &Arc<Self>, spawner: &Spawner, package: &Arc<Package>, dir: &Path) {
        {
            let this = Arc::clone(self);
            let package = Arc::clone(package);
            let dir = dir.to_path_buf();
            spawner.spawn(async move {
                let artifact = this.download(&package, &dir).await?;
                this.write_recipe(&package, &dir, &artifact).await
            });
        }
        {
            let this = Arc::clone(self);
            let package = Arc::clone(package);
            let dir = dir.to_path_buf();
            spawner.spawn(async move { this.write_service(&package, &dir) });
        }
        {
            let this = Arc::clone(self);
            let package = Arc::clone(package);
            let dir = dir.to_path_buf();
            spawner.spawn(async move { this.write_lint(&package, &dir) });
        }
    }

    /// Streams the package's RPM into `dir`, returning the written path.
    #[tracing::instrument(skip(self, package), fields(package = %package))]
    pub async fn download(&self, package: &Package, dir: &Path) -> Result<PathBuf> {
        let mut file = self
            .fs
            .open(&package.location)
            .await
            .with_context(|| format!("Failed to download {}", package))?;
        let info = file.info().clone();
        if info.name.is_empty() || info.name == "." || info.name == ".." || info.name.contains('/')
        {
            bail!("Failed to download {}: bad file name {:?}", package, info.name);
        }

        let partial = PartialFile::new(self.runtime.as_ref(), dir.join(&info.name));
        let mut writer = self
            .runtime
            .create_file(partial.path())
            .with_context(|| format!("Failed to create {:?}", partial.path()))?;
        let mut written: u64 = 0;
        while let Some(chunk) = file
            .chunk()
            .await
            .with_context(|| format!("Failed to download {}", package))?
        {
            writer
                .write_all(&chunk)
                .with_context(|| format!("Failed to write {:?}", partial.path()))?;
            written += chunk.len() as u64;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", partial.path()))?;
        drop(writer);

        if let Some(size) = info.size.filter(|size| *size > 0) {
            if written != size {
                bail!(
                    "Failed to download {}: got {}/{} bytes",
                    package,
                    written,
                    size
                );
            }
        }
        debug!("Downloaded {} ({} bytes)", package, written);
        Ok(partial.success())
    }

    fn substitutions(&self, package: &Package, artifact: &Path) -> Result<Substitutions> {
        let rpm = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("Artifact path {:?} has no file name", artifact))?;
        let source = match self.mode {
            ServiceMode::DownloadUrl => rpm.clone(),
            ServiceMode::DownloadFiles => self.fs.url_for(&package.location)?,
        };
        Ok(Substitutions { rpm, source })
    }

    /// Extracts the recipe from `artifact`, moves its changelog into
    /// `<name>.changes` and writes the merged `<name>.spec`.
    #[tracing::instrument(skip(self, package), fields(package = %package))]
    pub async fn write_recipe(&self, package: &Package, dir: &Path, artifact: &Path) -> Result<()> {
        let text = self
            .extractor
            .extract(artifact)
            .await
            .with_context(|| format!("Failed to generate recipe for {}", package))?;
        let mut recipe = Recipe::from(text.as_str());

        if let Some(changelog) = recipe.split_changelog() {
            let path = dir.join(format!("{}.changes", package.name));
            self.runtime
                .write(&path, changelog.join("\n").as_bytes())
                .with_context(|| format!("Failed to write changelog for {}", package))?;
        } else {
            debug!("{} has no changelog", package);
        }

        let vars = self.substitutions(package, artifact)?;
        let recipe = self.overrides.merge(&package.name, recipe, &vars);
        let path = dir.join(format!("{}.spec", package.name));
        self.runtime
            .write(&path, recipe.to_text().as_bytes())
            .with_context(|| format!("Failed to write recipe for {}", package))?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    pub fn write_service(&self, package: &Package, dir: &Path) -> Result<()> {
        let url = self.fs.url_for(&package.location)?;
        let xml = render_service(self.mode, &url)
            .with_context(|| format!("Failed to build {} _service file", package))?;
        let path = dir.join("_service");
        self.runtime
            .write(&path, xml.as_bytes())
            .with_context(|| format!("Failed to write {} _service file", package))?;
        debug!("Wrote service file {:?} for {}", path, package);
        Ok(())
    }

    pub fn write_lint(&self, package: &Package, dir: &Path) -> Result<()> {
        let path = dir.join(format!("{}-rpmlintrc", package.name));
        self.runtime
            .write(&path, render_lint_config(SUPPRESSED_CHECKS).as_bytes())
            .with_context(|| format!("Failed to write rpmlintrc for {}", package))
    }
}
