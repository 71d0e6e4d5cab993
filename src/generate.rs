//! The generator run: read the repository, pick the root package and
//! materialize its dependency closure.

use anyhow::{Context, Result, anyhow};
use log::info;
use std::sync::Arc;

use crate::closure::{ClosureEngine, ClosureReport};
use crate::config::Config;
use crate::http::{HttpClient, HttpFs};
use crate::materialize::Materializer;
use crate::package::PackageResolver;
use crate::recipe::{RecipeExtractor, Rpmrebuild};
use crate::repomd::{Package, RepoMdIndex, RepositoryIndex};
use crate::rpm::{Entry, Version};
use crate::runtime::Runtime;
use crate::versions::fetch_sdk_version;

/// Runs the generator with `rpmrebuild` as the recipe extractor.
pub async fn generate(runtime: Arc<dyn Runtime>, config: &Config) -> Result<ClosureReport> {
    let extractor = Arc::new(Rpmrebuild::new(&config.rpmrebuild));
    generate_with(runtime, config, extractor).await
}

pub async fn generate_with(
    runtime: Arc<dyn Runtime>,
    config: &Config,
    extractor: Arc<dyn RecipeExtractor>,
) -> Result<ClosureReport> {
    let overrides = Arc::new(config.load_overrides(runtime.as_ref())?);
    let client = config.http_client()?;
    let fs = Arc::new(HttpFs::new(client.clone(), &config.repository)?);

    let (version, pin) = resolve_versions(&client, config).await?;

    let packages: Vec<Arc<Package>> = RepoMdIndex::new(Arc::clone(&fs))
        .list_packages()
        .await
        .with_context(|| format!("Failed to read repository {}", config.repository))?
        .into_iter()
        .map(Arc::new)
        .collect();

    let root_entry = match version {
        Some(version) => Entry::exact(&config.package, version),
        None => Entry::any(&config.package),
    };
    let root = PackageResolver::find(&packages, &root_entry)
        .cloned()
        .ok_or_else(|| anyhow!("Could not find package {} in {}", root_entry, config.repository))?;
    info!("Generating packages for {}", root);

    let materializer = Materializer::new(
        runtime,
        fs,
        extractor,
        overrides,
        config.output.clone(),
    )
    .with_service_mode(config.service_mode);
    let report = ClosureEngine::new(packages, materializer)
        .with_pin(pin)
        .run(root)
        .await?;

    info!("Generated {} packages:", report.len());
    for (name, version) in &report.packages {
        info!("  {} {}", name, version);
    }
    Ok(report)
}

/// Root version and dependency pin, resolving `--runtime` when given.
async fn resolve_versions(
    client: &HttpClient,
    config: &Config,
) -> Result<(Option<Version>, Option<Version>)> {
    let Some(runtime_version) = &config.runtime_version else {
        return Ok((config.version.clone(), config.pin.clone()));
    };
    let version = match &config.version {
        Some(version) => version.clone(),
        None => fetch_sdk_version(client, &config.release_notes_url, runtime_version)
            .await?
            .parse()?,
    };
    let pin = match &config.pin {
        Some(pin) => pin.clone(),
        None => runtime_version.parse()?,
    };
    info!("Using {} {} with runtime {}", config.package, version, pin);
    Ok((Some(version), Some(pin)))
}
