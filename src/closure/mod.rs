//! Dependency closure walk.
//!
//! Starting from a root package, every package reachable through requires,
//! suggests, recommends, supplements or enhances is claimed once and
//! materialized by its own task. All tasks share one [`TaskGroup`], so the
//! first failure anywhere aborts the whole walk.

mod group;

use anyhow::{Result, anyhow};
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::materialize::Materializer;
use crate::package::PackageResolver;
use crate::repomd::Package;
use crate::rpm::Version;

pub use group::{Spawner, TaskGroup};

/// Packages claimed during one walk, by name.
#[derive(Default)]
pub struct ClosureState {
    claimed: Mutex<HashMap<String, Arc<Package>>>,
}

impl ClosureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `package`'s name; true when this call made the claim.
    pub fn claim(&self, package: &Arc<Package>) -> Result<bool> {
        let mut claimed = self
            .claimed
            .lock()
            .map_err(|_| anyhow!("Closure state lock poisoned"))?;
        if claimed.contains_key(&package.name) {
            return Ok(false);
        }
        claimed.insert(package.name.clone(), Arc::clone(package));
        Ok(true)
    }

    /// Every claimed package, sorted by name.
    pub fn claimed(&self) -> Result<Vec<Arc<Package>>> {
        let claimed = self
            .claimed
            .lock()
            .map_err(|_| anyhow!("Closure state lock poisoned"))?;
        let mut packages: Vec<Arc<Package>> = claimed.values().cloned().collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }
}

/// Packages materialized by a walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClosureReport {
    pub packages: Vec<(String, Version)>,
}

impl ClosureReport {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.iter().any(|(n, _)| n == name)
    }
}

impl fmt::Display for ClosureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, version) in &self.packages {
            writeln!(f, "{} {}", name, version)?;
        }
        Ok(())
    }
}

pub struct ClosureEngine {
    packages: Arc<Vec<Arc<Package>>>,
    materializer: Arc<Materializer>,
    pin: Option<Version>,
}

struct Walk {
    packages: Arc<Vec<Arc<Package>>>,
    materializer: Arc<Materializer>,
    pin: Option<Version>,
    root: Arc<Package>,
    state: Arc<ClosureState>,
}

impl ClosureEngine {
    pub fn new(packages: Vec<Arc<Package>>, materializer: Materializer) -> Self {
        Self {
            packages: Arc::new(packages),
            materializer: Arc::new(materializer),
            pin: None,
        }
    }

    /// Prefer `pin` for the root's direct dependencies.
    pub fn with_pin(mut self, pin: Option<Version>) -> Self {
        self.pin = pin;
        self
    }

    /// Materializes `root` and everything it reaches.
    pub async fn run(&self, root: Arc<Package>) -> Result<ClosureReport> {
        let state = Arc::new(ClosureState::new());
        state.claim(&root)?;

        let walk = Arc::new(Walk {
            packages: Arc::clone(&self.packages),
            materializer: Arc::clone(&self.materializer),
            pin: self.pin.clone(),
            root: Arc::clone(&root),
            state: Arc::clone(&state),
        });
        let group = TaskGroup::new();
        schedule(walk, group.spawner(), root);
        group.wait().await?;

        let packages = state
            .claimed()?
            .iter()
            .map(|p| (p.name.clone(), p.version.clone()))
            .collect();
        Ok(ClosureReport { packages })
    }
}

fn schedule(walk: Arc<Walk>, spawner: Spawner, package: Arc<Package>) {
    let task_spawner = spawner.clone();
    spawner.spawn(visit(walk, task_spawner, package));
}

async fn visit(walk: Arc<Walk>, spawner: Spawner, package: Arc<Package>) -> Result<()> {
    info!("Materializing {}", package);
    let dir = walk.materializer.prepare(&package)?;
    walk.materializer.schedule(&spawner, &package, &dir);

    let pin = if Arc::ptr_eq(&package, &walk.root) {
        walk.pin.as_ref()
    } else {
        None
    };
    for entry in package.wanted_entries() {
        let Some(found) = PackageResolver::find_pinned(&walk.packages, entry, pin) else {
            continue;
        };
        if walk.state.claim(found)? {
            debug!("{} pulls in {}", package.name, found);
            schedule(Arc::clone(&walk), spawner.clone(), Arc::clone(found));
        }
    }
    Ok(())
}
