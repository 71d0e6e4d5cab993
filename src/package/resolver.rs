//! Candidate selection for dependency entries.
//!
//! This module picks the package that satisfies a dependency entry out of
//! the full repository listing.

use log::debug;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::repomd::Package;
use crate::rpm::{Entry, Version, compare};

/// Package resolver - pure functions over slices of packages.
pub struct PackageResolver;

impl PackageResolver {
    /// Find the newest package satisfying `entry`.
    ///
    /// Returns None when nothing matches; optional dependencies are often
    /// missing from a repository, so this is not an error. Among equally
    /// new candidates the first one listed wins.
    pub fn find<'a>(packages: &'a [Arc<Package>], entry: &Entry) -> Option<&'a Arc<Package>> {
        let found = packages
            .iter()
            .filter(|p| entry.matches::<Package>(p))
            .reduce(|best, candidate| {
                if compare(&candidate.version, &best.version) == Ordering::Greater {
                    candidate
                } else {
                    best
                }
            });
        if found.is_none() {
            debug!("Could not find matching package for {}", entry);
        }
        found
    }

    /// Find a package for `entry`, preferring an exact `pin` version.
    ///
    /// Falls back to the entry's own constraint when nothing carries the
    /// pinned version.
    pub fn find_pinned<'a>(
        packages: &'a [Arc<Package>],
        entry: &Entry,
        pin: Option<&Version>,
    ) -> Option<&'a Arc<Package>> {
        if let Some(version) = pin {
            if let Some(found) = Self::find(packages, &entry.pinned(version)) {
                return Some(found);
            }
            debug!(
                "No {} at pinned version {}, using {}",
                entry.name, version, entry
            );
        }
        Self::find(packages, entry)
    }
}
