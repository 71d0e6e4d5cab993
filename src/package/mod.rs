//! Package selection
//!
//! This module resolves dependency entries against the repository listing.

mod resolver;

pub use resolver::PackageResolver;
