//! Recipe extraction and rewriting.
//!
//! - `extractor` - obtaining the raw recipe of a binary package
//! - `sections` - section markers and the line-based recipe document
//! - `overrides` - per-package lines spliced into recipe sections

mod extractor;
mod overrides;
mod sections;

pub use extractor::{RecipeExtractor, Rpmrebuild};
pub use overrides::{ConfigError, OverrideRule, OverrideTable, Substitutions};
pub use sections::{Recipe, Section};

#[cfg(test)]
pub use extractor::MockRecipeExtractor;
