//! RPM version semantics: parsing, ordering and dependency matching.

mod compare;
mod entry;
mod version;

pub use compare::{compare, compare_part, split_part};
pub use entry::{CompareOp, Entry, NamedVersion};
pub use version::Version;
