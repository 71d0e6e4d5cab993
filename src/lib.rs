pub mod cleanup;
pub mod closure;
pub mod config;
pub mod generate;
pub mod http;
pub mod materialize;
pub mod package;
pub mod recipe;
pub mod remote;
pub mod repomd;
pub mod rpm;
pub mod runtime;
pub mod versions;

pub use config::Config;
pub use generate::{generate, generate_with};
