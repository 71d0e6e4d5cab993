//! HTTP access: a thin client wrapper and the repository filesystem on top of it.

mod client;
mod fs;
mod status;

pub use client::HttpClient;
pub use fs::{HttpFile, HttpFs, disposition_filename};
pub use status::{check_status, classify_status};
