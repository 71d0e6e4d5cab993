use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// RAII guard for a file that is still being written.
///
/// Unless [`PartialFile::success`] is called, the file is removed when the
/// guard drops: on an early error return, and when the owning task is
/// cancelled mid-download.
pub struct PartialFile<'a> {
    runtime: &'a dyn Runtime,
    path: PathBuf,
    armed: bool,
}

impl<'a> PartialFile<'a> {
    pub fn new(runtime: &'a dyn Runtime, path: PathBuf) -> Self {
        Self {
            runtime,
            path,
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path.
    pub fn success(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if !self.armed || !self.runtime.exists(&self.path) {
            return;
        }
        debug!("Cleaning up: {:?}", self.path);
        if let Err(e) = self.runtime.remove_file(&self.path) {
            debug!("Failed to clean up {:?}: {:#}", self.path, e);
        }
    }
}
