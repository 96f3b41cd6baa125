//! Shared filesystem fixtures for resolution tests.
//!
//! A [`TestProject`] is a temporary project directory; files are written
//! relative to its root with parent directories created on demand.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::project_config::ProjectConfig;

pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        TestProject {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }

    /// Config rooted at the project directory, without aliases.
    pub fn config(&self) -> ProjectConfig {
        ProjectConfig::new(self.root())
    }
}
