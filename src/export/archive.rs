use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

pub const STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

/// `<root>/<stamp>/` grouping every object exported in one sitting.
#[derive(Debug, Clone)]
pub struct SessionArchive {
    root: PathBuf,
    stamp: String,
}

impl SessionArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::at(root, Local::now())
    }

    pub fn at(root: impl Into<PathBuf>, time: DateTime<Local>) -> Self {
        Self {
            root: root.into(),
            stamp: time.format(STAMP_FORMAT).to_string(),
        }
    }

    /// Start a new session group stamped with the current time.
    pub fn renew(&mut self) {
        self.stamp = Local::now().format(STAMP_FORMAT).to_string();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    pub fn session_dir(&self) -> PathBuf {
        self.root.join(&self.stamp)
    }

    pub fn object_dir(&self, object_name: &str) -> PathBuf {
        self.session_dir().join(object_name)
    }
}
