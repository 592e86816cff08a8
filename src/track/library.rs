use std::path::{Path, PathBuf};

/// A directory tree of recordings laid out as `<albumArtist>/<album>/<file>`.
#[derive(Clone, Debug)]
pub struct MusicLibrary {
    root: PathBuf,
    extension: String,
}

impl MusicLibrary {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File extension of encoded files, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn destination_for(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Whether a recording already exists at `relative` under this root.
    pub fn contains(&self, relative: &Path) -> bool {
        self.destination_for(relative).exists()
    }
}
