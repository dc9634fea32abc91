//! Local content directory
//!
//! Walks the build output with gitignore semantics. Hidden files are never
//! published, and a `.cdnplanignore` file in any directory excludes more.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::domain::ports::{ContentObject, ContentSource};

pub const IGNORE_FILE: &str = ".cdnplanignore";

pub struct LocalContentSource {
    root: PathBuf,
}

impl LocalContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }
}

impl ContentSource for LocalContentSource {
    fn list(&self) -> io::Result<Vec<ContentObject>> {
        if !self.root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("content directory {} does not exist", self.root.display()),
            ));
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .add_custom_ignore_filename(IGNORE_FILE)
            .build();

        let mut objects = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let Some(key) = self.key_for(&path) else {
                continue;
            };
            let size = fs::metadata(&path)?.len();
            objects.push(ContentObject { key, path, size });
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn read(&self, object: &ContentObject) -> io::Result<Vec<u8>> {
        fs::read(&object.path)
    }
}
