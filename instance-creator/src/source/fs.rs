//! Directory-tree namespace source.
//!
//! Namespace `a.b` maps to the directory `<root>/a/b`. Only one directory
//! level is listed per call; the walker drives recursion. Children are sorted
//! by file name so the listing order is stable across platforms.
//!
//! A child directory is a nested namespace, so its name must be an identifier;
//! anything else (`...`, `.git`, `my-dir`) is a malformed entry. When symbolic
//! links are followed, a link resolving to the listed directory or one of its
//! ancestors is reported as a loop.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::SourceError;
use crate::name::{Namespace, is_valid_segment};
use crate::source::{NamespaceEntry, NamespaceSource};

/// Reads namespaces from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    follow_links: bool,
}

impl DirectorySource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, follow_links: bool) -> Self {
        Self {
            root: root.into(),
            follow_links,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn directory_for(&self, namespace: &Namespace) -> PathBuf {
        let mut dir = self.root.clone();
        dir.extend(namespace.segments());
        dir
    }

    /// Canonical paths of the root and of every directory down to `dir`.
    fn canonical_ancestors(&self, dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let canonical = |path: &Path| {
            path.canonicalize().map_err(|source| SourceError::Io {
                path: path.to_owned(),
                source,
            })
        };
        let mut ancestors = vec![canonical(&self.root)?];
        let mut current = self.root.clone();
        if let Ok(relative) = dir.strip_prefix(&self.root) {
            for segment in relative {
                current.push(segment);
                ancestors.push(canonical(&current)?);
            }
        }
        Ok(ancestors)
    }
}

impl NamespaceSource for DirectorySource {
    fn entries(&mut self, namespace: &Namespace) -> Result<Vec<NamespaceEntry>, SourceError> {
        let dir = self.directory_for(namespace);
        if !dir.is_dir() {
            tracing::debug!(namespace = %namespace, dir = %dir.display(), "namespace directory not found");
            return Ok(Vec::new());
        }

        let mut ancestors = None;
        let mut entries = Vec::new();
        for entry_result in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name()
        {
            let entry = entry_result.map_err(|source| SourceError::Walk {
                path: dir.clone(),
                source,
            })?;

            let Some(name) = entry.file_name().to_str() else {
                return Err(SourceError::MalformedEntry {
                    path: dir.clone(),
                    entry: entry.file_name().to_string_lossy().into_owned(),
                });
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if !is_valid_segment(name) {
                    return Err(SourceError::MalformedEntry {
                        path: dir.clone(),
                        entry: name.to_owned(),
                    });
                }
                if entry.path_is_symlink() {
                    if ancestors.is_none() {
                        ancestors = Some(self.canonical_ancestors(&dir)?);
                    }
                    let target = entry.path().canonicalize().map_err(|source| SourceError::Io {
                        path: entry.path().to_owned(),
                        source,
                    })?;
                    if let Some(ancestor) = ancestors
                        .iter()
                        .flatten()
                        .find(|ancestor| **ancestor == target)
                    {
                        return Err(SourceError::SymlinkLoop {
                            link: entry.path().to_owned(),
                            ancestor: ancestor.clone(),
                        });
                    }
                }
                entries.push(NamespaceEntry::Namespace(name.to_owned()));
            } else if file_type.is_file() {
                entries.push(NamespaceEntry::File(name.to_owned()));
            }
            // Devices, pipes, sockets and unfollowed symlinks are neither.
        }
        Ok(entries)
    }
}
