//! Archive namespace source.
//!
//! Entry paths use `/` as the namespace separator and a trailing `/` for
//! directory entries. The archive is opened once and the handle is held until
//! the source is dropped, which the walker does when its walk ends. Entry names
//! are read from the central directory at open time; listing a namespace never
//! touches entry data.
//!
//! Archives built without explicit directory entries still expose their
//! nested namespaces: a sub-namespace is reported for every deeper entry path,
//! once, at the position of its first occurrence. A nested namespace segment
//! that is not an identifier (empty, `.`, `..`, dotted) is a malformed entry.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::SourceError;
use crate::name::{Namespace, is_valid_segment};
use crate::source::{NamespaceEntry, NamespaceSource};

/// Reads namespaces from a zip-format archive.
pub struct ArchiveSource {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    names: Vec<String>,
}

impl std::fmt::Debug for ArchiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveSource")
            .field("path", &self.path)
            .field("entries", &self.archive.len())
            .field("names", &self.names.len())
            .finish()
    }
}

impl ArchiveSource {
    /// Open the archive at `path` and read its entry names from the central
    /// directory.
    ///
    /// # Errors
    /// Returns [`SourceError`] if the file cannot be opened, is not a readable
    /// archive, or holds an entry whose path escapes the archive (absolute, or
    /// climbing out through `..`).
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.to_owned(),
            source,
        })?;
        let archive =
            ZipArchive::new(BufReader::new(file)).map_err(|source| SourceError::Archive {
                path: path.to_owned(),
                source,
            })?;

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let name = archive.name_for_index(index).unwrap_or_default();
            if !is_enclosed(name) {
                return Err(SourceError::MalformedEntry {
                    path: path.to_owned(),
                    entry: name.to_owned(),
                });
            }
            names.push(name.to_owned());
        }
        tracing::debug!(archive = %path.display(), entries = names.len(), "opened archive");
        Ok(Self {
            path: path.to_owned(),
            archive,
            names,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, entry: &str) -> SourceError {
        SourceError::MalformedEntry {
            path: self.path.clone(),
            entry: entry.to_owned(),
        }
    }
}

/// Whether `name` stays inside the archive root once extracted.
fn is_enclosed(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\0')
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn prefix_for(namespace: &Namespace) -> String {
    let mut prefix = String::new();
    for segment in namespace.segments() {
        prefix.push_str(segment);
        prefix.push('/');
    }
    prefix
}

impl NamespaceSource for ArchiveSource {
    fn entries(&mut self, namespace: &Namespace) -> Result<Vec<NamespaceEntry>, SourceError> {
        let prefix = prefix_for(namespace);
        let mut entries = Vec::new();
        let mut seen_namespaces: HashSet<&str> = HashSet::new();

        for name in &self.names {
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                // The namespace's own directory entry.
                None if rest.is_empty() => {}
                None => entries.push(NamespaceEntry::File(rest.to_owned())),
                Some((segment, _)) if !is_valid_segment(segment) => {
                    return Err(self.malformed(name));
                }
                Some((segment, _)) => {
                    if seen_namespaces.insert(segment) {
                        entries.push(NamespaceEntry::Namespace(segment.to_owned()));
                    }
                }
            }
        }
        Ok(entries)
    }
}
