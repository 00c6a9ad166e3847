//! Artifact root location.
//!
//! The primary mechanism reads the root path from an environment variable; the
//! fallback is the directory holding the running executable. The result is
//! memoized by the locator, which is owned by the creator rather than kept in
//! process-wide state.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::ScanConfig;
use crate::error::LocateError;

/// Container format of the artifact root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Directory,
    Archive,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::Archive => write!(f, "archive"),
        }
    }
}

/// The program's compiled output: a directory tree or a single archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRoot {
    kind: ArtifactKind,
    path: PathBuf,
}

impl ArtifactRoot {
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ArtifactKind::Directory,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: ArtifactKind::Archive,
            path: path.into(),
        }
    }

    /// Inspect `path` and decide its container kind.
    ///
    /// A regular file with one of the configured archive extensions is an
    /// archive; a directory is a directory.
    ///
    /// # Errors
    /// Returns [`LocateError::UnsupportedContainer`] for anything else.
    pub fn detect(path: &Path, config: &ScanConfig) -> Result<Self, LocateError> {
        if path.is_dir() {
            return Ok(Self::directory(path));
        }
        let is_archive = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| config.is_archive_extension(e));
        if is_archive {
            Ok(Self::archive(path))
        } else {
            Err(LocateError::UnsupportedContainer {
                path: path.to_owned(),
            })
        }
    }

    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ArtifactRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.kind)
    }
}

/// Resolves and memoizes the artifact root.
#[derive(Debug)]
pub struct ArtifactLocator {
    config: ScanConfig,
    resolved: OnceLock<ArtifactRoot>,
}

impl ArtifactLocator {
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            resolved: OnceLock::new(),
        }
    }

    /// A locator that always answers `root`.
    #[must_use]
    pub fn preset(root: ArtifactRoot, config: ScanConfig) -> Self {
        Self {
            config,
            resolved: OnceLock::from(root),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The artifact root, resolved on first use.
    ///
    /// Failures are not cached: a later call tries again.
    ///
    /// # Errors
    /// Returns [`LocateError`] if neither mechanism yields a usable root.
    pub fn resolve_root(&self) -> Result<&ArtifactRoot, LocateError> {
        if let Some(root) = self.resolved.get() {
            return Ok(root);
        }
        let primary = std::env::var_os(&self.config.root_env_var)
            .map(PathBuf::from)
            .ok_or_else(|| format!("environment variable {} is not set", self.config.root_env_var));
        let fallback = std::env::current_exe()
            .map_err(|e| format!("current executable path unavailable: {e}"))
            .and_then(|exe| {
                exe.parent()
                    .map(Path::to_path_buf)
                    .ok_or_else(|| format!("executable {} has no parent directory", exe.display()))
            });

        let root = locate_from(primary, fallback, &self.config)?;
        tracing::info!(root = %root, "resolved artifact root");
        Ok(self.resolved.get_or_init(|| root))
    }
}

/// Pick the artifact root from the primary candidate, falling back to the
/// secondary one when the primary is missing or unusable.
///
/// # Errors
/// Returns [`LocateError::Unresolved`] carrying both causes when neither
/// candidate is a directory or a recognised archive.
pub fn locate_from(
    primary: Result<PathBuf, String>,
    fallback: Result<PathBuf, String>,
    config: &ScanConfig,
) -> Result<ArtifactRoot, LocateError> {
    let primary_cause = match primary {
        Ok(path) => match ArtifactRoot::detect(&path, config) {
            Ok(root) => return Ok(root),
            Err(e) => e.to_string(),
        },
        Err(cause) => cause,
    };
    tracing::debug!(cause = %primary_cause, "primary artifact root unavailable, trying fallback");

    let fallback_cause = match fallback {
        Ok(path) => match ArtifactRoot::detect(&path, config) {
            Ok(root) => return Ok(root),
            Err(e) => e.to_string(),
        },
        Err(cause) => cause,
    };

    Err(LocateError::Unresolved {
        primary: primary_cause,
        fallback: fallback_cause,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_directory_and_archive() {
        let tmp = TempDir::new().unwrap();
        let cfg = ScanConfig::default();

        let dir = ArtifactRoot::detect(tmp.path(), &cfg).unwrap();
        assert_eq!(dir.kind(), ArtifactKind::Directory);

        let jar = tmp.path().join("app.JAR");
        fs::write(&jar, b"").unwrap();
        assert_eq!(
            ArtifactRoot::detect(&jar, &cfg).unwrap().kind(),
            ArtifactKind::Archive
        );

        let txt = tmp.path().join("notes.txt");
        fs::write(&txt, b"").unwrap();
        assert!(matches!(
            ArtifactRoot::detect(&txt, &cfg),
            Err(LocateError::UnsupportedContainer { .. })
        ));
    }

    #[test]
    fn test_locate_prefers_primary() {
        let primary = TempDir::new().unwrap();
        let fallback = TempDir::new().unwrap();
        let root = locate_from(
            Ok(primary.path().to_path_buf()),
            Ok(fallback.path().to_path_buf()),
            &ScanConfig::default(),
        )
        .unwrap();
        assert_eq!(root.path(), primary.path());
    }

    #[test]
    fn test_locate_falls_back_when_primary_unusable() {
        let fallback = TempDir::new().unwrap();
        let missing = fallback.path().join("missing");

        let root = locate_from(
            Ok(missing),
            Ok(fallback.path().to_path_buf()),
            &ScanConfig::default(),
        )
        .unwrap();
        assert_eq!(root, ArtifactRoot::directory(fallback.path()));

        let root = locate_from(
            Err("unset".to_owned()),
            Ok(fallback.path().to_path_buf()),
            &ScanConfig::default(),
        )
        .unwrap();
        assert_eq!(root.kind(), ArtifactKind::Directory);
    }

    #[test]
    fn test_locate_fails_when_both_fail() {
        let err = locate_from(
            Err("unset".to_owned()),
            Err("no exe".to_owned()),
            &ScanConfig::default(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("primary: unset"), "got: {msg}");
        assert!(msg.contains("fallback: no exe"), "got: {msg}");
    }

    #[test]
    fn test_preset_locator_is_memoized() {
        let tmp = TempDir::new().unwrap();
        let locator = ArtifactLocator::preset(
            ArtifactRoot::directory(tmp.path()),
            ScanConfig::default(),
        );
        let first = locator.resolve_root().unwrap();
        let second = locator.resolve_root().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.path(), tmp.path());
    }
}
