//! Configuration types for discovery.
//!
//! Split into the selection policy (what gets instantiated) and the scan
//! options (how the artifact root is found and read).

/// Environment variable consulted first when locating the artifact root.
pub const DEFAULT_ROOT_ENV_VAR: &str = "INSTANCE_CREATOR_ROOT";

/// File suffix marking a compiled unit inside the artifact.
pub const DEFAULT_UNIT_SUFFIX: &str = ".unit";

/// How accepted types are selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Every suitable type is instantiated unless it carries the `IGNORING` marker.
    #[default]
    Greedy,
    /// Only suitable types carrying the `CREATING_INSTANCE` marker are instantiated.
    Lazy,
}

/// Artifact location and traversal options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ScanConfig {
    /// Suffix of leaf files that denote a type (default: `.unit`).
    /// Files without it are ignored.
    pub unit_suffix: String,
    /// File extensions recognised as packaged archives (default: `zip`, `jar`).
    pub archive_extensions: Vec<String>,
    /// Environment variable holding the artifact root path
    /// (default: `INSTANCE_CREATOR_ROOT`).
    pub root_env_var: String,
    /// Whether directory traversal follows symbolic links.
    ///
    /// **Defaults to `false`** so a scan cannot leave the artifact root.
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            unit_suffix: DEFAULT_UNIT_SUFFIX.to_owned(),
            archive_extensions: vec!["zip".to_owned(), "jar".to_owned()],
            root_env_var: DEFAULT_ROOT_ENV_VAR.to_owned(),
            follow_links: false,
        }
    }
}

impl ScanConfig {
    /// Whether `extension` names an archive container (case-insensitive).
    #[must_use]
    pub fn is_archive_extension(&self, extension: &str) -> bool {
        self.archive_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.unit_suffix, ".unit");
        assert_eq!(cfg.root_env_var, "INSTANCE_CREATOR_ROOT");
        assert!(!cfg.follow_links);
        assert_eq!(SelectionMode::default(), SelectionMode::Greedy);
    }

    #[test]
    fn test_archive_extension_is_case_insensitive() {
        let cfg = ScanConfig::default();
        assert!(cfg.is_archive_extension("zip"));
        assert!(cfg.is_archive_extension("JAR"));
        assert!(!cfg.is_archive_extension("tar"));
    }
}
