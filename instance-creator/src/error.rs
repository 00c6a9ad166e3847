//! Error types for discovery and instantiation.
//!
//! Every component reports through its own enum. [`InstanceCreatorError`] wraps
//! them so a scan surfaces a single failure that still carries the original cause.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by factories and custom strategies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A namespace or candidate name that is not made of identifier segments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed name '{name}': {cause}")]
pub struct NameError {
    /// The raw name as received.
    pub name: String,
    /// Human-readable description of the problem.
    pub cause: String,
}

/// Failures while building a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two entries claim the same qualified name.
    #[error("Type '{name}' is registered more than once")]
    DuplicateName {
        /// The qualified name registered twice.
        name: String,
    },

    /// A registration carries a name that is not a valid qualified name.
    #[error(transparent)]
    InvalidName(#[from] NameError),
}

/// Why a candidate name could not be resolved to a registered type.
///
/// Resolution failures are expected during broad scans and never abort one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    /// No entry is registered under the name.
    #[error("Type '{name}' is not registered")]
    NotRegistered {
        /// The candidate name.
        name: String,
    },

    /// The entry exists but a type it depends on is not registered.
    #[error("Type '{name}' depends on '{dependency}', which is not registered")]
    MissingDependency {
        /// The candidate name.
        name: String,
        /// The first dependency found missing.
        dependency: String,
    },
}

/// Failures while determining the artifact root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocateError {
    /// Neither the primary nor the fallback mechanism produced a usable location.
    #[error("Unable to locate the artifact root (primary: {primary}; fallback: {fallback})")]
    Unresolved {
        /// Why the primary mechanism failed.
        primary: String,
        /// Why the fallback mechanism failed.
        fallback: String,
    },

    /// The location exists but is neither a directory nor a supported archive.
    #[error("Unsupported artifact container: {}", path.display())]
    UnsupportedContainer {
        /// The offending location.
        path: PathBuf,
    },
}

/// Failures while listing a namespace in a directory tree or an archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// Reading a directory or the archive file failed.
    #[error("I/O error while reading {}", path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed (permission denied, unreadable entry, ...).
    #[error("Directory traversal error under {}", path.display())]
    Walk {
        /// The directory that was being listed.
        path: PathBuf,
        /// The underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// The archive could not be opened or one of its entries could not be read.
    #[error("Archive error in {}", path.display())]
    Archive {
        /// The archive file.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// A followed symbolic link leads back to a directory already on the path
    /// being walked.
    #[error("Symbolic link loop: {} leads back to {}", link.display(), ancestor.display())]
    SymlinkLoop {
        /// The symbolic link.
        link: PathBuf,
        /// The enclosing directory it resolves to.
        ancestor: PathBuf,
    },

    /// An archive entry or a directory child has a name that cannot be mapped
    /// onto a namespace.
    #[error("Malformed entry '{entry}' in {}", path.display())]
    MalformedEntry {
        /// The artifact root containing the entry.
        path: PathBuf,
        /// The raw entry name.
        entry: String,
    },
}

/// Failures while classifying a candidate name.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassifyError {
    /// The candidate name itself is malformed (as opposed to merely unresolvable).
    #[error(transparent)]
    MalformedName(#[from] NameError),
}

/// Failures while creating an instance of an accepted type.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CreateError {
    /// The accepted type registers no parameterless factory.
    #[error("Type '{name}' has no parameterless factory")]
    MissingFactory {
        /// Qualified name of the type.
        name: String,
    },

    /// The factory ran and failed.
    #[error("Factory for type '{name}' failed")]
    Factory {
        /// Qualified name of the type.
        name: String,
        /// The error reported by the factory.
        #[source]
        source: BoxError,
    },

    /// A custom strategy rejected the type.
    #[error("Creation strategy failed for type '{name}'")]
    Strategy {
        /// Qualified name of the type.
        name: String,
        /// The error reported by the strategy.
        #[source]
        source: BoxError,
    },
}

/// Top-level failure of an [`InstanceCreator`](crate::InstanceCreator) operation.
///
/// A scan aborts on the first failure; instances created before it are kept.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstanceCreatorError {
    /// The target list was empty.
    #[error("At least one target type is required")]
    EmptyTargets,

    /// The requested namespace is malformed.
    #[error(transparent)]
    Namespace(NameError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Create(#[from] CreateError),
}
