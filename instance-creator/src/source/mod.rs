//! Namespace sources.
//!
//! A source lists the immediate children of one namespace inside an artifact
//! container. The directory tree and the archive are the two concrete
//! sources; the recursion over namespaces lives once, in the walker.

pub mod archive;
pub mod fs;

use crate::error::SourceError;
use crate::name::Namespace;

/// One immediate child of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEntry {
    /// A nested namespace, given by its last segment.
    Namespace(String),
    /// A leaf file, given by its file name (suffix included).
    File(String),
}

/// Lists namespaces of one artifact container.
pub trait NamespaceSource {
    /// Immediate children of `namespace`, in the container's listing order.
    ///
    /// A namespace absent from the container has no entries.
    ///
    /// # Errors
    /// Returns [`SourceError`] if the container cannot be read or holds an
    /// entry that cannot be mapped onto a namespace.
    fn entries(&mut self, namespace: &Namespace) -> Result<Vec<NamespaceEntry>, SourceError>;
}

impl<S: NamespaceSource + ?Sized> NamespaceSource for Box<S> {
    fn entries(&mut self, namespace: &Namespace) -> Result<Vec<NamespaceEntry>, SourceError> {
        (**self).entries(namespace)
    }
}
