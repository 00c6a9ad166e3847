//! Lazy namespace traversal.
//!
//! [`NamespaceWalk`] turns a [`NamespaceSource`] into a depth-first sequence
//! of candidate names. Entries are handled in the source's listing order and a
//! nested namespace is walked as soon as it is met.

use std::collections::HashSet;

use crate::error::SourceError;
use crate::locator::{ArtifactKind, ArtifactRoot};
use crate::name::{CandidateName, Namespace};
use crate::source::archive::ArchiveSource;
use crate::source::fs::DirectorySource;
use crate::source::{NamespaceEntry, NamespaceSource};

/// What the walker does with one listed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Descend(Namespace),
    Yield(CandidateName),
    Skip,
}

fn step_for(entry: NamespaceEntry, namespace: &Namespace, include_sub: bool, suffix: &str) -> Step {
    match entry {
        NamespaceEntry::Namespace(segment) if include_sub => Step::Descend(namespace.child(&segment)),
        NamespaceEntry::Namespace(_) => Step::Skip,
        NamespaceEntry::File(file_name) => match file_name.strip_suffix(suffix) {
            Some(stem) if !stem.is_empty() => Step::Yield(CandidateName::new(namespace, stem)),
            _ => Step::Skip,
        },
    }
}

struct Frame {
    namespace: Namespace,
    entries: std::vec::IntoIter<NamespaceEntry>,
    include_sub: bool,
}

/// Depth-first walk over the namespaces of one source.
///
/// Yields each candidate name at most once. After the first error the walk
/// ends; it cannot be restarted. Dropping the walk releases the source.
pub struct NamespaceWalk<S> {
    source: S,
    unit_suffix: String,
    pending: Option<(Namespace, bool)>,
    stack: Vec<Frame>,
    seen: HashSet<CandidateName>,
    finished: bool,
}

impl<S: NamespaceSource> NamespaceWalk<S> {
    /// Walk `namespace` of `source`, descending into nested namespaces only when
    /// `include_sub` is set. Below the first level nested namespaces are always
    /// walked.
    #[must_use]
    pub fn new(source: S, namespace: Namespace, include_sub: bool, unit_suffix: &str) -> Self {
        Self {
            source,
            unit_suffix: unit_suffix.to_owned(),
            pending: Some((namespace, include_sub)),
            stack: Vec::new(),
            seen: HashSet::new(),
            finished: false,
        }
    }

    fn fail(&mut self, err: SourceError) -> Option<Result<CandidateName, SourceError>> {
        self.finished = true;
        self.stack.clear();
        Some(Err(err))
    }
}

impl<S: NamespaceSource> Iterator for NamespaceWalk<S> {
    type Item = Result<CandidateName, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if let Some((namespace, include_sub)) = self.pending.take() {
                match self.source.entries(&namespace) {
                    Ok(entries) => self.stack.push(Frame {
                        namespace,
                        entries: entries.into_iter(),
                        include_sub,
                    }),
                    Err(err) => return self.fail(err),
                }
            }

            let Some(frame) = self.stack.last_mut() else {
                self.finished = true;
                return None;
            };
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            match step_for(entry, &frame.namespace, frame.include_sub, &self.unit_suffix) {
                Step::Descend(child) => self.pending = Some((child, true)),
                Step::Yield(name) => {
                    if self.seen.insert(name.clone()) {
                        return Some(Ok(name));
                    }
                }
                Step::Skip => {}
            }
        }
    }
}

impl<S: NamespaceSource> std::iter::FusedIterator for NamespaceWalk<S> {}

/// Walk `namespace` of the artifact at `root`, opening the container for the
/// duration of the walk.
///
/// # Errors
/// Returns [`SourceError`] if an archive root cannot be opened.
pub fn walk(
    root: &ArtifactRoot,
    namespace: Namespace,
    include_sub: bool,
    unit_suffix: &str,
    follow_links: bool,
) -> Result<NamespaceWalk<Box<dyn NamespaceSource>>, SourceError> {
    let source: Box<dyn NamespaceSource> = match root.kind() {
        ArtifactKind::Directory => Box::new(DirectorySource::new(root.path(), follow_links)),
        ArtifactKind::Archive => Box::new(ArchiveSource::open(root.path())?),
    };
    Ok(NamespaceWalk::new(source, namespace, include_sub, unit_suffix))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// In-memory source: namespace -> listed entries.
    #[derive(Default)]
    struct MapSource {
        listings: HashMap<String, Vec<NamespaceEntry>>,
        fail_on: Option<String>,
        calls: usize,
    }

    impl MapSource {
        fn with(mut self, namespace: &str, entries: &[&str]) -> Self {
            let entries = entries
                .iter()
                .map(|e| match e.strip_suffix('/') {
                    Some(dir) => NamespaceEntry::Namespace(dir.to_owned()),
                    None => NamespaceEntry::File((*e).to_owned()),
                })
                .collect();
            self.listings.insert(namespace.to_owned(), entries);
            self
        }
    }

    impl NamespaceSource for MapSource {
        fn entries(&mut self, namespace: &Namespace) -> Result<Vec<NamespaceEntry>, SourceError> {
            self.calls += 1;
            if self.fail_on.as_deref() == Some(namespace.as_str()) {
                return Err(SourceError::MalformedEntry {
                    path: PathBuf::from("mem"),
                    entry: namespace.as_str().to_owned(),
                });
            }
            Ok(self
                .listings
                .get(namespace.as_str())
                .cloned()
                .unwrap_or_default())
        }
    }

    fn tree() -> MapSource {
        MapSource::default()
            .with("", &["app/", "Main.unit"])
            .with("app", &["A.unit", "sub/", "B.unit", "readme.txt", ".unit"])
            .with("app.sub", &["C.unit", "deep/"])
            .with("app.sub.deep", &["D.unit"])
    }

    fn collect(walk: NamespaceWalk<MapSource>) -> Vec<String> {
        walk.map(|r| r.unwrap().to_string()).collect()
    }

    #[test]
    fn test_walk_includes_subnamespaces_depth_first() {
        let walk = NamespaceWalk::new(tree(), Namespace::parse("app").unwrap(), true, ".unit");
        assert_eq!(
            collect(walk),
            vec!["app.A", "app.sub.C", "app.sub.deep.D", "app.B"]
        );
    }

    #[test]
    fn test_walk_without_subnamespaces_stays_at_first_level() {
        let walk = NamespaceWalk::new(tree(), Namespace::parse("app").unwrap(), false, ".unit");
        assert_eq!(collect(walk), vec!["app.A", "app.B"]);
    }

    #[test]
    fn test_walk_from_root() {
        let walk = NamespaceWalk::new(tree(), Namespace::root(), true, ".unit");
        assert_eq!(
            collect(walk),
            vec!["app.A", "app.sub.C", "app.sub.deep.D", "app.B", "Main"]
        );
    }

    #[test]
    fn test_walk_is_lazy() {
        let mut walk = NamespaceWalk::new(tree(), Namespace::parse("app").unwrap(), true, ".unit");
        assert_eq!(walk.next().unwrap().unwrap().as_str(), "app.A");
        assert_eq!(walk.source.calls, 1);
    }

    #[test]
    fn test_walk_stops_after_error() {
        let mut source = tree();
        source.fail_on = Some("app.sub".to_owned());
        let mut walk = NamespaceWalk::new(source, Namespace::parse("app").unwrap(), true, ".unit");

        assert_eq!(walk.next().unwrap().unwrap().as_str(), "app.A");
        assert!(walk.next().unwrap().is_err());
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_walk_yields_duplicates_once() {
        let source = MapSource::default().with("app", &["A.unit", "A.unit"]);
        let walk = NamespaceWalk::new(source, Namespace::parse("app").unwrap(), true, ".unit");
        assert_eq!(collect(walk), vec!["app.A"]);
    }

    #[test]
    fn test_step_for_entries() {
        let ns = Namespace::parse("app").unwrap();
        assert_eq!(
            step_for(NamespaceEntry::Namespace("sub".to_owned()), &ns, true, ".unit"),
            Step::Descend(Namespace::parse("app.sub").unwrap())
        );
        assert_eq!(
            step_for(NamespaceEntry::Namespace("sub".to_owned()), &ns, false, ".unit"),
            Step::Skip
        );
        assert_eq!(
            step_for(NamespaceEntry::File("X.class".to_owned()), &ns, true, ".unit"),
            Step::Skip
        );
    }
}
