//! Namespaces and candidate names.
//!
//! Both are dotted paths of identifier segments. Caller input may use `/` as
//! the separator; it is normalized to `.`. The empty string is the root namespace.

use std::fmt;

use serde::Serialize;

use crate::error::NameError;

/// Separator used in rendered names.
pub const SEPARATOR: char = '.';

/// Validates a single name segment without regex.
///
/// Valid segments start with `[A-Za-z_]`, followed by `[A-Za-z0-9_]*`.
#[inline]
#[must_use]
pub fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_segments(raw: &str, normalized: &str) -> Result<(), NameError> {
    for (i, segment) in normalized.split(SEPARATOR).enumerate() {
        if segment.is_empty() {
            return Err(NameError {
                name: raw.to_owned(),
                cause: format!("segment #{} is empty", i + 1),
            });
        }
        if !is_valid_segment(segment) {
            return Err(NameError {
                name: raw.to_owned(),
                cause: format!(
                    "segment '{segment}' must start with [A-Za-z_] and contain only [A-Za-z0-9_]"
                ),
            });
        }
    }
    Ok(())
}

/// A validated namespace such as `app.sub`; empty for the root namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// The root namespace.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse a namespace given with `.` or `/` separators.
    ///
    /// A trailing separator is tolerated (`app/sub/` is `app.sub`).
    ///
    /// # Errors
    /// Returns [`NameError`] if any segment is empty or not an identifier.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let normalized = raw.replace('/', ".");
        let normalized = normalized.strip_suffix(SEPARATOR).unwrap_or(&normalized);
        if normalized.is_empty() {
            return Ok(Self::root());
        }
        check_segments(raw, normalized)?;
        Ok(Self(normalized.to_owned()))
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments from the outermost namespace inwards; empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// The namespace nested directly under this one.
    ///
    /// The segment is not validated here; namespace sources only list segments
    /// that are identifiers.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self(self.qualify(segment))
    }

    fn qualify(&self, simple: &str) -> String {
        if self.is_root() {
            simple.to_owned()
        } else {
            format!("{}{SEPARATOR}{simple}", self.0)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// A fully qualified type name discovered in an artifact, e.g. `app.sub.Widget`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CandidateName(String);

impl CandidateName {
    /// Build the name of a unit found directly in `namespace`.
    #[must_use]
    pub fn new(namespace: &Namespace, simple: &str) -> Self {
        Self(namespace.qualify(simple))
    }

    /// Parse an already qualified name.
    ///
    /// # Errors
    /// Returns [`NameError`] if the name is empty or any segment is not an identifier.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = Self(raw.replace('/', "."));
        name.validate()?;
        Ok(name)
    }

    /// Check that every segment is an identifier.
    ///
    /// # Errors
    /// Returns [`NameError`] describing the first offending segment.
    pub fn validate(&self) -> Result<(), NameError> {
        check_segments(&self.0, &self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// The namespace the name lives in.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        match self.0.rsplit_once(SEPARATOR) {
            Some((ns, _)) => Namespace(ns.to_owned()),
            None => Namespace::root(),
        }
    }
}

impl fmt::Display for CandidateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_namespace() {
        assert!(Namespace::parse("").unwrap().is_root());
        assert!(Namespace::parse("/").unwrap().is_root());
        assert_eq!(Namespace::root().segments().count(), 0);
    }

    #[test]
    fn test_parse_normalizes_separators() {
        let ns = Namespace::parse("app/sub/").unwrap();
        assert_eq!(ns.as_str(), "app.sub");
        assert_eq!(ns.segments().collect::<Vec<_>>(), vec!["app", "sub"]);
    }

    #[test]
    fn test_parse_rejects_bad_segments() {
        let err = Namespace::parse("app..sub").unwrap_err();
        assert!(err.cause.contains("segment #2 is empty"), "got: {err}");

        let err = Namespace::parse("app.1st").unwrap_err();
        assert!(err.cause.contains("'1st'"), "got: {err}");

        assert!(Namespace::parse("app.my-mod").is_err());
    }

    #[test]
    fn test_candidate_name_from_namespace() {
        let root = Namespace::root();
        assert_eq!(CandidateName::new(&root, "Main").as_str(), "Main");

        let ns = Namespace::parse("app.sub").unwrap();
        let name = CandidateName::new(&ns, "Widget");
        assert_eq!(name.as_str(), "app.sub.Widget");
        assert_eq!(name.simple_name(), "Widget");
        assert_eq!(name.namespace(), ns);
    }

    #[test]
    fn test_candidate_name_validation() {
        let ns = Namespace::parse("app").unwrap();
        assert!(CandidateName::new(&ns, "Widget").validate().is_ok());
        assert!(CandidateName::new(&ns, "package-info").validate().is_err());
        assert!(CandidateName::parse("").is_err());
        assert_eq!(
            CandidateName::parse("app/Widget").unwrap().as_str(),
            "app.Widget"
        );
    }

    #[test]
    fn test_namespace_display() {
        assert_eq!(Namespace::root().to_string(), "<root>");
        assert_eq!(Namespace::parse("app").unwrap().to_string(), "app");
    }
}
