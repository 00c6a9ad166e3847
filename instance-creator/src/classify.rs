//! Candidate classification.
//!
//! Decides for each discovered name whether its type is unresolvable, excluded
//! by the selection policy, or accepted for instantiation. Classification is
//! pure: the same registry, name, mode and targets always give the same answer.

use std::fmt;

use crate::config::SelectionMode;
use crate::error::{ClassifyError, CreateError, InstanceCreatorError, ResolveError};
use crate::name::CandidateName;
use crate::registry::{Instance, Markers, TypeCategory, TypeEntry, TypeRef, TypeRegistry};

/// Ordered, non-empty set of target types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet(Vec<TypeRef>);

impl TargetSet {
    /// Build a target set; repeated targets keep their first position.
    ///
    /// # Errors
    /// Returns [`InstanceCreatorError::EmptyTargets`] if `targets` is empty.
    pub fn new(targets: impl IntoIterator<Item = TypeRef>) -> Result<Self, InstanceCreatorError> {
        let mut unique: Vec<TypeRef> = Vec::new();
        for target in targets {
            if !unique.contains(&target) {
                unique.push(target);
            }
        }
        if unique.is_empty() {
            return Err(InstanceCreatorError::EmptyTargets);
        }
        Ok(Self(unique))
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Why a resolved type was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Greedy mode and the type carries `IGNORING`.
    Ignored,
    /// Lazy mode and the type lacks `CREATING_INSTANCE`.
    NotOptedIn,
    /// Contracts, markers and enumerations are never instantiated.
    NotInstantiable(TypeCategory),
    /// The type is compatible with none of the targets.
    NoMatchingTarget,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => write!(f, "marked as ignoring"),
            Self::NotOptedIn => write!(f, "not marked as creating instance"),
            Self::NotInstantiable(category) => write!(f, "{category:?} types are not instantiable"),
            Self::NoMatchingTarget => write!(f, "compatible with no target type"),
        }
    }
}

/// An accepted type, handed to the creation strategy.
#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor<'r> {
    entry: &'r TypeEntry,
    target: TypeRef,
}

impl<'r> TypeDescriptor<'r> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.entry.name()
    }

    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        self.entry.type_ref()
    }

    #[must_use]
    pub fn category(&self) -> TypeCategory {
        self.entry.category()
    }

    #[must_use]
    pub fn markers(&self) -> Markers {
        self.entry.marker_set()
    }

    /// The first target, in target-set order, the type matched.
    #[must_use]
    pub fn matched_target(&self) -> TypeRef {
        self.target
    }

    #[must_use]
    pub fn entry(&self) -> &'r TypeEntry {
        self.entry
    }

    /// Run the registered parameterless factory.
    ///
    /// # Errors
    /// Returns [`CreateError::MissingFactory`] when none is registered and
    /// [`CreateError::Factory`] when it fails.
    pub fn instantiate(&self) -> Result<Instance, CreateError> {
        let factory = self
            .entry
            .factory_fn()
            .ok_or_else(|| CreateError::MissingFactory {
                name: self.name().to_owned(),
            })?;
        factory().map_err(|source| CreateError::Factory {
            name: self.name().to_owned(),
            source,
        })
    }
}

/// Outcome of classifying one candidate.
#[derive(Debug, Clone)]
pub enum Decision<'r> {
    /// The type or one of its dependencies is not available; skipped silently.
    Unresolvable(ResolveError),
    /// Resolved but rejected by the selection policy.
    Excluded(Exclusion),
    /// Resolved and compatible with a target.
    Accepted(TypeDescriptor<'r>),
}

/// Classify `name` against the registry.
///
/// # Errors
/// Returns [`ClassifyError::MalformedName`] if the name itself is malformed.
/// A name that is well-formed but unknown is [`Decision::Unresolvable`].
pub fn classify<'r>(
    registry: &'r TypeRegistry,
    name: &CandidateName,
    mode: SelectionMode,
    targets: &TargetSet,
) -> Result<Decision<'r>, ClassifyError> {
    name.validate()?;

    let entry = match registry.resolve(name.as_str()) {
        Ok(entry) => entry,
        Err(err) => return Ok(Decision::Unresolvable(err)),
    };

    if let Some(exclusion) = policy_exclusion(entry, mode) {
        return Ok(Decision::Excluded(exclusion));
    }

    Ok(targets
        .iter()
        .find(|&target| registry.is_compatible(entry, target))
        .map_or(Decision::Excluded(Exclusion::NoMatchingTarget), |target| {
            Decision::Accepted(TypeDescriptor { entry, target })
        }))
}

fn policy_exclusion(entry: &TypeEntry, mode: SelectionMode) -> Option<Exclusion> {
    match mode {
        SelectionMode::Greedy if entry.has_marker(Markers::IGNORING) => {
            return Some(Exclusion::Ignored);
        }
        SelectionMode::Lazy if !entry.has_marker(Markers::CREATING_INSTANCE) => {
            return Some(Exclusion::NotOptedIn);
        }
        SelectionMode::Greedy | SelectionMode::Lazy => {}
    }
    if entry.category().is_instantiable() {
        None
    } else {
        Some(Exclusion::NotInstantiable(entry.category()))
    }
}
