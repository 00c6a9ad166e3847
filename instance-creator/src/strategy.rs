//! Creation strategies.
//!
//! A strategy receives every accepted type exactly once per scan. The default
//! one constructs an instance and drops it, which is enough for types whose
//! constructor registers itself somewhere. Any
//! `FnMut(&TypeDescriptor) -> Result<(), CreateError>` closure is a strategy.

use crate::classify::TypeDescriptor;
use crate::error::CreateError;

/// Acts on an accepted type.
pub trait CreationStrategy {
    /// Handle one accepted type.
    ///
    /// # Errors
    /// Any error aborts the current scan.
    fn create(&mut self, descriptor: &TypeDescriptor<'_>) -> Result<(), CreateError>;
}

impl<F> CreationStrategy for F
where
    F: FnMut(&TypeDescriptor<'_>) -> Result<(), CreateError>,
{
    fn create(&mut self, descriptor: &TypeDescriptor<'_>) -> Result<(), CreateError> {
        self(descriptor)
    }
}

/// Runs the registered parameterless factory and discards the instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCreation;

impl CreationStrategy for DefaultCreation {
    fn create(&mut self, descriptor: &TypeDescriptor<'_>) -> Result<(), CreateError> {
        let instance = descriptor.instantiate()?;
        tracing::debug!(type_name = descriptor.name(), "created instance");
        drop(instance);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::classify::{Decision, TargetSet, classify};
    use crate::config::SelectionMode;
    use crate::error::BoxError;
    use crate::name::CandidateName;
    use crate::registry::{Creatable, TypeCategory, TypeEntry, TypeRef, TypeRegistry, construct};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;
    struct Failing;

    impl Creatable for Counted {
        fn create() -> Result<Self, BoxError> {
            CREATED.fetch_add(1, Ordering::SeqCst);
            Ok(Counted)
        }
    }

    impl Creatable for Failing {
        fn create() -> Result<Self, BoxError> {
            Err("constructor failed".into())
        }
    }

    fn accepted<'r>(registry: &'r TypeRegistry, name: &str) -> TypeDescriptor<'r> {
        let targets = TargetSet::new([TypeRef::of::<Counted>(), TypeRef::of::<Failing>()]).unwrap();
        let name = CandidateName::parse(name).unwrap();
        match classify(registry, &name, SelectionMode::Greedy, &targets).unwrap() {
            Decision::Accepted(descriptor) => descriptor,
            other => panic!("expected {name} to be accepted, got {other:?}"),
        }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeEntry::new("app.Counted", TypeRef::of::<Counted>, TypeCategory::Ordinary)
                    .factory(construct::<Counted>),
            )
            .unwrap();
        registry
            .register(
                TypeEntry::new("app.Failing", TypeRef::of::<Failing>, TypeCategory::Ordinary)
                    .factory(construct::<Failing>),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_default_creation_runs_factory() {
        let registry = registry();
        let before = CREATED.load(Ordering::SeqCst);
        DefaultCreation
            .create(&accepted(&registry, "app.Counted"))
            .unwrap();
        assert_eq!(CREATED.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_default_creation_wraps_factory_failure() {
        let registry = registry();
        let err = DefaultCreation
            .create(&accepted(&registry, "app.Failing"))
            .unwrap_err();
        assert!(matches!(err, CreateError::Factory { ref name, .. } if name == "app.Failing"));
    }

    #[test]
    fn test_closure_is_a_strategy() {
        let registry = registry();
        let mut seen = Vec::new();
        let mut strategy = |d: &TypeDescriptor<'_>| -> Result<(), CreateError> {
            seen.push(d.name());
            Ok(())
        };
        strategy.create(&accepted(&registry, "app.Failing")).unwrap();
        assert_eq!(seen, vec!["app.Failing"]);
    }
}
