#![allow(clippy::unwrap_used)]
//! Link-time registration through `register_type!`.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use instance_creator::{
    ArtifactRoot, BoxError, Creatable, InstanceCreator, InstanceCreatorError, Markers,
    SelectionMode, TypeCategory, TypeEntry, TypeRef, construct,
};
use tempfile::TempDir;

trait Handler {}

static GREETERS: AtomicUsize = AtomicUsize::new(0);

struct Greeter;
struct Farewell;

impl Handler for Greeter {}
impl Handler for Farewell {}

impl Creatable for Greeter {
    fn create() -> Result<Self, BoxError> {
        GREETERS.fetch_add(1, Ordering::SeqCst);
        Ok(Greeter)
    }
}

impl Creatable for Farewell {
    fn create() -> Result<Self, BoxError> {
        Ok(Farewell)
    }
}

instance_creator::register_type! {
    TypeEntry::new("handlers.Greeter", TypeRef::of::<Greeter>, TypeCategory::Ordinary)
        .markers(Markers::CREATING_INSTANCE)
        .compatible_with(&[TypeRef::of::<dyn Handler>])
        .factory(construct::<Greeter>)
}

instance_creator::register_type! {
    TypeEntry::new("handlers.Farewell", TypeRef::of::<Farewell>, TypeCategory::Ordinary)
        .compatible_with(&[TypeRef::of::<dyn Handler>])
        .factory(construct::<Farewell>)
}

#[test]
fn test_registered_types_are_collected() {
    let creator = InstanceCreator::new(SelectionMode::Lazy, [TypeRef::of::<dyn Handler>()]).unwrap();
    let registry = creator.registry();

    assert_eq!(registry.len(), 2);
    let greeter = registry.get("handlers.Greeter").unwrap();
    assert!(greeter.has_marker(Markers::CREATING_INSTANCE));
    assert!(registry.is_compatible(greeter, TypeRef::of::<dyn Handler>()));
}

#[test]
fn test_default_strategy_constructs_registered_types() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("handlers")).unwrap();
    fs::write(tmp.path().join("handlers/Greeter.unit"), b"").unwrap();
    fs::write(tmp.path().join("handlers/Farewell.unit"), b"").unwrap();

    let mut creator = InstanceCreator::new(SelectionMode::Lazy, [TypeRef::of::<dyn Handler>()])
        .unwrap()
        .with_root(ArtifactRoot::directory(tmp.path()));
    let before = GREETERS.load(Ordering::SeqCst);

    creator.create_instances().unwrap();

    assert_eq!(GREETERS.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_empty_targets_are_rejected() {
    let err = InstanceCreator::new(SelectionMode::Greedy, Vec::<TypeRef>::new()).unwrap_err();
    assert!(matches!(err, InstanceCreatorError::EmptyTargets));
}
