//! # instance-creator
//!
//! Discover types inside a program's artifact root and instantiate the ones
//! matching a selection policy, without wiring each of them up by hand.
//!
//! The artifact root is either a directory tree or a single zip-format archive
//! whose layout mirrors the namespaces: `app/sub/Widget.unit` stands for the
//! type `app.sub.Widget`. Each discoverable type registers a [`TypeEntry`]
//! (name, category, markers, compatible targets, factory). A scan walks a
//! namespace, looks every found name up in the [`TypeRegistry`], filters it
//! through the [`SelectionMode`] and the target types, and hands each accepted
//! type to the active [`CreationStrategy`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use instance_creator::{
//!     ArtifactRoot, BoxError, Creatable, InstanceCreator, Markers, SelectionMode, TypeCategory,
//!     TypeEntry, TypeRef, construct,
//! };
//!
//! trait Command {}
//!
//! struct Hello;
//! impl Command for Hello {}
//! impl Creatable for Hello {
//!     fn create() -> Result<Self, BoxError> {
//!         Ok(Hello)
//!     }
//! }
//!
//! instance_creator::register_type! {
//!     TypeEntry::new("app.commands.Hello", TypeRef::of::<Hello>, TypeCategory::Ordinary)
//!         .markers(Markers::CREATING_INSTANCE)
//!         .compatible_with(&[TypeRef::of::<dyn Command>])
//!         .factory(construct::<Hello>)
//! }
//!
//! let mut creator = InstanceCreator::new(SelectionMode::Lazy, [TypeRef::of::<dyn Command>()])
//!     .unwrap()
//!     .with_root(ArtifactRoot::directory("target/units"));
//! creator.create_instances_in("app.commands").unwrap();
//! ```

mod classify;
mod config;
mod creator;
mod error;
mod locator;
mod name;
mod registry;
pub mod source;
mod strategy;
pub mod walker;

pub use classify::{Decision, Exclusion, TargetSet, TypeDescriptor, classify};
pub use config::{DEFAULT_ROOT_ENV_VAR, DEFAULT_UNIT_SUFFIX, ScanConfig, SelectionMode};
pub use creator::InstanceCreator;
pub use error::{
    BoxError, ClassifyError, CreateError, InstanceCreatorError, LocateError, NameError,
    RegistryError, ResolveError, SourceError,
};
pub use locator::{ArtifactKind, ArtifactLocator, ArtifactRoot, locate_from};
pub use name::{CandidateName, Namespace};
pub use registry::{
    Creatable, Factory, Instance, Markers, TypeCategory, TypeEntry, TypeRef, TypeRegistry,
    construct,
};
pub use strategy::{CreationStrategy, DefaultCreation};

#[doc(hidden)]
pub use inventory;
