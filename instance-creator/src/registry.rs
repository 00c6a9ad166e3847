//! Type registry.
//!
//! Each discoverable type contributes one [`TypeEntry`]: its qualified name,
//! identity, category, markers, the types and traits it is assignable to, the
//! registered types it depends on, and a parameterless factory. Entries are
//! either registered explicitly or submitted next to the type definition with
//! [`register_type!`](crate::register_type) and collected at link time via
//! `inventory`.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

use bitflags::bitflags;

use crate::error::{BoxError, RegistryError, ResolveError};
use crate::name::CandidateName;

/// A constructed instance, type-erased.
pub type Instance = Box<dyn Any>;

/// Parameterless factory registered for a concrete type.
pub type Factory = fn() -> Result<Instance, BoxError>;

/// Identity of a type or trait object, usable as a target.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// Reference to `T`; use `dyn Trait` to reference a contract.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The compiler-provided type name (diagnostics only).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural category of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// A concrete, constructible type.
    Ordinary,
    /// A contract only (a trait); never instantiated.
    Contract,
    /// A tag carrying no behaviour; never instantiated.
    Marker,
    /// A fixed set of constants; never instantiated.
    Enumerated,
}

impl TypeCategory {
    /// Whether types of this category may be instantiated at all.
    #[must_use]
    pub fn is_instantiable(self) -> bool {
        matches!(self, Self::Ordinary)
    }
}

bitflags! {
    /// Selection markers attached to a registration.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Markers: u8 {
        /// Opt in: instantiated in [`Lazy`](crate::SelectionMode::Lazy) mode.
        const CREATING_INSTANCE = 1;
        /// Opt out: skipped in [`Greedy`](crate::SelectionMode::Greedy) mode.
        const IGNORING = 1 << 1;
    }
}

/// Explicit parameterless constructor for a discoverable type.
pub trait Creatable: Any + Sized {
    /// Build a new instance.
    ///
    /// # Errors
    /// Returns whatever prevented construction.
    fn create() -> Result<Self, BoxError>;
}

/// Adapt [`Creatable::create`] into a registry [`Factory`].
///
/// # Errors
/// Propagates the error returned by [`Creatable::create`].
pub fn construct<T: Creatable>() -> Result<Instance, BoxError> {
    T::create().map(|value| Box::new(value) as Instance)
}

/// Registration record of a single discoverable type.
///
/// All builder methods are `const` so an entry can be submitted from a static
/// context:
///
/// ```rust
/// use instance_creator::{construct, Creatable, BoxError, Markers, TypeCategory, TypeEntry, TypeRef};
///
/// trait Plugin {}
/// struct Greeter;
/// impl Plugin for Greeter {}
/// impl Creatable for Greeter {
///     fn create() -> Result<Self, BoxError> {
///         Ok(Greeter)
///     }
/// }
///
/// instance_creator::register_type! {
///     TypeEntry::new("demo.Greeter", TypeRef::of::<Greeter>, TypeCategory::Ordinary)
///         .markers(Markers::CREATING_INSTANCE)
///         .compatible_with(&[TypeRef::of::<dyn Plugin>])
///         .factory(construct::<Greeter>)
/// }
/// ```
#[derive(Clone, Copy)]
pub struct TypeEntry {
    name: &'static str,
    type_ref: fn() -> TypeRef,
    category: TypeCategory,
    markers: Markers,
    compatible_with: &'static [fn() -> TypeRef],
    depends_on: &'static [&'static str],
    factory: Option<Factory>,
}

inventory::collect!(TypeEntry);

impl TypeEntry {
    #[must_use]
    pub const fn new(name: &'static str, type_ref: fn() -> TypeRef, category: TypeCategory) -> Self {
        Self {
            name,
            type_ref,
            category,
            markers: Markers::empty(),
            compatible_with: &[],
            depends_on: &[],
            factory: None,
        }
    }

    #[must_use]
    pub const fn markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Types and traits this type is assignable to, besides itself.
    #[must_use]
    pub const fn compatible_with(mut self, targets: &'static [fn() -> TypeRef]) -> Self {
        self.compatible_with = targets;
        self
    }

    /// Qualified names of registered types this type needs to be resolvable.
    #[must_use]
    pub const fn depends_on(mut self, names: &'static [&'static str]) -> Self {
        self.depends_on = names;
        self
    }

    #[must_use]
    pub const fn factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        (self.type_ref)()
    }

    #[must_use]
    pub fn category(&self) -> TypeCategory {
        self.category
    }

    #[must_use]
    pub fn marker_set(&self) -> Markers {
        self.markers
    }

    #[must_use]
    pub fn has_marker(&self, marker: Markers) -> bool {
        self.markers.contains(marker)
    }

    #[must_use]
    pub fn factory_fn(&self) -> Option<Factory> {
        self.factory
    }

    fn declared(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.compatible_with.iter().map(|f| f())
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("name", &self.name)
            .field("type_ref", &self.type_ref())
            .field("category", &self.category)
            .field("markers", &self.markers)
            .field("compatible_with", &self.declared().collect::<Vec<_>>())
            .field("depends_on", &self.depends_on)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// Submit a [`TypeEntry`] for link-time collection by [`TypeRegistry::from_inventory`].
#[macro_export]
macro_rules! register_type {
    ($entry:expr $(,)?) => {
        #[allow(unsafe_code)]
        const _: () = {
            $crate::inventory::submit! { $entry }
        };
    };
}

/// Lookup table from qualified names and type identities to registrations.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    by_name: HashMap<&'static str, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every entry submitted with `register_type!` in
    /// the final binary.
    ///
    /// # Errors
    /// Returns [`RegistryError`] on an invalid or duplicated name.
    pub fn from_inventory() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for entry in inventory::iter::<TypeEntry> {
            registry.register(*entry)?;
        }
        Ok(registry)
    }

    /// Add one entry.
    ///
    /// # Errors
    /// Returns [`RegistryError`] if the name is malformed or already registered.
    pub fn register(&mut self, entry: TypeEntry) -> Result<(), RegistryError> {
        CandidateName::parse(entry.name)?;
        if self.by_name.contains_key(entry.name) {
            return Err(RegistryError::DuplicateName {
                name: entry.name.to_owned(),
            });
        }
        let index = self.entries.len();
        self.by_name.insert(entry.name, index);
        self.by_type.entry(entry.type_ref().id()).or_insert(index);
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.entries.iter()
    }

    /// Look up `name` and check that every dependency it declares is
    /// registered, transitively.
    ///
    /// # Errors
    /// Returns [`ResolveError`] on a registry miss or a missing dependency.
    pub fn resolve(&self, name: &str) -> Result<&TypeEntry, ResolveError> {
        let entry = self.get(name).ok_or_else(|| ResolveError::NotRegistered {
            name: name.to_owned(),
        })?;

        let mut visited: HashSet<&str> = HashSet::from([entry.name]);
        let mut pending: Vec<&str> = entry.depends_on.to_vec();
        while let Some(dependency) = pending.pop() {
            if !visited.insert(dependency) {
                continue;
            }
            let Some(dep_entry) = self.get(dependency) else {
                return Err(ResolveError::MissingDependency {
                    name: name.to_owned(),
                    dependency: dependency.to_owned(),
                });
            };
            pending.extend_from_slice(dep_entry.depends_on);
        }
        Ok(entry)
    }

    /// Whether `entry` is `target`, declares `target`, or declares a registered
    /// type that is itself compatible with `target`.
    #[must_use]
    pub fn is_compatible(&self, entry: &TypeEntry, target: TypeRef) -> bool {
        let mut visited: HashSet<TypeId> = HashSet::new();
        let mut pending = vec![entry.type_ref()];
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current.id()) {
                continue;
            }
            let registered = if current == entry.type_ref() {
                Some(entry)
            } else {
                self.by_type.get(&current.id()).map(|&i| &self.entries[i])
            };
            if let Some(registered) = registered {
                pending.extend(registered.declared());
            }
        }
        false
    }
}
