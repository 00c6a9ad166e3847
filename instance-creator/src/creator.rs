//! The [`InstanceCreator`] facade.

use crate::classify::{Decision, TargetSet, classify};
use crate::config::{ScanConfig, SelectionMode};
use crate::error::InstanceCreatorError;
use crate::locator::{ArtifactLocator, ArtifactRoot};
use crate::name::Namespace;
use crate::registry::{TypeRef, TypeRegistry};
use crate::strategy::{CreationStrategy, DefaultCreation};
use crate::walker;

/// Finds types under a namespace of the artifact root and hands every one
/// matching the selection policy to the creation strategy.
///
/// Not meant to be shared across threads while the strategy is being replaced:
/// [`set_creation_strategy`](Self::set_creation_strategy) takes `&mut self`.
pub struct InstanceCreator {
    mode: SelectionMode,
    targets: TargetSet,
    registry: TypeRegistry,
    locator: ArtifactLocator,
    strategy: Box<dyn CreationStrategy>,
}

impl std::fmt::Debug for InstanceCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceCreator")
            .field("mode", &self.mode)
            .field("targets", &self.targets)
            .field("registry", &self.registry.len())
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

/// Counters logged at the end of a scan.
#[derive(Debug, Default)]
struct ScanTally {
    candidates: usize,
    unresolvable: usize,
    excluded: usize,
    created: usize,
}

impl InstanceCreator {
    /// Create a creator over every type registered with
    /// [`register_type!`](crate::register_type) in this binary.
    ///
    /// # Errors
    /// Returns [`InstanceCreatorError::EmptyTargets`] when `targets` is empty,
    /// or a registry error when the collected registrations conflict.
    pub fn new(
        mode: SelectionMode,
        targets: impl IntoIterator<Item = TypeRef>,
    ) -> Result<Self, InstanceCreatorError> {
        let targets = TargetSet::new(targets)?;
        let registry = TypeRegistry::from_inventory()?;
        Ok(Self::from_parts(mode, targets, registry))
    }

    /// Create a creator over an explicitly built registry.
    #[must_use]
    pub fn from_parts(mode: SelectionMode, targets: TargetSet, registry: TypeRegistry) -> Self {
        Self {
            mode,
            targets,
            registry,
            locator: ArtifactLocator::new(ScanConfig::default()),
            strategy: Box::new(DefaultCreation),
        }
    }

    /// Replace the registry.
    #[must_use]
    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the scan configuration; a previously resolved root is forgotten.
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.locator = ArtifactLocator::new(config);
        self
    }

    /// Use `root` instead of locating the artifact root.
    #[must_use]
    pub fn with_root(mut self, root: ArtifactRoot) -> Self {
        let config = self.locator.config().clone();
        self.locator = ArtifactLocator::preset(root, config);
        self
    }

    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    #[must_use]
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The artifact root, resolved on first use.
    ///
    /// # Errors
    /// Returns a locate error if the root cannot be determined.
    pub fn artifact_root(&self) -> Result<&ArtifactRoot, InstanceCreatorError> {
        Ok(self.locator.resolve_root()?)
    }

    /// Replace the strategy used by subsequent scans.
    pub fn set_creation_strategy(&mut self, strategy: impl CreationStrategy + 'static) {
        self.strategy = Box::new(strategy);
    }

    /// Scan every namespace of the artifact.
    ///
    /// # Errors
    /// See [`create_instances_with`](Self::create_instances_with).
    pub fn create_instances(&mut self) -> Result<(), InstanceCreatorError> {
        self.create_instances_with("", true)
    }

    /// Scan `namespace` and its nested namespaces.
    ///
    /// # Errors
    /// See [`create_instances_with`](Self::create_instances_with).
    pub fn create_instances_in(&mut self, namespace: &str) -> Result<(), InstanceCreatorError> {
        self.create_instances_with(namespace, true)
    }

    /// Scan `namespace`, descending into nested namespaces only when
    /// `include_subnamespaces` is set. An empty namespace means the root.
    ///
    /// Each accepted type is passed to the strategy once. Types that cannot be
    /// resolved are skipped.
    ///
    /// # Errors
    /// Aborts on the first failure: a malformed namespace or candidate name,
    /// an unlocatable root, an unreadable container, or a strategy error.
    /// Instances created before the failure are not rolled back.
    pub fn create_instances_with(
        &mut self,
        namespace: &str,
        include_subnamespaces: bool,
    ) -> Result<(), InstanceCreatorError> {
        let namespace = Namespace::parse(namespace).map_err(InstanceCreatorError::Namespace)?;
        let root = self.locator.resolve_root()?;
        let config = self.locator.config();

        tracing::debug!(
            root = %root,
            namespace = %namespace,
            include_subnamespaces,
            mode = ?self.mode,
            "scanning for instances"
        );

        let mut tally = ScanTally::default();
        let walk = walker::walk(
            root,
            namespace.clone(),
            include_subnamespaces,
            &config.unit_suffix,
            config.follow_links,
        )?;
        for candidate in walk {
            let candidate = candidate?;
            tally.candidates += 1;
            match classify(&self.registry, &candidate, self.mode, &self.targets)? {
                Decision::Unresolvable(reason) => {
                    tally.unresolvable += 1;
                    tracing::debug!(candidate = %candidate, %reason, "skipping unresolvable type");
                }
                Decision::Excluded(exclusion) => {
                    tally.excluded += 1;
                    tracing::trace!(candidate = %candidate, %exclusion, "type excluded");
                }
                Decision::Accepted(descriptor) => {
                    self.strategy.create(&descriptor)?;
                    tally.created += 1;
                }
            }
        }

        tracing::info!(
            namespace = %namespace,
            candidates = tally.candidates,
            created = tally.created,
            excluded = tally.excluded,
            unresolvable = tally.unresolvable,
            "instance scan finished"
        );
        Ok(())
    }
}
