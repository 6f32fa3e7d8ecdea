//! Validator registry keyed by entity type and test definition name

use super::{ValidatorConstructor, ValidatorContext, Validator};
use crate::error::ResolutionError;
use crate::runtime_params::SetterConstructor;
use assay_core::EntityType;
use std::collections::BTreeMap;

/// A registered validator
#[derive(Clone)]
pub struct ValidatorEntry {
    entity_type: EntityType,
    name: String,
    constructor: ValidatorConstructor,
    runtime_parameter_setter: Option<SetterConstructor>,
}

impl ValidatorEntry {
    pub fn new(
        entity_type: EntityType,
        name: impl Into<String>,
        constructor: ValidatorConstructor,
    ) -> Self {
        Self {
            entity_type,
            name: name.into(),
            constructor,
            runtime_parameter_setter: None,
        }
    }

    /// Declare that the validator needs runtime parameters from `setter`
    pub fn with_runtime_parameter_setter(mut self, setter: SetterConstructor) -> Self {
        self.runtime_parameter_setter = Some(setter);
        self
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Fully-qualified test definition name this entry serves
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requires_runtime_parameters(&self) -> bool {
        self.runtime_parameter_setter.is_some()
    }

    pub fn runtime_parameter_setter(&self) -> Option<&SetterConstructor> {
        self.runtime_parameter_setter.as_ref()
    }

    /// Build the validator for one test case
    pub fn construct(&self, ctx: ValidatorContext) -> Box<dyn Validator> {
        (self.constructor)(ctx)
    }
}

impl std::fmt::Debug for ValidatorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorEntry")
            .field("entity_type", &self.entity_type)
            .field("name", &self.name)
            .field(
                "requires_runtime_parameters",
                &self.requires_runtime_parameters(),
            )
            .finish()
    }
}

/// Validators available to an interface, registered at startup.
///
/// Lookups for unregistered pairs fail with [`ResolutionError`].
#[derive(Clone, Debug, Default)]
pub struct ValidatorRegistry {
    entries: BTreeMap<(EntityType, String), ValidatorEntry>,
}

impl ValidatorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in validator
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::column::register(&mut registry);
        super::table::register(&mut registry);
        registry
    }

    /// Register `entry`, returning the one it replaces
    pub fn register(&mut self, entry: ValidatorEntry) -> Option<ValidatorEntry> {
        let key = (entry.entity_type, entry.name.clone());
        let replaced = self.entries.insert(key, entry);
        if let Some(old) = &replaced {
            log::debug!("Replaced validator for {} test '{}'", old.entity_type, old.name);
        }
        replaced
    }

    /// Validator for a test definition
    pub fn resolve(
        &self,
        entity_type: EntityType,
        name: &str,
    ) -> Result<&ValidatorEntry, ResolutionError> {
        self.entries
            .get(&(entity_type, name.to_string()))
            .ok_or_else(|| ResolutionError::UnknownValidator {
                entity_type,
                name: name.to_string(),
            })
    }

    /// Registered entries in (entity type, name) order
    pub fn entries(&self) -> impl Iterator<Item = &ValidatorEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
