//! Registry of importable entity types

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use sr_common::Result;
use tracing::debug;

use super::models::*;
use super::{AttributeBinding, Entity, EntitySchema};
use crate::importer::{EntityLoad, EntityLoader};
use crate::mapping::MappingEntry;

/// Type-erased handle to one registered entity type
pub trait EntityHandle: Send + Sync {
    fn schema(&self) -> &'static EntitySchema;

    fn entity_id(&self) -> &'static str {
        self.schema().id
    }

    /// Bind a mapping entry to this entity, validating its attribute order
    fn prepare(&self, entry: &MappingEntry) -> Result<Box<dyn EntityLoad>>;
}

struct TypedHandle<E>(PhantomData<fn() -> E>);

impl<E: Entity> EntityHandle for TypedHandle<E> {
    fn schema(&self) -> &'static EntitySchema {
        E::schema()
    }

    fn prepare(&self, entry: &MappingEntry) -> Result<Box<dyn EntityLoad>> {
        let binding = AttributeBinding::<E>::new(&entry.attribute_order)?;
        Ok(Box::new(EntityLoader::new(entry.clone(), binding)))
    }
}

/// Entity types known to the storage layer, looked up by entity id
#[derive(Clone, Default)]
pub struct EntityRegistry {
    handles: HashMap<&'static str, Arc<dyn EntityHandle>>,
}

impl EntityRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// All Standard Reference entities
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register::<FoodGroup>()
            .register::<Food>()
            .register::<NutrientDefinition>()
            .register::<NutrientData>()
            .register::<Weight>()
            .register::<Footnote>()
            .register::<LangualFactor>()
            .register::<LangualDescription>()
            .register::<SourceCode>()
            .register::<DerivationCode>()
            .register::<DataSource>()
            .register::<DataSourceLink>();
        registry
    }

    /// Register `E` under its schema id, replacing any previous registration
    pub fn register<E: Entity>(&mut self) -> &mut Self {
        let id = E::schema().id;
        if self
            .handles
            .insert(id, Arc::new(TypedHandle::<E>(PhantomData)))
            .is_some()
        {
            debug!(entity = id, "Replaced entity registration");
        }
        self
    }

    pub fn resolve(&self, entity_id: &str) -> Option<&dyn EntityHandle> {
        self.handles.get(entity_id).map(|handle| handle.as_ref())
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.handles.contains_key(entity_id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.handles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry").field("entities", &self.ids()).finish()
    }
}
