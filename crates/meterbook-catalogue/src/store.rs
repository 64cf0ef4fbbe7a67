//! # Schema Resolution & In-Memory Catalogue
//!
//! The validator never owns schemas; it asks a [`SchemaResolver`] for the
//! item matching a meter's model. A missing item is a normal outcome.
//!
//! [`InMemoryCatalogue`] is a `DashMap`-backed store holding catalogue items
//! keyed by model and presets keyed by (type, level). Items are stored as
//! `Arc<CatalogueItem>` so a resolved schema stays valid while the store is
//! updated concurrently.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;
use crate::item::{CatalogueItem, Level, MeterType, Preset};
use crate::presets;

// ---------------------------------------------------------------------------
// SchemaResolver
// ---------------------------------------------------------------------------

/// Synchronous, side-effect-free lookup of a model's schema.
pub trait SchemaResolver {
    fn resolve_schema(&self, model: &str) -> Option<Arc<CatalogueItem>>;
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for &T {
    fn resolve_schema(&self, model: &str) -> Option<Arc<CatalogueItem>> {
        (**self).resolve_schema(model)
    }
}

impl<T: SchemaResolver + ?Sized> SchemaResolver for Arc<T> {
    fn resolve_schema(&self, model: &str) -> Option<Arc<CatalogueItem>> {
        (**self).resolve_schema(model)
    }
}

// ---------------------------------------------------------------------------
// CatalogueDocument
// ---------------------------------------------------------------------------

/// A catalogue file: items plus optional presets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogueDocument {
    #[serde(default)]
    pub items: Vec<CatalogueItem>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl CatalogueDocument {
    /// Parse a YAML (or JSON, which is valid YAML) catalogue document.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogueError> {
        serde_yaml::from_str(source).map_err(|e| CatalogueError::Parse(e.to_string()))
    }

    /// Parse a JSON catalogue document.
    pub fn from_json(source: &str) -> Result<Self, CatalogueError> {
        serde_json::from_str(source).map_err(|e| CatalogueError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// InMemoryCatalogue
// ---------------------------------------------------------------------------

/// Thread-safe in-memory catalogue.
#[derive(Default)]
pub struct InMemoryCatalogue {
    items: DashMap<String, Arc<CatalogueItem>>,
    presets: DashMap<(MeterType, Level), Arc<Preset>>,
}

impl InMemoryCatalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalogue from a parsed document.
    pub fn from_document(document: CatalogueDocument) -> Result<Self, CatalogueError> {
        let catalogue = Self::new();
        catalogue.load_document(document)?;
        Ok(catalogue)
    }

    /// Insert a new item. Fails if the model is taken or the item does not
    /// pass its definition checks.
    pub fn insert(&self, item: CatalogueItem) -> Result<Arc<CatalogueItem>, CatalogueError> {
        item.validate_definition()?;
        match self.items.entry(item.model.clone()) {
            Entry::Occupied(_) => Err(CatalogueError::DuplicateModel(item.model)),
            Entry::Vacant(slot) => {
                let item = Arc::new(item);
                slot.insert(Arc::clone(&item));
                tracing::debug!(
                    model = %item.model,
                    constraints = item.constraints.len(),
                    "catalogue item inserted"
                );
                Ok(item)
            }
        }
    }

    /// Insert or replace the item for its model. Returns the replaced item.
    pub fn upsert(
        &self,
        item: CatalogueItem,
    ) -> Result<Option<Arc<CatalogueItem>>, CatalogueError> {
        item.validate_definition()?;
        Ok(self.items.insert(item.model.clone(), Arc::new(item)))
    }

    /// Remove the item for `model`.
    pub fn remove(&self, model: &str) -> Option<Arc<CatalogueItem>> {
        self.items.remove(model).map(|(_, item)| item)
    }

    /// The item for `model`.
    pub fn get(&self, model: &str) -> Option<Arc<CatalogueItem>> {
        self.items.get(model).map(|r| Arc::clone(r.value()))
    }

    /// All stored models, sorted.
    pub fn models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.items.iter().map(|r| r.key().clone()).collect();
        models.sort();
        models
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert a preset. Fails if one already exists for its type and level.
    pub fn insert_preset(&self, preset: Preset) -> Result<Arc<Preset>, CatalogueError> {
        let (meter_type, level) = preset.key();
        match self.presets.entry(preset.key()) {
            Entry::Occupied(_) => Err(CatalogueError::DuplicatePreset { meter_type, level }),
            Entry::Vacant(slot) => {
                let preset = Arc::new(preset);
                slot.insert(Arc::clone(&preset));
                Ok(preset)
            }
        }
    }

    /// The preset for `meter_type` and `level`.
    pub fn preset(&self, meter_type: MeterType, level: Level) -> Option<Arc<Preset>> {
        self.presets
            .get(&(meter_type, level))
            .map(|r| Arc::clone(r.value()))
    }

    /// All stored presets, ordered by type then level.
    pub fn presets(&self) -> Vec<Arc<Preset>> {
        let mut presets: Vec<Arc<Preset>> =
            self.presets.iter().map(|r| Arc::clone(r.value())).collect();
        presets.sort_by_key(|p| p.key());
        presets
    }

    /// Install each built-in preset whose (type, level) slot is still free.
    /// Returns how many were installed.
    pub fn install_default_presets(&self) -> usize {
        let mut installed = 0;
        for preset in presets::defaults() {
            if let Entry::Vacant(slot) = self.presets.entry(preset.key()) {
                tracing::info!(
                    meter_type = %preset.meter_type,
                    level = %preset.level,
                    "installing default preset"
                );
                slot.insert(Arc::new(preset));
                installed += 1;
            }
        }
        installed
    }

    /// Insert every item and preset of `document`, stopping at the first
    /// failure. Returns the number of items inserted.
    pub fn load_document(&self, document: CatalogueDocument) -> Result<usize, CatalogueError> {
        for preset in document.presets {
            self.insert_preset(preset)?;
        }
        let count = document.items.len();
        for item in document.items {
            self.insert(item)?;
        }
        Ok(count)
    }
}

impl SchemaResolver for InMemoryCatalogue {
    fn resolve_schema(&self, model: &str) -> Option<Arc<CatalogueItem>> {
        self.get(model)
    }
}

impl std::fmt::Debug for InMemoryCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCatalogue")
            .field("item_count", &self.items.len())
            .field("preset_count", &self.presets.len())
            .finish()
    }
}
