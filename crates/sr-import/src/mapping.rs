//! Mapping catalog (usda_map.yml)
//!
//! Associates each entity id with the flat file that populates it and the
//! attribute names of that file's columns, in column order:
//!
//! ```yaml
//! FoodGroup:
//!   file_name: FD_GROUP.txt
//!   attribute_order: [fdgrp_cd, fdgrp_desc]
//! ```
//!
//! Document order is preserved; the importer walks entries in that order.

use serde::Deserialize;
use sr_common::{Result, SrError};
use std::collections::HashMap;
use std::path::Path;

/// The mapping shipped with the crate, covering the full SR release files
pub const BUNDLED_MAPPING: &str = include_str!("../usda_map.yml");

/// One entity's file and column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub entity_id: String,
    /// Path relative to the extraction directory
    pub file_name: String,
    pub attribute_order: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    file_name: String,
    attribute_order: Vec<String>,
}

/// Loaded, read-only mapping
#[derive(Debug, Clone, Default)]
pub struct MappingCatalog {
    entries: Vec<MappingEntry>,
    index: HashMap<String, usize>,
}

impl MappingCatalog {
    /// Load a catalog from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SrError::config(format!(
                "Mapping file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SrError::config(format!("Failed to read mapping {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// The catalog compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_yaml(BUNDLED_MAPPING)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| SrError::config(format!("Failed to parse mapping YAML: {}", e)))?;

        let mapping = match document {
            serde_yaml::Value::Mapping(mapping) => mapping,
            serde_yaml::Value::Null => {
                return Err(SrError::config("Mapping document is empty"));
            },
            _ => {
                return Err(SrError::config(
                    "Mapping document must be a map of entity id to {file_name, attribute_order}",
                ));
            },
        };

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let entity_id = key
                .as_str()
                .ok_or_else(|| SrError::config(format!("Entity id must be a string, got {:?}", key)))?
                .to_string();

            let raw: RawEntry = serde_yaml::from_value(value).map_err(|e| {
                SrError::config(format!("Invalid mapping entry '{}': {}", entity_id, e))
            })?;

            entries.push(MappingEntry {
                entity_id,
                file_name: raw.file_name,
                attribute_order: raw.attribute_order,
            });
        }

        Self::from_entries(entries)
    }

    /// Build a catalog from entries already in memory
    pub fn from_entries(entries: Vec<MappingEntry>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.file_name.trim().is_empty() {
                return Err(SrError::config(format!(
                    "Mapping entry '{}' has an empty file_name",
                    entry.entity_id
                )));
            }
            if index.insert(entry.entity_id.clone(), position).is_some() {
                return Err(SrError::config(format!(
                    "Duplicate mapping entry '{}'",
                    entry.entity_id
                )));
            }
        }
        Ok(Self { entries, index })
    }

    /// Entries in document order
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn get(&self, entity_id: &str) -> Option<&MappingEntry> {
        self.index.get(entity_id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
