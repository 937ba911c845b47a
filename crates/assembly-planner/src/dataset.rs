//! Production dataset loading.
//!
//! This module provides:
//! - Serde shapes for the recipe/item JSON document
//! - Loading from a string, a reader, or a file path
//! - Structural validation on load
//!
//! The document looks like:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "recipes": {
//!     "iron-gear-wheel": {
//!       "category": "crafting",
//!       "time": 0.5,
//!       "ingredients": [{ "name": "iron-plate", "amount": 2 }],
//!       "results": [{ "name": "iron-gear-wheel", "amount": 1 }]
//!     }
//!   },
//!   "items": {
//!     "iron-gear-wheel": { "displayName": "Iron gear wheel", "group": "intermediate-products" }
//!   }
//! }
//! ```
//!
//! Recipe order in the file is preserved; it is the order every
//! first-match lookup in the planner follows.

use std::fs;
use std::io::Read;
use std::path::Path;

use assembly_common::{DataError, DataResult, SchemaVersion};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Crafting time used when a recipe does not declare one.
pub const DEFAULT_CRAFTING_TIME: f64 = 0.5;

/// Category used when a recipe does not declare one.
pub const DEFAULT_CATEGORY: &str = "crafting";

/// An (item, amount) pair in an ingredient or result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAmount {
    /// Item name.
    pub name: String,
    /// Quantity per craft. Results without an amount produce one unit.
    #[serde(default = "default_amount")]
    pub amount: f64,
}

impl ItemAmount {
    /// Creates a new item amount.
    #[must_use]
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

const fn default_amount() -> f64 {
    1.0
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

const fn default_time() -> f64 {
    DEFAULT_CRAFTING_TIME
}

fn default_version() -> String {
    SchemaVersion::DATASET.to_string()
}

/// A recipe definition loaded from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDefinition {
    /// Recipe key. Filled from the enclosing map key on load.
    #[serde(default, skip_serializing)]
    pub key: String,
    /// Category tag (crafting, smelting, chemistry, ...).
    #[serde(default = "default_category")]
    pub category: String,
    /// Seconds per craft at crafting speed 1.
    #[serde(default = "default_time", alias = "energy_required", alias = "energy")]
    pub time: f64,
    /// Consumed items, in declaration order.
    #[serde(default)]
    pub ingredients: Vec<ItemAmount>,
    /// Produced items, in declaration order. The first entry is the primary output.
    #[serde(default, alias = "products")]
    pub results: Vec<ItemAmount>,
}

impl RecipeDefinition {
    /// Starts building a recipe with the given key.
    pub fn builder(key: impl Into<String>) -> RecipeDefinitionBuilder {
        RecipeDefinitionBuilder::new(key)
    }

    /// First listed result.
    #[must_use]
    pub fn primary_output(&self) -> Option<&ItemAmount> {
        self.results.first()
    }

    /// Amount of the primary output per craft.
    ///
    /// Falls back to one unit for a recipe with no results, which validation
    /// rejects before a recipe ever reaches the index.
    #[must_use]
    pub fn primary_output_amount(&self) -> f64 {
        self.primary_output().map_or(1.0, |r| r.amount)
    }

    /// Returns true if any result of this recipe is `item`.
    #[must_use]
    pub fn produces(&self, item: &str) -> bool {
        self.results.iter().any(|r| r.name == item)
    }

    /// Returns true if any ingredient of this recipe is `item`.
    #[must_use]
    pub fn consumes(&self, item: &str) -> bool {
        self.ingredients.iter().any(|i| i.name == item)
    }

    /// Validates the recipe definition.
    pub fn validate(&self) -> DataResult<()> {
        if self.key.is_empty() {
            return Err(DataError::Validation("Recipe has empty key".to_string()));
        }

        if self.results.is_empty() {
            return Err(DataError::Validation(format!(
                "Recipe {} has no results",
                self.key
            )));
        }

        if !(self.time.is_finite() && self.time > 0.0) {
            return Err(DataError::Validation(format!(
                "Recipe {} has invalid crafting time: {}",
                self.key, self.time
            )));
        }

        let entries = self
            .ingredients
            .iter()
            .map(|i| ("ingredient", i))
            .chain(self.results.iter().map(|r| ("result", r)));
        for (i, (role, entry)) in entries.enumerate() {
            if entry.name.is_empty() {
                return Err(DataError::Validation(format!(
                    "Recipe {} {} {} has empty item name",
                    self.key, role, i
                )));
            }
            if !(entry.amount.is_finite() && entry.amount > 0.0) {
                return Err(DataError::Validation(format!(
                    "Recipe {} {} '{}' has invalid amount: {}",
                    self.key, role, entry.name, entry.amount
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`RecipeDefinition`], mostly useful for tests and fixtures.
#[derive(Debug)]
pub struct RecipeDefinitionBuilder {
    recipe: RecipeDefinition,
}

impl RecipeDefinitionBuilder {
    fn new(key: impl Into<String>) -> Self {
        Self {
            recipe: RecipeDefinition {
                key: key.into(),
                category: default_category(),
                time: DEFAULT_CRAFTING_TIME,
                ingredients: Vec::new(),
                results: Vec::new(),
            },
        }
    }

    /// Sets the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.recipe.category = category.into();
        self
    }

    /// Sets the crafting time in seconds.
    pub fn time(mut self, seconds: f64) -> Self {
        self.recipe.time = seconds;
        self
    }

    /// Adds an ingredient.
    pub fn ingredient(mut self, item: impl Into<String>, amount: f64) -> Self {
        self.recipe.ingredients.push(ItemAmount::new(item, amount));
        self
    }

    /// Adds a result. The first result added is the primary output.
    pub fn result(mut self, item: impl Into<String>, amount: f64) -> Self {
        self.recipe.results.push(ItemAmount::new(item, amount));
        self
    }

    /// Builds the recipe.
    #[must_use]
    pub fn build(self) -> RecipeDefinition {
        self.recipe
    }
}

/// Optional display metadata for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// Human readable name.
    #[serde(default, alias = "localised_name")]
    pub display_name: Option<String>,
    /// Item group.
    #[serde(default)]
    pub group: Option<String>,
    /// Item subgroup.
    #[serde(default)]
    pub subgroup: Option<String>,
}

/// A complete production dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Recipes keyed by recipe key, in file order.
    #[serde(default)]
    pub recipes: IndexMap<String, RecipeDefinition>,
    /// Item metadata keyed by item name.
    #[serde(default)]
    pub items: IndexMap<String, ItemMetadata>,
}

impl Dataset {
    /// Creates a dataset from recipes, keyed by their `key` field.
    ///
    /// A later recipe with a duplicate key replaces the earlier one in place.
    #[must_use]
    pub fn from_recipes(recipes: impl IntoIterator<Item = RecipeDefinition>) -> Self {
        Self {
            version: default_version(),
            recipes: recipes.into_iter().map(|r| (r.key.clone(), r)).collect(),
            items: IndexMap::new(),
        }
    }

    /// Attaches item metadata.
    #[must_use]
    pub fn with_item(mut self, name: impl Into<String>, metadata: ItemMetadata) -> Self {
        self.items.insert(name.into(), metadata);
        self
    }

    /// Parses and validates a dataset from a JSON string.
    pub fn from_json_str(json: &str) -> DataResult<Self> {
        let mut dataset: Self = serde_json::from_str(json)?;
        dataset.assign_keys();
        dataset.validate()?;
        Ok(dataset)
    }

    /// Parses and validates a dataset from a reader.
    pub fn from_reader(reader: impl Read) -> DataResult<Self> {
        let mut dataset: Self = serde_json::from_reader(reader)?;
        dataset.assign_keys();
        dataset.validate()?;
        Ok(dataset)
    }

    /// Loads and validates a dataset file.
    pub fn load(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        debug!("Loading dataset file: {}", path.display());

        let file = fs::File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(std::io::BufReader::new(file))?;

        info!(
            "Loaded {} recipes and {} item entries from {}",
            dataset.recipes.len(),
            dataset.items.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Copies each map key into its recipe's `key` field.
    fn assign_keys(&mut self) {
        for (key, recipe) in &mut self.recipes {
            if recipe.key != *key {
                if !recipe.key.is_empty() {
                    warn!("Recipe key '{}' overridden by map key '{}'", recipe.key, key);
                }
                recipe.key.clone_from(key);
            }
        }
    }

    /// Validates the version and every recipe.
    pub fn validate(&self) -> DataResult<()> {
        let version =
            SchemaVersion::parse(&self.version).ok_or_else(|| DataError::VersionMismatch {
                expected: SchemaVersion::DATASET.to_string(),
                actual: self.version.clone(),
            })?;
        if !SchemaVersion::DATASET.can_read(&version) {
            return Err(DataError::VersionMismatch {
                expected: SchemaVersion::DATASET.to_string(),
                actual: version.to_string(),
            });
        }

        for recipe in self.recipes.values() {
            recipe.validate()?;
        }

        Ok(())
    }
}
