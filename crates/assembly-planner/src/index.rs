//! Read-only lookup structures over a production dataset.
//!
//! The index is built once and never mutated. Every planner operation takes
//! `&RecipeIndex`, so any number of queries can share one index across threads.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use tracing::info;

use crate::dataset::{Dataset, ItemMetadata, RecipeDefinition};

/// Recipe index with fast lookup by key, produced item and consumed item.
#[derive(Debug, Clone)]
pub struct RecipeIndex {
    /// Recipes in dataset order.
    recipes: Vec<RecipeDefinition>,
    /// Recipe positions by key.
    by_key: AHashMap<String, usize>,
    /// Positions of every recipe listing the item as a result, in dataset order.
    producers: AHashMap<String, Vec<usize>>,
    /// Positions of every recipe listing the item as an ingredient, in dataset order.
    consumers: AHashMap<String, Vec<usize>>,
    /// Every referenced item, in first-reference order.
    items: IndexSet<String>,
    /// Optional display metadata.
    metadata: IndexMap<String, ItemMetadata>,
}

impl RecipeIndex {
    /// Builds the index from a loaded dataset.
    #[must_use]
    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut index = Self::with_metadata(dataset.items);
        for recipe in dataset.recipes.into_values() {
            index.insert(recipe);
        }

        info!(
            "Indexed {} recipes over {} items",
            index.recipes.len(),
            index.items.len()
        );
        index
    }

    /// Builds the index from recipes without item metadata.
    #[must_use]
    pub fn from_recipes(recipes: impl IntoIterator<Item = RecipeDefinition>) -> Self {
        Self::from_dataset(Dataset::from_recipes(recipes))
    }

    fn with_metadata(metadata: IndexMap<String, ItemMetadata>) -> Self {
        Self {
            recipes: Vec::new(),
            by_key: AHashMap::new(),
            producers: AHashMap::new(),
            consumers: AHashMap::new(),
            items: IndexSet::new(),
            metadata,
        }
    }

    fn insert(&mut self, recipe: RecipeDefinition) {
        let pos = self.recipes.len();

        for ingredient in &recipe.ingredients {
            self.items.insert(ingredient.name.clone());
            let list = self.consumers.entry(ingredient.name.clone()).or_default();
            if list.last() != Some(&pos) {
                list.push(pos);
            }
        }

        for result in &recipe.results {
            self.items.insert(result.name.clone());
            let list = self.producers.entry(result.name.clone()).or_default();
            if list.last() != Some(&pos) {
                list.push(pos);
            }
        }

        self.by_key.insert(recipe.key.clone(), pos);
        self.recipes.push(recipe);
    }

    /// Returns the number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if the index holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Gets a recipe by key.
    #[must_use]
    pub fn recipe(&self, key: &str) -> Option<&RecipeDefinition> {
        self.by_key.get(key).map(|&pos| &self.recipes[pos])
    }

    /// Returns an iterator over all recipes in dataset order.
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeDefinition> {
        self.recipes.iter()
    }

    /// Returns an iterator over every referenced item, in first-reference order.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Returns true if any recipe references `item`.
    #[must_use]
    pub fn contains_item(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    /// Every recipe that lists `item` among its results, in dataset order.
    ///
    /// These are the candidate producers; planners currently resolve to the
    /// first one.
    pub fn recipes_for_item<'a>(
        &'a self,
        item: &str,
    ) -> impl Iterator<Item = &'a RecipeDefinition> + 'a {
        self.positions(&self.producers, item)
    }

    /// First recipe, in dataset order, that lists `item` among its results.
    #[must_use]
    pub fn find_recipe_for_item(&self, item: &str) -> Option<&RecipeDefinition> {
        self.recipes_for_item(item).next()
    }

    /// Every recipe that lists `item` among its ingredients, in dataset order.
    pub fn consumers_of<'a>(
        &'a self,
        item: &str,
    ) -> impl Iterator<Item = &'a RecipeDefinition> + 'a {
        self.positions(&self.consumers, item)
    }

    fn positions<'a>(
        &'a self,
        table: &'a AHashMap<String, Vec<usize>>,
        item: &str,
    ) -> impl Iterator<Item = &'a RecipeDefinition> + 'a {
        table
            .get(item)
            .into_iter()
            .flatten()
            .map(|&pos| &self.recipes[pos])
    }

    /// Display metadata for `item`, if the dataset carried any.
    #[must_use]
    pub fn item_metadata(&self, item: &str) -> Option<&ItemMetadata> {
        self.metadata.get(item)
    }

    /// Display name for `item`, falling back to the item name itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, item: &'a str) -> &'a str {
        self.metadata
            .get(item)
            .and_then(|m| m.display_name.as_deref())
            .unwrap_or(item)
    }

    /// Searches referenced items by name or display name (case-insensitive).
    pub fn search_items(&self, query: &str) -> Vec<&str> {
        let query_lower = query.to_lowercase();
        self.items()
            .filter(|item| {
                item.to_lowercase().contains(&query_lower)
                    || self
                        .display_name(item)
                        .to_lowercase()
                        .contains(&query_lower)
            })
            .collect()
    }
}
