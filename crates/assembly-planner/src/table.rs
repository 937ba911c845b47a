//! Normalized production table.
//!
//! Flattens the dependency walk into three collections: one row per recipe,
//! one row per item (who makes it, who eats it) and the raw material totals.
//! There is no depth cap; only a recipe already on the current path stops
//! descent.
//!
//! Recipe machine counts and output rates are summed exactly as visited.
//! Consumption figures and raw material totals are rounded to two decimals
//! once, after the walk.

use std::cmp::Ordering;

use ahash::AHashSet;
use assembly_common::{PlannerError, PlannerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dataset::RecipeDefinition;
use crate::index::RecipeIndex;
use crate::rates::{ingredient_rate, machines_needed, round2};

/// One recipe row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRecipe {
    /// Recipe key.
    pub key: String,
    /// Primary output of the recipe.
    pub item: String,
    /// Recipe category.
    pub category: String,
    /// Crafting time in seconds.
    pub crafting_time: f64,
    /// Machines needed, summed over every occurrence in the walk.
    pub machines: f64,
    /// Output rate in units per second, summed over every occurrence.
    pub output_rate: f64,
}

/// One item row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableItem {
    /// Recipe producing the item; `None` for raw materials and unexpanded items.
    pub produced_by: Option<String>,
    /// Rate the producing recipe runs at for this item.
    pub produced_rate: f64,
    /// Rate consumed by each recipe, keyed by recipe key.
    pub consumed_by: IndexMap<String, f64>,
    /// Sum of `consumed_by`.
    pub total_consumed: f64,
}

/// Flat production table for one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionTable {
    /// Recipe rows keyed by recipe key, in first-visit order.
    pub recipes: IndexMap<String, TableRecipe>,
    /// Item rows keyed by item name, in first-visit order.
    pub items: IndexMap<String, TableItem>,
    /// Items with no producing recipe and their total rate, highest first.
    pub raw_materials: IndexMap<String, f64>,
}

impl ProductionTable {
    /// Total machines across every recipe row.
    #[must_use]
    pub fn total_machines(&self) -> f64 {
        round2(self.recipes.values().map(|r| r.machines).sum())
    }
}

struct TableBuilder<'a> {
    index: &'a RecipeIndex,
    table: ProductionTable,
}

impl<'a> TableBuilder<'a> {
    fn walk(&mut self, item: &str, rate: f64, visited: &AHashSet<&'a str>) {
        let index = self.index;
        let Some(recipe) = index.find_recipe_for_item(item) else {
            *self.table.raw_materials.entry(item.to_string()).or_insert(0.0) += rate;
            self.table.items.entry(item.to_string()).or_default();
            return;
        };

        if visited.contains(recipe.key.as_str()) {
            trace!("Cycle cut at recipe {} for {}", recipe.key, item);
            return;
        }

        let mut path = visited.clone();
        path.insert(recipe.key.as_str());

        self.record_production(recipe, item, rate);

        let output_amount = recipe.primary_output_amount();
        for ingredient in &recipe.ingredients {
            let required = ingredient_rate(ingredient.amount, rate, output_amount);

            let row = self.table.items.entry(ingredient.name.clone()).or_default();
            *row.consumed_by.entry(recipe.key.clone()).or_insert(0.0) += required;
            row.total_consumed += required;

            self.walk(&ingredient.name, required, &path);
        }
    }

    fn record_production(&mut self, recipe: &RecipeDefinition, item: &str, rate: f64) {
        let output_amount = recipe.primary_output_amount();
        let row = self
            .table
            .recipes
            .entry(recipe.key.clone())
            .or_insert_with(|| TableRecipe {
                key: recipe.key.clone(),
                item: recipe
                    .primary_output()
                    .map_or_else(|| item.to_string(), |r| r.name.clone()),
                category: recipe.category.clone(),
                crafting_time: recipe.time,
                machines: 0.0,
                output_rate: 0.0,
            });
        row.machines += machines_needed(rate, recipe.time, output_amount);
        row.output_rate += rate;

        let row = self.table.items.entry(item.to_string()).or_default();
        if row.produced_by.is_none() {
            row.produced_by = Some(recipe.key.clone());
        }
        row.produced_rate += rate;
    }

    fn finish(mut self) -> ProductionTable {
        for row in self.table.recipes.values_mut() {
            row.machines = round2(row.machines);
        }
        for row in self.table.items.values_mut() {
            for rate in row.consumed_by.values_mut() {
                *rate = round2(*rate);
            }
            row.total_consumed = round2(row.total_consumed);
        }
        for rate in self.table.raw_materials.values_mut() {
            *rate = round2(*rate);
        }
        self.table.raw_materials.sort_by(|ka, a, kb, b| {
            b.partial_cmp(a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ka.cmp(kb))
        });
        self.table
    }
}

/// Builds the production table for `target_item` at `target_rate` units per second.
pub fn build_table(
    index: &RecipeIndex,
    target_item: &str,
    target_rate: f64,
) -> PlannerResult<ProductionTable> {
    if index.find_recipe_for_item(target_item).is_none() {
        return Err(PlannerError::not_found(target_item));
    }

    let mut builder = TableBuilder {
        index,
        table: ProductionTable::default(),
    };
    builder.walk(target_item, target_rate, &AHashSet::new());
    let table = builder.finish();

    debug!(
        "Built table for {} at {}/s: {} recipes, {} items, {} raw materials",
        target_item,
        target_rate,
        table.recipes.len(),
        table.items.len(),
        table.raw_materials.len()
    );
    Ok(table)
}
