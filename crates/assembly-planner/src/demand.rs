//! Aggregate demand propagation.
//!
//! Walks the dependency tree below a target item and sums, per item, the
//! throughput needed to sustain the target rate. The same item reached over
//! independent paths accumulates into one total.
//!
//! Cycle handling is path-local: each descent carries its own copy of the
//! recipe keys already on the path, so a cycle is cut only on the path that
//! closes it. Sibling branches that reach the same recipe expand it again.
//! This bounds recursion on cyclic data but not on wide diamond-shaped data.

use std::cmp::Ordering;

use ahash::AHashSet;
use assembly_common::{PlannerError, PlannerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dataset::RecipeDefinition;
use crate::index::RecipeIndex;
use crate::rates::{ingredient_rate, round2};

/// Required throughput of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandEntry {
    /// Item name.
    pub item: String,
    /// Units per second, rounded to two decimals.
    pub rate: f64,
}

/// Recursive demand propagator over a recipe index.
#[derive(Debug, Clone, Copy)]
pub struct DemandPropagator<'a> {
    index: &'a RecipeIndex,
}

impl<'a> DemandPropagator<'a> {
    /// Creates a propagator reading from `index`.
    #[must_use]
    pub const fn new(index: &'a RecipeIndex) -> Self {
        Self { index }
    }

    /// Per-item totals in first-discovery order.
    ///
    /// Totals are rounded to two decimals every time a contribution is added.
    pub fn totals(
        &self,
        target_item: &str,
        target_rate: f64,
    ) -> PlannerResult<IndexMap<String, f64>> {
        let recipe = self
            .index
            .find_recipe_for_item(target_item)
            .ok_or_else(|| PlannerError::not_found(target_item))?;

        let mut totals = IndexMap::new();
        self.propagate(recipe, target_rate, &AHashSet::new(), &mut totals);
        Ok(totals)
    }

    /// Aggregate demand sorted by descending rate.
    pub fn compute(&self, target_item: &str, target_rate: f64) -> PlannerResult<Vec<DemandEntry>> {
        let totals = self.totals(target_item, target_rate)?;

        let mut entries: Vec<DemandEntry> = totals
            .into_iter()
            .map(|(item, rate)| DemandEntry {
                item,
                rate: round2(rate),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.rate
                .partial_cmp(&a.rate)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.item.cmp(&b.item))
        });

        debug!(
            "Demand for {} at {}/s touches {} items",
            target_item,
            target_rate,
            entries.len()
        );
        Ok(entries)
    }

    fn propagate(
        &self,
        recipe: &'a RecipeDefinition,
        rate: f64,
        visited: &AHashSet<&'a str>,
        totals: &mut IndexMap<String, f64>,
    ) {
        if visited.contains(recipe.key.as_str()) {
            trace!("Cycle cut at recipe {}", recipe.key);
            return;
        }

        let mut path = visited.clone();
        path.insert(recipe.key.as_str());

        let output_amount = recipe.primary_output_amount();
        for ingredient in &recipe.ingredients {
            let required = ingredient_rate(ingredient.amount, rate, output_amount);

            let total = totals.entry(ingredient.name.clone()).or_insert(0.0);
            *total = round2(*total + required);

            if let Some(producer) = self.index.find_recipe_for_item(&ingredient.name) {
                self.propagate(producer, required, &path, totals);
            }
        }
    }
}

/// Total throughput of every upstream item needed to produce `target_item`
/// at `target_rate` units per second, sorted by descending rate.
pub fn compute_aggregate_demand(
    index: &RecipeIndex,
    target_item: &str,
    target_rate: f64,
) -> PlannerResult<Vec<DemandEntry>> {
    DemandPropagator::new(index).compute(target_item, target_rate)
}
