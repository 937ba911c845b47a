//! Hierarchical production tree.
//!
//! Each node names the item, the recipe chosen to make it, the rate it is
//! needed at and the machines that rate takes. Descent stops at raw
//! materials, at a recipe already on the current path, and at `max_depth`.

use ahash::AHashSet;
use assembly_common::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::index::RecipeIndex;
use crate::rates::{ingredient_rate, machines_needed, round2};

/// Default number of recipe levels expanded below the root.
pub const DEFAULT_TREE_DEPTH: usize = 5;

/// Why a node has (or lacks) children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeNodeKind {
    /// Produced by a recipe and expanded.
    Crafted,
    /// No recipe produces this item.
    Raw,
    /// The producing recipe is already on this path; not expanded.
    Cycle,
    /// The depth limit was reached; not expanded.
    DepthLimit,
}

/// One node of a production tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Item name.
    pub item: String,
    /// Display name, or the item name when the dataset has none.
    pub display_name: String,
    /// Recipe chosen to produce the item; `None` for raw materials.
    pub recipe: Option<String>,
    /// Units per second needed. Raw leaves are rounded to two decimals.
    pub rate: f64,
    /// Machines needed at the assumed crafting speed; zero for raw materials.
    pub machines_needed: f64,
    /// Recipe crafting time in seconds; zero for raw materials.
    pub crafting_time: f64,
    /// Node classification.
    pub kind: TreeNodeKind,
    /// Ingredient subtrees, in recipe ingredient order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Returns true if no recipe produces this node's item.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.kind == TreeNodeKind::Raw
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of levels in this subtree, counting this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

struct TreeBuilder<'a> {
    index: &'a RecipeIndex,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    fn node(&self, item: &str, rate: f64, depth: usize, visited: &AHashSet<&'a str>) -> TreeNode {
        let display_name = self.index.display_name(item).to_string();

        let Some(recipe) = self.index.find_recipe_for_item(item) else {
            return TreeNode {
                item: item.to_string(),
                display_name,
                recipe: None,
                rate: round2(rate),
                machines_needed: 0.0,
                crafting_time: 0.0,
                kind: TreeNodeKind::Raw,
                children: Vec::new(),
            };
        };

        let output_amount = recipe.primary_output_amount();
        let mut node = TreeNode {
            item: item.to_string(),
            display_name,
            recipe: Some(recipe.key.clone()),
            rate,
            machines_needed: machines_needed(rate, recipe.time, output_amount),
            crafting_time: recipe.time,
            kind: TreeNodeKind::Crafted,
            children: Vec::new(),
        };

        if visited.contains(recipe.key.as_str()) {
            trace!("Cycle cut at recipe {} for {}", recipe.key, item);
            node.kind = TreeNodeKind::Cycle;
            return node;
        }
        if depth >= self.max_depth {
            trace!("Depth limit {} reached at {}", self.max_depth, item);
            node.kind = TreeNodeKind::DepthLimit;
            return node;
        }

        let mut path = visited.clone();
        path.insert(recipe.key.as_str());

        node.children = recipe
            .ingredients
            .iter()
            .map(|ingredient| {
                let required = ingredient_rate(ingredient.amount, rate, output_amount);
                self.node(&ingredient.name, required, depth + 1, &path)
            })
            .collect();
        node
    }
}

/// Builds the production tree for `target_item` at `target_rate` units per
/// second, expanding at most `max_depth` recipe levels below the root.
pub fn build_tree(
    index: &RecipeIndex,
    target_item: &str,
    target_rate: f64,
    max_depth: usize,
) -> PlannerResult<TreeNode> {
    if index.find_recipe_for_item(target_item).is_none() {
        return Err(PlannerError::not_found(target_item));
    }

    let builder = TreeBuilder { index, max_depth };
    let root = builder.node(target_item, target_rate, 0, &AHashSet::new());

    debug!(
        "Built tree for {} at {}/s: {} nodes, {} levels",
        target_item,
        target_rate,
        root.node_count(),
        root.depth()
    );
    Ok(root)
}
