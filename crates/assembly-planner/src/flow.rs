//! Flow diagram graph.
//!
//! Produces `{nodes, links}` for Sankey-style renderers: one node per
//! distinct recipe and item, a link from each ingredient into the recipe
//! consuming it and from each recipe into the item it makes.
//!
//! Item labels are fixed the first time an item is discovered. An item first
//! seen at the depth limit is labeled raw, and keeps that label even if a
//! later, shallower path expands its recipe.

use ahash::AHashSet;
use assembly_common::{NodeId, PlannerError, PlannerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dataset::RecipeDefinition;
use crate::index::RecipeIndex;
use crate::rates::{ingredient_rate, MIN_LINK_VALUE};

/// Default number of recipe levels expanded below the target.
pub const DEFAULT_FLOW_DEPTH: usize = 3;

/// Flow node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowNodeKind {
    /// A recipe.
    Recipe,
    /// An item produced inside the diagram.
    Item,
    /// An item entering the diagram from outside.
    Raw,
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Node identifier.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Classification.
    pub kind: FlowNodeKind,
}

/// A directed, weighted diagram link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    /// Upstream node.
    pub source: NodeId,
    /// Downstream node.
    pub target: NodeId,
    /// Units per second, never below [`MIN_LINK_VALUE`].
    pub value: f64,
}

/// Diagram-ready production graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Nodes in discovery order.
    pub nodes: Vec<FlowNode>,
    /// Links in traversal order.
    pub links: Vec<FlowLink>,
}

impl FlowGraph {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

struct FlowBuilder<'a> {
    index: &'a RecipeIndex,
    max_depth: usize,
    nodes: IndexMap<NodeId, FlowNode>,
    links: Vec<FlowLink>,
}

impl<'a> FlowBuilder<'a> {
    fn walk(&mut self, item: &str, rate: f64, depth: usize, visited: &AHashSet<&'a str>) {
        let index = self.index;
        let recipe = index.find_recipe_for_item(item);
        let at_limit = depth >= self.max_depth;

        let kind = if recipe.is_none() || at_limit {
            FlowNodeKind::Raw
        } else {
            FlowNodeKind::Item
        };
        self.add_node(NodeId::item(item), index.display_name(item), kind);

        let Some(recipe) = recipe else {
            return;
        };
        if at_limit {
            trace!("Depth limit {} reached at {}", self.max_depth, item);
            return;
        }
        if visited.contains(recipe.key.as_str()) {
            trace!("Cycle cut at recipe {} for {}", recipe.key, item);
            return;
        }

        let mut path = visited.clone();
        path.insert(recipe.key.as_str());

        self.expand(recipe, item, rate, depth, &path);
    }

    fn expand(
        &mut self,
        recipe: &'a RecipeDefinition,
        item: &str,
        rate: f64,
        depth: usize,
        path: &AHashSet<&'a str>,
    ) {
        let recipe_id = NodeId::recipe(recipe.key.as_str());
        self.add_node(recipe_id.clone(), &recipe.key, FlowNodeKind::Recipe);
        self.link(recipe_id.clone(), NodeId::item(item), rate);

        let output_amount = recipe.primary_output_amount();
        for ingredient in &recipe.ingredients {
            let required = ingredient_rate(ingredient.amount, rate, output_amount);
            self.link(NodeId::item(ingredient.name.as_str()), recipe_id.clone(), required);
            self.walk(&ingredient.name, required, depth + 1, path);
        }
    }

    fn add_node(&mut self, id: NodeId, label: &str, kind: FlowNodeKind) {
        self.nodes.entry(id.clone()).or_insert_with(|| FlowNode {
            id,
            label: label.to_string(),
            kind,
        });
    }

    fn link(&mut self, source: NodeId, target: NodeId, value: f64) {
        self.links.push(FlowLink {
            source,
            target,
            value: value.max(MIN_LINK_VALUE),
        });
    }
}

/// Builds the flow diagram for `target_item` at `target_rate` units per
/// second, expanding at most `max_depth` recipe levels.
pub fn build_flow_graph(
    index: &RecipeIndex,
    target_item: &str,
    target_rate: f64,
    max_depth: usize,
) -> PlannerResult<FlowGraph> {
    if index.find_recipe_for_item(target_item).is_none() {
        return Err(PlannerError::not_found(target_item));
    }

    let mut builder = FlowBuilder {
        index,
        max_depth,
        nodes: IndexMap::new(),
        links: Vec::new(),
    };
    builder.walk(target_item, target_rate, 0, &AHashSet::new());

    let graph = FlowGraph {
        nodes: builder.nodes.into_values().collect(),
        links: builder.links,
    };
    debug!(
        "Built flow graph for {} at {}/s: {} nodes, {} links",
        target_item,
        target_rate,
        graph.nodes.len(),
        graph.links.len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit_index() -> RecipeIndex {
        RecipeIndex::from_recipes([
            RecipeDefinition::builder("electronic-circuit")
                .ingredient("iron-plate", 1.0)
                .ingredient("copper-cable", 3.0)
                .result("electronic-circuit", 1.0)
                .build(),
            RecipeDefinition::builder("copper-cable")
                .ingredient("copper-plate", 1.0)
                .result("copper-cable", 2.0)
                .build(),
        ])
    }

    #[test]
    fn test_nodes_and_links() {
        let index = circuit_index();
        let graph =
            build_flow_graph(&index, "electronic-circuit", 1.0, DEFAULT_FLOW_DEPTH).expect("flow");

        let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "item:electronic-circuit",
                "recipe:electronic-circuit",
                "item:iron-plate",
                "item:copper-cable",
                "recipe:copper-cable",
                "item:copper-plate",
            ]
        );

        let root_link = &graph.links[0];
        assert_eq!(root_link.source, NodeId::recipe("electronic-circuit"));
        assert_eq!(root_link.target, NodeId::item("electronic-circuit"));
        assert_eq!(root_link.value, 1.0);

        assert_eq!(
            graph.node(&NodeId::item("iron-plate")).map(|n| n.kind),
            Some(FlowNodeKind::Raw)
        );
        assert_eq!(
            graph.node(&NodeId::item("copper-cable")).map(|n| n.kind),
            Some(FlowNodeKind::Item)
        );

        let cable_in = graph
            .links
            .iter()
            .find(|l| l.source == NodeId::item("copper-cable"))
            .expect("cable link");
        assert_eq!(cable_in.value, 3.0);
        assert_eq!(graph.links.len(), 5);
    }

    #[test]
    fn test_link_value_floor() {
        let index = RecipeIndex::from_recipes([RecipeDefinition::builder("bulk")
            .ingredient("trace", 1.0)
            .result("bulk", 1000.0)
            .build()]);

        let graph = build_flow_graph(&index, "bulk", 1.0, DEFAULT_FLOW_DEPTH).expect("flow");
        let trace_link = graph
            .links
            .iter()
            .find(|l| l.source == NodeId::item("trace"))
            .expect("trace link");
        assert_eq!(trace_link.value, MIN_LINK_VALUE);
    }

    #[test]
    fn test_depth_limit_labels_raw() {
        let index = RecipeIndex::from_recipes([
            RecipeDefinition::builder("a")
                .ingredient("b", 1.0)
                .result("a", 1.0)
                .build(),
            RecipeDefinition::builder("b")
                .ingredient("c", 1.0)
                .result("b", 1.0)
                .build(),
            RecipeDefinition::builder("c")
                .ingredient("d", 1.0)
                .result("c", 1.0)
                .build(),
        ]);

        let graph = build_flow_graph(&index, "a", 1.0, 1).expect("flow");
        assert_eq!(
            graph.node(&NodeId::item("b")).map(|n| n.kind),
            Some(FlowNodeKind::Raw)
        );
        assert!(graph.node(&NodeId::recipe("b")).is_none());
        assert!(graph.node(&NodeId::item("c")).is_none());
    }

    #[test]
    fn test_first_discovery_label_sticks() {
        // "gear" is first reached at the depth limit through the long branch,
        // then reached again one level down through the short branch.
        let index = RecipeIndex::from_recipes([
            RecipeDefinition::builder("top")
                .ingredient("deep", 1.0)
                .ingredient("gear", 1.0)
                .result("top", 1.0)
                .build(),
            RecipeDefinition::builder("deep")
                .ingredient("mid", 1.0)
                .result("deep", 1.0)
                .build(),
            RecipeDefinition::builder("mid")
                .ingredient("gear", 1.0)
                .result("mid", 1.0)
                .build(),
            RecipeDefinition::builder("gear")
                .ingredient("plate", 1.0)
                .result("gear", 1.0)
                .build(),
        ]);

        let graph = build_flow_graph(&index, "top", 1.0, 3).expect("flow");
        assert_eq!(
            graph.node(&NodeId::item("gear")).map(|n| n.kind),
            Some(FlowNodeKind::Raw)
        );
        assert!(graph.node(&NodeId::recipe("gear")).is_some());
        assert!(graph
            .links
            .iter()
            .any(|l| l.source == NodeId::recipe("gear") && l.target == NodeId::item("gear")));
    }

    #[test]
    fn test_cycle_bounded() {
        let index = RecipeIndex::from_recipes([
            RecipeDefinition::builder("make-x")
                .ingredient("y", 1.0)
                .result("x", 1.0)
                .build(),
            RecipeDefinition::builder("make-y")
                .ingredient("x", 1.0)
                .result("y", 1.0)
                .build(),
        ]);

        let graph = build_flow_graph(&index, "x", 1.0, 100).expect("flow");
        assert_eq!(graph.nodes.len(), 4);
        // make-x -> x, y -> make-x, make-y -> y, x -> make-y
        assert_eq!(graph.links.len(), 4);
    }

    #[test]
    fn test_not_found() {
        let index = circuit_index();
        assert_eq!(
            build_flow_graph(&index, "copper-plate", 1.0, DEFAULT_FLOW_DEPTH),
            Err(PlannerError::not_found("copper-plate"))
        );
    }
}
