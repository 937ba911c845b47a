//! Produces/consumes graph exploration.
//!
//! Independent of demand propagation: these builders expose the bipartite
//! recipe/item graph itself, either whole or around seed items. Unlike the
//! planners, exploration follows every producing recipe, not just the first.

use ahash::AHashSet;
use assembly_common::{NodeId, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dataset::{ItemAmount, RecipeDefinition};
use crate::index::RecipeIndex;

/// Default number of item hops explored around a seed.
pub const DEFAULT_EXPLORE_DEPTH: usize = 2;

/// Edge relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relationship {
    /// Recipe -> item: the recipe lists the item among its results.
    Produces,
    /// Item -> recipe: the recipe lists the item among its ingredients.
    ConsumedBy,
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node identifier.
    pub id: NodeId,
    /// Display label.
    pub label: String,
    /// Recipe or item.
    pub kind: NodeKind,
    /// Recipe category (recipe nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Item group (item nodes with metadata only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// A graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Relationship between source and target.
    pub relationship: Relationship,
    /// Amount per craft from the recipe's ingredient or result entry.
    pub amount: f64,
}

impl GraphEdge {
    /// Identity used when merging graphs.
    #[must_use]
    pub fn key(&self) -> (NodeId, NodeId, Relationship) {
        (self.source.clone(), self.target.clone(), self.relationship)
    }
}

/// A recipe/item graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeGraph {
    /// Nodes in discovery order.
    pub nodes: Vec<GraphNode>,
    /// Edges in discovery order.
    pub edges: Vec<GraphEdge>,
}

impl RecipeGraph {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Returns true if the graph has an edge with this (source, target, relationship).
    #[must_use]
    pub fn contains_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
        relationship: Relationship,
    ) -> bool {
        self.edges.iter().any(|e| {
            &e.source == source && &e.target == target && e.relationship == relationship
        })
    }

    /// Structural union: nodes deduplicated by id, edges by
    /// (source, target, relationship). The first occurrence wins.
    #[must_use]
    pub fn union(graphs: impl IntoIterator<Item = RecipeGraph>) -> Self {
        let mut acc = GraphAccumulator::default();
        for graph in graphs {
            for node in graph.nodes {
                acc.nodes.entry(node.id.clone()).or_insert(node);
            }
            for edge in graph.edges {
                acc.edges.entry(edge.key()).or_insert(edge);
            }
        }
        acc.into_graph()
    }
}

/// Deduplicating node/edge collector.
#[derive(Default)]
struct GraphAccumulator {
    nodes: IndexMap<NodeId, GraphNode>,
    edges: IndexMap<(NodeId, NodeId, Relationship), GraphEdge>,
}

impl GraphAccumulator {
    fn add_item(&mut self, index: &RecipeIndex, item: &str) -> NodeId {
        let id = NodeId::item(item);
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| item_node(index, item));
        id
    }

    fn add_recipe(&mut self, recipe: &RecipeDefinition) -> NodeId {
        let id = NodeId::recipe(recipe.key.as_str());
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| recipe_node(recipe));
        id
    }

    fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        relationship: Relationship,
        amount: f64,
    ) {
        let edge = GraphEdge {
            source,
            target,
            relationship,
            amount,
        };
        self.edges.entry(edge.key()).or_insert(edge);
    }

    fn into_graph(self) -> RecipeGraph {
        RecipeGraph {
            nodes: self.nodes.into_values().collect(),
            edges: self.edges.into_values().collect(),
        }
    }
}

fn item_node(index: &RecipeIndex, item: &str) -> GraphNode {
    GraphNode {
        id: NodeId::item(item),
        label: index.display_name(item).to_string(),
        kind: NodeKind::Item,
        category: None,
        group: index.item_metadata(item).and_then(|m| m.group.clone()),
    }
}

fn recipe_node(recipe: &RecipeDefinition) -> GraphNode {
    GraphNode {
        id: NodeId::recipe(recipe.key.as_str()),
        label: recipe.key.clone(),
        kind: NodeKind::Recipe,
        category: Some(recipe.category.clone()),
        group: None,
    }
}

/// The whole produces/consumes graph: one node per recipe and per referenced
/// item, one edge per ingredient entry and per result entry.
pub fn build_complete_graph(index: &RecipeIndex) -> RecipeGraph {
    let mut nodes: IndexMap<NodeId, GraphNode> = IndexMap::new();
    let mut edges = Vec::new();

    for recipe in index.recipes() {
        let recipe_id = NodeId::recipe(recipe.key.as_str());
        nodes
            .entry(recipe_id.clone())
            .or_insert_with(|| recipe_node(recipe));

        for ingredient in &recipe.ingredients {
            let item_id = NodeId::item(ingredient.name.as_str());
            nodes
                .entry(item_id.clone())
                .or_insert_with(|| item_node(index, &ingredient.name));
            edges.push(GraphEdge {
                source: item_id,
                target: recipe_id.clone(),
                relationship: Relationship::ConsumedBy,
                amount: ingredient.amount,
            });
        }

        for result in &recipe.results {
            let item_id = NodeId::item(result.name.as_str());
            nodes
                .entry(item_id.clone())
                .or_insert_with(|| item_node(index, &result.name));
            edges.push(GraphEdge {
                source: recipe_id.clone(),
                target: item_id,
                relationship: Relationship::Produces,
                amount: result.amount,
            });
        }
    }

    debug!(
        "Built complete graph: {} nodes, {} edges",
        nodes.len(),
        edges.len()
    );
    RecipeGraph {
        nodes: nodes.into_values().collect(),
        edges,
    }
}

struct SubgraphExplorer<'a> {
    index: &'a RecipeIndex,
    max_depth: usize,
    acc: GraphAccumulator,
}

impl<'a> SubgraphExplorer<'a> {
    fn explore(&mut self, item: &'a str, depth: usize, visited: &AHashSet<&'a str>) {
        let index = self.index;
        let item_id = self.acc.add_item(index, item);

        if depth >= self.max_depth {
            return;
        }
        if visited.contains(item) {
            trace!("Already on path: {}", item);
            return;
        }

        let mut path = visited.clone();
        path.insert(item);

        for producer in index.recipes_for_item(item) {
            let recipe_id = self.acc.add_recipe(producer);
            let amount = amount_of(&producer.results, item);
            self.acc
                .add_edge(recipe_id.clone(), item_id.clone(), Relationship::Produces, amount);

            for ingredient in &producer.ingredients {
                let ingredient_id = self.acc.add_item(index, &ingredient.name);
                self.acc.add_edge(
                    ingredient_id,
                    recipe_id.clone(),
                    Relationship::ConsumedBy,
                    ingredient.amount,
                );
                self.explore(&ingredient.name, depth + 1, &path);
            }
        }

        for consumer in index.consumers_of(item) {
            let recipe_id = self.acc.add_recipe(consumer);
            let amount = amount_of(&consumer.ingredients, item);
            self.acc
                .add_edge(item_id.clone(), recipe_id.clone(), Relationship::ConsumedBy, amount);

            for result in &consumer.results {
                let result_id = self.acc.add_item(index, &result.name);
                self.acc.add_edge(
                    recipe_id.clone(),
                    result_id,
                    Relationship::Produces,
                    result.amount,
                );
                self.explore(&result.name, depth + 1, &path);
            }
        }
    }
}

fn amount_of(entries: &[ItemAmount], item: &str) -> f64 {
    entries
        .iter()
        .find(|e| e.name == item)
        .map_or(0.0, |e| e.amount)
}

/// Bidirectional neighbourhood of `seed_item`: every recipe producing it
/// (and their ingredients) and every recipe consuming it (and their results),
/// repeated up to `max_depth` item hops.
///
/// An item no recipe references yields a graph holding only the seed.
pub fn build_item_subgraph(index: &RecipeIndex, seed_item: &str, max_depth: usize) -> RecipeGraph {
    let mut explorer = SubgraphExplorer {
        index,
        max_depth,
        acc: GraphAccumulator::default(),
    };

    // Recurse with names borrowed from the index; the seed itself may not be in it.
    let seed = index.items().find(|i| *i == seed_item);
    match seed {
        Some(seed) => explorer.explore(seed, 0, &AHashSet::new()),
        None => {
            explorer.acc.add_item(index, seed_item);
        },
    }

    let graph = explorer.acc.into_graph();
    debug!(
        "Explored {} to depth {}: {} nodes, {} edges",
        seed_item,
        max_depth,
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

/// Union of [`build_item_subgraph`] run independently for each seed.
///
/// Each seed gets its own full depth budget; this is not a joint exploration.
pub fn build_multi_item_graph<S: AsRef<str>>(
    index: &RecipeIndex,
    seeds: &[S],
    depth: usize,
) -> RecipeGraph {
    RecipeGraph::union(
        seeds
            .iter()
            .map(|seed| build_item_subgraph(index, seed.as_ref(), depth)),
    )
}
