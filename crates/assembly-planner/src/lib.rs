//! # Assembly Planner
//!
//! Recipe dependency resolution for crafting-game production planning.
//!
//! Given a target item and a desired output rate, this crate computes how
//! much of every upstream ingredient is needed and renders the result as:
//! - A flat, sorted demand list
//! - A hierarchical production tree
//! - A normalized production table
//! - A flow diagram graph
//!
//! It also exposes the raw produces/consumes graph, whole or around seeds.
//!
//! Everything reads an immutable [`RecipeIndex`]; no operation mutates shared
//! state, so queries may run concurrently against one index.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod dataset;
pub mod demand;
pub mod explorer;
pub mod flow;
pub mod index;
pub mod rates;
pub mod table;
pub mod tree;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::dataset::*;
    pub use crate::demand::*;
    pub use crate::explorer::*;
    pub use crate::flow::*;
    pub use crate::index::*;
    pub use crate::rates::*;
    pub use crate::table::*;
    pub use crate::tree::*;
    pub use assembly_common::{NodeId, NodeKind, PlannerError, PlannerResult};
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> RecipeIndex {
        RecipeIndex::from_recipes([
            RecipeDefinition::builder("widget")
                .time(1.0)
                .ingredient("a", 1.0)
                .ingredient("b", 2.0)
                .result("widget", 1.0)
                .build(),
            RecipeDefinition::builder("b")
                .ingredient("ore", 1.0)
                .result("b", 1.0)
                .build(),
        ])
    }

    #[test]
    fn test_root_rate_matches_target_in_every_view() {
        let index = sample_index();
        let rate = 7.77;

        let tree = build_tree(&index, "widget", rate, DEFAULT_TREE_DEPTH).expect("tree");
        assert_eq!(tree.rate, rate);

        let table = build_table(&index, "widget", rate).expect("table");
        assert_eq!(table.recipes["widget"].output_rate, rate);
        assert_eq!(table.items["widget"].produced_rate, rate);

        let flow = build_flow_graph(&index, "widget", rate, DEFAULT_FLOW_DEPTH).expect("flow");
        assert_eq!(flow.links[0].target, NodeId::item("widget"));
        assert_eq!(flow.links[0].value, rate);
    }

    #[test]
    fn test_index_is_shareable_across_threads() {
        let index = std::sync::Arc::new(sample_index());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let index = std::sync::Arc::clone(&index);
                std::thread::spawn(move || {
                    compute_aggregate_demand(&index, "widget", f64::from(i + 1))
                        .expect("demand")
                        .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("thread"), 3);
        }
    }
}
