//! Planner query subcommands and dispatch.

use std::io::{self, Write};

use anyhow::Result;
use assembly_planner::prelude::*;
use clap::Subcommand;
use serde::Serialize;
use tracing::debug;

use crate::config::{PlannerConfig, MAX_DEPTH};

/// Planner queries. Each prints its result as JSON on stdout.
#[derive(Subcommand, Debug)]
pub enum Query {
    /// Aggregate upstream demand, highest rate first
    Demand {
        /// Target item
        item: String,
        /// Target rate in units per second
        #[arg(value_parser = parse_rate)]
        rate: f64,
    },

    /// Hierarchical production tree
    Tree {
        /// Target item
        item: String,
        /// Target rate in units per second
        #[arg(value_parser = parse_rate)]
        rate: f64,
        /// Recipe levels to expand (defaults to config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH)))]
        depth: Option<u32>,
    },

    /// Flat recipe/item/raw-material table
    Table {
        /// Target item
        item: String,
        /// Target rate in units per second
        #[arg(value_parser = parse_rate)]
        rate: f64,
    },

    /// Nodes and links for a flow diagram
    Flow {
        /// Target item
        item: String,
        /// Target rate in units per second
        #[arg(value_parser = parse_rate)]
        rate: f64,
        /// Recipe levels to expand (defaults to config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH)))]
        depth: Option<u32>,
    },

    /// The complete produces/consumes graph
    Graph,

    /// Neighbourhood graph around one or more seed items
    Explore {
        /// Seed items
        #[arg(required = true)]
        items: Vec<String>,
        /// Item hops per seed (defaults to config)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_DEPTH)))]
        depth: Option<u32>,
    },

    /// Items whose name or display name contains the query
    Search {
        /// Case-insensitive substring
        query: String,
    },
}

/// Rejects rates that are not positive finite numbers.
fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("invalid rate '{s}': {e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a positive number, got {s}"))
    }
}

/// Runs `query` against `index` and writes the JSON result to stdout.
pub fn run(query: &Query, index: &RecipeIndex, config: &PlannerConfig) -> Result<()> {
    debug!("Running {:?}", query);

    match query {
        Query::Demand { item, rate } => {
            emit(&compute_aggregate_demand(index, item, *rate)?, config)
        },
        Query::Tree { item, rate, depth } => {
            let depth = depth.map_or(config.tree_max_depth, |d| d as usize);
            emit(&build_tree(index, item, *rate, depth)?, config)
        },
        Query::Table { item, rate } => emit(&build_table(index, item, *rate)?, config),
        Query::Flow { item, rate, depth } => {
            let depth = depth.map_or(config.flow_max_depth, |d| d as usize);
            emit(&build_flow_graph(index, item, *rate, depth)?, config)
        },
        Query::Graph => emit(&build_complete_graph(index), config),
        Query::Explore { items, depth } => {
            let depth = depth.map_or(config.explore_depth, |d| d as usize);
            let graph = match items.as_slice() {
                [seed] => build_item_subgraph(index, seed, depth),
                seeds => build_multi_item_graph(index, seeds, depth),
            };
            emit(&graph, config)
        },
        Query::Search { query } => emit(&index.search_items(query), config),
    }
}

fn emit<T: Serialize>(value: &T, config: &PlannerConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if config.pretty_json {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("2.5"), Ok(2.5));
        assert!(parse_rate("0").is_err());
        assert!(parse_rate("-1").is_err());
        assert!(parse_rate("inf").is_err());
        assert!(parse_rate("fast").is_err());
    }
}
