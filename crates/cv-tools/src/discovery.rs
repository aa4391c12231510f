//! Breadth-first dependency graph discovery via the catalog

use crate::traits::CatalogClient;
use cv_core::{DependencyGraph, WarehouseName};
use std::collections::{HashSet, VecDeque};

/// Build the transitive dependency graph reachable from `seed`.
///
/// Breadth-first traversal: each dequeued warehouse is recorded in the
/// graph, its catalog-reported dependency set becomes edges, and unseen
/// targets join the queue. The seen-set strictly grows over a finite
/// universe, so the traversal terminates.
///
/// A warehouse whose catalog query fails (access denied, unreachable) is
/// recorded with an empty dependency set and a warning — an inaccessible
/// warehouse must not block analysis of the rest of the chain, but its
/// omitted edges are a correctness risk the operator has to weigh.
pub async fn build_graph(seed: &WarehouseName, catalog: &dyn CatalogClient) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    let mut queue: VecDeque<WarehouseName> = VecDeque::new();
    let mut seen: HashSet<WarehouseName> = HashSet::new();

    queue.push_back(seed.clone());
    seen.insert(seed.clone());

    while let Some(current) = queue.pop_front() {
        graph.add_warehouse(&current);

        let deps = match catalog.referenced_warehouses(&current).await {
            Ok(deps) => deps,
            Err(e) => {
                log::warn!("Recording {current} without dependencies: {e}");
                continue;
            }
        };

        for dep in deps {
            graph.add_dependency(&current, &dep);
            if seen.insert(dep.clone()) {
                queue.push_back(dep);
            }
        }
    }

    graph
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
