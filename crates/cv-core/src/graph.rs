//! Warehouse dependency graph: cycle detection and sequencing
//!
//! The graph is discovered, never authored: edges are recomputed on every
//! analysis run from what the catalog reports. It may be cyclic — acyclicity
//! is a property checked by [`DependencyGraph::find_cycles`], not assumed.

use crate::error::{CoreError, CoreResult};
use crate::warehouse_name::WarehouseName;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// One circular reference chain, closed: `w1 -> w2 -> ... -> w1`.
pub type Cycle = Vec<WarehouseName>;

/// A directed graph of cross-warehouse references.
///
/// Edges point from a warehouse to a warehouse it depends on. Every
/// warehouse reachable from the discovery seed appears as a node, even when
/// its dependency set is empty.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying graph
    graph: DiGraph<WarehouseName, ()>,

    /// Map from warehouse name to node index
    node_map: HashMap<WarehouseName, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a warehouse node, returning its index. Idempotent.
    pub fn add_warehouse(&mut self, name: &WarehouseName) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.clone());
            self.node_map.insert(name.clone(), idx);
            idx
        }
    }

    /// Record that `warehouse` depends on `depends_on`.
    ///
    /// Self-references are dropped (a warehouse referencing its own objects
    /// is not a cross-warehouse dependency), and duplicate edges are
    /// collapsed — the graph stores a set of distinct targets, not one edge
    /// per reference site.
    pub fn add_dependency(&mut self, warehouse: &WarehouseName, depends_on: &WarehouseName) {
        if warehouse == depends_on {
            return;
        }
        let from = self.add_warehouse(warehouse);
        let to = self.add_warehouse(depends_on);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Build a graph from a map of warehouse name -> dependency names.
    ///
    /// Dependency names that are not keys still become nodes, matching the
    /// invariant that every referenced warehouse appears in the graph.
    pub fn build(dependencies: &HashMap<String, Vec<String>>) -> CoreResult<Self> {
        let mut graph = Self::new();

        for (warehouse, deps) in dependencies {
            let warehouse = WarehouseName::try_new(warehouse.clone()).ok_or_else(|| {
                CoreError::EmptyName {
                    context: "warehouse name in dependency map".into(),
                }
            })?;
            graph.add_warehouse(&warehouse);
            for dep in deps {
                let dep = WarehouseName::try_new(dep.clone()).ok_or_else(|| {
                    CoreError::EmptyName {
                        context: format!("dependency of {warehouse}"),
                    }
                })?;
                graph.add_dependency(&warehouse, &dep);
            }
        }

        Ok(graph)
    }

    /// Number of warehouses in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Check whether the graph has no warehouses
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check whether a warehouse is present
    pub fn contains(&self, name: &WarehouseName) -> bool {
        self.node_map.contains_key(name)
    }

    /// All warehouse names, sorted
    pub fn warehouses(&self) -> Vec<WarehouseName> {
        let mut names: Vec<WarehouseName> = self.node_map.keys().cloned().collect();
        names.sort();
        names
    }

    /// Direct dependencies of a warehouse, sorted
    pub fn dependencies(&self, name: &WarehouseName) -> Vec<WarehouseName> {
        match self.node_map.get(name) {
            Some(&idx) => self
                .sorted_neighbors(idx, Direction::Outgoing)
                .into_iter()
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Find every circular reference chain in the graph.
    ///
    /// White/gray/black depth-first traversal: recursing into a warehouse
    /// already on the current recursion stack closes a cycle, reconstructed
    /// by slicing the DFS path from that warehouse's first occurrence. A
    /// warehouse that is finished (black) but not on the stack is a shared
    /// ancestor and is never re-explored or misreported.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut cycles: Vec<Cycle> = Vec::new();

        let mut roots: Vec<NodeIndex> = self.node_map.values().copied().collect();
        roots.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for root in roots {
            if !visited.contains(&root) {
                let mut on_stack: HashSet<NodeIndex> = HashSet::new();
                let mut path: Vec<NodeIndex> = Vec::new();
                self.cycle_dfs(root, &mut visited, &mut on_stack, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn cycle_dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
        cycles: &mut Vec<Cycle>,
    ) {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for next in self.sorted_neighbors(node, Direction::Outgoing) {
            if on_stack.contains(&next) {
                // Back-edge: the cycle is the path from `next` back to here,
                // plus the closing edge.
                if let Some(start) = path.iter().position(|&n| n == next) {
                    let mut cycle: Cycle =
                        path[start..].iter().map(|&n| self.graph[n].clone()).collect();
                    cycle.push(self.graph[next].clone());
                    cycles.push(cycle);
                }
            } else if !visited.contains(&next) {
                self.cycle_dfs(next, visited, on_stack, path, cycles);
            }
        }

        path.pop();
        on_stack.remove(&node);
    }

    /// Compute the processing order: dependencies before dependents.
    ///
    /// Kahn-style counting over the remaining-dependency count of each
    /// warehouse: zero-dependency warehouses are emitted first; emitting one
    /// decrements the count of every warehouse that listed it. Warehouses
    /// that become eligible together are emitted in case-insensitive
    /// lexicographic order, so runs are reproducible.
    ///
    /// The caller is expected to have checked [`find_cycles`](Self::find_cycles)
    /// first. If the order still comes up short — an undetected cycle or an
    /// inconsistent graph — this fails with the unresolved warehouses listed.
    pub fn sequence(&self) -> CoreResult<Vec<WarehouseName>> {
        let mut remaining: HashMap<NodeIndex, usize> = HashMap::new();
        let mut ready: BinaryHeap<Reverse<(WarehouseName, NodeIndex)>> = BinaryHeap::new();

        for &idx in self.node_map.values() {
            let count = self.graph.neighbors_directed(idx, Direction::Outgoing).count();
            remaining.insert(idx, count);
            if count == 0 {
                ready.push(Reverse((self.graph[idx].clone(), idx)));
            }
        }

        let mut order: Vec<WarehouseName> = Vec::with_capacity(self.graph.node_count());

        while let Some(Reverse((name, idx))) = ready.pop() {
            order.push(name);
            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(count) = remaining.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((self.graph[dependent].clone(), dependent)));
                    }
                }
            }
        }

        if order.len() != self.graph.node_count() {
            let emitted: HashSet<&WarehouseName> = order.iter().collect();
            let mut unresolved: Vec<String> = self
                .node_map
                .keys()
                .filter(|name| !emitted.contains(name))
                .map(|name| name.to_string())
                .collect();
            unresolved.sort_by_key(|s| s.to_ascii_lowercase());
            return Err(CoreError::UnresolvedOrder {
                unresolved: unresolved.join(", "),
            });
        }

        Ok(order)
    }

    /// Convenience wrapper: check for cycles, then sequence.
    ///
    /// Returns [`CoreError::CircularDependency`] listing every cycle path
    /// when the graph is cyclic.
    pub fn processing_order(&self) -> CoreResult<Vec<WarehouseName>> {
        let cycles = self.find_cycles();
        if !cycles.is_empty() {
            let rendered: Vec<String> = cycles.iter().map(|c| render_cycle(c)).collect();
            return Err(CoreError::CircularDependency {
                cycles: rendered.join("; "),
            });
        }
        self.sequence()
    }

    /// Neighbors of `idx` in `direction`, sorted by warehouse name for
    /// deterministic traversal and reporting.
    fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        neighbors
    }
}

/// Render a cycle as `A -> B -> A` for error messages and reports.
pub fn render_cycle(cycle: &Cycle) -> String {
    cycle
        .iter()
        .map(|w| w.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
