//! Import dependency graph between documents
//!
//! An edge `a -> b` means document `a` imports `b`. Targets need not be
//! present in the workspace: an edge onto a missing document records who is
//! waiting for it, so adding it later can invalidate those importers.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::kosaraju_scc;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::document::DocumentId;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<DocumentId, ()>,
    indices: HashMap<DocumentId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, id: &DocumentId) -> NodeIndex {
        if let Some(&idx) = self.indices.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.indices.insert(id.clone(), idx);
        idx
    }

    /// Replace the outgoing edges of `from` with edges onto `targets`
    pub fn set_imports<'a>(
        &mut self,
        from: &DocumentId,
        targets: impl IntoIterator<Item = &'a DocumentId>,
    ) {
        self.clear_imports(from);

        let from_idx = self.node(from);
        let mut seen = HashSet::new();
        for target in targets {
            if seen.insert(target.clone()) {
                let to_idx = self.node(target);
                self.graph.add_edge(from_idx, to_idx, ());
            }
        }
    }

    /// Drop every outgoing edge of `from`
    pub fn clear_imports(&mut self, from: &DocumentId) {
        let Some(&from_idx) = self.indices.get(from) else {
            return;
        };

        let edges: Vec<_> = self
            .graph
            .edges_directed(from_idx, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        for edge in edges {
            self.graph.remove_edge(edge);
        }
    }

    /// Documents `id` imports directly
    pub fn imports_of(&self, id: &DocumentId) -> Vec<DocumentId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Documents importing `id` directly
    pub fn importers_of(&self, id: &DocumentId) -> Vec<DocumentId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &DocumentId, direction: Direction) -> Vec<DocumentId> {
        let Some(&idx) = self.indices.get(id) else {
            return Vec::new();
        };

        let mut ids: Vec<DocumentId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Every document that reaches `id` through imports, excluding `id`
    /// itself unless it sits on an import cycle.
    pub fn transitive_importers(&self, id: &DocumentId) -> Vec<DocumentId> {
        let Some(&start) = self.indices.get(id) else {
            return Vec::new();
        };

        let mut result = HashSet::new();
        let mut to_visit = VecDeque::new();
        to_visit.push_back(start);

        while let Some(current) = to_visit.pop_front() {
            for importer in self.graph.neighbors_directed(current, Direction::Incoming) {
                if result.insert(importer) {
                    to_visit.push_back(importer);
                }
            }
        }

        let mut ids: Vec<DocumentId> = result.into_iter().map(|n| self.graph[n].clone()).collect();
        ids.sort();
        ids
    }

    /// Groups of documents that import each other, directly or transitively
    pub fn cycles(&self) -> Vec<Vec<DocumentId>> {
        let mut cycles: Vec<Vec<DocumentId>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.find_edge(n, n).is_some())
            })
            .map(|scc| {
                let mut ids: Vec<DocumentId> =
                    scc.into_iter().map(|n| self.graph[n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Remove nodes without edges unless `keep` says the document still exists
    pub fn prune(&mut self, keep: impl Fn(&DocumentId) -> bool) {
        let mut orphans = Vec::new();
        for (id, &idx) in &self.indices {
            let isolated = self.graph.neighbors_undirected(idx).next().is_none();
            if isolated && !keep(id) {
                orphans.push((id.clone(), idx));
            }
        }

        for (id, idx) in orphans {
            self.graph.remove_node(idx);
            self.indices.remove(&id);
        }
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.indices.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
