//! Program dependency graph (PDG) for one sequence.
//!
//! The raw PDG file names nodes by frame range definition. Some of those
//! nodes are not named tasks (they are missing from the task name map);
//! they are contracted away before the graph is exposed, so the resulting
//! graph is over task identifiers only.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::model::frame_range::FrameRangeDef;
use crate::program::namemap::TaskNameMap;
use crate::storage::OrderedMap;
use crate::{zlog_debug, Error, Result};

/// Contents of a raw PDG file: `{"id_map": {def: id}, "e": [[from, to]]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPdg {
    pub id_map: OrderedMap<FrameRangeDef, i64>,
    #[serde(default)]
    pub e: Vec<(i64, i64)>,
}

/// Mutable edge state used during contraction.
#[derive(Debug, Default)]
struct Adjacency {
    preds: BTreeMap<i64, BTreeSet<i64>>,
    succs: BTreeMap<i64, BTreeSet<i64>>,
}

impl Adjacency {
    fn from_edges(edges: &[(i64, i64)]) -> Self {
        let mut adj = Self::default();
        for &(from, to) in edges {
            adj.insert(from, to);
        }
        adj
    }

    fn insert(&mut self, from: i64, to: i64) {
        self.succs.entry(from).or_default().insert(to);
        self.preds.entry(to).or_default().insert(from);
    }

    /// Remove `node`, linking each of its current predecessors to each of
    /// its current successors. Returns the number of bridging edges.
    fn contract(&mut self, node: i64) -> usize {
        let preds = self.preds.remove(&node).unwrap_or_default();
        let succs = self.succs.remove(&node).unwrap_or_default();

        for p in &preds {
            if let Some(out) = self.succs.get_mut(p) {
                out.remove(&node);
            }
        }
        for s in &succs {
            if let Some(inc) = self.preds.get_mut(s) {
                inc.remove(&node);
            }
        }

        let mut bridged = 0;
        for &p in preds.iter().filter(|&&p| p != node) {
            for &s in succs.iter().filter(|&&s| s != node) {
                self.insert(p, s);
                bridged += 1;
            }
        }
        bridged
    }

    fn edges(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.succs
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }
}

/// Directed precedence graph over task identifiers.
///
/// An edge `a -> b` means `a` must happen before `b`. Cycles and self-loops
/// from the raw annotation are kept as-is.
#[derive(Clone, Default)]
pub struct ProgramDependencyGraph {
    graph: DiGraph<String, ()>,
    task_index: HashMap<String, NodeIndex>,
}

impl ProgramDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contract every raw node that is not in `names`, then translate the
    /// surviving nodes into task identifiers.
    ///
    /// Invalid nodes are processed one at a time in `id_map` order against
    /// the current edge state, so runs of consecutive invalid nodes bridge
    /// transitively. Every identifier in `names` becomes a node, whether or
    /// not the raw graph mentions it.
    pub fn build(raw: &RawPdg, names: &TaskNameMap) -> Result<Self> {
        let mut adj = Adjacency::from_edges(&raw.e);
        let mut id_to_name: HashMap<i64, &str> = HashMap::new();
        let mut contracted = 0usize;
        let mut bridged = 0usize;

        for (def, &id) in raw.id_map.iter() {
            match names.name_of(def) {
                Some(name) => {
                    id_to_name.insert(id, name);
                }
                None => {
                    bridged += adj.contract(id);
                    contracted += 1;
                }
            }
        }
        zlog_debug!(
            "PDG contraction: {} raw nodes, {} contracted, {} bridging edges",
            raw.id_map.len(),
            contracted,
            bridged
        );

        let mut pdg = Self::new();
        for name in names.names() {
            pdg.add_task(name);
        }
        for (from, to) in adj.edges() {
            let lookup = |id: i64| {
                id_to_name.get(&id).copied().ok_or_else(|| Error::MissingEntry {
                    kind: "PDG node",
                    key: id.to_string(),
                })
            };
            pdg.add_dependency(lookup(from)?, lookup(to)?)?;
        }
        Ok(pdg)
    }

    /// Add a task node. Returns the existing index if already present.
    pub fn add_task(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.task_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.task_index.insert(name.to_string(), index);
        index
    }

    /// Record that `from` precedes `to`. Repeated edges are stored once.
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<()> {
        let from_index = self.node(from)?;
        let to_index = self.node(to)?;
        self.graph.update_edge(from_index, to_index, ());
        Ok(())
    }

    fn node(&self, name: &str) -> Result<NodeIndex> {
        self.task_index
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingEntry {
                kind: "PDG task",
                key: name.to_string(),
            })
    }

    pub fn contains_task(&self, name: &str) -> bool {
        self.task_index.contains_key(name)
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn has_dependency(&self, from: &str, to: &str) -> bool {
        match (self.task_index.get(from), self.task_index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Tasks that must happen before `name`.
    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, petgraph::Direction::Incoming)
    }

    /// Tasks that must happen after `name`.
    pub fn successors(&self, name: &str) -> Vec<&str> {
        self.neighbors(name, petgraph::Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, dir: petgraph::Direction) -> Vec<&str> {
        match self.task_index.get(name) {
            Some(&index) => self
                .graph
                .neighbors_directed(index, dir)
                .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Task identifiers in insertion order.
    pub fn tasks(&self) -> Vec<&str> {
        self.graph.node_weights().map(String::as_str).collect()
    }

    pub fn dependencies(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((self.graph[a].as_str(), self.graph[b].as_str()))
            })
            .collect()
    }

    /// Tasks ordered so that every task comes after its predecessors.
    ///
    /// # Errors
    /// Returns an error if the raw annotation contained a cycle.
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            Error::PdgCycle(
                self.graph
                    .node_weight(cycle.node_id())
                    .cloned()
                    .unwrap_or_default(),
            )
        })?;
        Ok(sorted
            .into_iter()
            .filter_map(|i| self.graph.node_weight(i).map(String::as_str))
            .collect())
    }

    pub fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}

impl PartialEq for ProgramDependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        let nodes: HashSet<&str> = self.tasks().into_iter().collect();
        let other_nodes: HashSet<&str> = other.tasks().into_iter().collect();
        let edges: HashSet<(&str, &str)> = self.dependencies().into_iter().collect();
        let other_edges: HashSet<(&str, &str)> = other.dependencies().into_iter().collect();
        nodes == other_nodes && edges == other_edges
    }
}

impl std::fmt::Debug for ProgramDependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramDependencyGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
