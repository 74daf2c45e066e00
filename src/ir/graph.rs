use crate::ir::RezonicIR;
use crate::ir::port::{PortRef, PortRefError};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    /// False for ids that only appear in edge endpoints.
    pub declared: bool,
}

pub type Endpoint = Result<PortRef, PortRefError>;

/// Arena-indexed view of the node-id graph induced by an IR's edges.
#[derive(Debug, Clone, Default)]
pub struct IrGraph {
    pub graph: DiGraph<GraphNode, ()>,
    pub node_map: HashMap<String, NodeIndex>,
    /// Parsed `(source, target)` of every IR edge, in IR order.
    pub endpoints: Vec<(Endpoint, Endpoint)>,
}

impl IrGraph {
    pub fn build(ir: &RezonicIR) -> Self {
        let mut g = IrGraph::default();

        // 1. Declared nodes, first occurrence wins
        for node in &ir.nodes {
            if !g.node_map.contains_key(&node.id) {
                g.add_node(&node.id, true);
            }
        }

        // 2. Edges; undeclared endpoints still take part in the graph
        for (source, target) in &ir.edges {
            let endpoints = (source.parse::<PortRef>(), target.parse::<PortRef>());
            if let (Ok(src), Ok(dst)) = &endpoints {
                let src_idx = g.get_or_add(&src.node_id);
                let dst_idx = g.get_or_add(&dst.node_id);
                g.graph.add_edge(src_idx, dst_idx, ());
            }
            g.endpoints.push(endpoints);
        }
        g
    }

    fn add_node(&mut self, id: &str, declared: bool) -> NodeIndex {
        let idx = self.graph.add_node(GraphNode { id: id.to_string(), declared });
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    fn get_or_add(&mut self, id: &str) -> NodeIndex {
        match self.node_map.get(id) {
            Some(&idx) => idx,
            None => self.add_node(id, false),
        }
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx].id
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.index_of(id).is_some_and(|idx| self.graph[idx].declared)
    }

    /// Edges whose endpoints both parsed, with their position in the IR.
    pub fn well_formed_edges(&self) -> impl Iterator<Item = (usize, &PortRef, &PortRef)> {
        self.endpoints.iter().enumerate().filter_map(|(pos, endpoints)| match endpoints {
            (Ok(src), Ok(dst)) => Some((pos, src, dst)),
            _ => None,
        })
    }

    /// Every node with a path into one of `seeds`, seeds included.
    pub fn ancestors(&self, seeds: impl IntoIterator<Item = NodeIndex>) -> HashSet<NodeIndex> {
        let mut keep = HashSet::new();
        let mut stack = Vec::new();
        for idx in seeds {
            if keep.insert(idx) {
                stack.push(idx);
            }
        }

        while let Some(idx) = stack.pop() {
            for neighbor in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if keep.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        keep
    }
}
