use crate::ir::graph::IrGraph;
use petgraph::graph::NodeIndex;

/// Finds an edge that closes a cycle, if any.
///
/// Depth-first search with an explicit stack: a successor still on the
/// recursion stack closes a cycle, finished nodes are never re-entered.
pub fn find_back_edge(g: &IrGraph) -> Option<(NodeIndex, NodeIndex)> {
    let graph = &g.graph;
    let mut visited = vec![false; graph.node_count()];
    let mut on_stack = vec![false; graph.node_count()];

    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }
        visited[start.index()] = true;
        on_stack[start.index()] = true;
        let mut stack = vec![(start, graph.neighbors(start))];

        while let Some((node, successors)) = stack.last_mut() {
            let node = *node;
            match successors.next() {
                Some(next) if on_stack[next.index()] => return Some((node, next)),
                Some(next) if !visited[next.index()] => {
                    visited[next.index()] = true;
                    on_stack[next.index()] = true;
                    stack.push((next, graph.neighbors(next)));
                }
                Some(_) => {}
                None => {
                    on_stack[node.index()] = false;
                    stack.pop();
                }
            }
        }
    }
    None
}
