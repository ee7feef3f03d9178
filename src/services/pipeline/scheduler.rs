//! Pipeline Scheduler
//!
//! Computes an execution order for a pipeline's nodes that respects every
//! declared edge when the graph allows it, and degrades deterministically
//! when it does not. The scheduler never fails: a cyclic or disconnected
//! graph falls back to declaration order for the unresolved remainder, and
//! edges referencing undeclared ids are tracked as extra vertices rather
//! than rejected.
//!
//! Implemented as iterative Kahn's algorithm over an index-based arena
//! (adjacency lists + indegree counts), so malformed graphs cannot recurse
//! or loop forever.

use std::collections::{HashMap, VecDeque};

use crate::models::pipeline::PipelineDefinition;

/// A computed execution order plus any soft-degrade warnings.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Vertex ids in execution order. Ids that appear only in edges are
    /// included; the executor skips them with a warning.
    pub order: Vec<String>,
    /// Warnings recorded while ordering (cycles, disconnected components).
    pub warnings: Vec<String>,
}

/// Compute the execution order for a pipeline.
///
/// With no edges the order is declaration order. Otherwise Kahn's
/// algorithm runs with declaration order as the tie-break: the initial
/// ready queue lists zero-indegree nodes in declaration order, and the
/// queue drains FIFO. Every declared node appears in the result exactly
/// once; nodes trapped in a cycle or unreachable from any zero-indegree
/// vertex are appended in declaration order with a warning.
pub fn schedule(pipeline: &PipelineDefinition) -> Schedule {
    if pipeline.edges.is_empty() {
        return Schedule {
            order: pipeline.nodes.iter().map(|n| n.id.clone()).collect(),
            warnings: Vec::new(),
        };
    }

    // Vertex arena: declared nodes first (declaration order), then ids that
    // appear only in edges, in first-appearance order.
    let mut ids: Vec<String> = pipeline.nodes.iter().map(|n| n.id.clone()).collect();
    let mut index_of: HashMap<String, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), i))
        .collect();
    let declared_count = ids.len();

    for edge in &pipeline.edges {
        for endpoint in [&edge.from, &edge.to] {
            if !index_of.contains_key(endpoint) {
                index_of.insert(endpoint.clone(), ids.len());
                ids.push(endpoint.clone());
            }
        }
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    let mut indegree: Vec<usize> = vec![0; ids.len()];
    for edge in &pipeline.edges {
        let from = index_of[&edge.from];
        let to = index_of[&edge.to];
        adjacency[from].push(to);
        indegree[to] += 1;
    }

    let mut queue: VecDeque<usize> = (0..ids.len()).filter(|&i| indegree[i] == 0).collect();
    let mut order: Vec<String> = Vec::with_capacity(ids.len());
    let mut emitted: Vec<bool> = vec![false; ids.len()];

    while let Some(current) = queue.pop_front() {
        emitted[current] = true;
        order.push(ids[current].clone());
        for &next in &adjacency[current] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    let mut warnings = Vec::new();
    let unresolved: Vec<&str> = (0..declared_count)
        .filter(|&i| !emitted[i])
        .map(|i| ids[i].as_str())
        .collect();
    if !unresolved.is_empty() {
        warnings.push(format!(
            "pipeline '{}' has a cycle or unreachable nodes; falling back to declaration order for: {}",
            pipeline.name,
            unresolved.join(", ")
        ));
        for i in 0..declared_count {
            if !emitted[i] {
                order.push(ids[i].clone());
            }
        }
    }

    Schedule { order, warnings }
}
