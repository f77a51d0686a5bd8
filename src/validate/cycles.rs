//! Circular dependency detection over a layer's relation graph.

use std::collections::{HashMap, HashSet};

use super::check::{Check, CheckContext, CheckId};
use super::diagnostic::Diagnostic;
use crate::model::{Entity, Field};

/// Directed graph of resolved relations, nodes in document order.
struct RelationGraph<'a> {
    nodes: Vec<&'a str>,
    edges: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> RelationGraph<'a> {
    /// Edges whose endpoints both resolve to entity IDs. Self-loops are left
    /// out; the reference stage reports those on its own.
    fn build(entities: &'a [Field<Entity>]) -> Self {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();
        for entity in entities.iter().filter_map(Field::get) {
            if let Some(id) = entity.id() {
                if seen.insert(id) {
                    nodes.push(id);
                }
            }
        }

        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        for entity in entities.iter().filter_map(Field::get) {
            let Some(owner) = entity.id() else { continue };
            for rel in entity.relations() {
                let Some(target) = rel.target.as_deref() else {
                    continue;
                };
                let source = rel.origin(owner);
                if source == target || !seen.contains(source) || !seen.contains(target) {
                    continue;
                }
                edges.entry(source).or_default().push(target);
            }
        }

        Self { nodes, edges }
    }

    fn neighbors(&self, node: &str) -> &[&'a str] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Find circular dependencies among entity relations.
///
/// Runs a depth-first search from each unvisited entity in document order
/// and keeps at most the first cycle reached from each root. Each cycle is
/// returned once, as a closed path: `[a, b, c, a]`.
pub fn detect_cycles(entities: &[Field<Entity>]) -> Vec<Vec<String>> {
    let graph = RelationGraph::build(entities);
    let mut visited: HashSet<&str> = HashSet::new();
    let mut reported: HashSet<Vec<String>> = HashSet::new();
    let mut cycles = Vec::new();

    for &root in &graph.nodes {
        if visited.contains(root) {
            continue;
        }
        if let Some(cycle) = first_cycle_from(&graph, root, &mut visited) {
            if reported.insert(canonical(&cycle)) {
                cycles.push(cycle);
            }
        }
    }

    cycles
}

/// Iterative DFS from `root` that stops at the first back edge.
fn first_cycle_from<'a>(
    graph: &RelationGraph<'a>,
    root: &'a str,
    visited: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    // (node, index of the next neighbor to explore)
    let mut stack: Vec<(&'a str, usize)> = vec![(root, 0)];
    let mut on_path: HashSet<&str> = HashSet::from([root]);
    visited.insert(root);

    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        let Some(&neighbor) = graph.neighbors(node).get(next) else {
            on_path.remove(node);
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if on_path.contains(neighbor) {
            let start = stack.iter().position(|(n, _)| *n == neighbor)?;
            let mut cycle: Vec<String> =
                stack[start..].iter().map(|(n, _)| n.to_string()).collect();
            cycle.push(neighbor.to_string());
            return Some(cycle);
        }
        if visited.insert(neighbor) {
            on_path.insert(neighbor);
            stack.push((neighbor, 0));
        }
    }

    None
}

/// Rotation-independent key for a closed cycle path.
fn canonical(cycle: &[String]) -> Vec<String> {
    let open = &cycle[..cycle.len().saturating_sub(1)];
    let Some(min_pos) = open
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(pos, _)| pos)
    else {
        return Vec::new();
    };
    open[min_pos..]
        .iter()
        .chain(&open[..min_pos])
        .cloned()
        .collect()
}

/// Cycle stage, as run by the validator pipeline.
pub struct CycleCheck;

impl Check for CycleCheck {
    fn id(&self) -> CheckId {
        CheckId::new("cycles")
    }

    fn name(&self) -> &str {
        "Circular dependencies"
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Vec<Diagnostic> {
        let cycles = detect_cycles(ctx.entities);
        tracing::debug!(layer = %ctx.spec.layer, cycles = cycles.len(), "cycle stage complete");
        cycles
            .into_iter()
            .map(|cycle| {
                Diagnostic::warning(
                    self.id(),
                    format!("Circular dependency detected: {}", cycle.join(" -> ")),
                )
                .with_location(ctx.spec.collection)
                .with_recommendation("Break the cycle by removing or inverting one relation")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entities(value: Value) -> Vec<Field<Entity>> {
        serde_json::from_value(value).unwrap()
    }

    fn chain(edges: &[(&str, &str)], nodes: &[&str]) -> Vec<Field<Entity>> {
        let list: Vec<Value> = nodes
            .iter()
            .map(|id| {
                let relations: Vec<Value> = edges
                    .iter()
                    .filter(|(from, _)| from == id)
                    .map(|(from, to)| json!({"source": from, "target": to}))
                    .collect();
                json!({"id": id, "relations": relations})
            })
            .collect();
        entities(Value::Array(list))
    }

    #[test]
    fn three_node_cycle() {
        let ents = chain(&[("a", "b"), ("b", "c"), ("c", "a")], &["a", "b", "c"]);
        assert_eq!(detect_cycles(&ents), vec![vec!["a", "b", "c", "a"]]);
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let ents = chain(&[("a", "b"), ("b", "c"), ("a", "c")], &["a", "b", "c"]);
        assert!(detect_cycles(&ents).is_empty());
    }

    #[test]
    fn detection_is_idempotent() {
        let ents = chain(
            &[("a", "b"), ("b", "a"), ("c", "d"), ("d", "e"), ("e", "c")],
            &["a", "b", "c", "d", "e"],
        );
        let first: HashSet<Vec<String>> = detect_cycles(&ents).into_iter().collect();
        let second: HashSet<Vec<String>> = detect_cycles(&ents).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn path_starts_where_cycle_closes() {
        let ents = chain(&[("a", "b"), ("b", "c"), ("c", "b")], &["a", "b", "c"]);
        assert_eq!(detect_cycles(&ents), vec![vec!["b", "c", "b"]]);
    }

    #[test]
    fn only_first_cycle_per_root() {
        // Both b->a and c->a close a cycle through a; only the first is kept.
        let ents = chain(
            &[("a", "b"), ("b", "a"), ("a", "c"), ("c", "a")],
            &["a", "b", "c"],
        );
        assert_eq!(detect_cycles(&ents), vec![vec!["a", "b", "a"]]);
    }

    #[test]
    fn self_loops_and_unknown_targets_are_ignored() {
        let ents = entities(json!([
            {"id": "a", "relations": [{"target": "a"}, {"target": "ghost"}]},
            {"id": "b"}
        ]));
        assert!(detect_cycles(&ents).is_empty());
    }

    #[test]
    fn owner_is_the_implicit_source() {
        let ents = entities(json!([
            {"id": "api", "relations": [{"target": "worker"}]},
            {"id": "worker", "relations": [{"target": "api"}]}
        ]));
        assert_eq!(detect_cycles(&ents), vec![vec!["api", "worker", "api"]]);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let ids: Vec<String> = (0..20_000).map(|i| format!("n{}", i)).collect();
        let list: Vec<Value> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let next = &ids[(i + 1) % ids.len()];
                json!({"id": id, "relations": [{"target": next}]})
            })
            .collect();
        let cycles = detect_cycles(&entities(Value::Array(list)));
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 20_001);
    }

    #[test]
    fn canonical_ignores_rotation() {
        let a: Vec<String> = ["b", "c", "a", "b"].iter().map(|s| s.to_string()).collect();
        let b: Vec<String> = ["a", "b", "c", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(canonical(&a), canonical(&b));
    }
}
