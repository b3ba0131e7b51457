//! Graphviz rendering of a topology as boxed, series-chained blocks.

use super::block::{BlockId, FilterBlock};
use super::component::{format_value, ComponentKind};
use super::topology::FilterTopology;

/// Returns DOT source for the block diagram of `topology`.
///
/// Each block becomes a `cluster_<id>` with input/output points and a pair of
/// junctions; branch components hang between the junctions, grounds only off the
/// input junction. Blocks are chained `IN -> ... -> OUT`.
#[must_use]
pub fn to_dot(topology: &FilterTopology) -> String {
    let mut dot = String::from("digraph {\n    rankdir=LR\n");
    dot.push_str("    input [label=\"IN\" shape=diamond]\n");
    dot.push_str("    output [label=\"OUT\" shape=diamond]\n");

    let mut prev = String::from("input");
    for block in topology.roots() {
        let (block_in, block_out) = render_block(topology, block, &mut dot, 1);
        dot.push_str(&format!("    {prev} -> {block_in}\n"));
        prev = block_out;
    }
    dot.push_str(&format!("    {prev} -> output\n"));
    dot.push('}');
    dot
}

fn point(id: BlockId, suffix: &str) -> String {
    format!("{id}_{suffix}")
}

fn render_block(topology: &FilterTopology, block: &FilterBlock, dot: &mut String, depth: usize) -> (String, String) {
    let pad = "    ".repeat(depth);
    let id = block.id();
    let in_node = point(id, "in");
    let out_node = point(id, "out");
    let junction_in = point(id, "junction_in");
    let junction_out = point(id, "junction_out");

    dot.push_str(&format!("{pad}subgraph cluster_{id} {{\n"));
    dot.push_str(&format!("{pad}    label=\"{}\"\n", escape(block.name())));
    dot.push_str(&format!("{pad}    style=rounded\n"));
    for p in [&in_node, &out_node, &junction_in, &junction_out] {
        dot.push_str(&format!("{pad}    {p} [label=\"\" shape=point]\n"));
    }
    dot.push_str(&format!("{pad}    {in_node} -> {junction_in}\n"));
    dot.push_str(&format!("{pad}    {junction_out} -> {out_node}\n"));

    for kind in ComponentKind::ALL {
        for (idx, component) in block.components(kind).iter().enumerate() {
            let node = format!("{id}_{}_{idx}", kind.letter());
            if kind.is_branch() {
                dot.push_str(&format!(
                    "{pad}    {node} [label=\"{}\\n{}{}\" shape=box style=filled fillcolor=lightblue]\n",
                    kind.letter(),
                    format_value(component.value()),
                    component.unit()
                ));
                dot.push_str(&format!("{pad}    {junction_in} -> {node}\n"));
                dot.push_str(&format!("{pad}    {node} -> {junction_out}\n"));
            } else {
                dot.push_str(&format!("{pad}    {node} [label=\"{}\" shape=plain]\n", component.symbol()));
                dot.push_str(&format!("{pad}    {junction_in} -> {node}\n"));
            }
        }
    }
    if !block.has_branches() {
        dot.push_str(&format!("{pad}    {junction_in} -> {junction_out}\n"));
    }

    let mut children = Vec::new();
    for child in block.children() {
        if let Ok(child) = topology.block(*child) {
            children.push(render_block(topology, child, dot, depth + 1));
        }
    }
    dot.push_str(&format!("{pad}}}\n"));
    for (child_in, _) in children {
        dot.push_str(&format!("{pad}{out_node} -> {child_in}\n"));
    }

    (in_node, out_node)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::component::Unit;

    #[test]
    fn empty_topology_links_in_to_out() {
        let t = FilterTopology::new("empty");
        let dot = to_dot(&t);
        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("input -> output"));
    }

    #[test]
    fn blocks_become_clusters_chained_in_series() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("Stage \"A\"", 0);
        let b = t.add_block("Stage B", 1);
        t.add_component(a, ComponentKind::Resistor, 100.0, Unit::Ohm).unwrap();
        t.add_component(a, ComponentKind::Ground, 0.0, Unit::Dimensionless).unwrap();

        let dot = to_dot(&t);
        assert!(dot.contains(&format!("subgraph cluster_{a} {{")));
        assert!(dot.contains("label=\"Stage \\\"A\\\"\""));
        assert!(dot.contains(&format!("input -> {a}_in")));
        assert!(dot.contains(&format!("{a}_out -> {b}_in")));
        assert!(dot.contains(&format!("{b}_out -> output")));
        assert!(dot.contains(&format!("{a}_junction_in -> {a}_R_0")));
        assert!(dot.contains(&format!("{a}_R_0 -> {a}_junction_out")));
        assert!(dot.contains(&format!("{a}_G_0 [label=\"⏚\" shape=plain]")));
        assert!(!dot.contains(&format!("{a}_junction_in -> {a}_junction_out")));
        assert!(dot.contains(&format!("{b}_junction_in -> {b}_junction_out")));
    }

    #[test]
    fn one_statement_per_line() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        t.add_component(a, ComponentKind::Capacitor, 4.7, Unit::Microfarad).unwrap();
        t.add_component(a, ComponentKind::Inductor, 1.0, Unit::Millihenry).unwrap();
        t.add_sub_block(a, "b", 0).unwrap();

        let dot = to_dot(&t);
        assert!(dot.ends_with('}'));
        for line in dot.lines() {
            assert!(line.matches("->").count() <= 1, "joined statements: {line}");
        }
        assert!(dot.contains(&format!("{a}_C_0 [label=\"C\\n4.7µF\" shape=box")));
        assert_eq!(dot.matches("subgraph cluster_").count(), 2);
        assert_eq!(dot.matches('{').count(), dot.matches('}').count());
    }

    #[test]
    fn children_hang_off_parent_output() {
        let mut t = FilterTopology::new("t");
        let a = t.add_block("a", 0);
        let c = t.add_sub_block(a, "c", 0).unwrap();
        let dot = to_dot(&t);
        assert!(dot.contains(&format!("subgraph cluster_{c} {{")));
        assert!(dot.contains(&format!("{a}_out -> {c}_in")));
    }
}
