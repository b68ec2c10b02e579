// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket resolution: recompute a node's sockets when one of its options changes.
//!
//! Most filters have fixed sockets. The ones listed here derive their
//! socket lists from an option value (a count, a list of split points, a
//! media file) and are re-resolved every time that option is written.

use crate::catalog::{Filter, FILENAME_OPTION, INPUT_FILTER_NAME, OUTPUT_FILTER_NAME};
use crate::graph::FilterGraph;
use crate::node::{FilterNode, NodeId};
use crate::socket::{MediaKind, Socket};

/// Source of stream layouts for media files
pub trait MediaProbe: Send + Sync {
    /// List the streams of the file at `path` as sockets, empty if unreadable
    fn probe(&self, path: &str) -> Vec<Socket>;
}

/// Probe that never finds any streams
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl MediaProbe for NoProbe {
    fn probe(&self, _path: &str) -> Vec<Socket> {
        Vec::new()
    }
}

impl<F> MediaProbe for F
where
    F: Fn(&str) -> Vec<Socket> + Send + Sync,
{
    fn probe(&self, path: &str) -> Vec<Socket> {
        self(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inputs,
    Outputs,
}

/// A filter whose socket count is the integer value of one option
struct CountRule {
    filters: &'static [&'static str],
    options: &'static [&'static str],
    side: Side,
    /// Fixed kind; inferred from the filter name otherwise
    kind: Option<MediaKind>,
}

const COUNT_RULES: &[CountRule] = &[
    CountRule {
        filters: &["ainterleave", "interleave"],
        options: &["nb_inputs", "n"],
        side: Side::Inputs,
        kind: None,
    },
    CountRule {
        filters: &["amerge", "amix", "mix"],
        options: &["inputs"],
        side: Side::Inputs,
        kind: None,
    },
    CountRule {
        filters: &["aselect", "select", "asplit", "split"],
        options: &["outputs", "n"],
        side: Side::Outputs,
        kind: None,
    },
    CountRule {
        filters: &["join"],
        options: &["inputs"],
        side: Side::Inputs,
        kind: Some(MediaKind::Audio),
    },
    CountRule {
        filters: &[
            "hstack",
            "vstack",
            "xstack",
            "hstack_qsv",
            "vstack_qsv",
            "xstack_qsv",
            "xmedian",
            "libplacebo",
            "program_opencl",
        ],
        options: &["inputs"],
        side: Side::Inputs,
        kind: None,
    },
    CountRule {
        filters: &["signature"],
        options: &["nb_inputs"],
        side: Side::Inputs,
        kind: None,
    },
];

const PROBED_FILTERS: &[&str] = &[INPUT_FILTER_NAME, "movie", "amovie"];

/// Stream slots of a sink; unlinked slots are not written
const SINK_INPUTS: [MediaKind; 2] = [MediaKind::Video, MediaKind::Audio];

const CONCAT_DEFAULTS: [(&str, usize); 3] = [("n", 2), ("v", 1), ("a", 0)];

/// Most sockets one side of a node may be resolved to
pub const MAX_DYNAMIC_SOCKETS: usize = 1024;

/// New socket lists for a node; `None` leaves a side untouched
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SocketPlan {
    pub(crate) inputs: Option<Vec<Socket>>,
    pub(crate) outputs: Option<Vec<Socket>>,
}

/// Work out which sockets `node` should have after `option` became `value`
pub(crate) fn plan_sockets(
    node: &FilterNode,
    option: &str,
    value: &str,
    probe: &dyn MediaProbe,
) -> SocketPlan {
    let filter = node.filter();
    let name = filter.name.as_str();
    let mut plan = SocketPlan::default();

    if let Some(rule) = COUNT_RULES
        .iter()
        .find(|r| r.filters.contains(&name) && r.options.contains(&option))
    {
        // Unparseable or out-of-range counts leave the sockets alone
        if let Some(count) = parse_count(filter, option, value) {
            let kind = rule.kind.unwrap_or_else(|| MediaKind::from_filter_name(name));
            let sockets = Socket::repeat(count, kind);
            match rule.side {
                Side::Inputs => plan.inputs = Some(sockets),
                Side::Outputs => plan.outputs = Some(sockets),
            }
        }
        return plan;
    }

    match (name, option) {
        (_, FILENAME_OPTION) if PROBED_FILTERS.contains(&name) => {
            plan.outputs = Some(probe.probe(value));
        }
        (OUTPUT_FILTER_NAME, FILENAME_OPTION) => {
            plan.inputs = Some(SINK_INPUTS.iter().map(|&kind| Socket::unnamed(kind)).collect());
        }
        ("acrossover", "split") => {
            let count = value.split_whitespace().count().max(1);
            if count != node.outputs().len() && count <= MAX_DYNAMIC_SOCKETS {
                plan.outputs = Some(Socket::repeat(count, MediaKind::Audio));
            }
        }
        ("asegment" | "segment", "timestamps" | "samples" | "frames") => {
            let count = value.matches('|').count() + 1;
            if count != node.outputs().len() && count <= MAX_DYNAMIC_SOCKETS {
                plan.outputs = Some(Socket::repeat(count, MediaKind::from_filter_name(name)));
            }
        }
        ("concat", "n" | "v" | "a") => {
            let [n, v, a] =
                CONCAT_DEFAULTS.map(|(key, default)| concat_count(node, filter, key, default));
            let (Some(n), Some(v), Some(a)) = (n, v, a) else {
                return plan;
            };
            let total = v
                .checked_add(a)
                .and_then(|per_segment| per_segment.checked_mul(n));
            if !total.is_some_and(|total| total <= MAX_DYNAMIC_SOCKETS) {
                return plan;
            }
            let mut segment = Socket::repeat(v, MediaKind::Video);
            segment.extend(Socket::repeat(a, MediaKind::Audio));
            plan.inputs = Some((0..n).flat_map(|_| segment.iter().cloned()).collect());
            plan.outputs = Some(segment);
        }
        _ => {}
    }
    plan
}

/// A concat count; `None` when the set value is out of range
fn concat_count(node: &FilterNode, filter: &Filter, key: &str, default: usize) -> Option<usize> {
    match filter.option_index(key).and_then(|i| node.option(i)) {
        Some(value) => match value.trim().parse::<usize>() {
            Ok(_) => parse_count(filter, key, value),
            Err(_) => Some(default),
        },
        None => Some(default),
    }
}

/// Parse a socket count, rejecting values above the option's `max` or
/// [`MAX_DYNAMIC_SOCKETS`]
fn parse_count(filter: &Filter, option: &str, value: &str) -> Option<usize> {
    let count = value.trim().parse::<usize>().ok()?;
    let max = filter
        .option_index(option)
        .and_then(|i| filter.option(i))
        .and_then(|o| o.max.trim().parse::<f64>().ok());
    if max.is_some_and(|max| count as f64 > max) {
        return None;
    }
    (count <= MAX_DYNAMIC_SOCKETS).then_some(count)
}

impl FilterGraph {
    /// Re-derive the sockets of node `id` after option `index` became `value`
    pub(crate) fn resolve_sockets(&mut self, id: NodeId, index: usize, value: &str) {
        let Some(vertex) = self.node_vertex(id) else {
            return;
        };
        let node_index = self.state.vertices[vertex].node_index;
        let node = &self.nodes[node_index];
        let Some(option) = node.filter().option(index) else {
            return;
        };
        let plan = plan_sockets(node, &option.name, value, &*self.probe);

        if let Some(inputs) = plan.inputs {
            let node = &self.nodes[node_index];
            let ids = self.state.update_socket_ids(
                node_index,
                vertex,
                &inputs,
                node.inputs(),
                node.input_ids(),
                true,
            );
            tracing::debug!("Node {} now has {} inputs", id, inputs.len());
            let node = &mut self.nodes[node_index];
            node.input_ids = ids;
            node.set_inputs(inputs);
        }
        if let Some(outputs) = plan.outputs {
            let node = &self.nodes[node_index];
            let ids = self.state.update_socket_ids(
                node_index,
                vertex,
                &outputs,
                node.outputs(),
                node.output_ids(),
                false,
            );
            tracing::debug!("Node {} now has {} outputs", id, outputs.len());
            let node = &mut self.nodes[node_index];
            node.output_ids = ids;
            node.set_outputs(outputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, FilterOption};
    use crate::graph::NodeOrder;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        let mut amix = Filter::new("amix", "Audio mixing");
        amix.options.push(FilterOption::new("inputs", "", "int").with_default("2"));
        amix.outputs.push(Socket::new("default", MediaKind::Audio));
        amix.dynamic_input = true;

        let mut split = Filter::new("split", "Pass on the input to N video outputs");
        split.inputs.push(Socket::new("default", MediaKind::Video));
        split.options.push(FilterOption::new("outputs", "", "int").with_default("2"));
        split.dynamic_output = true;

        let mut join = Filter::new("join", "Join multiple audio streams");
        join.options.push(FilterOption::new("inputs", "", "int").with_default("2"));
        join.outputs.push(Socket::new("default", MediaKind::Audio));
        join.dynamic_input = true;

        let mut crossover = Filter::new("acrossover", "Split audio into per-bands streams");
        crossover.inputs.push(Socket::new("default", MediaKind::Audio));
        crossover.options.push(FilterOption::new("split", "", "string").with_default("500"));
        crossover.dynamic_output = true;

        let mut segment = Filter::new("segment", "Segment video stream");
        segment.inputs.push(Socket::new("default", MediaKind::Video));
        segment.options.push(FilterOption::new("timestamps", "", "string"));
        segment.dynamic_output = true;

        let mut concat = Filter::new("concat", "Concatenate audio and video streams");
        concat.options.push(FilterOption::new("n", "", "int").with_default("2"));
        concat.options.push(FilterOption::new("v", "", "int").with_default("1"));
        concat.options.push(FilterOption::new("a", "", "int").with_default("0"));
        concat.dynamic_input = true;
        concat.dynamic_output = true;

        let mut color = Filter::new("color", "Provide an uniformly colored input");
        color.outputs.push(Socket::new("default", MediaKind::Video));
        let mut anullsrc = Filter::new("anullsrc", "Null audio source");
        anullsrc.outputs.push(Socket::new("default", MediaKind::Audio));

        Catalog::from_filters(vec![amix, split, join, crossover, segment, concat, color, anullsrc])
    }

    fn graph_with(probe: Arc<dyn MediaProbe>) -> FilterGraph {
        FilterGraph::new("test", probe)
    }

    fn filter(catalog: &Catalog, name: &str) -> Arc<Filter> {
        catalog.get(name).unwrap().clone()
    }

    fn kinds(sockets: &[Socket]) -> Vec<MediaKind> {
        sockets.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_count_rule_resizes_inputs() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let amix = graph.add_node(filter(&catalog, "amix"));
        assert!(graph.node(amix).unwrap().inputs().is_empty());

        graph.set_option(amix, 0, "3");
        let node = graph.node(amix).unwrap();
        assert_eq!(kinds(node.inputs()), vec![MediaKind::Audio; 3]);
        assert_eq!(node.input_ids().len(), 3);

        // Garbage leaves the sockets as they were
        graph.set_option(amix, 0, "three");
        assert_eq!(graph.node(amix).unwrap().inputs().len(), 3);
    }

    #[test]
    fn test_count_rule_rejects_oversized_counts() {
        let mut amix = Filter::new("amix", "Audio mixing");
        amix.options.push(
            FilterOption::new("inputs", "", "int")
                .with_default("2")
                .with_range("1", "32767"),
        );
        amix.dynamic_input = true;
        let mut graph = FilterGraph::default();
        let node = graph.add_node(Arc::new(amix));
        graph.set_option(node, 0, "4");
        let ids = graph.node(node).unwrap().input_ids().to_vec();

        for value in ["18446744073709551615", "40000", "2000", "-1"] {
            graph.set_option(node, 0, value);
            assert_eq!(graph.node(node).unwrap().input_ids(), ids.as_slice(), "{value}");
        }

        graph.set_option(node, 0, "5");
        assert_eq!(graph.node(node).unwrap().inputs().len(), 5);
    }

    #[test]
    fn test_oversized_concat_and_segment_ignored() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let concat = graph.add_node(filter(&catalog, "concat"));
        graph.set_option(concat, 0, "3");
        graph.set_option(concat, 2, "1");
        assert_eq!(graph.node(concat).unwrap().inputs().len(), 6);
        graph.set_option(concat, 0, "99999999999");
        assert_eq!(graph.node(concat).unwrap().inputs().len(), 6);
        // 600 segments of two streams each
        graph.set_option(concat, 0, "600");
        assert_eq!(graph.node(concat).unwrap().inputs().len(), 6);

        let segment = graph.add_node(filter(&catalog, "segment"));
        graph.set_option(segment, 0, "1|2");
        graph.set_option(segment, 0, &"|".repeat(MAX_DYNAMIC_SOCKETS));
        assert_eq!(graph.node(segment).unwrap().outputs().len(), 2);
    }

    #[test]
    fn test_count_rule_kind_override() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let join = graph.add_node(filter(&catalog, "join"));
        graph.set_option(join, 0, "2");
        assert_eq!(kinds(graph.node(join).unwrap().inputs()), vec![MediaKind::Audio; 2]);

        let split = graph.add_node(filter(&catalog, "split"));
        graph.set_option(split, 0, "3");
        assert_eq!(kinds(graph.node(split).unwrap().outputs()), vec![MediaKind::Video; 3]);
    }

    #[test]
    fn test_resize_keeps_surviving_links() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let src = graph.add_node(filter(&catalog, "anullsrc"));
        let amix = graph.add_node(filter(&catalog, "amix"));
        graph.set_option(amix, 0, "3");
        let out = graph.node(src).unwrap().output_ids()[0];
        let first = graph.node(amix).unwrap().input_ids()[0];
        let third = graph.node(amix).unwrap().input_ids()[2];
        graph.add_link(out, first);
        graph.add_link(out, third);

        graph.set_option(amix, 0, "2");
        assert_eq!(graph.node(amix).unwrap().input_ids()[0], first);
        assert!(!graph.is_valid(third));
        assert_eq!(graph.link_count(), 1);

        graph.set_option(amix, 0, "3");
        let ids = graph.node(amix).unwrap().input_ids().to_vec();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], first);
        assert_ne!(ids[2], third);
        let upstream: Vec<_> = graph.input_sockets(amix).map(|s| s.upstream).collect();
        assert_eq!(upstream, vec![Some(out), None, None]);
    }

    #[test]
    fn test_probe_drives_source_outputs() {
        let catalog = catalog();
        let probe = |path: &str| {
            if path == "clip.mp4" {
                vec![Socket::unnamed(MediaKind::Video), Socket::unnamed(MediaKind::Audio)]
            } else {
                Vec::new()
            }
        };
        let mut graph = graph_with(Arc::new(probe));
        let input = graph.add_node(filter(&catalog, INPUT_FILTER_NAME));
        assert!(graph.node(input).unwrap().outputs().is_empty());

        graph.set_option(input, 0, "clip.mp4");
        let node = graph.node(input).unwrap();
        assert_eq!(kinds(node.outputs()), vec![MediaKind::Video, MediaKind::Audio]);
        assert_eq!(node.option_by_name(FILENAME_OPTION), Some("clip.mp4"));

        graph.set_option(input, 0, "missing.mp4");
        assert!(graph.node(input).unwrap().outputs().is_empty());
    }

    #[test]
    fn test_sink_gets_stream_slots() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let sink = graph.add_node(filter(&catalog, OUTPUT_FILTER_NAME));
        assert!(graph.node(sink).unwrap().inputs().is_empty());
        graph.set_option(sink, 0, "out.mkv");
        let ids = graph.node(sink).unwrap().input_ids().to_vec();
        assert_eq!(
            kinds(graph.node(sink).unwrap().inputs()),
            vec![MediaKind::Video, MediaKind::Audio]
        );
        graph.set_option(sink, 0, "other.mkv");
        assert_eq!(graph.node(sink).unwrap().input_ids(), ids.as_slice());
    }

    #[test]
    fn test_crossover_counts_split_points() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let node = graph.add_node(filter(&catalog, "acrossover"));
        assert!(graph.node(node).unwrap().outputs().is_empty());

        graph.set_option(node, 0, "500");
        assert_eq!(kinds(graph.node(node).unwrap().outputs()), vec![MediaKind::Audio]);
        graph.set_option(node, 0, "  500 1000\t4000 ");
        assert_eq!(graph.node(node).unwrap().outputs().len(), 3);
    }

    #[test]
    fn test_self_named_option_defaults_on_placement() {
        let mut fps = Filter::new("fps", "Force constant framerate");
        fps.options.push(FilterOption::new("fps", "", "string").with_default("25"));
        let mut graph = FilterGraph::default();
        let node = graph.add_node(Arc::new(fps));
        assert_eq!(graph.node(node).unwrap().option(0), Some("25"));
    }

    #[test]
    fn test_unchanged_count_keeps_ids() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let node = graph.add_node(filter(&catalog, "segment"));
        graph.set_option(node, 0, "10|20");
        let before = graph.node(node).unwrap().output_ids().to_vec();
        assert_eq!(before.len(), 2);
        graph.set_option(node, 0, "15|30");
        assert_eq!(graph.node(node).unwrap().output_ids(), before.as_slice());
    }

    #[test]
    fn test_concat_layout() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let concat = graph.add_node(filter(&catalog, "concat"));
        graph.set_option(concat, 0, "2");
        graph.set_option(concat, 2, "1");

        let node = graph.node(concat).unwrap();
        assert_eq!(
            kinds(node.inputs()),
            vec![MediaKind::Video, MediaKind::Audio, MediaKind::Video, MediaKind::Audio]
        );
        assert_eq!(kinds(node.outputs()), vec![MediaKind::Video, MediaKind::Audio]);
        assert_eq!(node.input_ids().len(), 4);
        assert_eq!(node.output_ids().len(), 2);
    }

    #[test]
    fn test_static_filters_untouched() {
        let catalog = catalog();
        let mut graph = FilterGraph::default();
        let color = graph.add_node(filter(&catalog, "color"));
        let ids = graph.node(color).unwrap().output_ids().to_vec();
        let plan = plan_sockets(graph.node(color).unwrap(), "c", "red", &NoProbe);
        assert_eq!(plan, SocketPlan::default());
        assert_eq!(graph.node(color).unwrap().output_ids(), ids.as_slice());
        assert_eq!(graph.node_ids(NodeOrder::Default), vec![color]);
    }
}
