//! Layered top-to-bottom auto-layout ("beautify").
//!
//! Layers come from a breadth-first walk from the source nodes, after which
//! every edge is relaxed so a target always sits at least one layer below its
//! source. Nodes a walk cannot reach (cycles with no way in) get a fresh
//! layer each, after everything else. Each layer is centred on `x = 0`.
//!
//! The result only depends on node and edge order, never on prior
//! positions, so running it twice gives identical output.
//!
//! Cycles get a best-effort layering only. Coming back round to the first
//! node can push it below the rest of its cycle, which leaves the top layers
//! empty, and because no layer exceeds `n - 1` an edge inside the cycle may
//! stay within a single row.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;
use serde::Serialize;

use super::config::LayoutConfig;
use super::geometry::Point;
use super::graph::{Edge, Graph, Node, NodeId, NodeKind};

/// Summary of one node for layer-grouped collaborator views.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerEntry {
	/// Node id.
	pub id: NodeId,
	/// Display name.
	pub name: String,
	/// Block kind, serialized as `type`.
	#[serde(rename = "type")]
	pub kind: NodeKind,
}

/// Layer index to the nodes placed on it, left to right.
pub type LayerMap = BTreeMap<usize, Vec<LayerEntry>>;

/// Output of [`beautify`]: nodes in input order with layer and position set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	/// Nodes with `layer` and `position` assigned.
	pub nodes: Vec<Node>,
	/// Nodes grouped by layer.
	pub layer_map: LayerMap,
}

impl Layout {
	/// Writes positions and layers back into `graph`.
	pub fn apply_to(&self, graph: &mut Graph) {
		for placed in &self.nodes {
			if let Some(node) = graph.node_mut(placed.id.as_str()) {
				node.position = placed.position;
				node.layer = placed.layer;
			}
		}
	}
}

/// Lays out `nodes` using `edges`. Edges naming unknown nodes are ignored.
pub fn beautify<'a, N, E>(nodes: N, edges: E, config: &LayoutConfig) -> Layout
where
	N: IntoIterator<Item = &'a Node>,
	E: IntoIterator<Item = &'a Edge>,
{
	let nodes: Vec<&Node> = nodes.into_iter().collect();
	if nodes.is_empty() {
		return Layout::default();
	}
	let index: HashMap<&NodeId, usize> = nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();

	let mut outgoing = vec![Vec::new(); nodes.len()];
	let mut indegree = vec![0usize; nodes.len()];
	for edge in edges {
		if let (Some(&s), Some(&t)) = (index.get(&edge.source.node_id), index.get(&edge.target.node_id)) {
			outgoing[s].push(t);
			indegree[t] += 1;
		}
	}

	let mut sources: Vec<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
	if sources.is_empty() {
		sources.push(0);
	}

	let (mut layers, mut visit_order) = walk_layers(&sources, &outgoing);
	settle_layers(&mut layers, &outgoing);

	let mut deepest = layers.iter().flatten().copied().max().unwrap_or(0);
	for (i, layer) in layers.iter_mut().enumerate() {
		if layer.is_none() {
			deepest += 1;
			*layer = Some(deepest);
			visit_order.push(i);
		}
	}

	let mut rows: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
	for &i in &visit_order {
		let layer = layers[i].unwrap_or(deepest);
		rows.entry(layer).or_default().push(i);
	}

	let mut placed: Vec<Node> = nodes.iter().map(|n| (*n).clone()).collect();
	let mut layer_map = LayerMap::new();
	for (&layer, row) in &rows {
		let start_x = -((row.len() - 1) as f64 * config.horizontal_spacing) / 2.0;
		let y = config.base_y + layer as f64 * config.vertical_spacing;
		for (slot, &i) in row.iter().enumerate() {
			let node = &mut placed[i];
			node.layer = layer;
			node.position = Point::new(start_x + slot as f64 * config.horizontal_spacing, y);
		}
		layer_map.insert(
			layer,
			row.iter()
				.map(|&i| LayerEntry {
					id: nodes[i].id.clone(),
					name: nodes[i].name.clone(),
					kind: nodes[i].kind.clone(),
				})
				.collect(),
		);
	}

	debug!("beautify: {} nodes in {} layers", placed.len(), layer_map.len());
	Layout {
		nodes: placed,
		layer_map,
	}
}

/// Breadth-first layer assignment. A node seen again keeps the deepest layer
/// it was reached at but is not expanded a second time.
fn walk_layers(sources: &[usize], outgoing: &[Vec<usize>]) -> (Vec<Option<usize>>, Vec<usize>) {
	let mut layers: Vec<Option<usize>> = vec![None; outgoing.len()];
	let mut visit_order = Vec::new();
	let mut queue: VecDeque<(usize, usize)> = sources.iter().map(|&i| (i, 0)).collect();

	while let Some((i, layer)) = queue.pop_front() {
		match layers[i] {
			Some(existing) => layers[i] = Some(existing.max(layer)),
			None => {
				layers[i] = Some(layer);
				visit_order.push(i);
				queue.extend(outgoing[i].iter().map(|&t| (t, layer + 1)));
			}
		}
	}
	(layers, visit_order)
}

/// Pushes edge targets below their sources until every edge between walked
/// nodes points downwards.
///
/// Layers never exceed `n - 1`, the longest possible path in a DAG, which
/// also bounds the work when cycles are present.
fn settle_layers(layers: &mut [Option<usize>], outgoing: &[Vec<usize>]) {
	let cap = layers.len().saturating_sub(1);
	loop {
		let mut changed = false;
		for (u, targets) in outgoing.iter().enumerate() {
			let Some(from) = layers[u] else {
				continue;
			};
			let wanted = (from + 1).min(cap);
			for &v in targets {
				if let Some(to) = layers[v] {
					if to < wanted {
						layers[v] = Some(wanted);
						changed = true;
					}
				}
			}
		}
		if !changed {
			break;
		}
	}
}
