//! Edge highlighting driven by the selected node.
//!
//! [`highlighted_edges`] is the source of truth: every edge touching the
//! selection. [`HighlightState`] adds per-edge intensities that ease towards
//! that set so the renderer can fade strokes in and out.

use std::collections::{HashMap, HashSet};

use super::graph::{Edge, EdgeId, NodeId};

/// Ids of all edges with an endpoint on `selected`. Empty when nothing is selected.
pub fn highlighted_edges<'a>(
	selected: Option<&NodeId>,
	edges: impl IntoIterator<Item = &'a Edge>,
) -> HashSet<EdgeId> {
	let Some(selected) = selected else {
		return HashSet::new();
	};
	edges
		.into_iter()
		.filter(|edge| edge.touches(selected))
		.map(|edge| edge.id.clone())
		.collect()
}

/// Selection plus smoothed per-edge highlight intensity.
///
/// Each edge's intensity (0.0 to 1.0) follows exponential smoothing towards
/// 1.0 while highlighted and decays towards 0.0 otherwise.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	selected: Option<NodeId>,
	target_set: HashSet<EdgeId>,
	edge_intensity: HashMap<EdgeId, f64>,
}

impl HighlightState {
	/// The node whose edges are highlighted.
	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	/// Recomputes the highlighted set. Call on every selection or edge change.
	pub fn update<'a>(&mut self, selected: Option<&NodeId>, edges: impl IntoIterator<Item = &'a Edge>) {
		self.selected = selected.cloned();
		self.target_set = highlighted_edges(selected, edges);
	}

	/// True when the edge touches the selected node.
	pub fn is_highlighted(&self, id: &EdgeId) -> bool {
		self.target_set.contains(id)
	}

	/// Every edge touching the selected node.
	pub fn highlighted(&self) -> &HashSet<EdgeId> {
		&self.target_set
	}

	/// Animates intensities towards their targets.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 8.0;
		const FADE_OUT_SPEED: f64 = 5.0;

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for id in &self.target_set {
			let intensity = self.edge_intensity.entry(id.clone()).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		self.edge_intensity.retain(|id, intensity| {
			if self.target_set.contains(id) {
				true
			} else {
				*intensity *= fade_out_decay;
				*intensity > 0.005
			}
		});
	}

	/// Smoothed intensity for an edge, 0.0 when not (or no longer) highlighted.
	pub fn edge_intensity(&self, id: &EdgeId) -> f64 {
		self.edge_intensity.get(id).copied().unwrap_or(0.0)
	}
}
