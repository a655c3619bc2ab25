//! Requests emitted by gesture controllers for the host to apply.
//!
//! Controllers never touch the graph; they describe the change and the host
//! decides whether to apply it.

use super::geometry::Point;
use super::graph::{Endpoint, NodeId};

/// A change the host is asked to make.
#[derive(Clone, Debug, PartialEq)]
pub enum MutationRequest {
	/// Connect an output (`source`) to an input (`target`).
	AddEdge {
		/// Output end.
		source: Endpoint,
		/// Input end.
		target: Endpoint,
	},
	/// Move a node to a graph-space position.
	UpdateNodePosition {
		/// Node to move.
		node_id: NodeId,
		/// New centre.
		position: Point,
	},
	/// Select a node, or clear the selection with `None`.
	SelectNode(Option<NodeId>),
}

/// Editor-wide modes that gate gestures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditorMode {
	/// Editing gestures are disabled.
	pub view_only: bool,
	/// Positions are owned by the auto-layout.
	pub beautify: bool,
}
