//! Node repositioning gesture.
//!
//! `Idle -> Dragging -> Idle`. While dragging only a preview position is
//! kept; the graph sees a single position update on release.

use log::debug;

use super::error::DragRejection;
use super::geometry::Point;
use super::graph::NodeId;
use super::mutation::{EditorMode, MutationRequest};
use super::viewport::ViewportState;

#[derive(Clone, Debug, Default, PartialEq)]
enum DragState {
	#[default]
	Idle,
	Dragging {
		node_id: NodeId,
		start_screen: Point,
		start_position: Point,
		current: Point,
	},
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct NodeDragController {
	state: DragState,
}

impl NodeDragController {
	/// An idle controller.
	pub fn new() -> Self {
		Self::default()
	}

	/// True when no node is being dragged.
	pub fn is_idle(&self) -> bool {
		self.state == DragState::Idle
	}

	/// Starts dragging `node_id` from `start_screen`.
	///
	/// On success the node should be selected. Rejected outright in view-only
	/// and beautify modes, and while a drag is already running.
	pub fn press(
		&mut self,
		node_id: NodeId,
		start_screen: Point,
		start_position: Point,
		mode: EditorMode,
	) -> Result<MutationRequest, DragRejection> {
		if mode.view_only {
			return Err(DragRejection::ViewOnly);
		}
		if mode.beautify {
			return Err(DragRejection::BeautifyActive);
		}
		if !self.is_idle() {
			return Err(DragRejection::GestureActive);
		}
		debug!("drag: start {node_id}");
		self.state = DragState::Dragging {
			node_id: node_id.clone(),
			start_screen,
			start_position,
			current: start_position,
		};
		Ok(MutationRequest::SelectNode(Some(node_id)))
	}

	/// Moves the preview. The offset is scaled, not fully transformed,
	/// because it is relative to the press point.
	pub fn drag_to(&mut self, screen: Point, viewport: &ViewportState) -> Option<Point> {
		let DragState::Dragging {
			start_screen,
			start_position,
			current,
			..
		} = &mut self.state
		else {
			return None;
		};
		let delta = viewport.screen_delta_to_graph(screen.x - start_screen.x, screen.y - start_screen.y);
		let candidate = start_position.offset(delta.x, delta.y);
		if candidate.is_finite() {
			*current = candidate;
		}
		Some(*current)
	}

	/// The node being dragged and where it should be drawn.
	pub fn preview(&self) -> Option<(&NodeId, Point)> {
		match &self.state {
			DragState::Dragging { node_id, current, .. } => Some((node_id, *current)),
			DragState::Idle => None,
		}
	}

	/// Ends the drag, emitting the one position update.
	pub fn release(&mut self, screen: Point, viewport: &ViewportState) -> Option<MutationRequest> {
		self.drag_to(screen, viewport)?;
		match std::mem::take(&mut self.state) {
			DragState::Dragging { node_id, current, .. } => {
				debug!("drag: commit {node_id} at ({:.1}, {:.1})", current.x, current.y);
				Some(MutationRequest::UpdateNodePosition {
					node_id,
					position: current,
				})
			}
			DragState::Idle => None,
		}
	}

	/// Abandons the drag without emitting anything.
	pub fn cancel(&mut self) {
		if !self.is_idle() {
			debug!("drag: cancelled");
		}
		self.state = DragState::Idle;
	}
}
