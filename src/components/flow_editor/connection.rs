//! Edge-drawing gesture.
//!
//! `Idle -> Dragging(origin) -> Idle`. Pressing a port starts a transient
//! curve that follows the pointer. Releasing over a compatible port emits an
//! add-edge request; releasing anywhere else simply ends the gesture. Either
//! way the controller is back to idle and the origin highlight is gone.

use log::debug;

use super::geometry::{CubicBezier, Point};
use super::graph::{Endpoint, Graph, PortAddress, PortDirection};
use super::hit_test::PortHitTest;
use super::mutation::MutationRequest;
use super::viewport::ViewportState;

/// Why a released connection produced nothing. Never surfaced to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionMiss {
	/// The release landed on no port.
	NoTarget,
	/// The target port belongs to the origin node.
	SameNode,
	/// Both ports are inputs or both are outputs.
	SameDirection,
	/// The graph refused the edge (existing connection or bad port).
	Refused,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum ConnectionState {
	#[default]
	Idle,
	Dragging {
		origin: PortAddress,
		/// Graph-space anchor of the origin port.
		anchor: Point,
		/// Graph-space pointer position.
		pointer: Point,
	},
}

/// Tracks an in-progress connection drag.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGestureController {
	state: ConnectionState,
}

impl ConnectionGestureController {
	/// An idle controller.
	pub fn new() -> Self {
		Self::default()
	}

	/// True when no connection is being drawn.
	pub fn is_idle(&self) -> bool {
		self.state == ConnectionState::Idle
	}

	/// The port the gesture started from, drawn highlighted while dragging.
	pub fn origin(&self) -> Option<&PortAddress> {
		match &self.state {
			ConnectionState::Dragging { origin, .. } => Some(origin),
			ConnectionState::Idle => None,
		}
	}

	/// Starts from `origin`, whose graph-space anchor is `anchor`.
	/// Returns `false` if a connection drag is already running.
	pub fn start(&mut self, origin: PortAddress, anchor: Point) -> bool {
		if !self.is_idle() {
			return false;
		}
		debug!(
			"connect: start at {} {:?}[{}]",
			origin.node_id, origin.direction, origin.index
		);
		self.state = ConnectionState::Dragging {
			origin,
			anchor,
			pointer: anchor,
		};
		true
	}

	/// Follows the pointer. Visual feedback only.
	pub fn pointer_moved(&mut self, screen: Point, viewport: &ViewportState) {
		if let ConnectionState::Dragging { pointer, .. } = &mut self.state {
			*pointer = viewport.screen_to_graph(screen);
		}
	}

	/// Transient curve, always drawn from the output side to the input side.
	pub fn preview(&self, pull: f64) -> Option<CubicBezier> {
		let ConnectionState::Dragging {
			origin,
			anchor,
			pointer,
		} = &self.state
		else {
			return None;
		};
		Some(match origin.direction {
			PortDirection::Output => CubicBezier::vertical(*anchor, *pointer, pull),
			PortDirection::Input => CubicBezier::vertical(*pointer, *anchor, pull),
		})
	}

	/// Ends the gesture at `screen`. Returns an add-edge request when the
	/// pointer is over a valid counterpart port.
	pub fn release(
		&mut self,
		screen: Point,
		hits: &dyn PortHitTest,
		graph: &Graph,
	) -> Option<MutationRequest> {
		let ConnectionState::Dragging { origin, .. } = std::mem::take(&mut self.state) else {
			return None;
		};
		let candidate = hits.topmost_port(screen, Some(&origin));
		match resolve(&origin, candidate.as_ref(), graph) {
			Ok((source, target)) => {
				debug!(
					"connect: {}[{}] -> {}[{}]",
					source.node_id, source.port, target.node_id, target.port
				);
				Some(MutationRequest::AddEdge { source, target })
			}
			Err(miss) => {
				debug!("connect: no edge ({miss:?})");
				None
			}
		}
	}

	/// Abandons the gesture, e.g. on pointer-cancel or window blur.
	pub fn cancel(&mut self) {
		if !self.is_idle() {
			debug!("connect: cancelled");
		}
		self.state = ConnectionState::Idle;
	}
}

/// Pairs `origin` with `candidate`, returning `(output, input)` endpoints.
///
/// Starting from an input is fine: the endpoints are swapped so the source
/// is always the output side.
pub fn resolve(
	origin: &PortAddress,
	candidate: Option<&PortAddress>,
	graph: &Graph,
) -> Result<(Endpoint, Endpoint), ConnectionMiss> {
	let candidate = candidate.ok_or(ConnectionMiss::NoTarget)?;
	if candidate.node_id == origin.node_id {
		return Err(ConnectionMiss::SameNode);
	}
	if candidate.direction == origin.direction {
		return Err(ConnectionMiss::SameDirection);
	}
	let (source, target) = match origin.direction {
		PortDirection::Output => (origin.endpoint(), candidate.endpoint()),
		PortDirection::Input => (candidate.endpoint(), origin.endpoint()),
	};
	graph
		.validate_edge(&source, &target)
		.map_err(|_| ConnectionMiss::Refused)?;
	Ok((source, target))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_editor::geometry::Bounds;
	use crate::components::flow_editor::graph::{NodeId, NodeKind};
	use crate::components::flow_editor::hit_test::PortTable;

	/// `a` is a data block (one output), `b` a task (one input, one output).
	fn fixture() -> (Graph, NodeId, NodeId, PortTable) {
		let mut graph = Graph::new();
		let a = graph.add_node(NodeKind::Data, Point::ORIGIN).unwrap();
		let b = graph.add_node(NodeKind::Task, Point::new(0.0, 200.0)).unwrap();
		let table = PortTable::new()
			.port(Point::new(0.0, 30.0), 5.0, PortAddress::output(a.clone(), 0))
			.port(Point::new(0.0, 170.0), 5.0, PortAddress::input(b.clone(), 0))
			.port(Point::new(0.0, 230.0), 5.0, PortAddress::output(b.clone(), 0));
		(graph, a, b, table)
	}

	#[test]
	fn output_to_input_emits_edge() {
		let (graph, a, b, table) = fixture();
		let mut conn = ConnectionGestureController::new();
		assert!(conn.start(PortAddress::output(a.clone(), 0), Point::new(0.0, 30.0)));
		conn.pointer_moved(Point::new(0.0, 100.0), &ViewportState::IDENTITY);
		assert_eq!(
			conn.release(Point::new(1.0, 171.0), &table, &graph),
			Some(MutationRequest::AddEdge {
				source: Endpoint::new(a, 0),
				target: Endpoint::new(b, 0),
			})
		);
		assert!(conn.is_idle());
		assert!(conn.origin().is_none());
	}

	#[test]
	fn starting_from_input_swaps_endpoints() {
		let (graph, a, b, table) = fixture();
		let mut conn = ConnectionGestureController::new();
		conn.start(PortAddress::input(b.clone(), 0), Point::new(0.0, 170.0));
		assert_eq!(
			conn.release(Point::new(0.0, 30.0), &table, &graph),
			Some(MutationRequest::AddEdge {
				source: Endpoint::new(a, 0),
				target: Endpoint::new(b, 0),
			})
		);
	}

	#[test]
	fn same_node_is_a_silent_no_op() {
		let (graph, _, b, table) = fixture();
		let mut conn = ConnectionGestureController::new();
		conn.start(PortAddress::output(b, 0), Point::new(0.0, 230.0));
		assert_eq!(conn.release(Point::new(0.0, 170.0), &table, &graph), None);
		assert!(conn.is_idle());
	}

	#[test]
	fn empty_canvas_release_is_a_no_op() {
		let (graph, a, _, table) = fixture();
		let mut conn = ConnectionGestureController::new();
		conn.start(PortAddress::output(a, 0), Point::new(0.0, 30.0));
		assert_eq!(conn.release(Point::new(400.0, 400.0), &table, &graph), None);
		assert!(conn.is_idle());
	}

	#[test]
	fn covered_ports_do_not_accept_a_release() {
		let (graph, a, _, table) = fixture();
		let cover = Bounds {
			min: Point::new(-60.0, 140.0),
			max: Point::new(60.0, 200.0),
		};
		let table = table.node(cover, "lid");
		let mut conn = ConnectionGestureController::new();
		conn.start(PortAddress::output(a, 0), Point::new(0.0, 30.0));
		assert_eq!(conn.release(Point::new(0.0, 170.0), &table, &graph), None);
		assert!(conn.is_idle());
	}

	#[test]
	fn releasing_on_origin_is_a_no_op() {
		let (graph, a, _, table) = fixture();
		let mut conn = ConnectionGestureController::new();
		conn.start(PortAddress::output(a, 0), Point::new(0.0, 30.0));
		assert_eq!(conn.release(Point::new(0.0, 30.0), &table, &graph), None);
	}

	#[test]
	fn resolve_rules() {
		let (mut graph, a, b, _) = fixture();
		let out_a = PortAddress::output(a.clone(), 0);
		let out_b = PortAddress::output(b.clone(), 0);
		let in_b = PortAddress::input(b.clone(), 0);
		assert_eq!(resolve(&out_a, None, &graph), Err(ConnectionMiss::NoTarget));
		assert_eq!(resolve(&out_a, Some(&out_b), &graph), Err(ConnectionMiss::SameDirection));
		assert_eq!(resolve(&out_b, Some(&in_b), &graph), Err(ConnectionMiss::SameNode));
		graph.add_edge(Endpoint::new(a, 0), Endpoint::new(b, 0)).unwrap();
		assert_eq!(resolve(&out_a, Some(&in_b), &graph), Err(ConnectionMiss::Refused));
	}

	#[test]
	fn preview_runs_output_to_input() {
		let mut conn = ConnectionGestureController::new();
		let vp = ViewportState::new(2.0, 0.0, 0.0);
		conn.start(PortAddress::input("b", 0), Point::new(0.0, 170.0));
		conn.pointer_moved(Point::new(100.0, 100.0), &vp);
		let curve = conn.preview(50.0).unwrap();
		assert_eq!(curve.from, Point::new(50.0, 50.0));
		assert_eq!(curve.to, Point::new(0.0, 170.0));
		conn.cancel();
		assert!(conn.preview(50.0).is_none());
	}

	#[test]
	fn only_one_connection_at_a_time() {
		let mut conn = ConnectionGestureController::new();
		assert!(conn.start(PortAddress::output("a", 0), Point::ORIGIN));
		assert!(!conn.start(PortAddress::output("b", 0), Point::ORIGIN));
		assert_eq!(conn.origin(), Some(&PortAddress::output("a", 0)));
	}
}
