//! The editor host.
//!
//! [`FlowEditor`] owns the graph and the viewport. Pointer input is routed
//! through hit testing to one gesture controller at a time, and whatever the
//! controllers ask for comes back through [`FlowEditor::apply`]. Collaborators
//! (palette, layer panel, zoom buttons, import/export) call the same
//! operations directly.
//!
//! While beautify is on, positions belong to the layout: every topology
//! change re-runs it and refits the view.

use log::{debug, info, warn};

use super::centering::{ViewCenteringController, VisibleRegion};
use super::config::EditorConfig;
use super::connection::ConnectionGestureController;
use super::document;
use super::drag::NodeDragController;
use super::error::{EdgeRejection, ExportError, ImportError, PositionRejection};
use super::geometry::{CubicBezier, Point};
use super::graph::{Edge, EdgeId, Endpoint, Graph, Node, NodeId, NodeKind, NodeTemplate, PortAddress};
use super::highlight::HighlightState;
use super::hit_test::{GeometryHitTest, Hit, PortHitTest};
use super::layout::{self, LayerMap};
use super::mutation::{EditorMode, MutationRequest};
use super::viewport::ViewportState;

/// What a pointer press landed on.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
	/// A connection drag started from this port.
	Port(PortAddress),
	/// The node was selected; a drag started unless the mode forbids it.
	Node(NodeId),
	/// Empty canvas: a pan, or a deselect if released in place.
	Background,
}

#[derive(Clone, Copy, Debug)]
struct PanGesture {
	start_screen: Point,
	start_viewport: ViewportState,
	/// Furthest the pointer got from the press point.
	travelled: f64,
}

/// Interactive flow editor state.
#[derive(Debug)]
pub struct FlowEditor {
	graph: Graph,
	viewport: ViewportState,
	config: EditorConfig,
	mode: EditorMode,
	/// Beautify was switched on by entering view-only and goes with it.
	beautify_from_view_only: bool,
	/// Positions from before beautify, restored when it is switched off.
	saved_positions: Vec<(NodeId, Point)>,
	layer_map: LayerMap,
	highlight: HighlightState,
	drag: NodeDragController,
	connection: ConnectionGestureController,
	pan: Option<PanGesture>,
	centering: ViewCenteringController,
	region: VisibleRegion,
	left_panel_open: bool,
	right_panel_open: bool,
}

impl Default for FlowEditor {
	fn default() -> Self {
		Self::new(EditorConfig::default())
	}
}

impl FlowEditor {
	/// An empty editor. An invalid `config` is replaced by the defaults.
	pub fn new(config: EditorConfig) -> Self {
		Self::with_graph(Graph::new(), config)
	}

	/// An editor over an existing graph. An invalid `config` is replaced by the defaults.
	pub fn with_graph(graph: Graph, config: EditorConfig) -> Self {
		let config = match config.validate() {
			Ok(()) => config,
			Err(e) => {
				warn!("{e}, using default config");
				EditorConfig::default()
			}
		};
		Self {
			graph,
			viewport: ViewportState::IDENTITY,
			config,
			mode: EditorMode::default(),
			beautify_from_view_only: false,
			saved_positions: Vec::new(),
			layer_map: LayerMap::new(),
			highlight: HighlightState::default(),
			drag: NodeDragController::new(),
			connection: ConnectionGestureController::new(),
			pan: None,
			centering: ViewCenteringController::new(),
			region: VisibleRegion::default(),
			left_panel_open: false,
			right_panel_open: false,
		}
	}

	/// The current flow.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// The active configuration.
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Beautify and view-only flags.
	pub fn mode(&self) -> EditorMode {
		self.mode
	}

	/// The selected node, if any.
	pub fn selected(&self) -> Option<&NodeId> {
		self.highlight.selected()
	}

	/// Selection and edge highlight state.
	pub fn highlight(&self) -> &HighlightState {
		&self.highlight
	}

	/// Layer-grouped node summary. Empty unless beautify is on.
	pub fn layer_map(&self) -> &LayerMap {
		&self.layer_map
	}

	/// True while a node drag, connection drag or pan is in progress.
	pub fn is_gesture_active(&self) -> bool {
		!self.drag.is_idle() || !self.connection.is_idle() || self.pan.is_some()
	}

	/// Node being dragged and where it is drawn right now.
	pub fn drag_preview(&self) -> Option<(&NodeId, Point)> {
		self.drag.preview()
	}

	/// Port a connection drag started from; drawn highlighted.
	pub fn connection_origin(&self) -> Option<&PortAddress> {
		self.connection.origin()
	}

	/// Transient curve of the running connection drag.
	pub fn connection_preview(&self) -> Option<CubicBezier> {
		self.connection.preview(self.config.scale.edge.curve_pull)
	}

	// --- viewport -----------------------------------------------------

	/// Current pan and zoom.
	pub fn get_viewport(&self) -> ViewportState {
		self.viewport
	}

	/// Replaces the viewport, clamping the scale. Non-finite input is ignored.
	pub fn set_viewport(&mut self, viewport: ViewportState) -> bool {
		match viewport.sanitized(&self.config.viewport) {
			Some(viewport) => {
				self.centering.cancel();
				self.viewport = viewport;
				true
			}
			None => {
				warn!("viewport: ignoring non-finite {viewport:?}");
				false
			}
		}
	}

	/// Canvas size in CSS pixels.
	pub fn set_canvas_size(&mut self, width: f64, height: f64) {
		self.region = VisibleRegion {
			width,
			height,
			..self.region
		};
	}

	/// Which collaborator panels currently cover the canvas.
	pub fn set_panels(&mut self, left_open: bool, right_open: bool) {
		self.left_panel_open = left_open;
		self.right_panel_open = right_open;
	}

	/// Canvas area not covered by open panels.
	pub fn visible_region(&self) -> VisibleRegion {
		self.region
			.with_panels(&self.config.panels, self.left_panel_open, self.right_panel_open)
	}

	/// Steps the zoom up by the button step, around the visible centre.
	pub fn zoom_in(&mut self) {
		let limits = &self.config.viewport;
		let scale = (self.viewport.scale + limits.button_step).min(limits.max_scale);
		self.zoom_buttons_to(scale.max(self.viewport.scale));
	}

	/// Steps the zoom down, stopping at the button floor.
	pub fn zoom_out(&mut self) {
		let limits = &self.config.viewport;
		let scale = (self.viewport.scale - limits.button_step).max(limits.button_min_scale);
		self.zoom_buttons_to(scale.min(self.viewport.scale));
	}

	fn zoom_buttons_to(&mut self, scale: f64) {
		let limits = &self.config.viewport;
		let anchor = self.visible_region().center();
		self.centering.cancel();
		self.viewport = self
			.viewport
			.zoom_to(anchor, scale, limits.min_scale, limits.max_scale);
		debug!("zoom: {:.2}", self.viewport.scale);
	}

	/// Mouse wheel: zooms around the cursor. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let limits = &self.config.viewport;
		let factor = if delta_y > 0.0 {
			limits.wheel_zoom_out
		} else {
			limits.wheel_zoom_in
		};
		self.centering.cancel();
		self.viewport = self.viewport.zoom_at(screen, factor, limits);
	}

	/// Animates to show every node. An empty graph goes back to identity.
	pub fn fit_view(&mut self) {
		let timing = &self.config.centering;
		let (target, duration) = match self.centering.fit_all(
			self.graph.nodes(),
			&self.viewport,
			&self.visible_region(),
			timing,
		) {
			Some(target) => (target, timing.fit_duration),
			None => (ViewportState::IDENTITY, timing.reset_duration),
		};
		self.animate_viewport(target, duration);
	}

	/// Selects a node and animates it into the centre of the visible area.
	pub fn focus_node(&mut self, id: &str) -> bool {
		let Some(node) = self.graph.node(id) else {
			debug!("focus: unknown node {id}");
			return false;
		};
		let target = self
			.centering
			.center_node(node, &self.viewport, &self.visible_region());
		let node_id = node.id.clone();
		self.select_node(Some(node_id));
		self.animate_viewport(target, self.config.centering.focus_duration);
		true
	}

	fn animate_viewport(&mut self, target: ViewportState, duration: f64) {
		if let Some(now) = self.centering.animate_to(self.viewport, target, duration) {
			self.viewport = now;
		}
	}

	/// Advances animations by `dt` seconds. Call once per frame.
	pub fn tick(&mut self, dt: f64) {
		if let Some(viewport) = self.centering.tick(dt) {
			self.viewport = viewport;
		}
		self.highlight.tick(dt);
	}

	/// True while a view transition is running.
	pub fn is_animating(&self) -> bool {
		self.centering.is_animating()
	}

	// --- graph operations ---------------------------------------------

	/// Drops a new block of `kind` at a graph-space position.
	pub fn add_node(&mut self, kind: NodeKind, position: Point) -> Result<NodeId, PositionRejection> {
		if self.mode.view_only {
			debug!("add node: rejected in view-only mode");
			return Err(PositionRejection::Locked);
		}
		let id = self.graph.add_node(kind, position)?;
		self.topology_changed();
		Ok(id)
	}

	/// Drops a block stamped from a user template.
	pub fn add_templated_node(
		&mut self,
		template: &NodeTemplate,
		position: Point,
	) -> Result<NodeId, PositionRejection> {
		if self.mode.view_only {
			debug!("add node: rejected in view-only mode");
			return Err(PositionRejection::Locked);
		}
		let id = self.graph.add_templated_node(template, position)?;
		self.topology_changed();
		Ok(id)
	}

	/// Connects output `source` to input `target`.
	pub fn add_edge(&mut self, source: Endpoint, target: Endpoint) -> Result<EdgeId, EdgeRejection> {
		if self.mode.view_only {
			debug!("add edge: rejected in view-only mode");
			return Err(EdgeRejection::ViewOnly);
		}
		match self.graph.add_edge(source, target) {
			Ok(id) => {
				self.topology_changed();
				Ok(id)
			}
			Err(rejection) => {
				debug!("add edge: {rejection}");
				Err(rejection)
			}
		}
	}

	/// Removes an edge. Refused in view-only mode.
	pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
		if self.mode.view_only {
			return None;
		}
		let edge = self.graph.remove_edge(id)?;
		self.topology_changed();
		Some(edge)
	}

	/// Moves a node. Refused while positions are owned by the layout.
	pub fn update_node_position(&mut self, id: &str, position: Point) -> Result<(), PositionRejection> {
		if self.mode.view_only || self.mode.beautify {
			debug!("move {id}: rejected, positions are locked");
			return Err(PositionRejection::Locked);
		}
		self.graph.set_position(id, position)
	}

	/// Removes a node and every edge touching it.
	pub fn delete_node(&mut self, id: &str) -> Option<Node> {
		if self.mode.view_only {
			debug!("delete {id}: rejected in view-only mode");
			return None;
		}
		let node = self.graph.delete_node(id)?;
		if self.selected() == Some(&node.id) {
			self.highlight.update(None, self.graph.edges());
		}
		if self.drag.preview().is_some_and(|(dragged, _)| dragged == &node.id) {
			self.drag.cancel();
		}
		if self.connection.origin().is_some_and(|origin| origin.node_id == node.id) {
			self.connection.cancel();
		}
		self.topology_changed();
		Some(node)
	}

	/// Renames a node, re-running the layout under beautify. False for unknown ids.
	pub fn rename_node(&mut self, id: &str, name: impl Into<String>) -> bool {
		if !self.graph.rename_node(id, name) {
			return false;
		}
		if self.mode.beautify {
			self.relayout();
		}
		true
	}

	/// Selects a node, or clears the selection with `None`. Unknown ids are ignored.
	pub fn select_node(&mut self, id: Option<NodeId>) -> bool {
		if let Some(id) = &id {
			if self.graph.node(id.as_str()).is_none() {
				debug!("select: unknown node {id}");
				return false;
			}
		}
		self.highlight.update(id.as_ref(), self.graph.edges());
		true
	}

	/// Applies a request emitted by a gesture controller.
	pub fn apply(&mut self, request: MutationRequest) -> bool {
		match request {
			MutationRequest::AddEdge { source, target } => self.add_edge(source, target).is_ok(),
			MutationRequest::UpdateNodePosition { node_id, position } => {
				self.update_node_position(node_id.as_str(), position).is_ok()
			}
			MutationRequest::SelectNode(id) => self.select_node(id),
		}
	}

	fn topology_changed(&mut self) {
		let selected = self.highlight.selected().cloned();
		self.highlight.update(selected.as_ref(), self.graph.edges());
		if self.mode.beautify {
			self.relayout();
			self.fit_view();
		}
	}

	fn relayout(&mut self) {
		let layout = layout::beautify(self.graph.nodes(), self.graph.edges(), &self.config.layout);
		layout.apply_to(&mut self.graph);
		self.layer_map = layout.layer_map;
	}

	// --- modes --------------------------------------------------------

	/// Turns auto-layout on or off.
	///
	/// Switching on remembers the current positions; switching off puts
	/// them back. Cannot be switched off while view-only.
	pub fn set_beautify(&mut self, on: bool) -> bool {
		if on == self.mode.beautify {
			return false;
		}
		if !on && self.mode.view_only {
			debug!("beautify: stays on while view-only");
			return false;
		}
		self.drag.cancel();
		if on {
			self.saved_positions = self.graph.nodes().map(|n| (n.id.clone(), n.position)).collect();
			self.mode.beautify = true;
			self.relayout();
			self.fit_view();
		} else {
			for (id, position) in std::mem::take(&mut self.saved_positions) {
				if let Some(node) = self.graph.node_mut(id.as_str()) {
					node.position = position;
				}
			}
			self.mode.beautify = false;
			self.beautify_from_view_only = false;
			self.layer_map.clear();
		}
		info!("beautify {}", if on { "on" } else { "off" });
		true
	}

	/// Enters or leaves view-only mode.
	///
	/// Entering switches beautify on (if it was off) and fits the view;
	/// leaving switches it back off in that case.
	pub fn set_view_only(&mut self, on: bool) -> bool {
		if on == self.mode.view_only {
			return false;
		}
		self.drag.cancel();
		self.connection.cancel();
		if on {
			self.mode.view_only = true;
			if self.mode.beautify {
				self.fit_view();
			} else {
				self.set_beautify(true);
				self.beautify_from_view_only = true;
			}
		} else {
			self.mode.view_only = false;
			if self.beautify_from_view_only {
				self.set_beautify(false);
			}
		}
		info!("view-only {}", if on { "on" } else { "off" });
		true
	}

	// --- documents ----------------------------------------------------

	/// Replaces the graph with a document. Nothing changes on failure.
	pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
		let graph = document::import_json(text).inspect_err(|e| warn!("import rejected: {e}"))?;
		info!("imported {} nodes, {} edges", graph.node_count(), graph.edge_count());
		self.drag.cancel();
		self.connection.cancel();
		self.pan = None;
		self.graph = graph;
		self.highlight.update(None, self.graph.edges());
		if self.mode.beautify {
			self.saved_positions = self.graph.nodes().map(|n| (n.id.clone(), n.position)).collect();
			self.relayout();
		}
		self.fit_view();
		Ok(())
	}

	/// Serializes the flow as a JSON document.
	pub fn export_json(&self, export_date: Option<String>) -> Result<String, ExportError> {
		document::export_json(&self.graph, export_date)
	}

	// --- pointer routing ----------------------------------------------

	/// Pointer pressed at `screen`. `None` while another gesture is running.
	pub fn pointer_down(&mut self, screen: Point) -> Option<PointerTarget> {
		if self.is_gesture_active() {
			return None;
		}
		let hit = GeometryHitTest::new(&self.graph, self.viewport, &self.config.scale).topmost(screen, None);
		// View-only ports act as part of their node.
		let hit = match hit {
			Some(Hit::Port(port)) if self.mode.view_only => Some(Hit::Node(port.node_id)),
			other => other,
		};

		match hit {
			Some(Hit::Port(port)) => {
				let node = self.graph.node(port.node_id.as_str())?;
				let anchor = self.config.scale.port_anchor(node.position, port.direction, port.index);
				self.connection.start(port.clone(), anchor);
				return Some(PointerTarget::Port(port));
			}
			Some(Hit::Node(node_id)) => {
				let position = self.graph.node(node_id.as_str()).map(|n| n.position)?;
				match self.drag.press(node_id.clone(), screen, position, self.mode) {
					Ok(select) => {
						self.apply(select);
					}
					Err(rejection) => {
						debug!("drag {node_id}: {rejection}");
						self.select_node(Some(node_id.clone()));
					}
				}
				return Some(PointerTarget::Node(node_id));
			}
			None => {}
		}

		self.centering.cancel();
		self.pan = Some(PanGesture {
			start_screen: screen,
			start_viewport: self.viewport,
			travelled: 0.0,
		});
		Some(PointerTarget::Background)
	}

	/// Advances whichever gesture is active.
	pub fn pointer_move(&mut self, screen: Point) {
		self.connection.pointer_moved(screen, &self.viewport);
		self.drag.drag_to(screen, &self.viewport);
		if let Some(pan) = &mut self.pan {
			pan.travelled = pan.travelled.max(pan.start_screen.distance(screen));
			self.viewport = pan
				.start_viewport
				.pan_by(screen.x - pan.start_screen.x, screen.y - pan.start_screen.y);
		}
	}

	/// Pointer released at `screen`, wherever it is.
	pub fn pointer_up(&mut self, screen: Point) {
		if !self.connection.is_idle() {
			let hits = GeometryHitTest::new(&self.graph, self.viewport, &self.config.scale);
			if let Some(request) = self.connection.release(screen, &hits, &self.graph) {
				self.apply(request);
			}
		}
		if let Some(request) = self.drag.release(screen, &self.viewport) {
			self.apply(request);
		}
		if let Some(pan) = self.pan.take() {
			if pan.travelled.max(pan.start_screen.distance(screen)) < self.config.gesture.click_slop {
				self.select_node(None);
			}
		}
	}

	/// Abandons whatever gesture is running, e.g. when the window loses focus.
	pub fn pointer_cancel(&mut self) {
		self.connection.cancel();
		self.drag.cancel();
		self.pan = None;
	}
}
