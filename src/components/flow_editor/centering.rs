//! Viewport centering and its animation.
//!
//! Targets are computed at the current scale: centering moves the canvas
//! but never zooms it. Only one animation runs at a time; a new request
//! replaces whatever was in flight.

use log::debug;

use super::config::{CenteringConfig, PanelInsets};
use super::geometry::{Bounds, Point};
use super::graph::Node;
use super::viewport::ViewportState;

/// Part of the canvas not covered by collaborator panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleRegion {
	/// Canvas width in screen pixels.
	pub width: f64,
	/// Canvas height in screen pixels.
	pub height: f64,
	/// Occluded width on the left edge.
	pub left_inset: f64,
	/// Occluded width on the right edge.
	pub right_inset: f64,
}

impl VisibleRegion {
	/// A region of the given size with no panels covering it.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			left_inset: 0.0,
			right_inset: 0.0,
		}
	}

	/// Applies the configured panel widths for whichever panels are open.
	pub fn with_panels(self, panels: &PanelInsets, left_open: bool, right_open: bool) -> Self {
		Self {
			left_inset: if left_open { panels.left_width } else { 0.0 },
			right_inset: if right_open { panels.right_width } else { 0.0 },
			..self
		}
	}

	/// Screen-space centre of the unoccluded area.
	///
	/// Falls back to the full canvas centre when the panels cover everything.
	pub fn center(&self) -> Point {
		let visible = self.width - self.left_inset - self.right_inset;
		if visible <= 0.0 {
			return Point::new(self.width / 2.0, self.height / 2.0);
		}
		Point::new(self.left_inset + visible / 2.0, self.height / 2.0)
	}
}

impl Default for VisibleRegion {
	fn default() -> Self {
		Self::new(0.0, 0.0)
	}
}

/// Bounding box of all node positions grown by the node margin and padding.
pub fn content_bounds<'a>(nodes: impl IntoIterator<Item = &'a Node>, config: &CenteringConfig) -> Option<Bounds> {
	Bounds::around(nodes.into_iter().map(|n| n.position), config.node_margin + config.padding)
}

/// Viewport at `scale` that maps `focus` onto the centre of `region`.
pub fn centered_on(focus: Point, region: &VisibleRegion, scale: f64) -> ViewportState {
	let center = region.center();
	ViewportState::new(scale, center.x - focus.x * scale, center.y - focus.y * scale)
}

/// d3's `cubicInOut`.
fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Animation {
	from: ViewportState,
	to: ViewportState,
	elapsed: f64,
	duration: f64,
}

/// Drives smooth viewport transitions from the frame loop.
#[derive(Clone, Debug, Default)]
pub struct ViewCenteringController {
	animation: Option<Animation>,
}

impl ViewCenteringController {
	/// A controller with no transition running.
	pub fn new() -> Self {
		Self::default()
	}

	/// True while a transition is still running.
	pub fn is_animating(&self) -> bool {
		self.animation.is_some()
	}

	/// Where the running animation will land.
	pub fn target(&self) -> Option<ViewportState> {
		self.animation.map(|a| a.to)
	}

	/// Starts moving from `from` to `to`, dropping any running animation.
	///
	/// A zero or negative duration is not animated; the caller should
	/// apply `to` directly, which is returned for convenience.
	pub fn animate_to(&mut self, from: ViewportState, to: ViewportState, duration: f64) -> Option<ViewportState> {
		if self.animation.is_some() {
			debug!("centering: replacing running animation");
		}
		if duration <= 0.0 || from == to {
			self.animation = None;
			return Some(to);
		}
		self.animation = Some(Animation {
			from,
			to,
			elapsed: 0.0,
			duration,
		});
		None
	}

	/// Advances by `dt` seconds and returns the viewport to show, if animating.
	pub fn tick(&mut self, dt: f64) -> Option<ViewportState> {
		let animation = self.animation.as_mut()?;
		animation.elapsed += dt.max(0.0);
		let t = (animation.elapsed / animation.duration).min(1.0);
		let current = animation.from.lerp(animation.to, ease_cubic_in_out(t));
		if t >= 1.0 {
			let to = animation.to;
			self.animation = None;
			return Some(to);
		}
		Some(current)
	}

	/// Stops the animation where it is.
	pub fn cancel(&mut self) {
		self.animation = None;
	}

	/// Scale the next target is computed at: the in-flight target's when an
	/// animation is running, so repeated requests agree.
	fn settled_scale(&self, current: &ViewportState) -> f64 {
		self.target().map_or(current.scale, |t| t.scale)
	}

	/// Viewport that centres every node, or `None` for an empty graph.
	pub fn fit_all<'a>(
		&self,
		nodes: impl IntoIterator<Item = &'a Node>,
		current: &ViewportState,
		region: &VisibleRegion,
		config: &CenteringConfig,
	) -> Option<ViewportState> {
		let bounds = content_bounds(nodes, config)?;
		Some(centered_on(bounds.center(), region, self.settled_scale(current)))
	}

	/// Viewport that centres a single node.
	pub fn center_node(&self, node: &Node, current: &ViewportState, region: &VisibleRegion) -> ViewportState {
		centered_on(node.position, region, self.settled_scale(current))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::flow_editor::graph::{Graph, NodeKind};

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn panels_shift_the_centre() {
		let region = VisibleRegion::new(1200.0, 800.0);
		assert_eq!(region.center(), Point::new(600.0, 400.0));
		let left = region.with_panels(&PanelInsets::default(), true, false);
		assert_eq!(left.center(), Point::new(320.0 + 440.0, 400.0));
		let both = region.with_panels(&PanelInsets::default(), true, true);
		assert_eq!(both.center(), Point::new(320.0 + 248.0, 400.0));
		let tiny = VisibleRegion::new(300.0, 300.0).with_panels(&PanelInsets::default(), true, true);
		assert_eq!(tiny.center(), Point::new(150.0, 150.0));
	}

	#[test]
	fn fit_centres_the_bounding_box_at_the_current_scale() {
		let mut g = Graph::new();
		g.add_node(NodeKind::Task, Point::new(0.0, 0.0)).unwrap();
		g.add_node(NodeKind::Task, Point::new(400.0, 200.0)).unwrap();
		let region = VisibleRegion::new(1000.0, 600.0);
		let current = ViewportState::new(2.0, 13.0, -7.0);
		let ctl = ViewCenteringController::new();
		let vp = ctl.fit_all(g.nodes(), &current, &region, &CenteringConfig::default()).unwrap();
		assert_eq!(vp.scale, 2.0);
		// Box centre (200, 100) lands on the region centre.
		let on_screen = vp.graph_to_screen(Point::new(200.0, 100.0));
		assert!(close(on_screen.x, 500.0) && close(on_screen.y, 300.0));
	}

	#[test]
	fn fit_on_empty_graph_is_none() {
		let g = Graph::new();
		let ctl = ViewCenteringController::new();
		let fit = ctl.fit_all(g.nodes(), &ViewportState::IDENTITY, &VisibleRegion::new(10.0, 10.0), &CenteringConfig::default());
		assert!(fit.is_none());
	}

	#[test]
	fn animation_eases_and_lands_exactly() {
		let mut ctl = ViewCenteringController::new();
		let from = ViewportState::IDENTITY;
		let to = ViewportState::new(1.0, 100.0, -50.0);
		assert_eq!(ctl.animate_to(from, to, 0.5), None);
		let halfway = ctl.tick(0.25).unwrap();
		assert!(close(halfway.translate_x, 50.0));
		let early = {
			let mut probe = ViewCenteringController::new();
			probe.animate_to(from, to, 0.5);
			probe.tick(0.05).unwrap()
		};
		assert!(early.translate_x < 10.0);
		assert_eq!(ctl.tick(1.0), Some(to));
		assert!(!ctl.is_animating());
		assert_eq!(ctl.tick(0.1), None);
	}

	#[test]
	fn new_request_replaces_the_running_one() {
		let mut ctl = ViewCenteringController::new();
		let a = ViewportState::new(1.0, 100.0, 0.0);
		let b = ViewportState::new(1.0, -100.0, 0.0);
		ctl.animate_to(ViewportState::IDENTITY, a, 0.5);
		ctl.tick(0.1);
		ctl.animate_to(ViewportState::IDENTITY, b, 0.5);
		assert_eq!(ctl.target(), Some(b));
		let mut last = None;
		while let Some(vp) = ctl.tick(0.1) {
			last = Some(vp);
		}
		assert_eq!(last, Some(b));
	}

	#[test]
	fn zero_duration_snaps() {
		let mut ctl = ViewCenteringController::new();
		let to = ViewportState::new(1.0, 5.0, 5.0);
		assert_eq!(ctl.animate_to(ViewportState::IDENTITY, to, 0.0), Some(to));
		assert!(!ctl.is_animating());
	}

	#[test]
	fn centering_twice_is_idempotent() {
		let mut g = Graph::new();
		let id = g.add_node(NodeKind::Data, Point::new(75.0, -20.0)).unwrap();
		let node = g.node(id.as_str()).unwrap();
		let region = VisibleRegion::new(800.0, 600.0);
		let ctl = ViewCenteringController::new();
		let first = ctl.center_node(node, &ViewportState::new(1.5, 0.0, 0.0), &region);
		let second = ctl.center_node(node, &first, &region);
		assert_eq!(first, second);
	}
}
