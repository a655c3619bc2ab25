//! Pan/zoom transform between screen (pointer) space and graph space.
//!
//! `screen = graph * scale + translate`. The scale is always clamped into a
//! strictly positive range, so the transform stays invertible.

use serde::{Deserialize, Serialize};

use super::config::ViewportLimits;
use super::geometry::Point;

/// Pan and zoom applied to the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
	/// Zoom factor, always positive.
	pub scale: f64,
	/// Horizontal pan in screen pixels.
	pub translate_x: f64,
	/// Vertical pan in screen pixels.
	pub translate_y: f64,
}

impl Default for ViewportState {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewportState {
	/// No pan, no zoom.
	pub const IDENTITY: ViewportState = ViewportState {
		scale: 1.0,
		translate_x: 0.0,
		translate_y: 0.0,
	};

	/// A viewport with the given scale and translation.
	pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
		Self {
			scale,
			translate_x,
			translate_y,
		}
	}

	/// Translation as a point.
	pub fn translate(&self) -> Point {
		Point::new(self.translate_x, self.translate_y)
	}

	/// Maps a pointer position into graph space.
	pub fn screen_to_graph(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.translate_x) / self.scale,
			(screen.y - self.translate_y) / self.scale,
		)
	}

	/// Maps a graph position onto the screen.
	pub fn graph_to_screen(&self, graph: Point) -> Point {
		Point::new(
			graph.x * self.scale + self.translate_x,
			graph.y * self.scale + self.translate_y,
		)
	}

	/// Converts a screen-space offset into a graph-space offset.
	///
	/// Offsets ignore translation: only relative movement matters.
	pub fn screen_delta_to_graph(&self, dx: f64, dy: f64) -> Point {
		Point::new(dx / self.scale, dy / self.scale)
	}

	/// Clamps the scale into `[min, max]`. Translation is unbounded.
	pub fn clamped(self, min_scale: f64, max_scale: f64) -> Self {
		Self {
			scale: self.scale.clamp(min_scale, max_scale),
			..self
		}
	}

	/// Validates an externally supplied viewport.
	///
	/// Non-finite components are rejected; the scale is clamped to `limits`.
	pub fn sanitized(self, limits: &ViewportLimits) -> Option<Self> {
		if !(self.scale.is_finite() && self.translate_x.is_finite() && self.translate_y.is_finite()) {
			return None;
		}
		Some(self.clamped(limits.min_scale, limits.max_scale))
	}

	/// This viewport panned by a screen-space offset.
	pub fn pan_by(self, dx: f64, dy: f64) -> Self {
		Self {
			translate_x: self.translate_x + dx,
			translate_y: self.translate_y + dy,
			..self
		}
	}

	/// Sets a new scale while keeping the graph point under `anchor` fixed.
	pub fn zoom_to(self, anchor: Point, scale: f64, min_scale: f64, max_scale: f64) -> Self {
		let new_k = scale.clamp(min_scale, max_scale);
		let ratio = new_k / self.scale;
		Self {
			scale: new_k,
			translate_x: anchor.x - (anchor.x - self.translate_x) * ratio,
			translate_y: anchor.y - (anchor.y - self.translate_y) * ratio,
		}
	}

	/// Multiplies the scale by `factor` around `anchor`.
	pub fn zoom_at(self, anchor: Point, factor: f64, limits: &ViewportLimits) -> Self {
		self.zoom_to(anchor, self.scale * factor, limits.min_scale, limits.max_scale)
	}

	/// Component-wise interpolation, used by view animations.
	pub fn lerp(self, other: ViewportState, t: f64) -> Self {
		Self {
			scale: self.scale + (other.scale - self.scale) * t,
			translate_x: self.translate_x + (other.translate_x - self.translate_x) * t,
			translate_y: self.translate_y + (other.translate_y - self.translate_y) * t,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn screen_graph_round_trip() {
		let viewports = [
			ViewportState::IDENTITY,
			ViewportState::new(0.1, -350.0, 12.5),
			ViewportState::new(3.7, 1e4, -2e3),
		];
		let points = [Point::ORIGIN, Point::new(-12.25, 88.0), Point::new(1e5, -4e4)];
		for vp in viewports {
			for p in points {
				assert!(close(vp.screen_to_graph(vp.graph_to_screen(p)), p));
				assert!(close(vp.graph_to_screen(vp.screen_to_graph(p)), p));
			}
		}
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let limits = ViewportLimits::default();
		let vp = ViewportState::new(1.0, 40.0, -20.0);
		let cursor = Point::new(300.0, 200.0);
		let before = vp.screen_to_graph(cursor);
		let zoomed = vp.zoom_at(cursor, 1.1, &limits);
		assert!((zoomed.scale - 1.1).abs() < 1e-12);
		assert!(close(zoomed.screen_to_graph(cursor), before));
	}

	#[test]
	fn zoom_is_clamped() {
		let limits = ViewportLimits::default();
		let mut vp = ViewportState::IDENTITY;
		for _ in 0..100 {
			vp = vp.zoom_at(Point::ORIGIN, 0.5, &limits);
		}
		assert_eq!(vp.scale, 0.1);
		for _ in 0..100 {
			vp = vp.zoom_at(Point::ORIGIN, 2.0, &limits);
		}
		assert_eq!(vp.scale, 4.0);
	}

	#[test]
	fn pan_moves_translate_only() {
		let vp = ViewportState::new(2.0, 0.0, 0.0).pan_by(15.0, -5.0);
		assert_eq!(vp, ViewportState::new(2.0, 15.0, -5.0));
	}

	#[test]
	fn sanitize_rejects_non_finite_and_clamps() {
		let limits = ViewportLimits::default();
		assert!(ViewportState::new(f64::NAN, 0.0, 0.0).sanitized(&limits).is_none());
		assert!(ViewportState::new(1.0, f64::INFINITY, 0.0).sanitized(&limits).is_none());
		assert_eq!(
			ViewportState::new(0.0, 5.0, 5.0).sanitized(&limits),
			Some(ViewportState::new(0.1, 5.0, 5.0))
		);
	}

	#[test]
	fn delta_uses_scale_only() {
		let vp = ViewportState::new(2.0, 500.0, 500.0);
		assert_eq!(vp.screen_delta_to_graph(10.0, -20.0), Point::new(5.0, -10.0));
	}
}
