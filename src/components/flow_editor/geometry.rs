//! Plain 2D geometry shared by the core components.

use serde::{Deserialize, Serialize};

/// A point or offset. Graph-space or screen-space depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

impl Point {
	/// `(0, 0)`.
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	/// A point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// True when both coordinates are finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// This point moved by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}

	/// Linear interpolation towards `other`; `t = 0` is `self`.
	pub fn lerp(self, other: Point, t: f64) -> Self {
		Self::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}
}

/// Axis-aligned rectangle, `min` inclusive, `max` inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Top-left corner.
	pub min: Point,
	/// Bottom-right corner.
	pub max: Point,
}

impl Bounds {
	/// Bounds of a point set, each point grown by `margin` on every side.
	/// `None` for an empty set.
	pub fn around<I>(points: I, margin: f64) -> Option<Self>
	where
		I: IntoIterator<Item = Point>,
	{
		let mut iter = points.into_iter();
		let first = iter.next()?;
		let mut bounds = Bounds {
			min: first,
			max: first,
		};
		for p in iter {
			bounds.min.x = bounds.min.x.min(p.x);
			bounds.min.y = bounds.min.y.min(p.y);
			bounds.max.x = bounds.max.x.max(p.x);
			bounds.max.y = bounds.max.y.max(p.y);
		}
		Some(bounds.inflate(margin))
	}

	/// Grows the box by `by` on every side.
	pub fn inflate(self, by: f64) -> Self {
		Self {
			min: self.min.offset(-by, -by),
			max: self.max.offset(by, by),
		}
	}

	/// Midpoint of the box.
	pub fn center(&self) -> Point {
		self.min.lerp(self.max, 0.5)
	}

	/// True when `p` lies inside or on the edge.
	pub fn contains(&self, p: Point) -> bool {
		p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
	}
}

/// Cubic Bézier segment `M from C c1, c2, to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
	/// Start point.
	pub from: Point,
	pub c1: Point,
	pub c2: Point,
	/// End point.
	pub to: Point,
}

impl CubicBezier {
	/// Vertical S-curve leaving `from` downwards and entering `to` from above.
	pub fn vertical(from: Point, to: Point, pull: f64) -> Self {
		Self {
			from,
			c1: from.offset(0.0, pull),
			c2: to.offset(0.0, -pull),
			to,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bounds_of_empty_set_is_none() {
		assert!(Bounds::around(std::iter::empty(), 10.0).is_none());
	}

	#[test]
	fn bounds_grow_by_margin() {
		let b = Bounds::around([Point::new(0.0, 0.0), Point::new(100.0, 50.0)], 10.0).unwrap();
		assert_eq!(b.min, Point::new(-10.0, -10.0));
		assert_eq!(b.max, Point::new(110.0, 60.0));
		assert_eq!(b.center(), Point::new(50.0, 25.0));
	}

	#[test]
	fn vertical_curve_pulls_control_points() {
		let curve = CubicBezier::vertical(Point::new(0.0, 0.0), Point::new(40.0, 200.0), 50.0);
		assert_eq!((curve.from, curve.to), (Point::ORIGIN, Point::new(40.0, 200.0)));
		assert_eq!(curve.c1, Point::new(0.0, 50.0));
		assert_eq!(curve.c2, Point::new(40.0, 150.0));
	}
}
