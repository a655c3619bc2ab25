//! Node geometry and zoom-dependent sizing for canvas visuals.
//!
//! Node boxes and port anchors are defined in graph space and never change
//! with zoom. Strokes, port hit areas and label fonts do, and this module is
//! where that behavior is tuned.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: graph coordinates. Values scale with zoom.
//! - **Screen-space**: canvas pixels. Values stay constant regardless of zoom.
//!
//! # Scaling Behaviors
//!
//! - [`ScaleBehavior::World`]: constant world size, appears larger when zoomed in.
//! - [`ScaleBehavior::Screen`]: constant pixel size. Divides by `k`.
//! - [`ScaleBehavior::Clamped`]: world size with min/max screen-size bounds.

use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Point};
use super::graph::PortDirection;

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(
	dead_code,
	reason = "World/Screen variants complete the API for users customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Fixed size in world units; grows and shrinks with zoom.
	World,
	/// Fixed size on screen whatever the zoom.
	Screen,
	/// World size kept within screen-space bounds; use infinities for unbounded.
	Clamped {
		/// Smallest on-screen size.
		min_screen: f64,
		/// Largest on-screen size.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(
	dead_code,
	reason = "Constant variant available for custom alpha behaviors"
)]
pub enum AlphaBehavior {
	/// Always fully opaque.
	Constant,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade {
		/// Zoom at which the element is invisible.
		zero_alpha_k: f64,
		/// Zoom at which the element is fully opaque.
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Opacity at zoom `k`, in `[0, 1]`.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node box geometry (world units) and label sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeScaleConfig {
	/// Box width, world units.
	pub width: f64,
	/// Box height, world units.
	pub height: f64,
	/// Corner rounding, world units.
	pub corner_radius: f64,
	/// Border width in screen pixels.
	pub border_width: f64,
	/// Label font size in world units.
	pub label_size: f64,
	/// Label fade with zoom.
	pub label_alpha: AlphaBehavior,
}

/// Port placement relative to the node centre.
///
/// Inputs stack upwards above the box, outputs downwards below it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortScaleConfig {
	/// Distance from node centre to the first port.
	pub offset: f64,
	/// Distance between consecutive ports on the same side.
	pub spacing: f64,
	/// Drawn port radius.
	pub radius: f64,
	/// Zoom behaviour of `radius`.
	pub radius_behavior: ScaleBehavior,
	/// Pointer hit radius.
	pub hit_radius: f64,
	/// Zoom behaviour of `hit_radius`.
	pub hit_behavior: ScaleBehavior,
}

/// Edge stroke configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	/// Line width of highlighted edges in screen pixels.
	pub highlight_width: f64,
	/// Vertical control-point pull of edge curves, world units.
	pub curve_pull: f64,
	/// Dash pattern of the in-progress connection curve, screen pixels.
	pub preview_dash: (f64, f64),
}

/// Complete scale configuration for all canvas elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
	/// Node boxes.
	pub node: NodeScaleConfig,
	/// Ports.
	pub port: PortScaleConfig,
	/// Edges.
	pub edge: EdgeScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				width: 120.0,
				height: 60.0,
				corner_radius: 6.0,
				border_width: 2.0,
				label_size: 14.0,
				label_alpha: AlphaBehavior::Fade {
					zero_alpha_k: 0.25,
					full_alpha_k: 0.5,
				},
			},
			port: PortScaleConfig {
				offset: 30.0,
				spacing: 20.0,
				radius: 5.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 3.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 8.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
			},
			edge: EdgeScaleConfig {
				line_width: 1.0,
				highlight_width: 2.0,
				curve_pull: 50.0,
				preview_dash: (5.0, 5.0),
			},
		}
	}
}

impl ScaleConfig {
	/// Graph-space anchor of a port on a node centred at `node_position`.
	pub fn port_anchor(&self, node_position: Point, direction: PortDirection, index: usize) -> Point {
		let distance = self.port.offset + index as f64 * self.port.spacing;
		match direction {
			PortDirection::Input => node_position.offset(0.0, -distance),
			PortDirection::Output => node_position.offset(0.0, distance),
		}
	}

	/// Graph-space box of a node centred at `node_position`.
	pub fn node_bounds(&self, node_position: Point) -> Bounds {
		let (hw, hh) = (self.node.width / 2.0, self.node.height / 2.0);
		Bounds {
			min: node_position.offset(-hw, -hh),
			max: node_position.offset(hw, hh),
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame. All sizes are world-space.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom level these values were computed for.
	pub k: f64,
	/// Drawn port radius.
	pub port_radius: f64,
	/// Port hit radius.
	pub port_hit_radius: f64,
	/// Node border width.
	pub border_width: f64,
	/// Canvas font string, e.g. "500 14px sans-serif".
	pub label_font: String,
	/// Label opacity.
	pub label_alpha: f64,
	/// Edge line width.
	pub edge_line_width: f64,
	/// Highlighted edge line width.
	pub edge_highlight_width: f64,
	/// Preview dash pattern.
	pub preview_dash: (f64, f64),
}

impl ScaledValues {
	/// Resolves every size in `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			port_radius: config.port.radius_behavior.apply(config.port.radius, k),
			port_hit_radius: config.port.hit_behavior.apply(config.port.hit_radius, k),
			border_width: config.node.border_width / k,
			label_font: format!("500 {}px sans-serif", config.node.label_size),
			label_alpha: config.node.label_alpha.apply(k),
			edge_line_width: config.edge.line_width / k,
			edge_highlight_width: config.edge.highlight_width / k,
			preview_dash: (config.edge.preview_dash.0 / k, config.edge.preview_dash.1 / k),
		}
	}
}
