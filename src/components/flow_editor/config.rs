//! Editor configuration.
//!
//! Every section has defaults matching the stock flow builder, and every
//! field may be omitted when loading a config from JSON.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::scale::{ScaleBehavior, ScaleConfig};

fn require(ok: bool, field: &'static str, requirement: &'static str) -> Result<(), ConfigError> {
	if ok {
		Ok(())
	} else {
		Err(ConfigError::Invalid { field, requirement })
	}
}

fn positive(value: f64) -> bool {
	value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
	value.is_finite() && value >= 0.0
}

/// Zoom range and step sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportLimits {
	/// Smallest scale reachable by wheel zoom.
	pub min_scale: f64,
	/// Largest scale reachable by any zoom.
	pub max_scale: f64,
	/// Lower bound for the zoom-out button, which stops earlier than the wheel.
	pub button_min_scale: f64,
	/// Scale change per zoom button press.
	pub button_step: f64,
	/// Scale factor per wheel step when zooming in.
	pub wheel_zoom_in: f64,
	/// Scale factor per wheel step when zooming out.
	pub wheel_zoom_out: f64,
}

impl Default for ViewportLimits {
	fn default() -> Self {
		Self {
			min_scale: 0.1,
			max_scale: 4.0,
			button_min_scale: 0.8,
			button_step: 0.1,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
		}
	}
}

/// Spacing used by the layered auto-layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Distance between node centres within a layer.
	pub horizontal_spacing: f64,
	/// Distance between layers.
	pub vertical_spacing: f64,
	/// Y coordinate of the top layer.
	pub base_y: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			horizontal_spacing: 250.0,
			vertical_spacing: 200.0,
			base_y: 100.0,
		}
	}
}

/// View centering margins and animation durations (seconds).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenteringConfig {
	/// Margin around each node position, standing in for its rendered size.
	pub node_margin: f64,
	/// Extra padding around the whole bounding box.
	pub padding: f64,
	/// Duration of `fit_view`.
	pub fit_duration: f64,
	/// Duration of `focus_node`.
	pub focus_duration: f64,
	/// Duration of `reset_view`.
	pub reset_duration: f64,
}

impl Default for CenteringConfig {
	fn default() -> Self {
		Self {
			node_margin: 100.0,
			padding: 100.0,
			fit_duration: 0.5,
			focus_duration: 0.5,
			reset_duration: 0.3,
		}
	}
}

/// Widths of the collaborator panels that can cover the canvas edges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelInsets {
	/// Width of the left panel when open.
	pub left_width: f64,
	/// Width of the right panel when open.
	pub right_width: f64,
}

impl Default for PanelInsets {
	fn default() -> Self {
		Self {
			left_width: 320.0,
			right_width: 384.0,
		}
	}
}

/// Pointer gesture tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
	/// A background press that travels less than this (screen px) is a click.
	pub click_slop: f64,
}

impl Default for GestureConfig {
	fn default() -> Self {
		Self { click_slop: 3.0 }
	}
}

/// Complete editor configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Zoom limits.
	pub viewport: ViewportLimits,
	/// Auto-layout spacing.
	pub layout: LayoutConfig,
	/// View centering.
	pub centering: CenteringConfig,
	/// Panel widths.
	pub panels: PanelInsets,
	/// Pointer gestures.
	pub gesture: GestureConfig,
	/// Element sizes and their zoom behaviour.
	pub scale: ScaleConfig,
}

impl ViewportLimits {
	/// Requires `0 < min_scale <= button_min_scale <= max_scale` and positive steps.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require(positive(self.min_scale), "viewport.min_scale", "must be finite and above 0")?;
		require(self.max_scale.is_finite(), "viewport.max_scale", "must be finite")?;
		require(
			self.min_scale <= self.button_min_scale && self.button_min_scale <= self.max_scale,
			"viewport.button_min_scale",
			"must lie between min_scale and max_scale",
		)?;
		require(positive(self.button_step), "viewport.button_step", "must be finite and above 0")?;
		require(positive(self.wheel_zoom_in), "viewport.wheel_zoom_in", "must be finite and above 0")?;
		require(positive(self.wheel_zoom_out), "viewport.wheel_zoom_out", "must be finite and above 0")
	}
}

impl LayoutConfig {
	/// Requires finite spacing so laid-out positions stay finite.
	pub fn validate(&self) -> Result<(), ConfigError> {
		require(self.horizontal_spacing.is_finite(), "layout.horizontal_spacing", "must be finite")?;
		require(self.vertical_spacing.is_finite(), "layout.vertical_spacing", "must be finite")?;
		require(self.base_y.is_finite(), "layout.base_y", "must be finite")
	}
}

fn validate_behavior(behavior: &ScaleBehavior, field: &'static str) -> Result<(), ConfigError> {
	match behavior {
		ScaleBehavior::Clamped {
			min_screen,
			max_screen,
		} => require(
			*min_screen >= 0.0 && min_screen <= max_screen,
			field,
			"needs 0 <= min_screen <= max_screen",
		),
		ScaleBehavior::World | ScaleBehavior::Screen => Ok(()),
	}
}

impl EditorConfig {
	/// Parses a (possibly partial) JSON config and validates it.
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks the ranges the editor relies on: a strictly positive zoom
	/// range, finite geometry and well-ordered clamp bounds.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.viewport.validate()?;
		self.layout.validate()?;
		require(non_negative(self.centering.node_margin), "centering.node_margin", "must be finite and not negative")?;
		require(non_negative(self.centering.padding), "centering.padding", "must be finite and not negative")?;
		require(non_negative(self.panels.left_width), "panels.left_width", "must be finite and not negative")?;
		require(non_negative(self.panels.right_width), "panels.right_width", "must be finite and not negative")?;
		require(non_negative(self.gesture.click_slop), "gesture.click_slop", "must be finite and not negative")?;

		let scale = &self.scale;
		require(positive(scale.node.width), "scale.node.width", "must be finite and above 0")?;
		require(positive(scale.node.height), "scale.node.height", "must be finite and above 0")?;
		require(non_negative(scale.port.offset), "scale.port.offset", "must be finite and not negative")?;
		require(non_negative(scale.port.spacing), "scale.port.spacing", "must be finite and not negative")?;
		validate_behavior(&scale.port.radius_behavior, "scale.port.radius_behavior")?;
		validate_behavior(&scale.port.hit_behavior, "scale.port.hit_behavior")
	}
}
