//! Visual theming for the flow canvas.
//!
//! Colours follow the flow builder's light and dark colour modes; block
//! kinds pick their ring colour from a small palette.

use super::graph::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// An opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// CSS text for the canvas context, `#rrggbb` when opaque.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

const BLUE_300: Color = Color::rgb(0x63, 0xb3, 0xed);
const BLUE_500: Color = Color::rgb(0x31, 0x82, 0xce);
const GREEN_300: Color = Color::rgb(0x68, 0xd3, 0x91);
const GREEN_500: Color = Color::rgb(0x38, 0xa1, 0x69);
const PURPLE_300: Color = Color::rgb(0xb7, 0x94, 0xf4);
const PURPLE_500: Color = Color::rgb(0x80, 0x5a, 0xd5);
const GRAY_50: Color = Color::rgb(0xf7, 0xfa, 0xfc);
const GRAY_300: Color = Color::rgb(0xcb, 0xd5, 0xe0);
const GRAY_400: Color = Color::rgb(0xa0, 0xae, 0xc0);
const GRAY_500: Color = Color::rgb(0x71, 0x80, 0x96);
const GRAY_700: Color = Color::rgb(0x2d, 0x37, 0x48);
const GRAY_800: Color = Color::rgb(0x1a, 0x20, 0x2c);
const WHITE: Color = Color::rgb(255, 255, 255);

/// Ring colours of one block kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindColors {
	/// Ring around an unselected block.
	pub ring: Color,
	/// Ring around the selected block.
	pub ring_selected: Color,
}

impl KindColors {
	/// Palette entry for `kind`.
	pub fn for_kind(kind: &NodeKind) -> Self {
		let (ring, ring_selected) = match kind {
			NodeKind::Data => (BLUE_300, BLUE_500),
			NodeKind::Task => (GREEN_300, GREEN_500),
			NodeKind::Parameters => (PURPLE_300, PURPLE_500),
			_ => (GRAY_300, GRAY_500),
		};
		Self { ring, ring_selected }
	}

	/// The ring to draw for the given selection state.
	pub fn ring(&self, selected: bool) -> Color {
		if selected { self.ring_selected } else { self.ring }
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Theme name, mirrored into the page's `data-theme`.
	pub name: &'static str,
	/// Canvas background.
	pub background: Color,
	/// Block fill.
	pub node_fill: Color,
	/// Fill of the selected block.
	pub node_fill_selected: Color,
	/// Block name text.
	pub label: Color,
	/// Port fill.
	pub port_fill: Color,
	/// Fill of the port a connection drag started from.
	pub port_active: Color,
	/// Edge stroke.
	pub edge: Color,
	/// Highlighted edge stroke.
	pub edge_highlight: Color,
	/// Stroke of the connection being drawn.
	pub preview: Color,
	/// Draw block names. The "hide text labels" toggle clears it.
	pub show_labels: bool,
}

impl Theme {
	/// Light colour mode.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: WHITE,
			node_fill: WHITE,
			node_fill_selected: GRAY_50,
			label: GRAY_800,
			port_fill: WHITE,
			port_active: BLUE_300,
			edge: GRAY_400,
			edge_highlight: BLUE_500,
			preview: GRAY_500,
			show_labels: true,
		}
	}

	/// Dark colour mode.
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: GRAY_800,
			node_fill: Color::rgb(0x4a, 0x55, 0x68),
			node_fill_selected: GRAY_700,
			label: WHITE,
			port_fill: GRAY_700,
			port_active: BLUE_500,
			edge: GRAY_500,
			edge_highlight: BLUE_300,
			preview: WHITE,
			show_labels: true,
		}
	}

	/// Stroke colour for an edge at highlight intensity `t`.
	pub fn edge_color(&self, t: f64) -> Color {
		self.edge.lerp(self.edge_highlight, t)
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}
