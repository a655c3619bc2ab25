//! Canvas rendering for the flow editor.
//!
//! Passes, bottom to top:
//! 1. Background (screen space)
//! 2. Edges, highlighted edges fading over plain ones (world space)
//! 3. The transient connection curve, dashed
//! 4. Node boxes and labels, then their ports

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::editor::FlowEditor;
use super::geometry::{CubicBezier, Point};
use super::graph::{Node, PortAddress, PortDirection};
use super::scale::{ScaleConfig, ScaledValues};
use super::theme::{KindColors, Theme};

/// Smoothstep easing for highlight intensity.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the whole editor to the canvas.
pub fn render(editor: &FlowEditor, ctx: &CanvasRenderingContext2d, width: f64, height: f64, theme: &Theme) {
	let viewport = editor.get_viewport();
	let config = &editor.config().scale;
	let scale = ScaledValues::new(config, viewport.scale);

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let _ = ctx.translate(viewport.translate_x, viewport.translate_y);
	let _ = ctx.scale(viewport.scale, viewport.scale);

	let frame = Frame {
		editor,
		ctx,
		config,
		scale: &scale,
		theme,
	};
	frame.draw_edges();
	if let Some(curve) = editor.connection_preview() {
		frame.draw_preview(&curve);
	}
	frame.draw_nodes();

	ctx.restore();
}

struct Frame<'a> {
	editor: &'a FlowEditor,
	ctx: &'a CanvasRenderingContext2d,
	config: &'a ScaleConfig,
	scale: &'a ScaledValues,
	theme: &'a Theme,
}

impl Frame<'_> {
	/// Where a node is drawn: its drag preview if it is being dragged.
	fn position_of(&self, node: &Node) -> Point {
		match self.editor.drag_preview() {
			Some((id, at)) if id == &node.id => at,
			_ => node.position,
		}
	}

	fn anchor(&self, node_id: &str, direction: PortDirection, index: usize) -> Option<Point> {
		let node = self.editor.graph().node(node_id)?;
		Some(self.config.port_anchor(self.position_of(node), direction, index))
	}

	fn draw_edges(&self) {
		let ctx = self.ctx;
		let highlight = self.editor.highlight();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		for edge in self.editor.graph().edges() {
			let (Some(from), Some(to)) = (
				self.anchor(edge.source.node_id.as_str(), PortDirection::Output, edge.source.port),
				self.anchor(edge.target.node_id.as_str(), PortDirection::Input, edge.target.port),
			) else {
				continue;
			};
			let t = smooth_step(highlight.edge_intensity(&edge.id));
			let color = self.theme.edge_color(t).to_css();
			let width = self.scale.edge_line_width
				+ (self.scale.edge_highlight_width - self.scale.edge_line_width) * t;

			ctx.set_stroke_style_str(&color);
			ctx.set_line_width(width);
			let curve = CubicBezier::vertical(from, to, self.config.edge.curve_pull);
			self.stroke_curve(&curve);

			ctx.set_fill_style_str(&color);
			self.draw_arrow(to);
		}
	}

	fn stroke_curve(&self, curve: &CubicBezier) {
		let ctx = self.ctx;
		ctx.begin_path();
		ctx.move_to(curve.from.x, curve.from.y);
		ctx.bezier_curve_to(curve.c1.x, curve.c1.y, curve.c2.x, curve.c2.y, curve.to.x, curve.to.y);
		ctx.stroke();
	}

	/// Downward arrowhead ending just above the target port.
	fn draw_arrow(&self, tip: Point) {
		let ctx = self.ctx;
		let size = 10.0 / self.scale.k.max(1.0);
		let tip = tip.offset(0.0, -self.scale.port_radius);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(tip.x - size * 0.5, tip.y - size);
		ctx.line_to(tip.x + size * 0.5, tip.y - size);
		ctx.close_path();
		ctx.fill();
	}

	fn draw_preview(&self, curve: &CubicBezier) {
		let ctx = self.ctx;
		let (dash, gap) = self.scale.preview_dash;
		ctx.set_stroke_style_str(&self.theme.preview.to_css());
		ctx.set_line_width(self.scale.edge_highlight_width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap)));
		self.stroke_curve(curve);
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	fn draw_nodes(&self) {
		let selected = self.editor.selected();
		let origin = self.editor.connection_origin();
		for node in self.editor.graph().nodes() {
			let at = self.position_of(node);
			let is_selected = selected == Some(&node.id);
			let colors = KindColors::for_kind(&node.kind);
			self.draw_box(node, at, is_selected, &colors);
			self.draw_ports(node, at, origin, &colors);
		}
	}

	fn draw_box(&self, node: &Node, at: Point, selected: bool, colors: &KindColors) {
		let ctx = self.ctx;
		let bounds = self.config.node_bounds(at);
		let r = self.config.node.corner_radius;

		ctx.begin_path();
		ctx.move_to(bounds.min.x + r, bounds.min.y);
		let _ = ctx.arc_to(bounds.max.x, bounds.min.y, bounds.max.x, bounds.max.y, r);
		let _ = ctx.arc_to(bounds.max.x, bounds.max.y, bounds.min.x, bounds.max.y, r);
		let _ = ctx.arc_to(bounds.min.x, bounds.max.y, bounds.min.x, bounds.min.y, r);
		let _ = ctx.arc_to(bounds.min.x, bounds.min.y, bounds.max.x, bounds.min.y, r);
		ctx.close_path();

		let fill = if selected {
			self.theme.node_fill_selected
		} else {
			self.theme.node_fill
		};
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill();
		ctx.set_stroke_style_str(&colors.ring(selected).to_css());
		ctx.set_line_width(if selected {
			self.scale.border_width * 1.5
		} else {
			self.scale.border_width
		});
		ctx.stroke();

		let alpha = self.scale.label_alpha;
		if self.theme.show_labels && alpha > 0.01 {
			ctx.set_global_alpha(alpha);
			ctx.set_fill_style_str(&self.theme.label.to_css());
			ctx.set_font(&self.scale.label_font);
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text_with_max_width(&node.name, at.x, at.y, self.config.node.width - 2.0 * r);
			ctx.set_global_alpha(1.0);
		}
	}

	fn draw_ports(&self, node: &Node, at: Point, origin: Option<&PortAddress>, colors: &KindColors) {
		let ctx = self.ctx;
		for direction in [PortDirection::Input, PortDirection::Output] {
			for index in 0..node.ports(direction).len() {
				let center = self.config.port_anchor(at, direction, index);
				let active = origin.is_some_and(|o| o.node_id == node.id && o.direction == direction && o.index == index);
				let fill = if active {
					self.theme.port_active
				} else {
					self.theme.port_fill
				};
				ctx.begin_path();
				let _ = ctx.arc(center.x, center.y, self.scale.port_radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&fill.to_css());
				ctx.fill();
				ctx.set_stroke_style_str(&colors.ring(active).to_css());
				ctx.set_line_width(self.scale.border_width);
				ctx.stroke();
			}
		}
	}
}
