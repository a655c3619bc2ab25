//! Leptos component hosting the flow editor on a canvas element.
//!
//! Presses and wheel events come from the canvas itself. Moves, releases
//! and focus loss are listened for on the window, so a gesture that leaves
//! the canvas still ends cleanly. An animation loop runs via
//! `requestAnimationFrame`, ticking view animations and redrawing each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::editor::FlowEditor;
use super::geometry::Point;
use super::render;
use super::theme::Theme;

/// Shared handle to one editor, used by the canvas and by collaborator controls.
#[derive(Clone, Debug)]
pub struct FlowEditorHandle(Rc<RefCell<FlowEditor>>);

impl FlowEditorHandle {
	/// Wraps an editor for sharing between the canvas and its controls.
	pub fn new(editor: FlowEditor) -> Self {
		Self(Rc::new(RefCell::new(editor)))
	}

	/// Runs `f` against the editor. Must not be nested.
	pub fn with<R>(&self, f: impl FnOnce(&mut FlowEditor) -> R) -> R {
		f(&mut self.0.borrow_mut())
	}
}

/// Drawing surface state kept between frames.
struct Surface {
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
	/// Timestamp of the previous frame in milliseconds.
	last_frame: Option<f64>,
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
		window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
	)
}

/// Renders an interactive flow editor on a canvas element.
///
/// The editor is shared through `editor`, so toolbars and panels can call
/// the same operations the gestures use. The component sizes itself to its
/// parent container by default; set `fullscreen = true` to fill the window
/// and follow resizes. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn FlowEditorCanvas(
	/// Editor to display and drive.
	editor: FlowEditorHandle,
	/// Colours and label visibility.
	#[prop(into)]
	theme: Signal<Theme>,
	/// Fill the window and follow resizes.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed canvas width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed canvas height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: Rc<RefCell<Option<Surface>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let mouse_cbs: Rc<RefCell<Vec<Closure<dyn FnMut(MouseEvent)>>>> = Rc::new(RefCell::new(Vec::new()));
	let blur_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (editor_init, surface_init) = (editor.clone(), surface.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("flow-canvas: 2d context unavailable");
			return;
		};

		editor_init.with(|ed| {
			ed.set_canvas_size(w, h);
			ed.fit_view();
		});
		*surface_init.borrow_mut() = Some(Surface {
			ctx,
			width: w,
			height: h,
			last_frame: None,
		});

		// Window-level listeners end gestures wherever the pointer is released.
		let (editor_move, canvas_move) = (editor_init.clone(), canvas.clone());
		let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			editor_move.with(|ed| {
				if ed.is_gesture_active() {
					ed.pointer_move(local_point(&canvas_move, &ev));
				}
			});
		});
		let (editor_up, canvas_up) = (editor_init.clone(), canvas.clone());
		let on_up = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
			editor_up.with(|ed| {
				if ed.is_gesture_active() {
					ed.pointer_up(local_point(&canvas_up, &ev));
				}
			});
		});
		let _ = window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref());
		let _ = window.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref());
		mouse_cbs.borrow_mut().extend([on_move, on_up]);

		let editor_blur = editor_init.clone();
		*blur_cb.borrow_mut() = Some(Closure::new(move || {
			editor_blur.with(FlowEditor::pointer_cancel);
		}));
		if let Some(ref cb) = *blur_cb.borrow() {
			let _ = window.add_event_listener_with_callback("blur", cb.as_ref().unchecked_ref());
		}

		if fullscreen {
			let (surface_resize, editor_resize, canvas_resize) =
				(surface_init.clone(), editor_init.clone(), canvas.clone());
			*resize_cb.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				editor_resize.with(|ed| ed.set_canvas_size(nw, nh));
				if let Some(ref mut s) = *surface_resize.borrow_mut() {
					s.width = nw;
					s.height = nh;
				}
			}));
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (surface_anim, editor_anim, animate_inner) = (surface_init.clone(), editor_init.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(ref mut s) = *surface_anim.borrow_mut() {
				let dt = s.last_frame.map_or(0.016, |last| ((now - last) / 1000.0).clamp(0.0, 0.1));
				s.last_frame = Some(now);
				editor_anim.with(|ed| {
					ed.tick(dt);
					theme.with_untracked(|t| render::render(ed, &s.ctx, s.width, s.height, t));
				});
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let editor_md = editor.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let at = local_point(&canvas, &ev);
		editor_md.with(|ed| {
			ed.pointer_down(at);
		});
	};

	let editor_wh = editor.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let at = local_point(&canvas, &ev);
		editor_wh.with(|ed| ed.wheel(at, ev.delta_y()));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-editor-canvas"
			on:mousedown=on_mousedown
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
