//! flow-canvas: Interactive node-graph flow editor.
//!
//! This crate provides a WASM-based flow builder canvas: typed blocks wired
//! through ports, pan/zoom, drag-to-connect, and a layered auto-layout.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::flow_editor::{
	EditorConfig, FlowEditor, FlowEditorCanvas, FlowEditorHandle, Graph, NodeKind, Point, Theme, ViewportState,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("flow-canvas: logging initialized");
}

/// Text of the `<script>` element with the given id, if there is one.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load editor configuration from a script element with id="flow-config".
fn load_config() -> EditorConfig {
	let Some(json_text) = script_text("flow-config") else {
		return EditorConfig::default();
	};
	match EditorConfig::from_json(&json_text) {
		Ok(config) => {
			info!("flow-canvas: loaded config");
			config
		}
		Err(e) => {
			warn!("flow-canvas: rejected config, using defaults: {}", e);
			EditorConfig::default()
		}
	}
}

fn export_date() -> String {
	String::from(js_sys::Date::new_0().to_iso_string())
}

/// Main application component.
/// Loads an optional flow document (id="flow-data") and renders the editor
/// with a small toolbar standing in for the surrounding panels.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let mut editor = FlowEditor::new(load_config());
	if let Some(json_text) = script_text("flow-data") {
		let _ = editor.import_json(&json_text);
	}
	let handle = FlowEditorHandle::new(editor);

	let theme = RwSignal::new(Theme::light());
	let document = RwSignal::new(String::new());
	let status = RwSignal::new(String::new());
	let beautify = RwSignal::new(false);
	let view_only = RwSignal::new(false);

	let sync_modes = {
		let h = handle.clone();
		move || {
			let mode = h.with(|ed| ed.mode());
			beautify.set(mode.beautify);
			view_only.set(mode.view_only);
		}
	};

	let add_block = {
		let h = handle.clone();
		move |kind: NodeKind| {
			let result = h.with(|ed| {
				let center = ed.get_viewport().screen_to_graph(ed.visible_region().center());
				ed.add_node(kind, center)
			});
			if let Err(e) = result {
				status.set(e.to_string());
			}
		}
	};
	let (add_data, add_task, add_params) = (add_block.clone(), add_block.clone(), add_block);

	let h = handle.clone();
	let zoom_in = move |_| h.with(FlowEditor::zoom_in);
	let h = handle.clone();
	let zoom_out = move |_| h.with(FlowEditor::zoom_out);
	let h = handle.clone();
	let fit_view = move |_| h.with(FlowEditor::fit_view);
	let h = handle.clone();
	let delete_selected = move |_| {
		h.with(|ed| {
			if let Some(id) = ed.selected().cloned() {
				ed.delete_node(id.as_str());
			}
		});
	};

	let (h, sync) = (handle.clone(), sync_modes.clone());
	let toggle_beautify = move |_| {
		h.with(|ed| ed.set_beautify(!ed.mode().beautify));
		sync();
	};
	let (h, sync) = (handle.clone(), sync_modes);
	let toggle_view_only = move |_| {
		h.with(|ed| ed.set_view_only(!ed.mode().view_only));
		sync();
	};
	let toggle_labels = move |_| theme.update(|t| t.show_labels = !t.show_labels);
	let toggle_theme = move |_| {
		theme.update(|t| {
			let show_labels = t.show_labels;
			*t = if t.name == "light" { Theme::dark() } else { Theme::light() };
			t.show_labels = show_labels;
		})
	};

	let h = handle.clone();
	let export_flow = move |_| match h.with(|ed| ed.export_json(Some(export_date()))) {
		Ok(json_text) => {
			document.set(json_text);
			status.set("Flow exported.".to_string());
		}
		Err(e) => status.set(e.to_string()),
	};
	let h = handle.clone();
	let import_flow = move |_| {
		let json_text = document.get_untracked();
		match h.with(|ed| ed.import_json(&json_text).map(|()| ed.graph().node_count())) {
			Ok(count) => status.set(format!("Imported {count} blocks.")),
			Err(e) => status.set(e.to_string()),
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=move || theme.with(|t| t.name) />
		<Title text="Flow Builder" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="flow-editor">
			<FlowEditorCanvas editor=handle theme=theme fullscreen=true />
			<div class="flow-toolbar">
				<button on:click=move |_| add_data(NodeKind::Data)>"Data"</button>
				<button on:click=move |_| add_task(NodeKind::Task)>"Task"</button>
				<button on:click=move |_| add_params(NodeKind::Parameters)>"Parameters"</button>
				<button on:click=delete_selected>"Delete"</button>
				<button on:click=zoom_in>"+"</button>
				<button on:click=zoom_out>"-"</button>
				<button on:click=fit_view>"Fit"</button>
				<button on:click=toggle_beautify class:active=move || beautify.get()>"Beautify"</button>
				<button on:click=toggle_view_only class:active=move || view_only.get()>"View only"</button>
				<button on:click=toggle_labels>"Labels"</button>
				<button on:click=toggle_theme>"Theme"</button>
				<button on:click=export_flow>"Export"</button>
				<button on:click=import_flow>"Import"</button>
			</div>
			<div class="flow-document">
				<textarea
					prop:value=move || document.get()
					on:input=move |ev| document.set(event_target_value(&ev))
				/>
				<p class="status">{move || status.get()}</p>
			</div>
		</div>
	}
}
