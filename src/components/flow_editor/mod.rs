//! Interactive flow editor.
//!
//! Typed blocks are wired together through ports on a pannable, zoomable
//! canvas:
//! - Node and edge tables with cascade delete and duplicate/self-loop rejection
//! - Gesture state machines for moving nodes and drawing connections
//! - Layered top-to-bottom auto-layout ("beautify")
//! - Selection highlighting and animated view centering
//! - JSON import/export
//!
//! Everything except the canvas component and renderer is plain data, so
//! the editor can be driven and tested without a browser.
//!
//! # Example
//!
//! ```ignore
//! use flow_canvas::{EditorConfig, FlowEditor, FlowEditorCanvas, FlowEditorHandle, NodeKind, Point, Theme};
//!
//! let mut editor = FlowEditor::new(EditorConfig::default());
//! editor.add_node(NodeKind::Data, Point::new(0.0, 0.0))?;
//! let handle = FlowEditorHandle::new(editor);
//!
//! view! { <FlowEditorCanvas editor=handle theme=Signal::stored(Theme::light()) fullscreen=true /> }
//! ```

pub mod centering;
mod component;
pub mod config;
pub mod connection;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod highlight;
pub mod layout;
pub mod mutation;
mod render;
pub mod scale;
pub mod theme;
pub mod viewport;

pub use component::{FlowEditorCanvas, FlowEditorHandle};
pub use config::EditorConfig;
pub use editor::{FlowEditor, PointerTarget};
pub use error::{ConfigError, DragRejection, EdgeRejection, ExportError, ImportError, PositionRejection};
pub use geometry::Point;
pub use graph::{Edge, EdgeId, Endpoint, Graph, Node, NodeId, NodeKind, NodeTemplate, PortAddress, PortDirection, PortSpec};
pub use layout::{LayerEntry, LayerMap, Layout, beautify};
pub use mutation::{EditorMode, MutationRequest};
pub use theme::Theme;
pub use viewport::ViewportState;
