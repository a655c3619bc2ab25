//! Typed failures and rejections reported by the editor core.
//!
//! Gestures that end badly are not errors: the controllers turn an
//! [`EdgeRejection`] into a silent no-op. The enums exist so collaborators
//! calling the operation surface directly can tell what happened.

/// Why a flow document could not be imported.
///
/// Import is all-or-nothing, so any of these leaves the current graph intact.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
	/// The text is not a flow document.
	#[error("Invalid JSON format: {0}")]
	InvalidFormat(String),
	/// An edge references a missing node.
	#[error("Invalid edges: dangling reference ({edge_id})")]
	DanglingEdge {
		/// Id of the offending edge.
		edge_id: String,
	},
	/// An edge references a missing port.
	#[error("Invalid edges: port out of range ({edge_id})")]
	DanglingPort {
		/// Id of the offending edge.
		edge_id: String,
	},
	/// An edge connects a node to itself.
	#[error("Invalid edges: self-loop ({edge_id})")]
	SelfLoop {
		/// Id of the offending edge.
		edge_id: String,
	},
	/// Two edges connect the same ports.
	#[error("Invalid edges: duplicate connection ({edge_id})")]
	DuplicateEdge {
		/// Id of the offending edge.
		edge_id: String,
	},
	/// Two nodes share an id.
	#[error("Invalid nodes: duplicate id ({node_id})")]
	DuplicateNode {
		/// Id of the offending node.
		node_id: String,
	},
	/// A node position is NaN or infinite.
	#[error("Invalid nodes: non-finite position ({node_id})")]
	NonFinitePosition {
		/// Id of the offending node.
		node_id: String,
	},
}

/// Why an editor configuration was refused.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The text is not valid JSON for this shape.
	#[error("failed to parse config: {0}")]
	Parse(#[from] serde_json::Error),
	/// A value is outside its allowed range.
	#[error("invalid config: {field} {requirement}")]
	Invalid {
		/// Dotted path of the field, e.g. `viewport.min_scale`.
		field: &'static str,
		/// What the value must satisfy.
		requirement: &'static str,
	},
}

/// Why a flow could not be exported.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
	/// The flow has no nodes.
	#[error("No flow content to export.")]
	Empty,
	/// Serialization failed.
	#[error("failed to serialize flow: {0}")]
	Serialize(#[from] serde_json::Error),
}

/// Why an `add_edge` request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EdgeRejection {
	/// Source and target are the same node.
	#[error("an edge cannot connect a node to itself")]
	SelfLoop,
	/// The same ports are already connected.
	#[error("this connection already exists")]
	Duplicate,
	/// Source or target node is unknown.
	#[error("edge references a node that does not exist")]
	UnknownNode,
	/// A port index is past the end of the node's ports.
	#[error("edge references a port that does not exist")]
	PortOutOfRange,
	/// Edits are disabled.
	#[error("the editor is in view-only mode")]
	ViewOnly,
}

/// Why a node drag could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DragRejection {
	/// Edits are disabled.
	#[error("the editor is in view-only mode")]
	ViewOnly,
	/// Beautify owns node positions.
	#[error("manual dragging is disabled while beautify is active")]
	BeautifyActive,
	/// Another gesture holds the pointer.
	#[error("another gesture is already in progress")]
	GestureActive,
}

/// Why a position update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionRejection {
	/// No node has this id.
	#[error("node does not exist")]
	UnknownNode,
	/// The position is NaN or infinite.
	#[error("position must be finite")]
	NonFinite,
	/// Beautify or view-only mode is on.
	#[error("the editor does not accept this change in its current mode")]
	Locked,
}
