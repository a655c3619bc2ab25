//! JSON import/export of a flow.
//!
//! The document is `{exportDate?, nodes, edges, version}`. Import parses and
//! validates the whole document before building a graph, so a bad file
//! never leaves anything half-applied.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::{ExportError, ImportError};
use super::geometry::Point;
use super::graph::{Edge, EdgeId, Endpoint, Graph, Node, NodeId, NodeKind, PortSpec};

/// Version written into exported documents.
pub const DOCUMENT_VERSION: &str = "1.0";

fn default_version() -> String {
	DOCUMENT_VERSION.to_string()
}

/// Serialized flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
	/// ISO 8601 timestamp of the export.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub export_date: Option<String>,
	/// Blocks of the flow.
	pub nodes: Vec<NodeRecord>,
	/// Connections between blocks.
	pub edges: Vec<EdgeRecord>,
	/// Document format version.
	#[serde(default = "default_version")]
	pub version: String,
}

/// One block as stored in a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
	/// Block id, unique within the document.
	pub id: NodeId,
	/// Block kind, serialized as `type`.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Graph-space x of the block centre.
	pub x: f64,
	/// Graph-space y of the block centre.
	pub y: f64,
	/// Input ports.
	#[serde(default)]
	pub inputs: Vec<PortSpec>,
	/// Output ports.
	#[serde(default)]
	pub outputs: Vec<PortSpec>,
	/// Template the block was created from, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub template_id: Option<String>,
	/// Free-form data kept for collaborators.
	#[serde(default)]
	pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// One connection as stored in a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
	/// Edge id, unique within the document.
	pub id: EdgeId,
	/// Id of the source block.
	pub source: NodeId,
	/// Id of the target block.
	pub target: NodeId,
	/// Output port index on the source.
	#[serde(default)]
	pub source_port: usize,
	/// Input port index on the target.
	#[serde(default)]
	pub target_port: usize,
}

impl From<&Node> for NodeRecord {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id.clone(),
			kind: node.kind.clone(),
			name: node.name.clone(),
			x: node.position.x,
			y: node.position.y,
			inputs: node.inputs.clone(),
			outputs: node.outputs.clone(),
			template_id: node.template_id.clone(),
			metadata: node.metadata.clone(),
		}
	}
}

impl From<NodeRecord> for Node {
	fn from(record: NodeRecord) -> Self {
		Self {
			id: record.id,
			kind: record.kind,
			name: record.name,
			position: Point::new(record.x, record.y),
			inputs: record.inputs,
			outputs: record.outputs,
			layer: 0,
			template_id: record.template_id,
			metadata: record.metadata,
		}
	}
}

impl From<&Edge> for EdgeRecord {
	fn from(edge: &Edge) -> Self {
		Self {
			id: edge.id.clone(),
			source: edge.source.node_id.clone(),
			target: edge.target.node_id.clone(),
			source_port: edge.source.port,
			target_port: edge.target.port,
		}
	}
}

impl From<EdgeRecord> for Edge {
	fn from(record: EdgeRecord) -> Self {
		Self {
			id: record.id,
			source: Endpoint::new(record.source, record.source_port),
			target: Endpoint::new(record.target, record.target_port),
		}
	}
}

impl FlowDocument {
	/// Snapshot of `graph` in document form.
	pub fn from_graph(graph: &Graph, export_date: Option<String>) -> Self {
		Self {
			export_date,
			nodes: graph.nodes().map(NodeRecord::from).collect(),
			edges: graph.edges().map(EdgeRecord::from).collect(),
			version: default_version(),
		}
	}

	/// Checks every graph invariant, then builds the graph.
	pub fn into_graph(self) -> Result<Graph, ImportError> {
		let mut seen_nodes = HashSet::new();
		for node in &self.nodes {
			if !seen_nodes.insert(&node.id) {
				return Err(ImportError::DuplicateNode {
					node_id: node.id.to_string(),
				});
			}
			if !(node.x.is_finite() && node.y.is_finite()) {
				return Err(ImportError::NonFinitePosition {
					node_id: node.id.to_string(),
				});
			}
		}

		let mut seen_edges = HashSet::new();
		let mut seen_tuples = HashSet::new();
		for edge in &self.edges {
			let edge_id = || edge.id.to_string();
			let source = self.nodes.iter().find(|n| n.id == edge.source);
			let target = self.nodes.iter().find(|n| n.id == edge.target);
			let (Some(source), Some(target)) = (source, target) else {
				return Err(ImportError::DanglingEdge { edge_id: edge_id() });
			};
			if source.id == target.id {
				return Err(ImportError::SelfLoop { edge_id: edge_id() });
			}
			if edge.source_port >= source.outputs.len() || edge.target_port >= target.inputs.len() {
				return Err(ImportError::DanglingPort { edge_id: edge_id() });
			}
			let tuple = (&edge.source, edge.source_port, &edge.target, edge.target_port);
			if !seen_edges.insert(&edge.id) || !seen_tuples.insert(tuple) {
				return Err(ImportError::DuplicateEdge { edge_id: edge_id() });
			}
		}

		Ok(Graph::from_parts(
			self.nodes.into_iter().map(Node::from).collect(),
			self.edges.into_iter().map(Edge::from).collect(),
		))
	}
}

/// Parses and validates a flow document.
pub fn import_json(text: &str) -> Result<Graph, ImportError> {
	let value: serde_json::Value =
		serde_json::from_str(text).map_err(|e| ImportError::InvalidFormat(e.to_string()))?;
	let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
	if !has("nodes") || !has("edges") {
		return Err(ImportError::InvalidFormat("Missing nodes or edges".to_string()));
	}
	let document: FlowDocument =
		serde_json::from_value(value).map_err(|e| ImportError::InvalidFormat(e.to_string()))?;
	document.into_graph()
}

/// Pretty-printed document for `graph`. Empty graphs are refused.
pub fn export_json(graph: &Graph, export_date: Option<String>) -> Result<String, ExportError> {
	if graph.is_empty() {
		return Err(ExportError::Empty);
	}
	Ok(serde_json::to_string_pretty(&FlowDocument::from_graph(graph, export_date))?)
}

#[cfg(test)]
mod tests {
	use super::*;

	const TWO_NODES: &str = r#"{
		"nodes": [
			{"id": "a", "type": "data", "name": "Source", "x": 0, "y": 0, "outputs": [{"name": "data", "type": "any"}]},
			{"id": "b", "type": "task", "name": "Work", "x": 0, "y": 200,
			 "inputs": [{"name": "input", "type": "any"}], "outputs": [{"name": "output", "type": "any"}],
			 "metadata": {"owner": "ops"}}
		],
		"edges": [{"id": "e1", "source": "a", "target": "b"}]
	}"#;

	fn doc_with_edges(edges: &str) -> String {
		format!(
			r#"{{"nodes": [
				{{"id": "a", "type": "task", "x": 0, "y": 0, "inputs": [{{"name": "i", "type": "any"}}], "outputs": [{{"name": "o", "type": "any"}}]}},
				{{"id": "b", "type": "task", "x": 0, "y": 0, "inputs": [{{"name": "i", "type": "any"}}], "outputs": [{{"name": "o", "type": "any"}}]}}
			], "edges": {edges}}}"#
		)
	}

	#[test]
	fn imports_with_defaults() {
		let graph = import_json(TWO_NODES).unwrap();
		assert_eq!(graph.node_count(), 2);
		let a = graph.node("a").unwrap();
		assert!(a.inputs.is_empty());
		assert_eq!(a.kind, NodeKind::Data);
		assert_eq!(graph.node("b").unwrap().metadata["owner"], "ops");
		let edge = graph.edge("e1").unwrap();
		assert_eq!(edge.source, Endpoint::new("a", 0));
		assert_eq!(edge.target, Endpoint::new("b", 0));
	}

	#[test]
	fn missing_tables_are_invalid_format() {
		for text in [r#"{"nodes": []}"#, r#"{"edges": []}"#, r#"{"nodes": null, "edges": []}"#, "[]"] {
			let err = import_json(text).unwrap_err();
			assert_eq!(err.to_string(), "Invalid JSON format: Missing nodes or edges");
		}
		assert!(matches!(import_json("{nodes"), Err(ImportError::InvalidFormat(_))));
		assert!(matches!(
			import_json(r#"{"nodes": [{"id": "a"}], "edges": []}"#),
			Err(ImportError::InvalidFormat(_))
		));
	}

	#[test]
	fn dangling_edges_reject_the_whole_document() {
		let text = doc_with_edges(r#"[{"id": "e1", "source": "a", "target": "b"}, {"id": "e2", "source": "a", "target": "ghost"}]"#);
		let err = import_json(&text).unwrap_err();
		assert!(matches!(&err, ImportError::DanglingEdge { edge_id } if edge_id == "e2"));
		assert!(err.to_string().starts_with("Invalid edges: dangling reference"));
	}

	#[test]
	fn structural_invariants_are_enforced() {
		let self_loop = doc_with_edges(r#"[{"id": "e1", "source": "a", "target": "a"}]"#);
		assert!(matches!(import_json(&self_loop), Err(ImportError::SelfLoop { .. })));

		let bad_port = doc_with_edges(r#"[{"id": "e1", "source": "a", "target": "b", "sourcePort": 3}]"#);
		assert!(matches!(import_json(&bad_port), Err(ImportError::DanglingPort { .. })));

		let twice = doc_with_edges(
			r#"[{"id": "e1", "source": "a", "target": "b"}, {"id": "e2", "source": "a", "target": "b"}]"#,
		);
		assert!(matches!(import_json(&twice), Err(ImportError::DuplicateEdge { .. })));

		let dup_node = r#"{"nodes": [{"id": "a", "type": "data", "x": 0, "y": 0}, {"id": "a", "type": "data", "x": 1, "y": 1}], "edges": []}"#;
		assert!(matches!(import_json(dup_node), Err(ImportError::DuplicateNode { .. })));
	}

	#[test]
	fn non_finite_positions_are_rejected() {
		let document = FlowDocument {
			export_date: None,
			nodes: vec![NodeRecord {
				id: "a".into(),
				kind: NodeKind::Data,
				name: String::new(),
				x: f64::NAN,
				y: 0.0,
				inputs: vec![],
				outputs: vec![],
				template_id: None,
				metadata: Default::default(),
			}],
			edges: vec![],
			version: default_version(),
		};
		assert!(matches!(document.into_graph(), Err(ImportError::NonFinitePosition { .. })));
	}

	#[test]
	fn export_shape() {
		let graph = import_json(TWO_NODES).unwrap();
		let text = export_json(&graph, Some("2026-01-01T00:00:00.000Z".into())).unwrap();
		assert!(text.contains('\n'));
		let value: serde_json::Value = serde_json::from_str(&text).unwrap();
		assert_eq!(value["version"], "1.0");
		assert_eq!(value["exportDate"], "2026-01-01T00:00:00.000Z");
		assert_eq!(value["nodes"][1]["type"], "task");
		assert_eq!(value["nodes"][0]["metadata"], serde_json::json!({}));
		assert_eq!(value["edges"][0]["sourcePort"], 0);
		assert_eq!(value["edges"][0]["targetPort"], 0);

		let undated = export_json(&graph, None).unwrap();
		assert!(!undated.contains("exportDate"));
	}

	#[test]
	fn empty_graph_cannot_be_exported() {
		let err = export_json(&Graph::new(), None).unwrap_err();
		assert_eq!(err.to_string(), "No flow content to export.");
	}

	#[test]
	fn reimport_preserves_the_graph() {
		let graph = import_json(TWO_NODES).unwrap();
		let again = import_json(&export_json(&graph, None).unwrap()).unwrap();
		assert_eq!(again.nodes().collect::<Vec<_>>(), graph.nodes().collect::<Vec<_>>());
		assert_eq!(again.edges().collect::<Vec<_>>(), graph.edges().collect::<Vec<_>>());
	}
}
