//! Node, port and edge tables for a flow.
//!
//! Nodes and edges live in insertion-ordered tables keyed by id. Ports are
//! not entities of their own: a port is addressed by its node, direction and
//! index within that node's `inputs` or `outputs`.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{EdgeRejection, PositionRejection};
use super::geometry::Point;

macro_rules! string_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wraps an id string.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// The id as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}
	};
}

string_id!(
	/// Stable, opaque node identifier. Immutable once the node exists.
	NodeId
);
string_id!(
	/// Stable, opaque edge identifier.
	EdgeId
);

/// Which side of a node a port sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
	/// Receives edges; drawn above the node.
	Input,
	/// Sends edges; drawn below the node.
	Output,
}

/// Declared name and type of a port. The type is informational only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
	/// Port label.
	pub name: String,
	/// Declared data type, serialized as `type`.
	#[serde(rename = "type")]
	pub port_type: String,
}

impl PortSpec {
	/// A port named `name` with type `any`.
	pub fn any(name: &str) -> Self {
		Self {
			name: name.to_string(),
			port_type: "any".to_string(),
		}
	}
}

/// A port addressed as `(node, direction, index)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortAddress {
	/// Owning node.
	pub node_id: NodeId,
	/// Side of the node.
	pub direction: PortDirection,
	/// Position within that side's ports.
	pub index: usize,
}

impl PortAddress {
	/// Address of input `index` on `node_id`.
	pub fn input(node_id: impl Into<NodeId>, index: usize) -> Self {
		Self {
			node_id: node_id.into(),
			direction: PortDirection::Input,
			index,
		}
	}

	/// Address of output `index` on `node_id`.
	pub fn output(node_id: impl Into<NodeId>, index: usize) -> Self {
		Self {
			node_id: node_id.into(),
			direction: PortDirection::Output,
			index,
		}
	}

	/// The port as an edge endpoint.
	pub fn endpoint(&self) -> Endpoint {
		Endpoint {
			node_id: self.node_id.clone(),
			port: self.index,
		}
	}
}

/// One end of an edge: a node and a port index on the relevant side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
	/// Node at this end.
	pub node_id: NodeId,
	/// Port index: an output on the source, an input on the target.
	pub port: usize,
}

impl Endpoint {
	/// Endpoint at port `port` of `node_id`.
	pub fn new(node_id: impl Into<NodeId>, port: usize) -> Self {
		Self {
			node_id: node_id.into(),
			port,
		}
	}
}

/// Block kind. Determines default ports, name and colour.
///
/// Unrecognized kinds are kept verbatim in [`NodeKind::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
	/// A data source.
	Data,
	/// A processing step.
	Task,
	/// Run parameters.
	Parameters,
	/// Flow entry point.
	Start,
	/// Flow exit point.
	End,
	/// Conditional branch.
	Case,
	/// Chat message input.
	ChatInput,
	/// Conversation history.
	ContextHistory,
	/// Stored data blocks.
	Datablocks,
	/// SQL query against a database.
	SqlDatabase,
	/// REST API call.
	RestApi,
	/// On-chain read.
	BlockchainRead,
	/// Transaction payload.
	TransactionJson,
	/// Picks one of several inputs.
	Selector,
	/// Joins several inputs.
	Merger,
	/// Random values.
	RandomGenerator,
	/// Current time.
	Time,
	/// Free-form LLM prompt.
	LlmFree,
	/// LLM prompt with structured output.
	LlmStructured,
	/// User script.
	CustomScript,
	/// Any other kind, kept by name.
	Other(String),
}

const KIND_NAMES: &[(&str, NodeKind)] = &[
	("data", NodeKind::Data),
	("task", NodeKind::Task),
	("parameters", NodeKind::Parameters),
	("start", NodeKind::Start),
	("end", NodeKind::End),
	("case", NodeKind::Case),
	("chat-input", NodeKind::ChatInput),
	("context-history", NodeKind::ContextHistory),
	("datablocks", NodeKind::Datablocks),
	("sql-database", NodeKind::SqlDatabase),
	("rest-api", NodeKind::RestApi),
	("blockchain-read", NodeKind::BlockchainRead),
	("transaction-json", NodeKind::TransactionJson),
	("selector", NodeKind::Selector),
	("merger", NodeKind::Merger),
	("random-generator", NodeKind::RandomGenerator),
	("time", NodeKind::Time),
	("llm-free", NodeKind::LlmFree),
	("llm-structured", NodeKind::LlmStructured),
	("custom-script", NodeKind::CustomScript),
];

impl NodeKind {
	/// Wire name of the kind, e.g. `chat-input`.
	pub fn as_str(&self) -> &str {
		if let NodeKind::Other(name) = self {
			return name;
		}
		KIND_NAMES
			.iter()
			.find(|(_, kind)| kind == self)
			.map(|(name, _)| *name)
			.unwrap_or_default()
	}

	/// Default `(inputs, outputs)` for a freshly dropped block.
	pub fn default_ports(&self) -> (Vec<PortSpec>, Vec<PortSpec>) {
		use NodeKind::*;
		match self {
			Data | ChatInput | ContextHistory | Datablocks | SqlDatabase | RestApi => {
				(vec![], vec![PortSpec::any("data")])
			}
			Task | CustomScript | BlockchainRead | TransactionJson | Selector | Merger
			| RandomGenerator | Time => (vec![PortSpec::any("input")], vec![PortSpec::any("output")]),
			Parameters => (vec![], vec![PortSpec::any("params")]),
			Start => (vec![], vec![PortSpec::any("start")]),
			End => (vec![PortSpec::any("end")], vec![]),
			Case => (
				vec![PortSpec::any("condition")],
				vec![PortSpec::any("true"), PortSpec::any("false")],
			),
			LlmFree | LlmStructured => (vec![PortSpec::any("prompt")], vec![PortSpec::any("response")]),
			Other(_) => (vec![], vec![]),
		}
	}

	/// Title-cased display name, e.g. `chat-input` becomes `Chat Input`.
	pub fn default_name(&self) -> String {
		self.as_str()
			.split('-')
			.filter(|word| !word.is_empty())
			.map(|word| {
				let mut chars = word.chars();
				match chars.next() {
					Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
					None => String::new(),
				}
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}

impl From<&str> for NodeKind {
	fn from(name: &str) -> Self {
		KIND_NAMES
			.iter()
			.find(|(n, _)| *n == name)
			.map(|(_, kind)| kind.clone())
			.unwrap_or_else(|| NodeKind::Other(name.to_string()))
	}
}

impl From<String> for NodeKind {
	fn from(name: String) -> Self {
		NodeKind::from(name.as_str())
	}
}

impl From<NodeKind> for String {
	fn from(kind: NodeKind) -> Self {
		kind.as_str().to_string()
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A user-defined block whose ports override the kind defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTemplate {
	/// Template id.
	pub id: String,
	/// Name given to nodes created from the template.
	pub name: String,
	/// Underlying block kind.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Input ports.
	#[serde(default)]
	pub inputs: Vec<PortSpec>,
	/// Output ports.
	#[serde(default)]
	pub outputs: Vec<PortSpec>,
}

/// A block on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique id.
	pub id: NodeId,
	/// Block kind.
	pub kind: NodeKind,
	/// Display name.
	pub name: String,
	/// Graph-space position of the node centre. Always finite.
	pub position: Point,
	/// Input ports, stacked above the node.
	pub inputs: Vec<PortSpec>,
	/// Output ports, stacked below the node.
	pub outputs: Vec<PortSpec>,
	/// Layer assigned by the last beautify pass.
	pub layer: usize,
	/// Template the node was created from, if any.
	pub template_id: Option<String>,
	/// Free-form data kept for collaborators.
	pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Node {
	/// Ports on one side of the node.
	pub fn ports(&self, direction: PortDirection) -> &[PortSpec] {
		match direction {
			PortDirection::Input => &self.inputs,
			PortDirection::Output => &self.outputs,
		}
	}

	/// True when the node has port `index` on `direction`'s side.
	pub fn has_port(&self, direction: PortDirection, index: usize) -> bool {
		index < self.ports(direction).len()
	}
}

/// Directed connection from an output port to an input port.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Unique id.
	pub id: EdgeId,
	/// Output end.
	pub source: Endpoint,
	/// Input end.
	pub target: Endpoint,
}

impl Edge {
	/// True when either end is on `node_id`.
	pub fn touches(&self, node_id: &NodeId) -> bool {
		&self.source.node_id == node_id || &self.target.node_id == node_id
	}

	/// True when this edge joins exactly these endpoints.
	pub fn connects(&self, source: &Endpoint, target: &Endpoint) -> bool {
		&self.source == source && &self.target == target
	}
}

/// The flow: nodes and edges keyed by id, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: IndexMap<NodeId, Node>,
	edges: IndexMap<EdgeId, Edge>,
	next_node: u64,
	next_edge: u64,
}

impl Graph {
	/// An empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a graph from parts that have already been validated.
	pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		Self {
			nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
			edges: edges.into_iter().map(|e| (e.id.clone(), e)).collect(),
			next_node: 0,
			next_edge: 0,
		}
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges.values()
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.get_mut(id)
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.get(id)
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// True when an edge already joins these endpoints.
	pub fn has_connection(&self, source: &Endpoint, target: &Endpoint) -> bool {
		self.edges.values().any(|e| e.connects(source, target))
	}

	fn fresh_node_id(&mut self) -> NodeId {
		loop {
			self.next_node += 1;
			let id = NodeId::new(format!("node-{}", self.next_node));
			if !self.nodes.contains_key(&id) {
				return id;
			}
		}
	}

	fn fresh_edge_id(&mut self) -> EdgeId {
		loop {
			self.next_edge += 1;
			let id = EdgeId::new(format!("edge-{}", self.next_edge));
			if !self.edges.contains_key(&id) {
				return id;
			}
		}
	}

	/// Adds a block of `kind` with its default ports and name.
	pub fn add_node(&mut self, kind: NodeKind, position: Point) -> Result<NodeId, PositionRejection> {
		let (inputs, outputs) = kind.default_ports();
		let name = kind.default_name();
		self.insert_node(kind, name, position, inputs, outputs, None)
	}

	/// Adds a block stamped from a user template.
	pub fn add_templated_node(
		&mut self,
		template: &NodeTemplate,
		position: Point,
	) -> Result<NodeId, PositionRejection> {
		self.insert_node(
			template.kind.clone(),
			template.name.clone(),
			position,
			template.inputs.clone(),
			template.outputs.clone(),
			Some(template.id.clone()),
		)
	}

	fn insert_node(
		&mut self,
		kind: NodeKind,
		name: String,
		position: Point,
		inputs: Vec<PortSpec>,
		outputs: Vec<PortSpec>,
		template_id: Option<String>,
	) -> Result<NodeId, PositionRejection> {
		if !position.is_finite() {
			return Err(PositionRejection::NonFinite);
		}
		let id = self.fresh_node_id();
		self.nodes.insert(
			id.clone(),
			Node {
				id: id.clone(),
				kind,
				name,
				position,
				inputs,
				outputs,
				layer: 0,
				template_id,
				metadata: serde_json::Map::new(),
			},
		);
		Ok(id)
	}

	/// Checks an edge request against the graph without inserting it.
	pub fn validate_edge(&self, source: &Endpoint, target: &Endpoint) -> Result<(), EdgeRejection> {
		let (Some(src), Some(tgt)) = (self.node(source.node_id.as_str()), self.node(target.node_id.as_str()))
		else {
			return Err(EdgeRejection::UnknownNode);
		};
		if src.id == tgt.id {
			return Err(EdgeRejection::SelfLoop);
		}
		if !src.has_port(PortDirection::Output, source.port) || !tgt.has_port(PortDirection::Input, target.port) {
			return Err(EdgeRejection::PortOutOfRange);
		}
		if self.has_connection(source, target) {
			return Err(EdgeRejection::Duplicate);
		}
		Ok(())
	}

	/// Connects output `source` to input `target`.
	pub fn add_edge(&mut self, source: Endpoint, target: Endpoint) -> Result<EdgeId, EdgeRejection> {
		self.validate_edge(&source, &target)?;
		let id = self.fresh_edge_id();
		self.edges.insert(
			id.clone(),
			Edge {
				id: id.clone(),
				source,
				target,
			},
		);
		Ok(id)
	}

	/// Removes an edge, returning it if it existed.
	pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
		self.edges.shift_remove(id)
	}

	/// Removes a node together with every edge that references it.
	pub fn delete_node(&mut self, id: &str) -> Option<Node> {
		let node = self.nodes.shift_remove(id)?;
		self.edges.retain(|_, e| !e.touches(&node.id));
		Some(node)
	}

	/// Moves a node. Finite positions only.
	pub fn set_position(&mut self, id: &str, position: Point) -> Result<(), PositionRejection> {
		if !position.is_finite() {
			return Err(PositionRejection::NonFinite);
		}
		let node = self.nodes.get_mut(id).ok_or(PositionRejection::UnknownNode)?;
		node.position = position;
		Ok(())
	}

	/// Renames a node. False when the id is unknown.
	pub fn rename_node(&mut self, id: &str, name: impl Into<String>) -> bool {
		match self.nodes.get_mut(id) {
			Some(node) => {
				node.name = name.into();
				true
			}
			None => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn two_tasks() -> (Graph, NodeId, NodeId) {
		let mut g = Graph::new();
		let a = g.add_node(NodeKind::Task, Point::new(0.0, 0.0)).unwrap();
		let b = g.add_node(NodeKind::Task, Point::new(0.0, 200.0)).unwrap();
		(g, a, b)
	}

	#[test]
	fn default_ports_follow_kind() {
		let (inputs, outputs) = NodeKind::Case.default_ports();
		assert_eq!(inputs, vec![PortSpec::any("condition")]);
		assert_eq!(outputs.len(), 2);
		let (inputs, outputs) = NodeKind::from("data").default_ports();
		assert!(inputs.is_empty());
		assert_eq!(outputs[0].name, "data");
		assert_eq!(NodeKind::from("my-widget").default_ports(), (vec![], vec![]));
	}

	#[test]
	fn default_name_is_title_cased() {
		assert_eq!(NodeKind::ChatInput.default_name(), "Chat Input");
		assert_eq!(NodeKind::from("random-generator").default_name(), "Random Generator");
		assert_eq!(NodeKind::Other("x".into()).default_name(), "X");
	}

	#[test]
	fn kind_round_trips_through_strings() {
		for (name, kind) in KIND_NAMES {
			assert_eq!(&NodeKind::from(*name), kind);
			assert_eq!(kind.as_str(), *name);
		}
		assert_eq!(NodeKind::from("vendor-thing").as_str(), "vendor-thing");
	}

	#[test]
	fn templates_override_ports_and_name() {
		let mut g = Graph::new();
		let template = NodeTemplate {
			id: "template-1".into(),
			name: "Scorer".into(),
			kind: NodeKind::Task,
			inputs: vec![PortSpec::any("a"), PortSpec::any("b")],
			outputs: vec![],
		};
		let id = g.add_templated_node(&template, Point::ORIGIN).unwrap();
		let node = g.node(id.as_str()).unwrap();
		assert_eq!(node.name, "Scorer");
		assert_eq!(node.inputs.len(), 2);
		assert_eq!(node.template_id.as_deref(), Some("template-1"));
	}

	#[test]
	fn node_ids_are_unique() {
		let mut g = Graph::new();
		let a = g.add_node(NodeKind::Data, Point::ORIGIN).unwrap();
		g.delete_node(a.as_str());
		let b = g.add_node(NodeKind::Data, Point::ORIGIN).unwrap();
		let c = g.add_node(NodeKind::Data, Point::ORIGIN).unwrap();
		assert_ne!(a, b);
		assert_ne!(b, c);
	}

	#[test]
	fn rejects_non_finite_positions() {
		let mut g = Graph::new();
		assert_eq!(
			g.add_node(NodeKind::Data, Point::new(f64::NAN, 0.0)),
			Err(PositionRejection::NonFinite)
		);
		let id = g.add_node(NodeKind::Data, Point::ORIGIN).unwrap();
		assert_eq!(
			g.set_position(id.as_str(), Point::new(0.0, f64::INFINITY)),
			Err(PositionRejection::NonFinite)
		);
		assert_eq!(g.node(id.as_str()).unwrap().position, Point::ORIGIN);
	}

	#[test]
	fn edge_rules() {
		let (mut g, a, b) = two_tasks();
		assert_eq!(
			g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(a.clone(), 0)),
			Err(EdgeRejection::SelfLoop)
		);
		assert_eq!(
			g.add_edge(Endpoint::new(a.clone(), 1), Endpoint::new(b.clone(), 0)),
			Err(EdgeRejection::PortOutOfRange)
		);
		assert_eq!(
			g.add_edge(Endpoint::new("ghost", 0), Endpoint::new(b.clone(), 0)),
			Err(EdgeRejection::UnknownNode)
		);
		assert!(g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(b.clone(), 0)).is_ok());
		assert_eq!(
			g.add_edge(Endpoint::new(a, 0), Endpoint::new(b, 0)),
			Err(EdgeRejection::Duplicate)
		);
		assert_eq!(g.edge_count(), 1);
	}

	#[test]
	fn fan_out_and_fan_in_are_allowed() {
		let (mut g, a, b) = two_tasks();
		let c = g.add_node(NodeKind::Task, Point::ORIGIN).unwrap();
		g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(b.clone(), 0)).unwrap();
		g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(c.clone(), 0)).unwrap();
		g.add_edge(Endpoint::new(c, 0), Endpoint::new(b, 0)).unwrap();
		assert_eq!(g.edge_count(), 3);
	}

	#[test]
	fn delete_cascades_to_edges() {
		let (mut g, a, b) = two_tasks();
		let c = g.add_node(NodeKind::Task, Point::ORIGIN).unwrap();
		g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(b.clone(), 0)).unwrap();
		g.add_edge(Endpoint::new(b.clone(), 0), Endpoint::new(c.clone(), 0)).unwrap();
		g.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(c.clone(), 0)).unwrap();

		let removed = g.delete_node(b.as_str()).unwrap();
		assert_eq!(removed.id, b);
		assert_eq!(g.node_count(), 2);
		assert_eq!(g.edge_count(), 1);
		assert!(g.edges().all(|e| !e.touches(&b)));
		assert!(g.delete_node(b.as_str()).is_none());
	}
}
