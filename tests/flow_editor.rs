//! End-to-end editor scenarios driven through the public API only.

use flow_canvas::components::flow_editor::config::LayoutConfig;
use flow_canvas::components::flow_editor::{
	EdgeRejection, EditorConfig, Endpoint, FlowEditor, Graph, ImportError, NodeKind, Point, ViewportState, beautify,
};

fn chain(ed: &mut FlowEditor, kinds: &[NodeKind]) -> Vec<String> {
	let ids: Vec<String> = kinds
		.iter()
		.enumerate()
		.map(|(i, kind)| {
			ed.add_node(kind.clone(), Point::new(i as f64 * 300.0, 0.0))
				.unwrap()
				.as_str()
				.to_string()
		})
		.collect();
	for pair in ids.windows(2) {
		ed.add_edge(Endpoint::new(pair[0].as_str(), 0), Endpoint::new(pair[1].as_str(), 0))
			.unwrap();
	}
	ids
}

#[test]
fn connecting_two_blocks() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let a = ed.add_node(NodeKind::Data, Point::new(0.0, 0.0)).unwrap();
	let b = ed.add_node(NodeKind::Task, Point::new(0.0, 200.0)).unwrap();

	let id = ed.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(b.clone(), 0)).unwrap();
	let edge = ed.graph().edge(id.as_str()).unwrap();
	assert_eq!(edge.source.node_id, a);
	assert_eq!(edge.target.node_id, b);
}

#[test]
fn self_loops_and_duplicates_are_refused() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let ids = chain(&mut ed, &[NodeKind::Data, NodeKind::Task]);
	let t = ed.add_node(NodeKind::Task, Point::new(0.0, 400.0)).unwrap();

	assert_eq!(
		ed.add_edge(Endpoint::new(t.clone(), 0), Endpoint::new(t, 0)),
		Err(EdgeRejection::SelfLoop)
	);
	assert_eq!(
		ed.add_edge(Endpoint::new(ids[0].as_str(), 0), Endpoint::new(ids[1].as_str(), 0)),
		Err(EdgeRejection::Duplicate)
	);
	assert_eq!(ed.graph().edge_count(), 1);
}

#[test]
fn beautify_stacks_a_chain_top_to_bottom() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let ids = chain(&mut ed, &[NodeKind::Data, NodeKind::Task, NodeKind::Task]);
	assert!(ed.set_beautify(true));

	let nodes: Vec<_> = ids.iter().map(|id| ed.graph().node(id).unwrap()).collect();
	assert_eq!(nodes.iter().map(|n| n.layer).collect::<Vec<_>>(), vec![0, 1, 2]);
	assert!(nodes.iter().all(|n| n.position.x == 0.0));
	assert!(nodes[0].position.y < nodes[1].position.y);
	assert!(nodes[1].position.y < nodes[2].position.y);
	assert_eq!(ed.layer_map().len(), 3);
}

#[test]
fn leaving_beautify_restores_manual_positions() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let ids = chain(&mut ed, &[NodeKind::Data, NodeKind::Task]);
	let before: Vec<Point> = ids.iter().map(|id| ed.graph().node(id).unwrap().position).collect();

	ed.set_beautify(true);
	ed.set_beautify(false);
	let after: Vec<Point> = ids.iter().map(|id| ed.graph().node(id).unwrap().position).collect();
	assert_eq!(before, after);
}

#[test]
fn deleting_a_block_removes_its_edges() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let ids = chain(&mut ed, &[NodeKind::Data, NodeKind::Task]);

	assert!(ed.delete_node(&ids[0]).is_some());
	let remaining: Vec<&str> = ed.graph().nodes().map(|n| n.id.as_str()).collect();
	assert_eq!(remaining, vec![ids[1].as_str()]);
	assert_eq!(ed.graph().edge_count(), 0);
	assert!(ed.delete_node(&ids[0]).is_none());
}

#[test]
fn view_only_refuses_edits() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let a = ed.add_node(NodeKind::Data, Point::new(0.0, 0.0)).unwrap();
	let b = ed.add_node(NodeKind::Task, Point::new(0.0, 200.0)).unwrap();
	assert!(ed.set_view_only(true));

	assert!(ed.add_node(NodeKind::Data, Point::ORIGIN).is_err());
	assert_eq!(
		ed.add_edge(Endpoint::new(a.clone(), 0), Endpoint::new(b, 0)),
		Err(EdgeRejection::ViewOnly)
	);
	assert!(ed.delete_node(a.as_str()).is_none());
	assert_eq!(ed.graph().node_count(), 2);
}

#[test]
fn export_then_import_keeps_the_flow() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	let ids = chain(&mut ed, &[NodeKind::Data, NodeKind::Task, NodeKind::End]);
	ed.rename_node(&ids[1], "Summarize");
	let json = ed.export_json(Some("2026-01-01T00:00:00.000Z".to_string())).unwrap();

	let mut other = FlowEditor::new(EditorConfig::default());
	other.import_json(&json).unwrap();
	assert_eq!(other.graph().node_count(), 3);
	assert_eq!(other.graph().edge_count(), 2);
	assert_eq!(other.graph().node(&ids[1]).unwrap().name, "Summarize");
	assert_eq!(other.graph().node(&ids[2]).unwrap().kind, NodeKind::End);
}

#[test]
fn invalid_imports_change_nothing() {
	let mut ed = FlowEditor::new(EditorConfig::default());
	chain(&mut ed, &[NodeKind::Data, NodeKind::Task]);

	let dangling = r#"{
		"nodes": [{"id": "x", "type": "data", "x": 0, "y": 0, "outputs": [{"name": "data", "type": "any"}]}],
		"edges": [{"id": "e", "source": "x", "target": "missing", "sourcePort": 0, "targetPort": 0}]
	}"#;
	assert!(matches!(ed.import_json(dangling), Err(ImportError::DanglingEdge { .. })));
	assert!(matches!(ed.import_json("{\"nodes\": []}"), Err(ImportError::InvalidFormat(_))));
	assert!(matches!(ed.import_json("not json"), Err(ImportError::InvalidFormat(_))));

	assert_eq!(ed.graph().node_count(), 2);
	assert_eq!(ed.graph().edge_count(), 1);
}

#[test]
fn exporting_an_empty_flow_fails() {
	let ed = FlowEditor::new(EditorConfig::default());
	assert!(ed.export_json(None).is_err());
}

#[test]
fn layout_is_deterministic_and_follows_edges() {
	let mut graph = Graph::new();
	let a = graph.add_node(NodeKind::Data, Point::new(400.0, -50.0)).unwrap();
	let b = graph.add_node(NodeKind::Task, Point::new(-90.0, 10.0)).unwrap();
	let c = graph.add_node(NodeKind::Task, Point::new(5.0, 700.0)).unwrap();
	let d = graph.add_node(NodeKind::End, Point::new(0.0, 0.0)).unwrap();
	for (s, t) in [(&a, &b), (&a, &c), (&b, &d), (&c, &d)] {
		graph.add_edge(Endpoint::new(s.clone(), 0), Endpoint::new(t.clone(), 0)).unwrap();
	}

	let config = LayoutConfig::default();
	let first = beautify(graph.nodes(), graph.edges(), &config);
	let second = beautify(first.nodes.iter(), graph.edges(), &config);
	assert_eq!(first, second);

	let layer = |id: &str| first.nodes.iter().find(|n| n.id.as_str() == id).unwrap().layer;
	for edge in graph.edges() {
		assert!(layer(edge.target.node_id.as_str()) > layer(edge.source.node_id.as_str()));
	}
	assert_eq!(layer(d.as_str()), 2);
}

#[test]
fn screen_and_graph_coordinates_round_trip() {
	let viewport = ViewportState::new(1.7, -240.0, 85.5);
	for p in [Point::new(0.0, 0.0), Point::new(-310.25, 42.0), Point::new(1e4, -3e3)] {
		let back = viewport.screen_to_graph(viewport.graph_to_screen(p));
		assert!(back.distance(p) < 1e-9);
	}
}
