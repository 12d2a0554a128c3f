//! Payload records and the normalized graph built from them.

use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Deserializer};

/// The two node kinds of a Petri net.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum NodeKind {
	/// A world-state condition that holds tokens.
	#[serde(rename = "place", alias = "Place", alias = "PLACE")]
	Place,
	/// An event or choice that moves tokens between places.
	#[serde(rename = "transition", alias = "Transition", alias = "TRANSITION")]
	Transition,
}

/// Ids come from a relational backend and may be serialized as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Number(serde_json::Number),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Text(s) => s,
			RawId::Number(n) => n.to_string(),
		}
	}
}

/// Edge endpoints are either a bare id or an embedded node object.
#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRef {
	Id(RawId),
	Object { id: RawId },
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
	RawId::deserialize(d).map(String::from)
}

/// Absent and `null` lists both read as empty.
fn de_list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn de_id_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
	let ids: Vec<RawId> = de_list(d)?;
	Ok(ids.into_iter().map(String::from).collect())
}

fn de_endpoint<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
	Ok(match EndpointRef::deserialize(d)? {
		EndpointRef::Id(id) | EndpointRef::Object { id } => id.into(),
	})
}

/// A place or transition as delivered by the backend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	#[serde(deserialize_with = "de_id")]
	pub id: String,
	#[serde(default)]
	pub key: String,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(alias = "type")]
	pub kind: NodeKind,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub exclusive_group: Option<String>,
}

impl Node {
	/// Text drawn next to the shape and used as the details title.
	pub fn display_name(&self) -> &str {
		self.label
			.as_deref()
			.filter(|l| !l.is_empty())
			.unwrap_or(&self.key)
	}
}

/// A directed arc between a place and a transition.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	#[serde(alias = "source", deserialize_with = "de_endpoint")]
	pub source_id: String,
	#[serde(alias = "target", deserialize_with = "de_endpoint")]
	pub target_id: String,
	#[serde(default)]
	pub source_key: Option<String>,
	#[serde(default)]
	pub target_key: Option<String>,
	#[serde(default)]
	pub weight: Option<f64>,
}

/// The place a choice group competes over.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PlaceRef {
	/// Id of the place node.
	#[serde(deserialize_with = "de_id")]
	pub id: String,
	/// Stable alias of the place.
	#[serde(default)]
	pub key: Option<String>,
	/// Human-readable name.
	#[serde(default)]
	pub label: Option<String>,
}

/// Transitions competing for the tokens of one place.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceGroup {
	/// Unique group id.
	#[serde(deserialize_with = "de_id")]
	pub id: String,
	/// Shared place, when the backend knows it.
	#[serde(default, alias = "place")]
	pub place_ref: Option<PlaceRef>,
	/// Competing transitions, in backend order.
	#[serde(default, deserialize_with = "de_id_list")]
	pub transition_ids: Vec<String>,
	/// Exclusivity tag shared by the alternatives.
	#[serde(default)]
	pub exclusive_group: Option<String>,
}

/// Body of the graph-data endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
	/// Required; a missing or non-array value is a malformed payload.
	pub nodes: Vec<Node>,
	/// Directed arcs.
	#[serde(default, deserialize_with = "de_list")]
	pub edges: Vec<Edge>,
	/// Choice groups.
	#[serde(default, deserialize_with = "de_list")]
	pub choices: Vec<ChoiceGroup>,
}

/// Validated, immutable graph for one load.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	groups: Vec<ChoiceGroup>,
	lookup: HashMap<String, usize>,
	duplicate_ids: Vec<String>,
}

impl GraphModel {
	/// Normalize a payload. A repeated node id replaces the earlier record in
	/// place and is recorded in [`GraphModel::duplicate_ids`].
	pub fn build(payload: GraphPayload) -> Self {
		let mut nodes: Vec<Node> = Vec::with_capacity(payload.nodes.len());
		let mut lookup = HashMap::with_capacity(payload.nodes.len());
		let mut duplicate_ids = Vec::new();

		for mut node in payload.nodes {
			if node.key.is_empty() {
				node.key = node.id.clone();
			}
			match lookup.get(&node.id) {
				Some(&slot) => {
					warn!("duplicate node id '{}', keeping the later record", node.id);
					duplicate_ids.push(node.id.clone());
					nodes[slot] = node;
				}
				None => {
					lookup.insert(node.id.clone(), nodes.len());
					nodes.push(node);
				}
			}
		}

		let model = Self {
			nodes,
			edges: payload.edges,
			groups: payload.choices,
			lookup,
			duplicate_ids,
		};

		let dangling = model
			.edges
			.iter()
			.filter(|e| model.edge_endpoints(e).is_none())
			.count();
		if dangling > 0 {
			warn!("{dangling} edge(s) reference unknown nodes and will not be drawn");
		}
		info!(
			"graph loaded: {} nodes, {} edges, {} choice groups",
			model.nodes.len(),
			model.edges.len(),
			model.groups.len()
		);
		model
	}

	/// Nodes in load order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges as delivered, including ones with unknown endpoints.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Choice groups as delivered.
	pub fn groups(&self) -> &[ChoiceGroup] {
		&self.groups
	}

	/// Load-order position of a node id.
	pub fn slot(&self, id: &str) -> Option<usize> {
		self.lookup.get(id).copied()
	}

	/// Look up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.slot(id).map(|slot| &self.nodes[slot])
	}

	/// Slots of both endpoints, or `None` when either is unknown.
	pub fn edge_endpoints(&self, edge: &Edge) -> Option<(usize, usize)> {
		Some((self.slot(&edge.source_id)?, self.slot(&edge.target_id)?))
	}

	/// Ids that appeared more than once in the payload.
	pub fn duplicate_ids(&self) -> &[String] {
		&self.duplicate_ids
	}

	/// True when the payload carried no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(json: &str) -> GraphModel {
		GraphModel::build(serde_json::from_str(json).unwrap())
	}

	#[test]
	fn endpoints_resolve_from_ids_and_objects() {
		let model = parse(
			r#"{
				"nodes": [
					{"id": 1, "key": "start", "type": "place"},
					{"id": "t1", "key": "go", "kind": "Transition"}
				],
				"edges": [
					{"sourceId": 1, "targetId": {"id": "t1", "key": "go"}},
					{"source": {"id": "1"}, "target": "t1"}
				]
			}"#,
		);
		assert_eq!(model.nodes()[0].id, "1");
		for edge in model.edges() {
			assert_eq!(model.edge_endpoints(edge), Some((0, 1)));
		}
	}

	#[test]
	fn duplicate_ids_keep_later_record_in_first_slot() {
		let model = parse(
			r#"{"nodes": [
				{"id": "a", "key": "first", "kind": "place"},
				{"id": "b", "key": "other", "kind": "place"},
				{"id": "a", "key": "second", "kind": "place"}
			]}"#,
		);
		assert_eq!(model.nodes().len(), 2);
		assert_eq!(model.node("a").unwrap().key, "second");
		assert_eq!(model.slot("a"), Some(0));
		assert_eq!(model.duplicate_ids(), ["a".to_string()]);
	}

	#[test]
	fn missing_key_falls_back_to_id() {
		let model = parse(r#"{"nodes": [{"id": "p9", "kind": "place"}]}"#);
		assert_eq!(model.nodes()[0].key, "p9");
		assert_eq!(model.nodes()[0].display_name(), "p9");
	}

	#[test]
	fn empty_payload_is_valid() {
		let model = parse(r#"{"nodes": [], "edges": [], "choices": []}"#);
		assert!(model.is_empty());
	}

	#[test]
	fn null_lists_read_as_empty() {
		let model = parse(
			r#"{"nodes": [{"id": "t", "kind": "transition"}],
				"edges": null,
				"choices": [{"id": "g", "transitionIds": null}]}"#,
		);
		assert!(model.edges().is_empty());
		assert!(model.groups()[0].transition_ids.is_empty());

		let model = parse(r#"{"nodes": [], "choices": null}"#);
		assert!(model.groups().is_empty());
	}

	#[test]
	fn dangling_edge_has_no_endpoints() {
		let model = parse(
			r#"{"nodes": [{"id": "p", "kind": "place"}],
				"edges": [{"sourceId": "p", "targetId": "ghost"}]}"#,
		);
		assert_eq!(model.edges().len(), 1);
		assert_eq!(model.edge_endpoints(&model.edges()[0]), None);
	}
}
