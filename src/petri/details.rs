//! Content of the details panel for the selected node.

use super::GraphSnapshot;
use super::model::{ChoiceGroup, NodeKind};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const NO_ALTERNATIVES: &str = "(No alternative transitions)";
pub const DEFAULT_GROUP_HEADING: &str = "Choice point";

/// Human label for a node kind.
pub fn kind_label(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Place => "Place — world state",
		NodeKind::Transition => "Transition — quest or choice",
	}
}

/// One choice group as seen from a selected transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceGroupDetails {
	pub heading: String,
	/// `Exclusive group: <tag>` when the group is tagged.
	pub exclusive_tag: Option<String>,
	/// The other transitions by label, key or id. Empty means the group
	/// degenerated to the selection alone.
	pub alternatives: Vec<String>,
}

/// Everything the details panel shows for one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub title: String,
	pub kind: NodeKind,
	pub key: String,
	pub description: String,
	/// Always empty for places, and for transitions outside any group.
	pub choice_groups: Vec<ChoiceGroupDetails>,
}

impl NodeDetails {
	/// Label shown under the title.
	pub fn kind_label(&self) -> &'static str {
		kind_label(self.kind)
	}
}

/// Empty strings count as absent.
fn present(text: Option<&String>) -> Option<&str> {
	text.map(String::as_str).filter(|t| !t.is_empty())
}

fn group_heading(group: &ChoiceGroup) -> String {
	let place = group.place_ref.as_ref();
	present(place.and_then(|p| p.label.as_ref()))
		.or_else(|| present(place.and_then(|p| p.key.as_ref())))
		.or_else(|| present(group.exclusive_group.as_ref()))
		.unwrap_or(DEFAULT_GROUP_HEADING)
		.to_string()
}

fn alternative_name(snapshot: &GraphSnapshot, id: &str) -> String {
	snapshot
		.model
		.node(id)
		.map(|n| n.display_name().to_string())
		.unwrap_or_else(|| id.to_string())
}

/// Panel content for `id`, or `None` if the node is unknown.
pub fn node_details(snapshot: &GraphSnapshot, id: &str) -> Option<NodeDetails> {
	let node = snapshot.model.node(id)?;

	let choice_groups = match node.kind {
		NodeKind::Place => Vec::new(),
		NodeKind::Transition => snapshot
			.choices
			.groups_of(id)
			.iter()
			.filter_map(|&g| snapshot.model.groups().get(g))
			.map(|group| ChoiceGroupDetails {
				heading: group_heading(group),
				exclusive_tag: present(group.exclusive_group.as_ref())
					.map(|tag| format!("Exclusive group: {tag}")),
				alternatives: group
					.transition_ids
					.iter()
					.filter(|t| t.as_str() != id)
					.map(|t| alternative_name(snapshot, t))
					.collect(),
			})
			.collect(),
	};

	Some(NodeDetails {
		title: node.display_name().to_string(),
		kind: node.kind,
		key: node.key.clone(),
		description: node
			.description
			.clone()
			.filter(|d| !d.trim().is_empty())
			.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
		choice_groups,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::petri::fixtures::sample;
	use crate::petri::GraphSnapshot;

	#[test]
	fn transition_lists_alternatives_per_group() {
		let details = node_details(&sample(), "t1").unwrap();
		assert_eq!(details.title, "Go left");
		assert_eq!(details.kind_label(), "Transition — quest or choice");
		assert_eq!(details.description, NO_DESCRIPTION);
		assert_eq!(details.choice_groups.len(), 2);

		let first = &details.choice_groups[0];
		assert_eq!(first.heading, "Crossroads");
		assert_eq!(first.exclusive_tag.as_deref(), Some("Exclusive group: fork"));
		assert_eq!(first.alternatives, ["go_right", "turn_back"]);

		let second = &details.choice_groups[1];
		assert_eq!(second.heading, "camp");
		assert_eq!(second.exclusive_tag, None);
		assert_eq!(second.alternatives, ["wait"]);
	}

	#[test]
	fn place_has_no_choice_section() {
		let details = node_details(&sample(), "p0").unwrap();
		assert_eq!(details.kind_label(), "Place — world state");
		assert_eq!(details.description, "Where the road splits.");
		assert!(details.choice_groups.is_empty());
	}

	#[test]
	fn transition_outside_groups_has_no_choice_section() {
		// t2's only other group is a singleton, which is skipped
		let snapshot = sample();
		let details = node_details(&snapshot, "t2").unwrap();
		assert_eq!(details.choice_groups.len(), 1);

		let payload = serde_json::from_str(
			r#"{"nodes": [{"id": "t", "key": "lonely", "kind": "transition"}]}"#,
		)
		.unwrap();
		let lonely = GraphSnapshot::load(payload);
		assert!(node_details(&lonely, "t").unwrap().choice_groups.is_empty());
	}

	#[test]
	fn degenerate_group_has_no_alternatives() {
		let payload = serde_json::from_str(
			r#"{"nodes": [{"id": "t", "key": "echo", "kind": "transition"}],
				"choices": [{"id": "g", "transitionIds": ["t", "t"]}]}"#,
		)
		.unwrap();
		let snapshot = GraphSnapshot::load(payload);
		let details = node_details(&snapshot, "t").unwrap();
		assert_eq!(details.choice_groups.len(), 1);
		assert_eq!(details.choice_groups[0].heading, DEFAULT_GROUP_HEADING);
		assert!(details.choice_groups[0].alternatives.is_empty());
	}

	#[test]
	fn heading_falls_back_to_exclusive_tag() {
		let payload = serde_json::from_str(
			r#"{"nodes": [],
				"choices": [{"id": "g", "placeRef": null, "exclusiveGroup": "baron",
				             "transitionIds": ["a", "b"]}]}"#,
		)
		.unwrap();
		let snapshot = GraphSnapshot::load(payload);
		assert_eq!(group_heading(&snapshot.model.groups()[0]), "baron");
	}

	#[test]
	fn empty_heading_fields_fall_through() {
		let payload = serde_json::from_str(
			r#"{"nodes": [],
				"choices": [
					{"id": "g1", "placeRef": {"id": "p", "key": "camp", "label": ""},
					 "transitionIds": ["a", "b"]},
					{"id": "g2", "placeRef": {"id": "p", "key": ""}, "exclusiveGroup": "baron",
					 "transitionIds": ["a", "b"]},
					{"id": "g3", "placeRef": {"id": "p", "key": "", "label": ""}, "exclusiveGroup": "",
					 "transitionIds": ["a", "b"]}
				]}"#,
		)
		.unwrap();
		let snapshot = GraphSnapshot::load(payload);
		let groups = snapshot.model.groups();
		assert_eq!(group_heading(&groups[0]), "camp");
		assert_eq!(group_heading(&groups[1]), "baron");
		assert_eq!(group_heading(&groups[2]), DEFAULT_GROUP_HEADING);
	}

	#[test]
	fn empty_exclusive_tag_is_not_shown() {
		let payload = serde_json::from_str(
			r#"{"nodes": [{"id": "a", "kind": "transition"}, {"id": "b", "kind": "transition"}],
				"choices": [{"id": "g", "exclusiveGroup": "", "transitionIds": ["a", "b"]}]}"#,
		)
		.unwrap();
		let snapshot = GraphSnapshot::load(payload);
		let details = node_details(&snapshot, "a").unwrap();
		assert_eq!(details.choice_groups[0].exclusive_tag, None);
		assert_eq!(details.choice_groups[0].alternatives, ["b"]);
	}

	#[test]
	fn unknown_node_has_no_details() {
		assert!(node_details(&sample(), "nope").is_none());
	}
}
