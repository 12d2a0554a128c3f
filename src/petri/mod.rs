//! Rendering-free Petri net logic: the loaded graph, its choice index, the
//! highlight rule, details-panel content and the token game.

pub mod choice;
pub mod details;
pub mod highlight;
pub mod marking;
pub mod model;

use choice::{ChoiceIndex, build_choice_index};
use model::{GraphModel, GraphPayload};

/// Everything derived from one fetched payload. Built once and shared
/// read-only by the canvas and the side panels.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
	/// Normalized nodes, edges and groups.
	pub model: GraphModel,
	/// Node to group reverse index and choice links.
	pub choices: ChoiceIndex,
}

impl GraphSnapshot {
	/// Normalize the payload and derive the choice index from it.
	pub fn load(payload: GraphPayload) -> Self {
		let model = GraphModel::build(payload);
		let choices = build_choice_index(model.groups());
		Self { model, choices }
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use super::*;

	/// p0 feeds a three-way choice {t1, t2, t3}; t1 and t4 share a second
	/// place p5. t3 writes to p6.
	pub fn sample() -> GraphSnapshot {
		let payload = serde_json::from_str(
			r#"{
				"nodes": [
					{"id": "p0", "key": "crossroads", "label": "Crossroads", "kind": "place",
					 "description": "Where the road splits."},
					{"id": "t1", "key": "go_left", "label": "Go left", "kind": "transition",
					 "exclusiveGroup": "fork"},
					{"id": "t2", "key": "go_right", "kind": "transition", "exclusiveGroup": "fork"},
					{"id": "t3", "key": "turn_back", "kind": "transition"},
					{"id": "t4", "key": "wait", "kind": "transition"},
					{"id": "p5", "key": "camp", "kind": "place"},
					{"id": "p6", "key": "home", "kind": "place"}
				],
				"edges": [
					{"sourceId": "p0", "targetId": "t1", "sourceKey": "crossroads", "targetKey": "go_left", "weight": 1},
					{"sourceId": "p0", "targetId": "t2"},
					{"sourceId": "p0", "targetId": "t3"},
					{"sourceId": "p5", "targetId": "t1"},
					{"sourceId": "p5", "targetId": "t4"},
					{"sourceId": "t3", "targetId": "p6", "weight": 2},
					{"sourceId": "t4", "targetId": "nowhere"}
				],
				"choices": [
					{"id": "g1", "placeRef": {"id": "p0", "key": "crossroads", "label": "Crossroads"},
					 "transitionIds": ["t1", "t2", "t3"], "exclusiveGroup": "fork"},
					{"id": "g2", "placeRef": {"id": "p5", "key": "camp"}, "transitionIds": ["t1", "t4"]},
					{"id": "g3", "placeRef": null, "transitionIds": ["t2"]}
				]
			}"#,
		)
		.unwrap();
		GraphSnapshot::load(payload)
	}
}
