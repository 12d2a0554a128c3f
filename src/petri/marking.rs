//! Token game: which transitions may fire and what firing does.

use std::collections::HashMap;

use log::debug;

use super::model::{Edge, GraphModel, NodeKind};
use crate::error::FireError;

/// Tokens per place id. Places absent from the map hold zero tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Marking {
	tokens: HashMap<String, u32>,
}

fn arc_weight(edge: &Edge) -> u32 {
	edge.weight
		.map(|w| w.round().max(0.0) as u32)
		.unwrap_or(1)
}

fn is_kind(model: &GraphModel, id: &str, kind: NodeKind) -> bool {
	model.node(id).is_some_and(|n| n.kind == kind)
}

/// Place -> transition arcs feeding `transition`.
fn inputs<'a>(model: &'a GraphModel, transition: &'a str) -> impl Iterator<Item = &'a Edge> {
	model
		.edges()
		.iter()
		.filter(move |e| e.target_id == transition && is_kind(model, &e.source_id, NodeKind::Place))
}

/// Transition -> place arcs leaving `transition`.
fn outputs<'a>(model: &'a GraphModel, transition: &'a str) -> impl Iterator<Item = &'a Edge> {
	model
		.edges()
		.iter()
		.filter(move |e| e.source_id == transition && is_kind(model, &e.target_id, NodeKind::Place))
}

impl Marking {
	/// One token on the first place in load order.
	pub fn initial(model: &GraphModel) -> Self {
		let mut marking = Self::default();
		if let Some(start) = model.nodes().iter().find(|n| n.kind == NodeKind::Place) {
			marking.tokens.insert(start.id.clone(), 1);
		}
		marking
	}

	/// Tokens currently held by `place_id`.
	pub fn tokens(&self, place_id: &str) -> u32 {
		self.tokens.get(place_id).copied().unwrap_or(0)
	}

	/// A transition is enabled when it has at least one input place and
	/// every input place holds at least the arc weight.
	pub fn is_enabled(&self, model: &GraphModel, transition_id: &str) -> bool {
		if !is_kind(model, transition_id, NodeKind::Transition) {
			return false;
		}
		let mut any = false;
		for arc in inputs(model, transition_id) {
			any = true;
			if self.tokens(&arc.source_id) < arc_weight(arc) {
				return false;
			}
		}
		any
	}

	/// Enabled transitions in load order.
	pub fn enabled_transitions<'a>(&self, model: &'a GraphModel) -> Vec<&'a str> {
		model
			.nodes()
			.iter()
			.filter(|n| self.is_enabled(model, &n.id))
			.map(|n| n.id.as_str())
			.collect()
	}

	/// Consume input tokens and produce output tokens.
	pub fn fire(&mut self, model: &GraphModel, transition_id: &str) -> Result<(), FireError> {
		if !is_kind(model, transition_id, NodeKind::Transition) {
			return Err(FireError::UnknownTransition(transition_id.to_string()));
		}
		if !self.is_enabled(model, transition_id) {
			return Err(FireError::NotEnabled(transition_id.to_string()));
		}

		for arc in inputs(model, transition_id) {
			let held = self.tokens.entry(arc.source_id.clone()).or_default();
			*held = held.saturating_sub(arc_weight(arc));
		}
		for arc in outputs(model, transition_id) {
			let held = self.tokens.entry(arc.target_id.clone()).or_default();
			*held = held.saturating_add(arc_weight(arc));
		}
		debug!("fired {transition_id}");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::petri::fixtures::sample;

	#[test]
	fn initial_marking_seeds_first_place() {
		let snapshot = sample();
		let marking = Marking::initial(&snapshot.model);
		assert_eq!(marking.tokens("p0"), 1);
		assert_eq!(marking.tokens("p5"), 0);
	}

	#[test]
	fn enabled_requires_every_input() {
		let snapshot = sample();
		let model = &snapshot.model;
		let marking = Marking::initial(model);
		// t1 also needs a token on p5
		assert_eq!(marking.enabled_transitions(model), ["t2", "t3"]);
		assert!(!marking.is_enabled(model, "p0"));
	}

	#[test]
	fn firing_moves_weighted_tokens() {
		let snapshot = sample();
		let model = &snapshot.model;
		let mut marking = Marking::initial(model);
		marking.fire(model, "t3").unwrap();
		assert_eq!(marking.tokens("p0"), 0);
		assert_eq!(marking.tokens("p6"), 2);
		assert!(marking.enabled_transitions(model).is_empty());
	}

	#[test]
	fn fire_rejects_unknown_and_disabled() {
		let snapshot = sample();
		let model = &snapshot.model;
		let mut marking = Marking::initial(model);
		assert_eq!(
			marking.fire(model, "zzz"),
			Err(FireError::UnknownTransition("zzz".into()))
		);
		assert_eq!(marking.fire(model, "t4"), Err(FireError::NotEnabled("t4".into())));
		assert_eq!(marking, Marking::initial(model));
	}

	#[test]
	fn heavy_output_saturates_instead_of_overflowing() {
		let payload = serde_json::from_str(
			r#"{
				"nodes": [
					{"id": "p", "kind": "place"},
					{"id": "t", "kind": "transition"}
				],
				"edges": [
					{"sourceId": "p", "targetId": "t", "weight": 1},
					{"sourceId": "t", "targetId": "p", "weight": 1e12}
				]
			}"#,
		)
		.unwrap();
		let model = GraphModel::build(payload);
		let mut marking = Marking::initial(&model);
		marking.fire(&model, "t").unwrap();
		assert_eq!(marking.tokens("p"), u32::MAX);
		marking.fire(&model, "t").unwrap();
		assert_eq!(marking.tokens("p"), u32::MAX);
	}
}
