//! Reverse index from transitions to the choice groups they belong to, plus
//! the pairwise links drawn between alternatives.
//!
//! Link emission is quadratic in group size (`k * (k - 1) / 2` per group).
//! That is fine for the dozens-to-hundreds of nodes this viewer targets but
//! is the first thing to revisit for large nets.

use std::collections::HashMap;

use super::model::ChoiceGroup;

/// Undirected link between two alternatives of one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceLink {
	/// Id of the group that produced the link.
	pub group_id: String,
	/// Position of that group in the payload.
	pub group: usize,
	/// Earlier transition in the group.
	pub source_id: String,
	/// Later transition in the group.
	pub target_id: String,
}

/// Derived once per load; never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct ChoiceIndex {
	node_groups: HashMap<String, Vec<usize>>,
	links: Vec<ChoiceLink>,
}

impl ChoiceIndex {
	/// Positions of the groups `id` participates in, in scan order.
	pub fn groups_of(&self, id: &str) -> &[usize] {
		self.node_groups.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// All links, grouped by group and then by pair order.
	pub fn links(&self) -> &[ChoiceLink] {
		&self.links
	}
}

/// Build the reverse index and the link list. Groups with fewer than two
/// transitions are skipped.
pub fn build_choice_index(groups: &[ChoiceGroup]) -> ChoiceIndex {
	let mut index = ChoiceIndex::default();

	for (slot, group) in groups.iter().enumerate() {
		let ids = &group.transition_ids;
		if ids.len() < 2 {
			continue;
		}

		for id in ids {
			let entry = index.node_groups.entry(id.clone()).or_default();
			// a transition listed twice in one group still joins it once
			if entry.last() != Some(&slot) {
				entry.push(slot);
			}
		}

		for (i, source) in ids.iter().enumerate() {
			for target in &ids[i + 1..] {
				index.links.push(ChoiceLink {
					group_id: group.id.clone(),
					group: slot,
					source_id: source.clone(),
					target_id: target.clone(),
				});
			}
		}
	}

	index
}
