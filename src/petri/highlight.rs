//! Which elements light up for a given selection.

use std::collections::BTreeSet;

use super::GraphSnapshot;

/// Elements to mark for one selection. Rebuilt from scratch on every
/// selection so stale marks never accumulate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightSet {
	/// The selected node.
	pub selected_id: String,
	/// Alternatives sharing a choice group with the selection.
	pub peer_ids: BTreeSet<String>,
	/// Positions of edges touching the selection.
	pub active_edges: BTreeSet<usize>,
	/// Positions of choice links from the selection's groups.
	pub active_links: BTreeSet<usize>,
}

impl HighlightSet {
	/// True for the selected node.
	pub fn is_selected(&self, id: &str) -> bool {
		self.selected_id == id
	}

	/// True for a choice peer of the selection.
	pub fn is_peer(&self, id: &str) -> bool {
		self.peer_ids.contains(id)
	}
}

/// Selected node, its choice-group peers, its edges and its groups' links.
pub fn compute_highlight_set(selection_id: &str, snapshot: &GraphSnapshot) -> HighlightSet {
	let groups = snapshot.choices.groups_of(selection_id);
	let all_groups = snapshot.model.groups();

	let peer_ids = groups
		.iter()
		.filter_map(|&g| all_groups.get(g))
		.flat_map(|g| g.transition_ids.iter())
		.filter(|id| id.as_str() != selection_id)
		.cloned()
		.collect();

	let active_edges = snapshot
		.model
		.edges()
		.iter()
		.enumerate()
		.filter(|(_, e)| e.source_id == selection_id || e.target_id == selection_id)
		.map(|(i, _)| i)
		.collect();

	let active_links = snapshot
		.choices
		.links()
		.iter()
		.enumerate()
		.filter(|(_, l)| groups.contains(&l.group))
		.map(|(i, _)| i)
		.collect();

	HighlightSet {
		selected_id: selection_id.to_string(),
		peer_ids,
		active_edges,
		active_links,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::petri::fixtures::sample;

	#[test]
	fn selecting_t1_lights_both_groups() {
		let snapshot = sample();
		let set = compute_highlight_set("t1", &snapshot);
		let peers: Vec<_> = set.peer_ids.iter().map(String::as_str).collect();
		assert_eq!(peers, ["t2", "t3", "t4"]);
		// p0 -> t1 and p5 -> t1
		assert_eq!(set.active_edges.iter().copied().collect::<Vec<_>>(), [0, 3]);
		// g1 has three links, g2 one; all of them belong to t1's groups
		assert_eq!(set.active_links.len(), 4);
	}

	#[test]
	fn only_links_of_own_groups_are_active() {
		let snapshot = sample();
		let set = compute_highlight_set("t4", &snapshot);
		let links = snapshot.choices.links();
		assert_eq!(set.active_links.len(), 1);
		for i in &set.active_links {
			assert_eq!(links[*i].group_id, "g2");
		}
		assert!(set.is_peer("t1"));
		assert!(!set.is_peer("t2"));
	}

	#[test]
	fn selection_is_never_its_own_peer() {
		let snapshot = sample();
		for node in snapshot.model.nodes() {
			let set = compute_highlight_set(&node.id, &snapshot);
			assert!(!set.peer_ids.contains(&node.id));
			assert!(set.is_selected(&node.id));
		}
	}

	#[test]
	fn reselecting_is_idempotent() {
		let snapshot = sample();
		let first = compute_highlight_set("t2", &snapshot);
		let _ = compute_highlight_set("p0", &snapshot);
		let again = compute_highlight_set("t2", &snapshot);
		assert_eq!(first, again);
	}

	#[test]
	fn place_has_edges_but_no_peers() {
		let snapshot = sample();
		let set = compute_highlight_set("p0", &snapshot);
		assert!(set.peer_ids.is_empty());
		assert!(set.active_links.is_empty());
		assert_eq!(set.active_edges.len(), 3);
	}

	#[test]
	fn unknown_selection_marks_nothing_else() {
		let snapshot = sample();
		let set = compute_highlight_set("missing", &snapshot);
		assert!(set.peer_ids.is_empty() && set.active_edges.is_empty() && set.active_links.is_empty());
	}
}
