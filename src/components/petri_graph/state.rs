use std::f64::consts::SQRT_2;
use std::sync::Arc;

use log::debug;

use super::layout::LayoutEngine;
use crate::config::LayoutParams;
use crate::petri::GraphSnapshot;
use crate::petri::highlight::{HighlightSet, compute_highlight_set};
use crate::petri::model::{Edge, NodeKind};

pub const PLACE_RADIUS: f64 = 24.0;
pub const TRANSITION_SIDE: f64 = 36.0;
pub const EDGE_HIT_DISTANCE: f64 = 6.0;
const HIGHLIGHT_SPEED: f64 = 4.0;

/// Center-to-outline distance of a node shape. Transitions are squares
/// rotated 45°, so their extent is the half diagonal.
pub fn shape_extent(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Place => PLACE_RADIUS,
		NodeKind::Transition => TRANSITION_SIDE / SQRT_2,
	}
}

/// `"{source} -> {target}\nweight: {weight}"`, preferring keys over ids.
pub fn edge_tooltip(edge: &Edge) -> String {
	let source = edge.source_key.as_deref().unwrap_or(&edge.source_id);
	let target = edge.target_key.as_deref().unwrap_or(&edge.target_id);
	let weight = edge.weight.map(|w| w.to_string()).unwrap_or_default();
	format!("{source} -> {target}\nweight: {weight}")
}

fn segment_distance((px, py): (f64, f64), (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
	let (dx, dy) = (bx - ax, by - ay);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-9 {
		0.0
	} else {
		(((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (ax + t * dx, ay + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub slot: Option<usize>,
	/// Node center minus the pointer at grab time.
	pub offset_x: f64,
	pub offset_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Eased 0..1 progress of the current highlight.
	pub highlight_t: f64,
	pub tooltip: Option<String>,
}

/// Everything one mounted canvas owns: the loaded graph, live positions and
/// the current selection.
pub struct ViewSession {
	pub snapshot: Arc<GraphSnapshot>,
	pub layout: LayoutEngine,
	pub drag: DragState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	highlight: Option<HighlightSet>,
}

impl ViewSession {
	/// Build the layout and select the first node, if any.
	pub fn new(snapshot: Arc<GraphSnapshot>, params: LayoutParams, width: f64, height: f64) -> Self {
		let layout = LayoutEngine::new(&snapshot.model, params, width, height);
		let mut session = Self {
			snapshot,
			layout,
			drag: DragState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			highlight: None,
		};
		let snapshot = Arc::clone(&session.snapshot);
		if let Some(first) = snapshot.model.nodes().first() {
			session.select(&first.id);
		}
		session
	}

	pub fn selection(&self) -> Option<&str> {
		self.highlight.as_ref().map(|h| h.selected_id.as_str())
	}

	pub fn highlight(&self) -> Option<&HighlightSet> {
		self.highlight.as_ref()
	}

	/// Replace the highlight with the one for `id`. Returns whether the
	/// selection moved to a different node.
	pub fn select(&mut self, id: &str) -> bool {
		let changed = self.selection() != Some(id);
		self.highlight = Some(compute_highlight_set(id, &self.snapshot));
		if changed {
			self.hover.highlight_t = 0.0;
		}
		changed
	}

	/// Screen position of a node.
	pub fn node_position(&self, slot: usize) -> Option<(f64, f64)> {
		self.layout
			.position(slot)
			.map(|p| (p.x as f64, p.y as f64))
	}

	/// Topmost node whose shape contains the point.
	pub fn node_at_position(&self, x: f64, y: f64) -> Option<usize> {
		let nodes = self.snapshot.model.nodes();
		(0..nodes.len()).rev().find(|&slot| {
			let Some((nx, ny)) = self.node_position(slot) else {
				return false;
			};
			let (dx, dy) = (x - nx, y - ny);
			match nodes[slot].kind {
				NodeKind::Place => (dx * dx + dy * dy).sqrt() <= PLACE_RADIUS,
				NodeKind::Transition => dx.abs() + dy.abs() <= shape_extent(NodeKind::Transition),
			}
		})
	}

	/// Edge whose drawn segment passes within [`EDGE_HIT_DISTANCE`].
	pub fn edge_at_position(&self, x: f64, y: f64) -> Option<usize> {
		let model = &self.snapshot.model;
		model.edges().iter().enumerate().find_map(|(i, edge)| {
			let (s, t) = model.edge_endpoints(edge)?;
			let (a, b) = (self.node_position(s)?, self.node_position(t)?);
			(segment_distance((x, y), a, b) <= EDGE_HIT_DISTANCE).then_some(i)
		})
	}

	/// Tooltip for whatever sits under the pointer.
	pub fn tooltip_at(&self, x: f64, y: f64) -> Option<String> {
		if let Some(slot) = self.node_at_position(x, y) {
			return Some(self.snapshot.model.nodes()[slot].key.clone());
		}
		self.edge_at_position(x, y)
			.map(|i| edge_tooltip(&self.snapshot.model.edges()[i]))
	}

	/// Pin `slot` where it is, remembering where on the shape it was grabbed.
	pub fn begin_drag(&mut self, slot: usize, x: f64, y: f64) {
		let Some((nx, ny)) = self.node_position(slot) else {
			return;
		};
		self.drag = DragState {
			slot: Some(slot),
			offset_x: nx - x,
			offset_y: ny - y,
		};
		self.layout.pin(slot, nx, ny);
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		if let Some(slot) = self.drag.slot {
			self.layout.pin(slot, x + self.drag.offset_x, y + self.drag.offset_y);
		}
	}

	pub fn end_drag(&mut self) {
		if let Some(slot) = self.drag.slot.take() {
			self.layout.unpin(slot);
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.slot.is_some()
	}

	pub fn tick(&mut self, dt: f64) {
		self.layout.tick(dt as f32);
		self.flow_time += dt;
		if self.highlight.is_some() {
			let t = self.hover.highlight_t;
			self.hover.highlight_t = (t + (1.0 - t) * HIGHLIGHT_SPEED * dt).min(1.0);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		debug!("viewport resized to {width}x{height}");
		self.width = width;
		self.height = height;
		self.layout.resize(width, height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::petri::fixtures::sample;

	fn session() -> ViewSession {
		ViewSession::new(Arc::new(sample()), LayoutParams::default(), 800.0, 600.0)
	}

	#[test]
	fn first_node_is_selected_on_load() {
		let s = session();
		assert_eq!(s.selection(), Some("p0"));
		assert_eq!(s.highlight().unwrap().active_edges.len(), 3);
	}

	#[test]
	fn empty_graph_has_no_selection() {
		let s = ViewSession::new(
			Arc::new(GraphSnapshot::default()),
			LayoutParams::default(),
			800.0,
			600.0,
		);
		assert_eq!(s.selection(), None);
		assert_eq!(s.node_at_position(400.0, 300.0), None);
	}

	#[test]
	fn reselecting_keeps_state_and_reports_no_change() {
		let mut s = session();
		assert!(s.select("t1"));
		let before = s.highlight().cloned();
		assert!(!s.select("t1"));
		assert_eq!(s.highlight().cloned(), before);
	}

	#[test]
	fn hit_tests_follow_shapes() {
		let s = session();
		let (px, py) = s.node_position(0).unwrap();
		assert_eq!(s.node_at_position(px + 20.0, py), Some(0));
		assert_ne!(s.node_at_position(px + 20.0, py + 20.0), Some(0));

		let (tx, ty) = s.node_position(1).unwrap();
		assert_eq!(s.node_at_position(tx + 12.0, ty + 12.0), Some(1));
		assert_ne!(s.node_at_position(tx + 20.0, ty + 20.0), Some(1));
	}

	#[test]
	fn edge_tooltip_prefers_keys() {
		let snapshot = sample();
		let edges = snapshot.model.edges();
		assert_eq!(edge_tooltip(&edges[0]), "crossroads -> go_left\nweight: 1");
		assert_eq!(edge_tooltip(&edges[1]), "p0 -> t2\nweight: ");
		assert_eq!(edge_tooltip(&edges[5]), "t3 -> p6\nweight: 2");
	}

	#[test]
	fn dangling_edge_is_never_hit() {
		let s = session();
		// edge 6 points at a node that does not exist
		for (x, y) in [(0.0, 0.0), (400.0, 300.0), (800.0, 600.0)] {
			assert_ne!(s.edge_at_position(x, y), Some(6));
		}
	}

	fn assert_near((ax, ay): (f64, f64), (bx, by): (f64, f64)) {
		assert!((ax - bx).abs() < 1e-3 && (ay - by).abs() < 1e-3, "{ax},{ay} vs {bx},{by}");
	}

	#[test]
	fn drag_pins_then_releases() {
		let mut s = session();
		let start = s.node_position(3).unwrap();
		// grab off center; the node must not jump to the pointer
		s.begin_drag(3, start.0 + 10.0, start.1 - 5.0);
		assert_near(s.node_position(3).unwrap(), start);

		s.drag_to(410.0, 295.0);
		s.tick(0.016);
		assert_near(s.node_position(3).unwrap(), (400.0, 300.0));
		assert!(s.layout.position(3).unwrap().is_pinned());

		s.end_drag();
		assert!(!s.is_dragging());
		assert!(!s.layout.position(3).unwrap().is_pinned());
	}

	#[test]
	fn highlight_fades_in_after_selection() {
		let mut s = session();
		s.select("t2");
		assert_eq!(s.hover.highlight_t, 0.0);
		for _ in 0..120 {
			s.tick(0.016);
		}
		assert!(s.hover.highlight_t > 0.9);
	}
}
