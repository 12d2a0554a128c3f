use std::f32::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use crate::config::LayoutParams;
use crate::petri::model::{GraphModel, NodeKind};

/// Per-node data carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct Body {
	pub slot: usize,
}

/// Current coordinates of one node. While a pin is present the node is held
/// at the pinned coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutPosition {
	pub x: f32,
	pub y: f32,
	pub pinned_x: Option<f32>,
	pub pinned_y: Option<f32>,
}

impl LayoutPosition {
	pub fn is_pinned(&self) -> bool {
		self.pinned_x.is_some() || self.pinned_y.is_some()
	}
}

/// Clamp that tolerates a viewport narrower than twice the margin.
fn bound(v: f32, lo: f32, hi: f32) -> f32 {
	if lo > hi { (lo + hi) / 2.0 } else { v.clamp(lo, hi) }
}

/// Force-directed layout: charge and integration come from `force_graph`;
/// link rest length, collision, centering and viewport bounds are applied
/// on top after every step, scaled by a decaying energy (`alpha`).
pub struct LayoutEngine {
	graph: ForceGraph<Body, ()>,
	positions: Vec<LayoutPosition>,
	radii: Vec<f32>,
	links: Vec<(usize, usize)>,
	params: LayoutParams,
	width: f32,
	height: f32,
	alpha: f32,
	alpha_target: f32,
}

impl LayoutEngine {
	pub fn new(model: &GraphModel, params: LayoutParams, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: params.force_charge,
			force_spring: params.force_spring,
			force_max: params.force_max,
			node_speed: params.node_speed,
			damping_factor: params.damping_factor,
		});
		let (width, height) = (width as f32, height as f32);
		let count = model.nodes().len().max(1);
		let spread = (width.min(height) / 2.0 - params.margin).clamp(1.0, 100.0);

		let mut handles: Vec<DefaultNodeIdx> = Vec::with_capacity(count);
		let mut positions = Vec::with_capacity(count);
		let mut radii = Vec::with_capacity(count);
		for (slot, node) in model.nodes().iter().enumerate() {
			let radius = match node.kind {
				NodeKind::Place => params.place_collision_radius,
				NodeKind::Transition => params.transition_collision_radius,
			};
			let angle = slot as f32 * 2.0 * PI / count as f32;
			let (x, y) = (
				width / 2.0 + spread * angle.cos(),
				height / 2.0 + spread * angle.sin(),
			);
			handles.push(graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: Body { slot },
			}));
			positions.push(LayoutPosition {
				x,
				y,
				..Default::default()
			});
			radii.push(radius);
		}

		let mut links = Vec::new();
		for edge in model.edges() {
			let Some((src, tgt)) = model.edge_endpoints(edge) else {
				continue;
			};
			if src == tgt {
				continue;
			}
			graph.add_edge(handles[src], handles[tgt], EdgeData::default());
			links.push((src, tgt));
		}

		let mut engine = Self {
			graph,
			positions,
			radii,
			links,
			params,
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
		};
		engine.constrain();
		engine.push_to_graph();
		engine
	}

	pub fn positions(&self) -> &[LayoutPosition] {
		&self.positions
	}

	pub fn position(&self, slot: usize) -> Option<&LayoutPosition> {
		self.positions.get(slot)
	}

	/// Center the layout is pulled toward.
	pub fn center(&self) -> (f32, f32) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Whether another step would still move anything.
	pub fn is_active(&self) -> bool {
		self.alpha >= self.params.alpha_min || self.alpha_target > 0.0
	}

	/// Advance one step. Returns `false` once the layout has cooled.
	pub fn tick(&mut self, dt: f32) -> bool {
		if self.positions.is_empty() || !self.is_active() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		self.graph.update(dt * self.alpha.max(self.params.alpha_min));
		self.pull_from_graph();
		self.apply_links();
		self.apply_collisions();
		self.apply_centering();
		self.constrain();
		self.push_to_graph();
		true
	}

	/// Hold `slot` at the pointer and raise the energy so neighbours react.
	pub fn pin(&mut self, slot: usize, x: f64, y: f64) {
		let margin = self.params.margin;
		let (w, h) = (self.width, self.height);
		let Some(pos) = self.positions.get_mut(slot) else {
			return;
		};
		let (px, py) = (bound(x as f32, margin, w - margin), bound(y as f32, margin, h - margin));
		pos.pinned_x = Some(px);
		pos.pinned_y = Some(py);
		pos.x = px;
		pos.y = py;
		self.alpha_target = self.params.drag_alpha_target;
		self.alpha = self.alpha.max(self.params.drag_alpha_target);
		self.push_to_graph();
	}

	/// Release the pin on `slot` and let the energy decay.
	pub fn unpin(&mut self, slot: usize) {
		if let Some(pos) = self.positions.get_mut(slot) {
			debug!("released node {slot}");
			pos.pinned_x = None;
			pos.pinned_y = None;
		}
		if !self.positions.iter().any(LayoutPosition::is_pinned) {
			self.alpha_target = 0.0;
		}
		self.push_to_graph();
	}

	/// Move the centering target; node data is untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width as f32;
		self.height = height as f32;
		self.alpha = self.alpha.max(self.params.resize_alpha);
		debug!("layout resized to {width}x{height}");
	}

	fn pull_from_graph(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			if let Some(pos) = positions.get_mut(node.data.user_data.slot) {
				pos.x = node.x();
				pos.y = node.y();
			}
		});
	}

	fn push_to_graph(&mut self) {
		let positions = &self.positions;
		self.graph.visit_nodes_mut(|node| {
			if let Some(pos) = positions.get(node.data.user_data.slot) {
				node.data.x = pos.x;
				node.data.y = pos.y;
				node.data.is_anchor = pos.is_pinned();
			}
		});
	}

	fn apply_links(&mut self) {
		let strength = self.params.link_strength * self.alpha;
		for &(s, t) in &self.links {
			let (a, b) = (self.positions[s], self.positions[t]);
			let (dx, dy) = (b.x - a.x, b.y - a.y);
			let dist = (dx * dx + dy * dy).sqrt().max(0.01);
			let k = (dist - self.params.link_distance) / dist * strength * 0.5;
			let (mx, my) = (dx * k, dy * k);
			if !a.is_pinned() {
				self.positions[s].x += mx;
				self.positions[s].y += my;
			}
			if !b.is_pinned() {
				self.positions[t].x -= mx;
				self.positions[t].y -= my;
			}
		}
	}

	fn apply_collisions(&mut self) {
		let n = self.positions.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (self.positions[i], self.positions[j]);
				let min = self.radii[i] + self.radii[j];
				let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
				let mut dist = (dx * dx + dy * dy).sqrt();
				if dist >= min {
					continue;
				}
				if dist < 1e-3 {
					// coincident: separate along a direction derived from the pair
					let angle = (i * 31 + j * 17) as f32;
					(dx, dy, dist) = (angle.cos(), angle.sin(), 1.0);
				}
				let push = (min - dist) / dist * 0.5;
				let (px, py) = (dx * push, dy * push);
				match (a.is_pinned(), b.is_pinned()) {
					(true, true) => {}
					(true, false) => {
						self.positions[j].x += px * 2.0;
						self.positions[j].y += py * 2.0;
					}
					(false, true) => {
						self.positions[i].x -= px * 2.0;
						self.positions[i].y -= py * 2.0;
					}
					(false, false) => {
						self.positions[i].x -= px;
						self.positions[i].y -= py;
						self.positions[j].x += px;
						self.positions[j].y += py;
					}
				}
			}
		}
	}

	fn apply_centering(&mut self) {
		let n = self.positions.len() as f32;
		let (sx, sy) = self
			.positions
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let (cx, cy) = self.center();
		let k = self.params.center_strength;
		let (shift_x, shift_y) = ((cx - sx / n) * k, (cy - sy / n) * k);
		for pos in self.positions.iter_mut().filter(|p| !p.is_pinned()) {
			pos.x += shift_x;
			pos.y += shift_y;
		}
	}

	/// Restore pins and keep every node inside the margin.
	fn constrain(&mut self) {
		let margin = self.params.margin;
		let (w, h) = (self.width, self.height);
		for pos in &mut self.positions {
			if let Some(px) = pos.pinned_x {
				pos.x = px;
			}
			if let Some(py) = pos.pinned_y {
				pos.y = py;
			}
			if !pos.x.is_finite() || !pos.y.is_finite() {
				(pos.x, pos.y) = (w / 2.0, h / 2.0);
			}
			pos.x = bound(pos.x, margin, w - margin);
			pos.y = bound(pos.y, margin, h - margin);
		}
	}
}
