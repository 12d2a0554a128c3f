use std::collections::HashSet;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{PLACE_RADIUS, ViewSession, shape_extent};
use crate::petri::marking::Marking;
use crate::petri::model::{Node, NodeKind};

const BACKGROUND: &str = "#1a1a2e";
const PLACE_FILL: &str = "#1f77b4";
const TRANSITION_FILL: &str = "#ff7f0e";
const PEER_STROKE: &str = "#ffd166";
const ENABLED_STROKE: &str = "#2ca02c";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64, gap: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
}

fn clear_dash(ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Repaint the whole canvas from the session's current positions.
pub fn render(session: &ViewSession, marking: &Marking, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, session.width, session.height);
	draw_choice_links(session, ctx);
	draw_edges(session, ctx);
	draw_nodes(session, marking, ctx);
}

fn draw_choice_links(session: &ViewSession, ctx: &CanvasRenderingContext2d) {
	let model = &session.snapshot.model;
	let highlight = session.highlight();
	let t = ease_out_cubic(session.hover.highlight_t);
	let flow_offset = -(session.flow_time * 24.0) % 12.0;

	ctx.set_line_width(1.5);
	for (i, link) in session.snapshot.choices.links().iter().enumerate() {
		let ends = model
			.slot(&link.source_id)
			.zip(model.slot(&link.target_id))
			.and_then(|(s, e)| session.node_position(s).zip(session.node_position(e)));
		let Some(((x1, y1), (x2, y2))) = ends else {
			continue;
		};
		if (x2 - x1).hypot(y2 - y1) < 0.001 {
			continue;
		}

		let active = highlight.is_some_and(|h| h.active_links.contains(&i));
		let alpha = if active { 0.35 + 0.55 * t } else { 0.35 - 0.2 * t };
		ctx.set_stroke_style_str(&format!("rgba(255, 209, 102, {alpha})"));
		set_dash(ctx, 6.0, 6.0);
		ctx.set_line_dash_offset(if active { flow_offset } else { 0.0 });
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
	clear_dash(ctx);
	ctx.set_line_dash_offset(0.0);
}

fn draw_edges(session: &ViewSession, ctx: &CanvasRenderingContext2d) {
	let model = &session.snapshot.model;
	let nodes = model.nodes();
	let highlight = session.highlight();
	let t = ease_out_cubic(session.hover.highlight_t);
	let arrow_size = 9.0;

	for (i, edge) in model.edges().iter().enumerate() {
		let Some((s, e)) = model.edge_endpoints(edge) else {
			continue;
		};
		let (Some((x1, y1)), Some((x2, y2))) = (session.node_position(s), session.node_position(e))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		let (r1, r2) = (shape_extent(nodes[s].kind), shape_extent(nodes[e].kind));
		if dist < r1 + r2 + arrow_size {
			continue;
		}

		let active = highlight.is_some_and(|h| h.active_edges.contains(&i));
		// t=0: every edge at 0.6; t=1: active at 0.95, the rest at 0.25
		let (alpha, width) = if active {
			(0.6 + 0.35 * t, 1.5 * (1.0 + 0.4 * t))
		} else {
			(0.6 - 0.35 * t, 1.5)
		};
		let color = format!("rgba(100, 180, 255, {alpha})");

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
		ctx.stroke();

		ctx.set_fill_style_str(&color);
		let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

/// Circle for places, 45°-rotated square for transitions.
fn trace_shape(ctx: &CanvasRenderingContext2d, kind: NodeKind, x: f64, y: f64, grow: f64) {
	ctx.begin_path();
	match kind {
		NodeKind::Place => {
			let _ = ctx.arc(x, y, PLACE_RADIUS + grow, 0.0, 2.0 * PI);
		}
		NodeKind::Transition => {
			let e = shape_extent(kind) + grow;
			ctx.move_to(x, y - e);
			ctx.line_to(x + e, y);
			ctx.line_to(x, y + e);
			ctx.line_to(x - e, y);
			ctx.close_path();
		}
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, alpha: f64) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, radius) else {
		return;
	};
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_nodes(session: &ViewSession, marking: &Marking, ctx: &CanvasRenderingContext2d) {
	let model = &session.snapshot.model;
	let highlight = session.highlight();
	let t = ease_out_cubic(session.hover.highlight_t);
	let enabled: HashSet<&str> = marking.enabled_transitions(model).into_iter().collect();

	ctx.set_font("11px sans-serif");
	ctx.set_text_align("center");

	for (slot, node) in model.nodes().iter().enumerate() {
		let Some((x, y)) = session.node_position(slot) else {
			continue;
		};
		let selected = highlight.is_some_and(|h| h.is_selected(&node.id));
		let peer = highlight.is_some_and(|h| h.is_peer(&node.id));
		let extent = shape_extent(node.kind);

		if selected && t > 0.01 {
			draw_glow(ctx, x, y, extent * (1.4 + 0.8 * t), 0.35 * t);
		}

		ctx.set_global_alpha(if selected || peer { 1.0 } else { 1.0 - 0.45 * t });
		trace_shape(ctx, node.kind, x, y, 0.0);
		ctx.set_fill_style_str(match node.kind {
			NodeKind::Place => PLACE_FILL,
			NodeKind::Transition => TRANSITION_FILL,
		});
		ctx.fill();

		if enabled.contains(node.id.as_str()) {
			trace_shape(ctx, node.kind, x, y, 4.0);
			ctx.set_stroke_style_str(ENABLED_STROKE);
			ctx.set_line_width(2.0);
			ctx.stroke();
		}
		if selected {
			trace_shape(ctx, node.kind, x, y, 2.0);
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(2.5);
			ctx.stroke();
		} else if peer {
			trace_shape(ctx, node.kind, x, y, 2.0);
			ctx.set_stroke_style_str(PEER_STROKE);
			ctx.set_line_width(2.0);
			set_dash(ctx, 4.0, 3.0);
			ctx.stroke();
			clear_dash(ctx);
		}

		if node.kind == NodeKind::Place {
			let tokens = marking.tokens(&node.id);
			if tokens > 0 {
				ctx.set_fill_style_str("white");
				let _ = ctx.fill_text(&tokens.to_string(), x, y + 4.0);
			}
		}
		draw_label(ctx, node, x, y - extent - 6.0);
		ctx.set_global_alpha(1.0);
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, node: &Node, x: f64, y: f64) {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
	let _ = ctx.fill_text(node.display_name(), x, y);
}
