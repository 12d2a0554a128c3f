use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::render;
use super::state::ViewSession;
use crate::config::ViewerConfig;
use crate::petri::GraphSnapshot;
use crate::petri::marking::Marking;

const FRAME_DT: f64 = 0.016;

/// Container width by window height minus room for the page chrome.
fn viewport_size(window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
	let width = canvas
		.parent_element()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(800.0);
	let window_height = window
		.inner_height()
		.ok()
		.and_then(|h| h.as_f64())
		.unwrap_or(760.0);
	(width, (window_height - 160.0).max(420.0))
}

fn canvas_point(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(HtmlCanvasElement, f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	let (x, y) = (
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	);
	Some((canvas, x, y))
}

fn set_tooltip(canvas: &HtmlCanvasElement, text: Option<&str>) {
	let _ = match text {
		Some(text) => canvas.set_attribute("title", text),
		None => canvas.remove_attribute("title"),
	};
}

#[component]
pub fn PetriGraphCanvas(
	snapshot: Arc<GraphSnapshot>,
	selected: RwSignal<Option<String>>,
	marking: RwSignal<Marking>,
) -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ViewSession>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let frame: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let (state_init, animate_init, resize_cb_init, frame_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), frame.clone());

	let teardown = StoredValue::new_local((animate.clone(), resize_cb.clone(), frame.clone()));
	on_cleanup(move || {
		teardown.try_with_value(|(animate, resize_cb, frame)| {
			let window = web_sys::window();
			if let (Some(win), Some(id)) = (&window, frame.take()) {
				let _ = win.cancel_animation_frame(id);
			}
			if let (Some(win), Some(cb)) = (&window, resize_cb.borrow_mut().take()) {
				let _ =
					win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			animate.borrow_mut().take();
			debug!("graph canvas torn down");
		});
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			error!("no window; graph canvas not started");
			return;
		};

		let (w, h) = viewport_size(&window, &canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("canvas context is not 2d");
					return;
				}
			},
			_ => {
				error!("2d canvas context unavailable");
				return;
			}
		};

		let session = ViewSession::new(snapshot.clone(), config.layout.clone(), w, h);
		selected.set(session.selection().map(str::to_string));
		*state_init.borrow_mut() = Some(session);

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = viewport_size(&win, &canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, frame_inner) =
			(state_init.clone(), animate_init.clone(), frame_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(FRAME_DT);
				let session: &ViewSession = s;
				marking.try_with_untracked(|m| render::render(session, m, &ctx));
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((_, x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut clicked = None;
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(slot) = s.node_at_position(x, y) {
				let id = s.snapshot.model.nodes()[slot].id.clone();
				s.select(&id);
				s.begin_drag(slot, x, y);
				clicked = Some(id);
			}
		}
		if clicked.is_some() && selected.get_untracked() != clicked {
			selected.set(clicked);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((canvas, x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut hovered = None;
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.is_dragging() {
				s.drag_to(x, y);
			} else {
				if let Some(slot) = s.node_at_position(x, y) {
					let id = s.snapshot.model.nodes()[slot].id.clone();
					if s.select(&id) {
						hovered = Some(id);
					}
				}
				let tooltip = s.tooltip_at(x, y);
				if tooltip != s.hover.tooltip {
					set_tooltip(&canvas, tooltip.as_deref());
					s.hover.tooltip = tooltip;
				}
			}
		}
		if hovered.is_some() {
			selected.set(hovered);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_drag();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |ev: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
			s.hover.tooltip = None;
		}
		if let Some((canvas, _, _)) = canvas_point(canvas_ref, &ev) {
			set_tooltip(&canvas, None);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="petri-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; cursor: grab;"
		/>
	}
}
