//! Viewer settings, optionally overridden by a JSON block in the host page.

use log::{info, warn};
use serde::Deserialize;

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "petri-viewer-config";

/// Physics and geometry of the force layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Rest length of the edge springs.
	pub link_distance: f32,
	/// How much of the rest-length error is corrected per tick.
	pub link_strength: f32,
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// Minimum separation radius around a place.
	pub place_collision_radius: f32,
	/// Minimum separation radius around a transition.
	pub transition_collision_radius: f32,
	pub center_strength: f32,
	/// Distance kept between every node and the viewport edges.
	pub margin: f32,
	pub alpha_decay: f32,
	pub alpha_min: f32,
	/// Energy held while a node is dragged.
	pub drag_alpha_target: f32,
	/// Energy injected by a viewport resize.
	pub resize_alpha: f32,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			link_distance: 90.0,
			link_strength: 0.7,
			force_charge: 150.0,
			force_spring: 0.02,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			place_collision_radius: 34.0,
			transition_collision_radius: 28.0,
			center_strength: 0.05,
			margin: 30.0,
			alpha_decay: 0.0228,
			alpha_min: 0.001,
			drag_alpha_target: 0.3,
			resize_alpha: 0.3,
		}
	}
}

/// Endpoints and defaults for the whole app.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
	/// `GET` endpoint returning nodes, edges and choices.
	pub graph_endpoint: String,
	/// `POST` endpoint answering questions.
	pub ask_endpoint: String,
	pub default_depth: u32,
	pub default_max_docs: u32,
	/// Force layout tuning.
	pub layout: LayoutParams,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			graph_endpoint: "/petri/graph/data".into(),
			ask_endpoint: "/ask".into(),
			default_depth: 2,
			default_max_docs: 12,
			layout: LayoutParams::default(),
		}
	}
}

impl ViewerConfig {
	/// Parse a (possibly partial) JSON override; missing fields keep defaults.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Read overrides from the host page, falling back to defaults.
	pub fn from_document() -> Self {
		let Some(element) = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
		else {
			return Self::default();
		};
		let text = element.text_content().unwrap_or_default();
		match Self::from_json(&text) {
			Ok(config) => {
				info!("loaded viewer config from #{CONFIG_ELEMENT_ID}");
				config
			}
			Err(err) => {
				warn!("ignoring invalid #{CONFIG_ELEMENT_ID}: {err}");
				Self::default()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_override_keeps_defaults() {
		let config =
			ViewerConfig::from_json(r#"{"graph_endpoint": "/api/graph", "layout": {"margin": 10}}"#)
				.unwrap();
		assert_eq!(config.graph_endpoint, "/api/graph");
		assert_eq!(config.ask_endpoint, "/ask");
		assert_eq!(config.layout.margin, 10.0);
		assert_eq!(config.layout.link_distance, 90.0);
	}

	#[test]
	fn places_collide_wider_than_transitions() {
		let params = LayoutParams::default();
		assert!(params.place_collision_radius > params.transition_collision_radius);
	}

	#[test]
	fn invalid_json_is_an_error() {
		assert!(ViewerConfig::from_json("{not json").is_err());
	}
}
