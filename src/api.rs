//! Backend calls: the graph payload and the question endpoint.
//!
//! Transport uses web-sys fetch; decoding goes through `serde_json` so the
//! parsing half is testable off the browser.

use log::error;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::error::ViewerError;
use crate::petri::GraphSnapshot;
use crate::petri::model::GraphPayload;

/// Body of the question endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
	pub question: String,
	pub depth: u32,
	pub max_docs: u32,
}

/// A document the answer was drawn from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnswerSource {
	pub id: i64,
	pub title: String,
}

/// Reply of the question endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AskAnswer {
	pub answer: String,
	#[serde(default)]
	pub sources: Vec<AnswerSource>,
}

pub fn parse_graph_payload(body: &str) -> Result<GraphPayload, ViewerError> {
	Ok(serde_json::from_str(body)?)
}

pub fn parse_answer(body: &str) -> Result<AskAnswer, ViewerError> {
	Ok(serde_json::from_str(body)?)
}

async fn send(method: &str, url: &str, body: Option<String>) -> Result<String, ViewerError> {
	let opts = RequestInit::new();
	opts.set_method(method);
	opts.set_mode(RequestMode::Cors);
	if let Some(body) = &body {
		opts.set_body(&JsValue::from_str(body));
	}

	let request = Request::new_with_str_and_init(url, &opts)
		.map_err(|e| ViewerError::Fetch(format!("request error: {e:?}")))?;
	if body.is_some() {
		request
			.headers()
			.set("Content-Type", "application/json")
			.map_err(|e| ViewerError::Fetch(format!("header error: {e:?}")))?;
	}

	let window = web_sys::window().ok_or_else(|| ViewerError::Fetch("no window".into()))?;
	let resp_value = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| ViewerError::Fetch(format!("{e:?}")))?;
	let resp: Response = resp_value
		.dyn_into()
		.map_err(|_| ViewerError::Fetch("response is not a Response".into()))?;

	if !resp.ok() {
		return Err(ViewerError::Status(resp.status()));
	}

	let text = JsFuture::from(
		resp.text()
			.map_err(|e| ViewerError::MalformedPayload(format!("{e:?}")))?,
	)
	.await
	.map_err(|e| ViewerError::MalformedPayload(format!("{e:?}")))?;
	text.as_string()
		.ok_or_else(|| ViewerError::MalformedPayload("body is not text".into()))
}

/// Fetch and normalize the graph. Either the whole snapshot or an error.
pub async fn fetch_graph(endpoint: &str) -> Result<GraphSnapshot, ViewerError> {
	let body = send("GET", endpoint, None).await.inspect_err(|e| {
		error!("graph fetch failed: {e}");
	})?;
	let payload = parse_graph_payload(&body).inspect_err(|e| {
		error!("graph payload rejected: {e}");
	})?;
	Ok(GraphSnapshot::load(payload))
}

pub async fn ask(endpoint: &str, request: &AskRequest) -> Result<AskAnswer, ViewerError> {
	let body = serde_json::to_string(request)
		.map_err(|e| ViewerError::MalformedPayload(e.to_string()))?;
	let reply = send("POST", endpoint, Some(body)).await.inspect_err(|e| {
		error!("question failed: {e}");
	})?;
	parse_answer(&reply)
}
