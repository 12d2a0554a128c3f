//! Error types shared by the fetch layer and the token game.

use thiserror::Error;

/// Failures while loading the graph or asking a question.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
	/// The request never produced a response.
	#[error("network error: {0}")]
	Fetch(String),
	/// The server answered with a non-success status.
	#[error("server responded with HTTP {0}")]
	Status(u16),
	/// The body was not the JSON shape we expect.
	#[error("malformed payload: {0}")]
	MalformedPayload(String),
}

impl From<serde_json::Error> for ViewerError {
	fn from(err: serde_json::Error) -> Self {
		Self::MalformedPayload(err.to_string())
	}
}

/// Why a transition could not fire under the current marking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
	/// No transition with this id exists.
	#[error("unknown transition: {0}")]
	UnknownTransition(String),
	/// An input place lacks tokens, or the transition has no inputs.
	#[error("transition '{0}' is not enabled under the current marking")]
	NotEnabled(String),
}
