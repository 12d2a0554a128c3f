//! Free-text question box. Failures here never touch the graph view.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{self, AskAnswer, AskRequest};
use crate::config::ViewerConfig;

#[component]
pub fn AskPanel() -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let question = RwSignal::new(String::new());
	let depth = RwSignal::new(config.default_depth);
	let max_docs = RwSignal::new(config.default_max_docs);
	let answer = RwSignal::new(None::<AskAnswer>);
	let error = RwSignal::new(None::<String>);
	let pending = RwSignal::new(false);
	let endpoint = config.ask_endpoint.clone();

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let text = question.get_untracked().trim().to_string();
		if text.is_empty() || pending.get_untracked() {
			return;
		}
		let request = AskRequest {
			question: text,
			depth: depth.get_untracked(),
			max_docs: max_docs.get_untracked(),
		};
		answer.set(None);
		error.set(None);
		pending.set(true);

		let endpoint = endpoint.clone();
		spawn_local(async move {
			match api::ask(&endpoint, &request).await {
				Ok(reply) => answer.set(Some(reply)),
				Err(err) => error.set(Some(format!("Could not get an answer: {err}"))),
			}
			pending.set(false);
		});
	};

	view! {
		<section class="ask-panel">
			<h2>"Ask about the story"</h2>
			<form on:submit=on_submit>
				<textarea
					placeholder="What happens if I free the spirit under the Hillock?"
					prop:value=move || question.get()
					on:input=move |ev| question.set(event_target_value(&ev))
				></textarea>
				<label>
					"Depth "
					<input
						type="number"
						min="0"
						max="6"
						prop:value=move || depth.get().to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse() {
								depth.set(v);
							}
						}
					/>
				</label>
				<label>
					"Max docs "
					<input
						type="number"
						min="1"
						max="50"
						prop:value=move || max_docs.get().to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse() {
								max_docs.set(v);
							}
						}
					/>
				</label>
				<button type="submit" disabled=move || pending.get()>
					{move || if pending.get() { "Asking..." } else { "Ask" }}
				</button>
			</form>
			{move || error.get().map(|e| view! { <p class="error">{e}</p> })}
			{move || {
				answer
					.get()
					.map(|reply| {
						view! {
							<div class="answer">
								<p>{reply.answer}</p>
								{(!reply.sources.is_empty())
									.then(|| {
										view! {
											<ul class="sources">
												{reply
													.sources
													.into_iter()
													.map(|s| view! { <li>{format!("[{}] {}", s.id, s.title)}</li> })
													.collect_view()}
											</ul>
										}
									})}
							</div>
						}
					})
			}}
		</section>
	}
}
