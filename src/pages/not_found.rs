use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<main class="petri-explorer">
			<h1>"Page not found"</h1>
			<p>
				<a href="/">"Back to the graph"</a>
			</p>
		</main>
	}
}
