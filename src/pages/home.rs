use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use crate::api;
use crate::components::ask_panel::AskPanel;
use crate::components::details_panel::DetailsPanel;
use crate::components::petri_graph::PetriGraphCanvas;
use crate::config::ViewerConfig;
use crate::petri::GraphSnapshot;
use crate::petri::marking::Marking;

/// What the graph area shows. The graph is either fully rendered or replaced
/// by a single status message.
#[derive(Clone, Debug)]
enum LoadState {
	Loading,
	Empty,
	Ready(Arc<GraphSnapshot>),
	Failed(String),
}

fn data_quality_notice(snapshot: &GraphSnapshot) -> Option<AnyView> {
	let duplicates = snapshot.model.duplicate_ids().len();
	(duplicates > 0).then(|| {
		view! {
			<p class="status warning">
				{format!("{duplicates} duplicate node id(s) in the data; later records were kept.")}
			</p>
		}
		.into_any()
	})
}

/// Graph explorer with details and question panels
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let load_state = RwSignal::new(LoadState::Loading);
	let selected = RwSignal::new(None::<String>);
	let marking = RwSignal::new(Marking::default());

	let endpoint = config.graph_endpoint.clone();
	spawn_local(async move {
		let next = match api::fetch_graph(&endpoint).await {
			Ok(snapshot) if snapshot.model.is_empty() => {
				info!("graph is empty");
				LoadState::Empty
			}
			Ok(snapshot) => {
				marking.set(Marking::initial(&snapshot.model));
				selected.set(snapshot.model.nodes().first().map(|n| n.id.clone()));
				LoadState::Ready(Arc::new(snapshot))
			}
			Err(err) => LoadState::Failed(format!("Could not load the graph: {err}")),
		};
		load_state.set(next);
	});

	let graph_area = move || match load_state.get() {
		LoadState::Loading => view! { <p class="status">"Loading graph..."</p> }.into_any(),
		LoadState::Empty => view! { <p class="status">"No nodes to display."</p> }.into_any(),
		LoadState::Failed(message) => view! { <p class="status error">{message}</p> }.into_any(),
		LoadState::Ready(snapshot) => view! {
			{data_quality_notice(&snapshot)}
			<div class="graph-container">
				<PetriGraphCanvas snapshot=snapshot.clone() selected=selected marking=marking />
			</div>
			<DetailsPanel snapshot=snapshot selected=selected marking=marking />
		}
		.into_any(),
	};

	view! {
		<main class="petri-explorer">
			<section class="graph-area">{graph_area}</section>
			<AskPanel />
		</main>
	}
}
