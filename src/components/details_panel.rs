//! Side panel describing the selected node, its choice alternatives and its
//! state in the token game.

use std::sync::Arc;

use leptos::prelude::*;
use log::warn;

use crate::petri::GraphSnapshot;
use crate::petri::details::{ChoiceGroupDetails, NO_ALTERNATIVES, NodeDetails, node_details};
use crate::petri::marking::Marking;
use crate::petri::model::NodeKind;

#[component]
fn ChoiceGroupBlock(group: ChoiceGroupDetails) -> impl IntoView {
	let alternatives = if group.alternatives.is_empty() {
		view! { <li class="muted">{NO_ALTERNATIVES}</li> }.into_any()
	} else {
		group
			.alternatives
			.into_iter()
			.map(|name| view! { <li>{name}</li> })
			.collect_view()
			.into_any()
	};

	view! {
		<div class="choice-group">
			<h4>{group.heading}</h4>
			{group.exclusive_tag.map(|tag| view! { <p class="exclusive-tag">{tag}</p> })}
			<ul>{alternatives}</ul>
		</div>
	}
}

#[component]
fn TokenStatus(
	snapshot: Arc<GraphSnapshot>,
	id: String,
	kind: NodeKind,
	marking: RwSignal<Marking>,
) -> impl IntoView {
	let (fire_error, set_fire_error) = signal(None::<String>);

	match kind {
		NodeKind::Place => {
			let tokens = move || marking.with(|m| m.tokens(&id));
			view! { <p class="token-status">"Tokens: " {tokens}</p> }.into_any()
		}
		NodeKind::Transition => {
			let (status_snapshot, status_id) = (snapshot.clone(), id.clone());
			let enabled =
				Memo::new(move |_| marking.with(|m| m.is_enabled(&status_snapshot.model, &status_id)));
			let on_fire = move |_| {
				let mut result = Ok(());
				marking.update(|m| result = m.fire(&snapshot.model, &id));
				match result {
					Ok(()) => set_fire_error.set(None),
					Err(err) => {
						warn!("{err}");
						set_fire_error.set(Some(err.to_string()));
					}
				}
			};
			view! {
				<div class="token-status">
					<span>{move || if enabled.get() { "Enabled" } else { "Not enabled" }}</span>
					<button on:click=on_fire disabled=move || !enabled.get()>"Fire"</button>
					{move || fire_error.get().map(|e| view! { <p class="error">{e}</p> })}
				</div>
			}
			.into_any()
		}
	}
}

#[component]
pub fn DetailsPanel(
	snapshot: Arc<GraphSnapshot>,
	selected: RwSignal<Option<String>>,
	marking: RwSignal<Marking>,
) -> impl IntoView {
	let reset_snapshot = snapshot.clone();
	let on_reset = move |_| marking.set(Marking::initial(&reset_snapshot.model));

	let body = move || {
		let Some((id, details)) = selected
			.get()
			.and_then(|id| node_details(&snapshot, &id).map(|d| (id, d)))
		else {
			return view! { <p class="muted">"Hover or click a node to see its details."</p> }
				.into_any();
		};
		let NodeDetails {
			title,
			kind,
			key,
			description,
			choice_groups,
		} = details;
		let kind_label = crate::petri::details::kind_label(kind);

		view! {
			<h2>{title}</h2>
			<p class="kind">{kind_label}</p>
			<p class="key">"Key: " <code>{key}</code></p>
			<p class="description">{description}</p>
			<TokenStatus snapshot=snapshot.clone() id=id kind=kind marking=marking />
			{(!choice_groups.is_empty()).then(|| view! {
				<section class="choice-groups">
					<h3>"Choice groups"</h3>
					{choice_groups
						.into_iter()
						.map(|group| view! { <ChoiceGroupBlock group=group /> })
						.collect_view()}
				</section>
			})}
		}
		.into_any()
	};

	view! {
		<aside class="details-panel">
			{body}
			<button class="reset-marking" on:click=on_reset>"Reset tokens"</button>
		</aside>
	}
}
