use leptos::prelude::*;

use crate::components::dialogue_graph::{DialogueCanvas, asset_exists, create_asset, list_assets};

/// Editor home page: asset toolbar, new-asset naming popup, and the canvas
/// for whichever dialogue is currently open.
#[component]
pub fn Home() -> impl IntoView {
	let assets = RwSignal::new(Vec::<String>::new());
	let selected = RwSignal::new(None::<String>);
	let show_popup = RwSignal::new(false);
	let new_name = RwSignal::new(String::new());

	Effect::new(move |_| {
		let list = list_assets();
		// Nothing to open yet: prompt for a name, like a first launch.
		if list.is_empty() {
			show_popup.set(true);
		}
		assets.set(list);
	});

	let create = move |_| {
		let name = new_name.get_untracked().trim().to_string();
		if name.is_empty() {
			return;
		}
		if !asset_exists(&name) {
			create_asset(&name);
			assets.update(|list| {
				list.push(name.clone());
				list.sort();
			});
		}
		selected.set(Some(name));
		show_popup.set(false);
		new_name.set(String::new());
	};

	view! {
		<div class="editor-shell">
			<header class="editor-toolbar">
				<h1>"Dialogue Editor"</h1>
				<button on:click=move |_| show_popup.set(true)>"New Dialogue"</button>
				{move || {
					assets
						.get()
						.into_iter()
						.map(|name| {
							let open = name.clone();
							let is_open = selected.get().as_deref() == Some(name.as_str());
							view! {
								<button
									class="asset-button"
									class:open=is_open
									on:click=move |_| selected.set(Some(open.clone()))
								>
									{name.clone()}
								</button>
							}
						})
						.collect_view()
				}}
			</header>

			{move || {
				show_popup.get().then(|| {
					view! {
						<div class="name-popup">
							<label>"Enter new file name"</label>
							<input
								type="text"
								prop:value=new_name
								on:input=move |ev| new_name.set(event_target_value(&ev))
							/>
							<button on:click=create>"Create"</button>
							<button on:click=move |_| show_popup.set(false)>"Cancel"</button>
						</div>
					}
				})
			}}

			<main class="editor-main">
				{move || {
					selected
						.get()
						.map(|name| view! { <DialogueCanvas name=name /> })
				}}
			</main>
		</div>
	}
}
