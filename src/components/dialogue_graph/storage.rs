//! Named dialogue assets persisted to browser localStorage as JSON.
//!
//! Only the node vector is stored; the id lookup is rebuilt on load.

use log::{info, warn};
use web_sys::Storage;

use super::graph::DialogueGraph;

const KEY_PREFIX: &str = "dialogue/";

fn local_storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

fn asset_key(name: &str) -> String {
	format!("{}{}", KEY_PREFIX, name)
}

/// Persist the graph under its asset name. Failures are logged, never
/// surfaced; the in-memory graph stays authoritative either way.
pub fn save_asset(name: &str, graph: &DialogueGraph) {
	let Some(store) = local_storage() else {
		return;
	};
	let Some(json) = graph.to_json() else {
		warn!("could not serialize dialogue '{}'", name);
		return;
	};
	if store.set_item(&asset_key(name), &json).is_err() {
		warn!("could not persist dialogue '{}'", name);
	}
}

pub fn load_asset(name: &str) -> Option<DialogueGraph> {
	let store = local_storage()?;
	let json = store.get_item(&asset_key(name)).ok().flatten()?;
	let graph = DialogueGraph::from_json(&json);
	if graph.is_none() {
		warn!("stored dialogue '{}' is not valid JSON", name);
	}
	graph
}

/// Create and immediately persist a fresh graph seeded with a root node.
pub fn create_asset(name: &str) -> DialogueGraph {
	let graph = DialogueGraph::new();
	save_asset(name, &graph);
	info!("created dialogue asset '{}'", name);
	graph
}

pub fn asset_exists(name: &str) -> bool {
	local_storage()
		.and_then(|store| store.get_item(&asset_key(name)).ok().flatten())
		.is_some()
}

/// Names of all stored dialogue assets, sorted.
pub fn list_assets() -> Vec<String> {
	let Some(store) = local_storage() else {
		return Vec::new();
	};
	let len = store.length().unwrap_or(0);
	let mut names = Vec::new();
	for i in 0..len {
		if let Ok(Some(key)) = store.key(i) {
			if let Some(name) = key.strip_prefix(KEY_PREFIX) {
				names.push(name.to_string());
			}
		}
	}
	names.sort();
	names
}
