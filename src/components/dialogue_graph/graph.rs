use std::collections::HashMap;

use uuid::Uuid;

use super::node::DialogueNode;

/// The complete set of dialogue nodes for one asset, plus a derived id
/// lookup over them.
///
/// The node vector is the source of truth; the lookup is a cache rebuilt
/// after every structural mutation and is never persisted. The graph is
/// seeded with a single root node (index 0) on creation, so `root()` is
/// always valid on a graph that has only been mutated through this API.
#[derive(Clone, Debug)]
pub struct DialogueGraph {
	nodes: Vec<DialogueNode>,
	lookup: HashMap<String, usize>,
}

impl DialogueGraph {
	/// New graph seeded with a root node.
	pub fn new() -> Self {
		Self::from_nodes(Vec::new())
	}

	/// Wrap a loaded node vector, seeding a root if it is empty.
	pub fn from_nodes(mut nodes: Vec<DialogueNode>) -> Self {
		if nodes.is_empty() {
			nodes.push(DialogueNode::new(fresh_id()));
		}
		let mut graph = Self {
			nodes,
			lookup: HashMap::new(),
		};
		graph.rebuild_lookup();
		graph
	}

	/// Clear and repopulate the id lookup from the node vector. Later
	/// entries win on a duplicate id; the generator is relied on to make
	/// that unreachable.
	pub fn rebuild_lookup(&mut self) {
		self.lookup.clear();
		for (i, node) in self.nodes.iter().enumerate() {
			self.lookup.insert(node.id.clone(), i);
		}
	}

	pub fn nodes(&self) -> &[DialogueNode] {
		&self.nodes
	}

	/// The root node at index 0.
	///
	/// Panics on an empty node vector; seeding guarantees that never
	/// happens through this API, so an empty graph here is a bug.
	pub fn root(&self) -> &DialogueNode {
		&self.nodes[0]
	}

	pub fn get(&self, id: &str) -> Option<&DialogueNode> {
		self.lookup.get(id).map(|&i| &self.nodes[i])
	}

	pub fn get_mut(&mut self, id: &str) -> Option<&mut DialogueNode> {
		self.lookup.get(id).map(|&i| &mut self.nodes[i])
	}

	/// Existing children of `id` in `child_ids` order. Ids with no matching
	/// node are skipped, not errored.
	pub fn children<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a DialogueNode> + 'a {
		self.get(id)
			.into_iter()
			.flat_map(|parent| parent.child_ids.iter())
			.filter_map(move |child_id| self.get(child_id))
	}

	/// Append a new node as a child of `parent_id`, positioned at an offset
	/// from the parent so it does not overlap it. Returns the new node's id,
	/// or `None` if the parent is unknown.
	pub fn create_node(&mut self, parent_id: &str) -> Option<String> {
		let parent_position = self.get(parent_id)?.position;
		let mut node = DialogueNode::new(fresh_id());
		node.offset_from(parent_position);
		let id = node.id.clone();
		self.nodes.push(node);
		if let Some(parent) = self.get_mut(parent_id) {
			parent.child_ids.push(id.clone());
		}
		self.rebuild_lookup();
		Some(id)
	}

	/// Remove the node with `id` and strip the id from every remaining
	/// node's child list. A no-op when the node is already gone, so the
	/// operation is idempotent. Orphaned children are left in place.
	pub fn delete_node(&mut self, id: &str) {
		let Some(index) = self.nodes.iter().position(|n| n.id == id) else {
			return;
		};
		self.nodes.remove(index);
		self.rebuild_lookup();
		for node in &mut self.nodes {
			node.child_ids.retain(|child_id| child_id != id);
		}
	}

	/// Append `child_id` to the parent's child list if not already present.
	pub fn add_link(&mut self, parent_id: &str, child_id: &str) {
		if let Some(parent) = self.get_mut(parent_id) {
			if !parent.child_ids.iter().any(|c| c == child_id) {
				parent.child_ids.push(child_id.to_string());
			}
		}
	}

	pub fn remove_link(&mut self, parent_id: &str, child_id: &str) {
		if let Some(parent) = self.get_mut(parent_id) {
			parent.child_ids.retain(|c| c != child_id);
		}
	}

	/// Replace the node vector wholesale (undo/redo restore path).
	pub fn restore(&mut self, nodes: Vec<DialogueNode>) {
		self.nodes = nodes;
		self.rebuild_lookup();
	}

	pub fn to_json(&self) -> Option<String> {
		serde_json::to_string(&self.nodes).ok()
	}

	pub fn from_json(json: &str) -> Option<Self> {
		serde_json::from_str::<Vec<DialogueNode>>(json)
			.ok()
			.map(Self::from_nodes)
	}
}

impl Default for DialogueGraph {
	fn default() -> Self {
		Self::new()
	}
}

fn fresh_id() -> String {
	Uuid::new_v4().to_string()
}
