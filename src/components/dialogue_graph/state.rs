use super::graph::DialogueGraph;
use super::history::History;
use super::node::{DialogueNode, Vec2, rect_contains};

/// Pointer travel beyond which a press stops counting as a click.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeButton {
	Create,
	Link,
	Delete,
}

#[derive(Clone, Debug)]
pub struct DragState {
	pub node_id: String,
	/// node position - pointer position at press, so moves preserve the
	/// grab point.
	pub anchor: Vec2,
	recorded: bool,
}

#[derive(Clone, Debug)]
struct PressState {
	start: Vec2,
	moved: bool,
	text_target: Option<String>,
}

/// Per-session editor state: the open graph plus all transient interaction
/// state (drag, pan, pending link, pending create/delete, text editing).
///
/// Pointer positions are in canvas-element space; node positions live in
/// scrolled world space, related by `world = pointer + scroll`.
pub struct EditorState {
	pub graph: DialogueGraph,
	pub name: String,
	pub scroll: Vec2,
	pub drag: Option<DragState>,
	pub pan: Option<Vec2>,
	pub link_source: Option<String>,
	pub editing: Option<String>,
	pub history: History,
	pub width: f64,
	pub height: f64,
	dirty: bool,
	pending_create: Option<String>,
	pending_delete: Option<String>,
	press: Option<PressState>,
	edit_recorded: bool,
}

impl EditorState {
	pub fn new(name: String, graph: DialogueGraph, width: f64, height: f64) -> Self {
		Self {
			graph,
			name,
			scroll: Vec2::default(),
			drag: None,
			pan: None,
			link_source: None,
			editing: None,
			history: History::new(),
			width,
			height,
			dirty: false,
			pending_create: None,
			pending_delete: None,
			press: None,
			edit_recorded: false,
		}
	}

	/// Topmost node under a world-space point. Single linear scan, last
	/// match wins, matching draw order.
	pub fn node_at(&self, world: Vec2) -> Option<&DialogueNode> {
		let mut hit = None;
		for node in self.graph.nodes() {
			if node.contains(world) {
				hit = Some(node);
			}
		}
		hit
	}

	fn button_at(&self, world: Vec2) -> Option<(String, NodeButton)> {
		let mut hit = None;
		for node in self.graph.nodes() {
			for (i, (origin, size)) in node.button_rects().into_iter().enumerate() {
				if rect_contains(origin, size, world) {
					let button = match i {
						0 => NodeButton::Create,
						1 => NodeButton::Link,
						_ => NodeButton::Delete,
					};
					hit = Some((node.id.clone(), button));
				}
			}
		}
		hit
	}

	pub fn on_pointer_down(&mut self, p: Vec2) {
		self.editing = None;
		self.edit_recorded = false;
		let world = p + self.scroll;

		// Action buttons take the press outright; no drag or pan arming.
		if let Some((id, button)) = self.button_at(world) {
			self.dispatch(id, button);
			return;
		}

		let mut text_target = None;
		if let Some(node) = self.node_at(world) {
			let id = node.id.clone();
			let anchor = node.position - p;
			let (origin, size) = node.text_rect();
			if rect_contains(origin, size, world) {
				text_target = Some(id.clone());
			}
			self.drag = Some(DragState {
				node_id: id,
				anchor,
				recorded: false,
			});
		}
		// Pan is always armed on press; it only takes effect while no node
		// drag is active.
		self.pan = Some(p + self.scroll);
		self.press = Some(PressState {
			start: p,
			moved: false,
			text_target,
		});
	}

	pub fn on_pointer_move(&mut self, p: Vec2) {
		if let Some(press) = &mut self.press {
			let d = p - press.start;
			if d.x.abs() > CLICK_SLOP || d.y.abs() > CLICK_SLOP {
				press.moved = true;
			}
		}

		if let Some(drag) = &mut self.drag {
			if !drag.recorded {
				self.history.record(&self.graph);
				drag.recorded = true;
			}
			if let Some(node) = self.graph.get_mut(&drag.node_id) {
				node.position = p + drag.anchor;
				self.dirty = true;
			}
		} else if let Some(anchor) = self.pan {
			self.scroll = -(p - anchor);
		}
	}

	pub fn on_pointer_up(&mut self) {
		if let Some(press) = self.press.take() {
			// A clean click on a node's text region opens the text editor.
			if !press.moved {
				if let Some(id) = press.text_target {
					self.editing = Some(id);
					self.edit_recorded = false;
				}
			}
		}
		self.drag = None;
		self.pan = None;
	}

	/// Pointer left the canvas mid-gesture: abandon drag, pan, and click
	/// tracking without opening the text editor.
	pub fn on_pointer_cancel(&mut self) {
		self.drag = None;
		self.pan = None;
		self.press = None;
	}

	fn dispatch(&mut self, node_id: String, button: NodeButton) {
		match button {
			NodeButton::Create => self.pending_create = Some(node_id),
			NodeButton::Delete => self.pending_delete = Some(node_id),
			NodeButton::Link => match self.link_source.take() {
				None => self.link_source = Some(node_id),
				// Cancel on the source node itself.
				Some(source) if source == node_id => {}
				Some(source) => {
					// The source may have been deleted while the link was
					// armed; nothing to record or mutate then.
					let Some(source_node) = self.graph.get(&source) else {
						return;
					};
					let linked = source_node.child_ids.iter().any(|c| *c == node_id);
					self.history.record(&self.graph);
					if linked {
						self.graph.remove_link(&source, &node_id);
					} else {
						self.graph.add_link(&source, &node_id);
					}
					self.dirty = true;
				}
			},
		}
	}

	/// Label for a node's link affordance under the current link state.
	pub fn link_label(&self, node_id: &str) -> &'static str {
		match &self.link_source {
			None => "Link",
			Some(source) if source == node_id => "Cancel",
			Some(source) => {
				let linked = self
					.graph
					.get(source)
					.is_some_and(|n| n.child_ids.iter().any(|c| c == node_id));
				if linked { "Remove Link" } else { "Add Link" }
			}
		}
	}

	pub fn is_link_source(&self, node_id: &str) -> bool {
		self.link_source.as_deref() == Some(node_id)
	}

	pub fn is_editing(&self, node_id: &str) -> bool {
		self.editing.as_deref() == Some(node_id)
	}

	/// Drain the deferred create/delete slots, recording undo state before
	/// each mutation. Called once per redraw cycle, never during the draw
	/// pass. Returns whether the graph changed.
	pub fn apply_pending(&mut self) -> bool {
		let mut changed = false;

		if let Some(parent_id) = self.pending_create.take() {
			if self.graph.get(&parent_id).is_some() {
				self.history.record(&self.graph);
				self.graph.create_node(&parent_id);
				changed = true;
			}
		}

		if let Some(id) = self.pending_delete.take() {
			if self.graph.get(&id).is_some() {
				self.history.record(&self.graph);
				self.graph.delete_node(&id);
				if self.link_source.as_deref() == Some(id.as_str()) {
					self.link_source = None;
				}
				if self.editing.as_deref() == Some(id.as_str()) {
					self.editing = None;
				}
				changed = true;
			}
		}

		if changed {
			self.dirty = true;
		}
		changed
	}

	/// Write-through text edit; the first edit of a session records one
	/// undo snapshot.
	pub fn set_text(&mut self, id: &str, text: String) {
		if self.graph.get(id).is_none() {
			return;
		}
		if !self.edit_recorded {
			self.history.record(&self.graph);
			self.edit_recorded = true;
		}
		if let Some(node) = self.graph.get_mut(id) {
			node.text = text;
			self.dirty = true;
		}
	}

	pub fn undo(&mut self) {
		self.clear_transient();
		if self.history.undo(&mut self.graph) {
			self.dirty = true;
		}
	}

	pub fn redo(&mut self) {
		self.clear_transient();
		if self.history.redo(&mut self.graph) {
			self.dirty = true;
		}
	}

	fn clear_transient(&mut self) {
		self.drag = None;
		self.pan = None;
		self.press = None;
		self.link_source = None;
		self.editing = None;
	}

	/// True once per change burst; the caller persists when it sees true.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn editor() -> EditorState {
		EditorState::new("test".to_string(), DialogueGraph::new(), 800.0, 600.0)
	}

	fn button_center(node: &DialogueNode, i: usize) -> Vec2 {
		let (origin, size) = node.button_rects()[i];
		Vec2::new(origin.x + size.x / 2.0, origin.y + size.y / 2.0)
	}

	#[test]
	fn drag_preserves_the_grab_point() {
		// Root sits at (10,10); press at (50,50), move to (100,80).
		let mut state = editor();
		state.on_pointer_down(Vec2::new(50.0, 50.0));
		let drag = state.drag.as_ref().unwrap();
		assert_eq!(drag.anchor, Vec2::new(-40.0, -40.0));

		state.on_pointer_move(Vec2::new(100.0, 80.0));
		assert_eq!(state.graph.root().position, Vec2::new(60.0, 40.0));

		state.on_pointer_up();
		assert!(state.drag.is_none());
	}

	#[test]
	fn drag_records_one_undo_snapshot_per_gesture() {
		let mut state = editor();
		state.on_pointer_down(Vec2::new(50.0, 50.0));
		state.on_pointer_move(Vec2::new(60.0, 60.0));
		state.on_pointer_move(Vec2::new(70.0, 70.0));
		state.on_pointer_up();

		state.undo();
		assert_eq!(state.graph.root().position, Vec2::new(10.0, 10.0));
		// Nothing further to unwind.
		state.undo();
		assert_eq!(state.graph.root().position, Vec2::new(10.0, 10.0));
	}

	#[test]
	fn empty_press_pans_the_canvas() {
		let mut state = editor();
		state.on_pointer_down(Vec2::new(500.0, 500.0));
		assert!(state.drag.is_none());

		state.on_pointer_move(Vec2::new(510.0, 520.0));
		assert_eq!(state.scroll, Vec2::new(-10.0, -20.0));
	}

	#[test]
	fn hit_testing_accounts_for_scroll() {
		let mut state = editor();
		state.scroll = Vec2::new(-100.0, 0.0);
		// Root at world (10,10) appears at canvas x 110.
		assert!(state.node_at(Vec2::new(50.0, 20.0) + state.scroll).is_none());
		state.on_pointer_down(Vec2::new(120.0, 20.0));
		assert!(state.drag.is_some());
	}

	#[test]
	fn last_drawn_node_wins_the_hit_test() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		let a = state.graph.create_node(&root).unwrap();
		// Stack the child exactly on top of the root.
		state.graph.get_mut(&a).unwrap().position = Vec2::new(10.0, 10.0);

		let hit = state.node_at(Vec2::new(50.0, 30.0)).unwrap();
		assert_eq!(hit.id, a);
	}

	#[test]
	fn click_on_text_region_opens_the_editor() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		state.on_pointer_down(Vec2::new(50.0, 30.0));
		state.on_pointer_up();
		assert_eq!(state.editing.as_deref(), Some(root.as_str()));

		// A drag is not a click.
		state.on_pointer_down(Vec2::new(50.0, 30.0));
		state.on_pointer_move(Vec2::new(90.0, 30.0));
		state.on_pointer_up();
		assert!(state.editing.is_none());
	}

	#[test]
	fn create_button_queues_and_drains_once() {
		let mut state = editor();
		let press = button_center(state.graph.root(), 0);
		state.on_pointer_down(press);
		assert!(state.drag.is_none());
		assert!(state.pan.is_none());
		assert_eq!(state.graph.nodes().len(), 1);

		assert!(state.apply_pending());
		assert_eq!(state.graph.nodes().len(), 2);
		assert!(!state.apply_pending());
		assert_eq!(state.graph.nodes().len(), 2);
	}

	#[test]
	fn delete_button_queues_deletion() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		let a = state.graph.create_node(&root).unwrap();
		let press = button_center(state.graph.get(&a).unwrap(), 2);

		state.on_pointer_down(press);
		state.apply_pending();
		assert!(state.graph.get(&a).is_none());
		assert!(!state.graph.root().child_ids.contains(&a));
	}

	#[test]
	fn link_toggle_round_trip() {
		// Scenario C through the dispatch path.
		let mut state = editor();
		let root = state.graph.root().id.clone();
		let a = state.graph.create_node(&root).unwrap();
		let b = state.graph.create_node(&root).unwrap();

		state.dispatch(a.clone(), NodeButton::Link);
		assert_eq!(state.link_label(&a), "Cancel");
		assert_eq!(state.link_label(&b), "Add Link");

		state.dispatch(b.clone(), NodeButton::Link);
		assert!(state.graph.get(&a).unwrap().child_ids.contains(&b));
		assert!(state.link_source.is_none());

		state.dispatch(a.clone(), NodeButton::Link);
		assert_eq!(state.link_label(&b), "Remove Link");
		state.dispatch(b.clone(), NodeButton::Link);
		assert!(!state.graph.get(&a).unwrap().child_ids.contains(&b));
	}

	#[test]
	fn cancel_clears_the_pending_link() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		state.dispatch(root.clone(), NodeButton::Link);
		assert!(state.is_link_source(&root));
		state.dispatch(root.clone(), NodeButton::Link);
		assert!(state.link_source.is_none());
		assert_eq!(state.graph.root().child_ids.len(), 0);
	}

	#[test]
	fn deleting_the_link_source_disarms_it() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		let a = state.graph.create_node(&root).unwrap();
		state.dispatch(a.clone(), NodeButton::Link);
		state.dispatch(a.clone(), NodeButton::Delete);
		state.apply_pending();
		assert!(state.link_source.is_none());
	}

	#[test]
	fn stale_link_source_records_nothing() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		let a = state.graph.create_node(&root).unwrap();
		let b = state.graph.create_node(&root).unwrap();
		state.take_dirty();

		state.dispatch(a.clone(), NodeButton::Link);
		state.graph.delete_node(&a);
		state.dispatch(b.clone(), NodeButton::Link);

		// No mutation happened, so no dirty flag and no undo snapshot.
		assert!(state.link_source.is_none());
		assert!(!state.take_dirty());
		let before: Vec<_> = state.graph.nodes().iter().map(|n| n.id.clone()).collect();
		state.undo();
		let after: Vec<_> = state.graph.nodes().iter().map(|n| n.id.clone()).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn text_edit_writes_through_with_undo() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		state.set_text(&root, "hel".to_string());
		state.set_text(&root, "hello".to_string());
		assert_eq!(state.graph.root().text, "hello");

		// One snapshot for the whole edit session.
		state.undo();
		assert_eq!(state.graph.root().text, "");
	}

	#[test]
	fn undo_then_redo_restores_a_created_node() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		state.dispatch(root, NodeButton::Create);
		state.apply_pending();
		assert_eq!(state.graph.nodes().len(), 2);

		state.undo();
		assert_eq!(state.graph.nodes().len(), 1);
		state.redo();
		assert_eq!(state.graph.nodes().len(), 2);
	}

	#[test]
	fn mutations_mark_the_state_dirty_once() {
		let mut state = editor();
		let root = state.graph.root().id.clone();
		assert!(!state.take_dirty());
		state.dispatch(root, NodeButton::Create);
		state.apply_pending();
		assert!(state.take_dirty());
		assert!(!state.take_dirty());
	}
}
