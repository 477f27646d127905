use super::graph::DialogueGraph;
use super::node::DialogueNode;

const MAX_DEPTH: usize = 100;

/// Snapshot-based undo/redo over the graph's node vector.
///
/// Callers record immediately before each mutation; undo swaps the live
/// node vector with the most recent snapshot and pushes the current state
/// onto the redo stack. A new recording invalidates the redo stack.
#[derive(Debug, Default)]
pub struct History {
	undo: Vec<Vec<DialogueNode>>,
	redo: Vec<Vec<DialogueNode>>,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	/// Capture the graph as it is now, before a mutation lands.
	pub fn record(&mut self, graph: &DialogueGraph) {
		self.redo.clear();
		self.undo.push(graph.nodes().to_vec());
		if self.undo.len() > MAX_DEPTH {
			self.undo.remove(0);
		}
	}

	/// Restore the most recent snapshot. Returns false when there is
	/// nothing to undo.
	pub fn undo(&mut self, graph: &mut DialogueGraph) -> bool {
		let Some(snapshot) = self.undo.pop() else {
			return false;
		};
		self.redo.push(graph.nodes().to_vec());
		graph.restore(snapshot);
		true
	}

	pub fn redo(&mut self, graph: &mut DialogueGraph) -> bool {
		let Some(snapshot) = self.redo.pop() else {
			return false;
		};
		self.undo.push(graph.nodes().to_vec());
		graph.restore(snapshot);
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn undo_restores_the_pre_mutation_state() {
		let mut graph = DialogueGraph::new();
		let mut history = History::new();
		let root = graph.root().id.clone();

		history.record(&graph);
		graph.create_node(&root);
		assert_eq!(graph.nodes().len(), 2);

		assert!(history.undo(&mut graph));
		assert_eq!(graph.nodes().len(), 1);
		assert!(graph.root().child_ids.is_empty());
	}

	#[test]
	fn redo_reapplies_an_undone_mutation() {
		let mut graph = DialogueGraph::new();
		let mut history = History::new();
		let root = graph.root().id.clone();

		history.record(&graph);
		let child = graph.create_node(&root).unwrap();

		history.undo(&mut graph);
		assert!(history.redo(&mut graph));
		assert_eq!(graph.nodes().len(), 2);
		assert!(graph.get(&child).is_some());
	}

	#[test]
	fn recording_clears_the_redo_stack() {
		let mut graph = DialogueGraph::new();
		let mut history = History::new();
		let root = graph.root().id.clone();

		history.record(&graph);
		graph.create_node(&root);
		history.undo(&mut graph);

		history.record(&graph);
		graph.create_node(&root);
		assert!(!history.redo(&mut graph));
	}

	#[test]
	fn undo_on_empty_stack_is_a_noop() {
		let mut graph = DialogueGraph::new();
		let mut history = History::new();
		assert!(!history.undo(&mut graph));
		assert_eq!(graph.nodes().len(), 1);
	}
}
