pub mod dialogue_graph;
