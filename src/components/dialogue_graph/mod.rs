mod component;
mod graph;
mod history;
mod node;
mod render;
mod state;
mod storage;

pub use component::DialogueCanvas;
pub use storage::{asset_exists, create_asset, list_assets};
