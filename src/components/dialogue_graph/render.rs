use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::node::{DialogueNode, Vec2};
use super::state::EditorState;

const GRID_STEP: f64 = 50.0;
/// Horizontal gap between a node edge and its connector endpoint.
const LINK_OFFSET: f64 = 10.0;
/// How far the bezier control points extend past each endpoint.
const CONTROL_OFFSET: f64 = 20.0;

/// Draw one frame: background, then all connectors, then all node boxes.
/// Connectors go first so links never occlude node content. Pure read of
/// the editor state; all mutation happens before this runs.
pub fn render(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_grid(state, ctx);

	for node in state.graph.nodes() {
		draw_connectors(state, node, ctx);
	}
	for node in state.graph.nodes() {
		draw_node(state, node, ctx);
	}
}

fn draw_grid(state: &EditorState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.06)");
	ctx.set_line_width(1.0);

	let mut x = -state.scroll.x.rem_euclid(GRID_STEP);
	while x < state.width {
		ctx.begin_path();
		ctx.move_to(x, 0.0);
		ctx.line_to(x, state.height);
		ctx.stroke();
		x += GRID_STEP;
	}
	let mut y = -state.scroll.y.rem_euclid(GRID_STEP);
	while y < state.height {
		ctx.begin_path();
		ctx.move_to(0.0, y);
		ctx.line_to(state.width, y);
		ctx.stroke();
		y += GRID_STEP;
	}
}

fn draw_connectors(state: &EditorState, parent: &DialogueNode, ctx: &CanvasRenderingContext2d) {
	let start = parent.right_center() - state.scroll + Vec2::new(LINK_OFFSET, 0.0);

	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.85)");
	ctx.set_line_width(3.0);

	// Children with no matching node are filtered out by the graph, so
	// dangling ids simply draw nothing.
	for child in state.graph.children(&parent.id) {
		let end = child.left_center() - state.scroll - Vec2::new(LINK_OFFSET, 0.0);
		ctx.begin_path();
		ctx.move_to(start.x, start.y);
		ctx.bezier_curve_to(
			start.x + CONTROL_OFFSET,
			start.y,
			end.x - CONTROL_OFFSET,
			end.y,
			end.x,
			end.y,
		);
		ctx.stroke();
	}
}

fn draw_node(state: &EditorState, node: &DialogueNode, ctx: &CanvasRenderingContext2d) {
	let origin = node.position - state.scroll;

	// Cull boxes entirely outside the viewport.
	if origin.x + node.size.x < 0.0
		|| origin.y + node.size.y < 0.0
		|| origin.x > state.width
		|| origin.y > state.height
	{
		return;
	}

	ctx.set_fill_style_str("#2b2b40");
	ctx.fill_rect(origin.x, origin.y, node.size.x, node.size.y);

	if state.is_link_source(&node.id) {
		// Dashed border while this node is waiting for a link target.
		ctx.set_stroke_style_str("#64b4ff");
		ctx.set_line_width(2.0);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(6.0),
			&JsValue::from_f64(4.0),
		));
		ctx.stroke_rect(origin.x, origin.y, node.size.x, node.size.y);
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	} else if state.is_editing(&node.id) {
		ctx.set_stroke_style_str("#ffd866");
		ctx.set_line_width(2.0);
		ctx.stroke_rect(origin.x, origin.y, node.size.x, node.size.y);
	} else {
		ctx.set_stroke_style_str("#555570");
		ctx.set_line_width(1.5);
		ctx.stroke_rect(origin.x, origin.y, node.size.x, node.size.y);
	}

	ctx.set_fill_style_str("#e8e8f0");
	ctx.set_font("13px sans-serif");
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	let _ = ctx.fill_text(&clipped_text(&node.text), origin.x + 8.0, origin.y + 8.0);

	draw_buttons(state, node, ctx);
}

fn draw_buttons(state: &EditorState, node: &DialogueNode, ctx: &CanvasRenderingContext2d) {
	let labels = ["Create", state.link_label(&node.id), "Delete"];

	ctx.set_font("11px sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for ((rect_origin, rect_size), label) in node.button_rects().into_iter().zip(labels) {
		let o = rect_origin - state.scroll;
		ctx.set_fill_style_str("#3b3b55");
		ctx.fill_rect(o.x, o.y, rect_size.x, rect_size.y);
		ctx.set_stroke_style_str("#666688");
		ctx.set_line_width(1.0);
		ctx.stroke_rect(o.x, o.y, rect_size.x, rect_size.y);
		ctx.set_fill_style_str("#d0d0e0");
		let _ = ctx.fill_text(label, o.x + rect_size.x / 2.0, o.y + rect_size.y / 2.0);
	}
}

/// Single-line preview of the node text; the overlay input shows the full
/// string while editing.
fn clipped_text(text: &str) -> String {
	const MAX_CHARS: usize = 24;
	if text.chars().count() <= MAX_CHARS {
		text.to_string()
	} else {
		let head: String = text.chars().take(MAX_CHARS).collect();
		format!("{}…", head)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clipped_text_truncates_long_lines() {
		assert_eq!(clipped_text("short"), "short");
		let long = "x".repeat(40);
		let clipped = clipped_text(&long);
		assert_eq!(clipped.chars().count(), 25);
		assert!(clipped.ends_with('…'));
	}
}
