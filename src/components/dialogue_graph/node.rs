use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Default node box dimensions.
pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 75.0;

/// Offset applied to a freshly created child relative to its parent, chosen
/// so a new node never lands on top of the node that spawned it.
pub const CHILD_OFFSET: Vec2 = Vec2 { x: 250.0, y: 50.0 };

/// Height of the button row along the bottom edge of a node box.
pub const BUTTON_ROW_HEIGHT: f64 = 24.0;
const BUTTON_MARGIN: f64 = 4.0;

/// 2D point/offset in canvas units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

impl Add for Vec2 {
	type Output = Vec2;

	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Vec2 {
	type Output = Vec2;

	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Neg for Vec2 {
	type Output = Vec2;

	fn neg(self) -> Vec2 {
		Vec2::new(-self.x, -self.y)
	}
}

/// One dialogue line in the graph. Links are directed and stored solely on
/// the parent as an ordered list of child ids; an id with no matching node
/// is tolerated and filtered out at read time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DialogueNode {
	pub id: String,
	pub text: String,
	pub child_ids: Vec<String>,
	pub position: Vec2,
	pub size: Vec2,
}

impl DialogueNode {
	pub fn new(id: String) -> Self {
		Self {
			id,
			text: String::new(),
			child_ids: Vec::new(),
			position: Vec2::new(10.0, 10.0),
			size: Vec2::new(NODE_WIDTH, NODE_HEIGHT),
		}
	}

	/// Shift this node into place next to its parent.
	pub fn offset_from(&mut self, parent_position: Vec2) {
		self.position = self.position + parent_position + CHILD_OFFSET;
	}

	pub fn contains(&self, p: Vec2) -> bool {
		p.x >= self.position.x
			&& p.x <= self.position.x + self.size.x
			&& p.y >= self.position.y
			&& p.y <= self.position.y + self.size.y
	}

	/// Bezier connector endpoints: connectors leave the right edge of the
	/// parent and enter the left edge of the child, vertically centered.
	pub fn right_center(&self) -> Vec2 {
		Vec2::new(self.position.x + self.size.x, self.position.y + self.size.y / 2.0)
	}

	pub fn left_center(&self) -> Vec2 {
		Vec2::new(self.position.x, self.position.y + self.size.y / 2.0)
	}

	/// Area above the button row holding the editable text.
	pub fn text_rect(&self) -> (Vec2, Vec2) {
		(
			self.position,
			Vec2::new(self.size.x, self.size.y - BUTTON_ROW_HEIGHT),
		)
	}

	/// The three action affordances (create / link / delete), laid out as an
	/// even row along the bottom edge. Returned as (origin, size) pairs in
	/// the same world space as `position`.
	pub fn button_rects(&self) -> [(Vec2, Vec2); 3] {
		let width = (self.size.x - BUTTON_MARGIN * 4.0) / 3.0;
		let y = self.position.y + self.size.y - BUTTON_ROW_HEIGHT;
		let size = Vec2::new(width, BUTTON_ROW_HEIGHT - BUTTON_MARGIN);
		let rect = |i: f64| {
			(
				Vec2::new(
					self.position.x + BUTTON_MARGIN + i * (width + BUTTON_MARGIN),
					y,
				),
				size,
			)
		};
		[rect(0.0), rect(1.0), rect(2.0)]
	}
}

pub fn rect_contains(origin: Vec2, size: Vec2, p: Vec2) -> bool {
	p.x >= origin.x && p.x <= origin.x + size.x && p.y >= origin.y && p.y <= origin.y + size.y
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn child_offset_is_relative_to_parent() {
		let mut node = DialogueNode::new("a".into());
		node.offset_from(Vec2::new(100.0, 20.0));
		assert_eq!(node.position, Vec2::new(360.0, 80.0));
	}

	#[test]
	fn contains_checks_box_bounds() {
		let node = DialogueNode::new("a".into());
		assert!(node.contains(Vec2::new(10.0, 10.0)));
		assert!(node.contains(Vec2::new(210.0, 85.0)));
		assert!(!node.contains(Vec2::new(9.0, 10.0)));
		assert!(!node.contains(Vec2::new(211.0, 10.0)));
	}

	#[test]
	fn button_rects_sit_inside_the_box() {
		let node = DialogueNode::new("a".into());
		for (origin, size) in node.button_rects() {
			assert!(node.contains(origin));
			assert!(node.contains(origin + size));
		}
	}
}
