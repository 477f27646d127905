use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

use super::node::{BUTTON_ROW_HEIGHT, Vec2};
use super::render;
use super::state::EditorState;
use super::storage;

/// Geometry and initial text for the in-place node text editor, captured
/// when editing opens. Editing closes on any canvas press, so the captured
/// position stays valid for the overlay's lifetime.
#[derive(Clone, PartialEq)]
struct EditOverlay {
	id: String,
	x: f64,
	y: f64,
	width: f64,
	height: f64,
	text: String,
}

#[component]
pub fn DialogueCanvas(name: String) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<EditorState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// Thread-local stored values: their handles are Send, so they can cross
	// into `on_cleanup` and reactive children where an Rc cannot.
	let keydown = StoredValue::new_local(None::<Closure<dyn FnMut(KeyboardEvent)>>);
	let state_stored = StoredValue::new_local(state.clone());
	let alive = RwSignal::new(true);
	let overlay = RwSignal::new(None::<EditOverlay>);

	let (state_init, animate_init) = (state.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = (
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0),
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let graph = storage::load_asset(&name).unwrap_or_else(|| storage::create_asset(&name));
		*state_init.borrow_mut() = Some(EditorState::new(name.clone(), graph, w, h));

		// Undo/redo shortcuts; suppressed while the text overlay has focus.
		// Registered once per mount and removed again in on_cleanup.
		if keydown.with_value(|cb| cb.is_none()) {
			let state_key = state_init.clone();
			let cb = Closure::new(move |ev: KeyboardEvent| {
				if overlay.get_untracked().is_some() {
					return;
				}
				if !(ev.ctrl_key() || ev.meta_key()) {
					return;
				}
				if let Some(ref mut s) = *state_key.borrow_mut() {
					match ev.key().as_str() {
						"z" => {
							ev.prevent_default();
							s.undo();
						}
						"Z" => {
							ev.prevent_default();
							s.redo();
						}
						"y" => {
							ev.prevent_default();
							s.redo();
						}
						_ => {}
					}
				}
			});
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
			keydown.set_value(Some(cb));
		}

		// Redraw loop: drain deferred create/delete, autosave, then draw.
		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			// Stops once the component unmounts and `alive` is gone.
			if alive.try_get_untracked() != Some(true) {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.apply_pending();
				if s.take_dirty() {
					storage::save_asset(&s.name, &s.graph);
				}
				sync_overlay(s, overlay);
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	on_cleanup(move || {
		let _ = alive.try_set(false);
		// Detach the window listener before its closure is dropped, or the
		// next keypress after a remount would invoke freed memory.
		if let Some(cb) = keydown.try_update_value(|slot| slot.take()).flatten() {
			if let Some(window) = web_sys::window() {
				let _ = window
					.remove_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
			}
		}
	});

	let pointer = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		Vec2::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let p = pointer(&ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.on_pointer_down(p);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if ev.buttons() == 0 {
			return;
		}
		let p = pointer(&ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.on_pointer_move(p);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.on_pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.on_pointer_cancel();
		}
	};

	view! {
		<div class="dialogue-canvas-wrap" style="position: relative; width: 100%; height: 100%;">
			<canvas
				node_ref=canvas_ref
				class="dialogue-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				style="display: block; cursor: grab;"
			/>
			{move || {
				overlay.get().map(|eb| {
					// Reactive children must be Send; the Rc comes out of the
					// stored handle only once we are running on the UI thread.
					let state_edit = state_stored.get_value();
					let close = {
						let state_close = state_edit.clone();
						move || {
							if let Some(ref mut s) = *state_close.borrow_mut() {
								s.editing = None;
							}
							overlay.set(None);
						}
					};
					let close_enter = close.clone();
					let on_input = {
						let state_input = state_edit.clone();
						let id = eb.id.clone();
						move |ev: web_sys::Event| {
							if let Some(ref mut s) = *state_input.borrow_mut() {
								s.set_text(&id, event_target_value(&ev));
							}
						}
					};
					let style = format!(
						"position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; \
						 box-sizing: border-box; background: #232338; color: #e8e8f0; \
						 border: 1px solid #ffd866; font: 13px sans-serif; padding: 4px 8px;",
						eb.x, eb.y, eb.width, eb.height,
					);
					view! {
						<input
							type="text"
							class="node-text-input"
							value=eb.text
							style=style
							autofocus=true
							on:input=on_input
							on:keydown=move |ev: KeyboardEvent| {
								if ev.key() == "Enter" {
									close_enter();
								}
							}
							on:blur=move |_| close()
						/>
					}
				})
			}}
		</div>
	}
}

/// Push the controller's editing target into the overlay signal when it
/// changes. Text typed into the overlay does not round-trip back through
/// here; only the editing id transitions do.
fn sync_overlay(state: &EditorState, overlay: RwSignal<Option<EditOverlay>>) {
	let current = overlay.get_untracked().map(|o| o.id);
	if current == state.editing {
		return;
	}
	let next = state.editing.as_ref().and_then(|id| {
		state.graph.get(id).map(|node| {
			let origin = node.position - state.scroll;
			EditOverlay {
				id: node.id.clone(),
				x: origin.x,
				y: origin.y,
				width: node.size.x,
				height: node.size.y - BUTTON_ROW_HEIGHT,
				text: node.text.clone(),
			}
		})
	});
	overlay.set(next);
}
