use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use tracing::error;

use crate::camera::{EventOutcome, OrbitCamera, PointerButton, PointerEvent};

use super::config::matches_binding;
use super::state::EditorState;
use super::ui::Layout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Continue,
    Resize(u16, u16),
    Quit,
}

pub fn handle_event(
    state: &mut EditorState,
    camera: &mut OrbitCamera,
    layout: &Layout,
    event: Event,
) -> Action {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, camera, layout, key),
        Event::Mouse(mouse) => {
            handle_mouse(state, camera, layout, mouse);
            Action::Continue
        }
        Event::Resize(w, h) => Action::Resize(w, h),
        _ => Action::Continue,
    }
}

fn handle_key(state: &mut EditorState, camera: &mut OrbitCamera, layout: &Layout, key: KeyEvent) -> Action {
    let bindings = &state.config.key_bindings;

    if matches_binding(&bindings.quit, &key) {
        return Action::Quit;
    }
    if matches_binding(&bindings.toggle_auto_rotate, &key) {
        camera.toggle_auto_rotate();
        return Action::Continue;
    }
    if matches_binding(&bindings.save, &key) {
        if let Err(e) = state.save() {
            error!(error = %e, "save failed");
            state.set_status(format!("Save failed: {e}"));
        }
        return Action::Continue;
    }

    let page = layout.editor_rows().saturating_sub(1).max(1);
    let buffer = &mut state.buffer;
    let edited = match key.code {
        KeyCode::Up => {
            buffer.move_up();
            false
        }
        KeyCode::Down => {
            buffer.move_down();
            false
        }
        KeyCode::Left => {
            buffer.move_left();
            false
        }
        KeyCode::Right => {
            buffer.move_right();
            false
        }
        KeyCode::Home => {
            buffer.home();
            false
        }
        KeyCode::End => {
            buffer.end();
            false
        }
        KeyCode::PageUp => {
            buffer.page_up(page);
            false
        }
        KeyCode::PageDown => {
            buffer.page_down(page);
            false
        }
        KeyCode::Enter => {
            buffer.newline();
            true
        }
        KeyCode::Backspace => {
            buffer.backspace();
            true
        }
        KeyCode::Delete => {
            buffer.delete();
            true
        }
        KeyCode::Char(c) if !c.is_control() => {
            buffer.insert_char(c);
            true
        }
        _ => false,
    };
    buffer.scroll_into_view(layout.editor_rows());
    if edited {
        state.dirty = true;
    }
    Action::Continue
}

/// Translate a terminal mouse report into a camera pointer event.
pub fn to_pointer(mouse: &MouseEvent) -> Option<PointerEvent> {
    let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
    let button = |b: MouseButton| match b {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => None,
    };
    match mouse.kind {
        MouseEventKind::Down(b) => button(b).map(|button| PointerEvent::Press { button, x, y }),
        MouseEventKind::Up(b) => button(b).map(|button| PointerEvent::Release { button, x, y }),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => Some(PointerEvent::Motion { x, y }),
        MouseEventKind::ScrollUp => Some(PointerEvent::WheelUp { x, y }),
        MouseEventKind::ScrollDown => Some(PointerEvent::WheelDown { x, y }),
        MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight => None,
    }
}

fn handle_mouse(state: &mut EditorState, camera: &mut OrbitCamera, layout: &Layout, mouse: MouseEvent) {
    let outcome = match to_pointer(&mouse) {
        Some(pointer) => camera.handle(pointer),
        None => EventOutcome::Unhandled,
    };
    if outcome == EventOutcome::Handled {
        return;
    }
    if mouse.kind == MouseEventKind::Down(MouseButton::Left) && mouse.column >= layout.editor_x {
        let x = usize::from(mouse.column - layout.editor_x);
        state.buffer.click(x, usize::from(mouse.row));
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::camera::CameraState;
    use crate::editor::config::EditorConfig;

    fn setup(text: &str) -> (EditorState, OrbitCamera, Layout) {
        let path = std::env::temp_dir().join(format!(
            "ascii-modeler-input-{}-does-not-exist.json",
            std::process::id()
        ));
        let mut state = EditorState::open(&path, EditorConfig::default()).unwrap();
        state.buffer.replace(text);
        let layout = Layout::compute(100, 20, 0.7);
        let camera = OrbitCamera::new(CameraState::default(), 2.0, i32::from(layout.render_width));
        (state, camera, layout)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn tab_toggles_auto_rotate() {
        let (mut state, mut camera, layout) = setup("");
        handle_event(&mut state, &mut camera, &layout, key(KeyCode::Tab, KeyModifiers::NONE));
        assert!(!camera.state().auto_rotate);
    }

    #[test]
    fn typing_edits_buffer_and_marks_dirty() {
        let (mut state, mut camera, layout) = setup("");
        state.dirty = false;
        handle_event(&mut state, &mut camera, &layout, key(KeyCode::Char('{'), KeyModifiers::NONE));
        assert_eq!(state.buffer.text(), "{");
        assert!(state.dirty);
    }

    #[test]
    fn quit_binding() {
        let (mut state, mut camera, layout) = setup("");
        let action = handle_event(&mut state, &mut camera, &layout, key(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn wheel_in_render_pane_zooms() {
        let (mut state, mut camera, layout) = setup("");
        handle_event(&mut state, &mut camera, &layout, mouse(MouseEventKind::ScrollDown, 5, 5));
        assert!((camera.state().distance - 4.7).abs() < 1e-6);
    }

    #[test]
    fn click_in_editor_pane_moves_cursor() {
        let (mut state, mut camera, layout) = setup("abc\ndefg");
        let column = layout.editor_x + 2;
        handle_event(&mut state, &mut camera, &layout, mouse(MouseEventKind::Down(MouseButton::Left), column, 1));
        assert_eq!(state.buffer.cursor(), (2, 1));
        assert_eq!(camera.drag(), crate::camera::DragState::Idle);
    }

    #[test]
    fn resize_is_reported() {
        let (mut state, mut camera, layout) = setup("");
        assert_eq!(
            handle_event(&mut state, &mut camera, &layout, Event::Resize(90, 30)),
            Action::Resize(90, 30)
        );
    }
}
