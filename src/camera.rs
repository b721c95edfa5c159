//! Orbit camera — pointer gestures in, camera parameters out.
//!
//! Primary-button drags rotate, secondary-button drags pan, the wheel
//! zooms. Only one drag can be active at a time. Any manual rotation turns
//! auto-rotate off until it is toggled back on.

use glam::{Mat4, Vec3};

pub const MIN_DISTANCE: f32 = 1.0;
pub const ZOOM_STEP: f32 = 0.3;
const ROTATE_GAIN: f32 = 0.5;
const PAN_GAIN: f32 = 0.01;
/// Degrees added to `current_angle` per frame while auto-rotating.
const AUTO_ROTATE_STEP: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Eye distance from the target, never below `MIN_DISTANCE`.
    pub distance: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    pub auto_rotate: bool,
    /// Scene spin about the vertical axis, in degrees.
    pub current_angle: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState {
            distance: 5.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
            auto_rotate: true,
            current_angle: 0.0,
        }
    }
}

impl CameraState {
    /// World-to-eye transform: pan and back off, then tilt, then turn.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pan_x, self.pan_y, -self.distance))
            * Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Pointer input in render-pane cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press { button: PointerButton, x: i32, y: i32 },
    Release { button: PointerButton, x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    WheelUp { x: i32, y: i32 },
    WheelDown { x: i32, y: i32 },
}

impl PointerEvent {
    pub fn x(&self) -> i32 {
        match *self {
            PointerEvent::Press { x, .. }
            | PointerEvent::Release { x, .. }
            | PointerEvent::Motion { x, .. }
            | PointerEvent::WheelUp { x, .. }
            | PointerEvent::WheelDown { x, .. } => x,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// Outside the render pane; route it elsewhere.
    Unhandled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Rotating { last_x: i32, last_y: i32 },
    Panning { last_x: i32, last_y: i32 },
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    state: CameraState,
    drag: DragState,
    sensitivity: f32,
    /// Columns at or beyond this belong to someone else.
    pane_width: i32,
}

impl OrbitCamera {
    pub fn new(state: CameraState, sensitivity: f32, pane_width: i32) -> Self {
        OrbitCamera {
            state,
            drag: DragState::Idle,
            sensitivity,
            pane_width,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn set_pane_width(&mut self, width: i32) {
        self.pane_width = width;
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.state.auto_rotate = !self.state.auto_rotate;
    }

    /// Advance one frame. The angle only moves while auto-rotating and
    /// stays in [0, 360).
    pub fn tick(&mut self) -> f32 {
        if self.state.auto_rotate {
            self.state.current_angle = (self.state.current_angle + AUTO_ROTATE_STEP).rem_euclid(360.0);
        }
        self.state.current_angle
    }

    pub fn handle(&mut self, event: PointerEvent) -> EventOutcome {
        if event.x() >= self.pane_width {
            return EventOutcome::Unhandled;
        }

        match (self.drag, event) {
            (DragState::Idle, PointerEvent::Press { button, x, y }) => {
                self.drag = match button {
                    PointerButton::Primary => DragState::Rotating { last_x: x, last_y: y },
                    PointerButton::Secondary => DragState::Panning { last_x: x, last_y: y },
                };
            }
            (DragState::Rotating { .. }, PointerEvent::Release { button: PointerButton::Primary, .. })
            | (DragState::Panning { .. }, PointerEvent::Release { button: PointerButton::Secondary, .. }) => {
                self.drag = DragState::Idle;
            }
            (DragState::Rotating { last_x, last_y }, PointerEvent::Motion { x, y }) => {
                let (dx, dy) = ((x - last_x) as f32, (y - last_y) as f32);
                if dx != 0.0 || dy != 0.0 {
                    self.state.auto_rotate = false;
                    self.state.rotation_y += dx * ROTATE_GAIN * self.sensitivity;
                    self.state.rotation_x += dy * ROTATE_GAIN * self.sensitivity;
                }
                self.drag = DragState::Rotating { last_x: x, last_y: y };
            }
            (DragState::Panning { last_x, last_y }, PointerEvent::Motion { x, y }) => {
                let (dx, dy) = ((x - last_x) as f32, (y - last_y) as f32);
                self.state.pan_x += dx * PAN_GAIN * self.sensitivity;
                self.state.pan_y -= dy * PAN_GAIN * self.sensitivity;
                self.drag = DragState::Panning { last_x: x, last_y: y };
            }
            (_, PointerEvent::WheelDown { .. }) => {
                self.state.distance = (self.state.distance - ZOOM_STEP).max(MIN_DISTANCE);
            }
            (_, PointerEvent::WheelUp { .. }) => {
                self.state.distance += ZOOM_STEP;
            }
            // Second press during a drag, stray release, idle motion.
            _ => {}
        }
        EventOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraState::default(), 2.0, 80)
    }

    fn press(button: PointerButton, x: i32, y: i32) -> PointerEvent {
        PointerEvent::Press { button, x, y }
    }

    #[test]
    fn rotate_drag_updates_angles() {
        let mut cam = camera();
        cam.handle(press(PointerButton::Primary, 10, 10));
        cam.handle(PointerEvent::Motion { x: 13, y: 8 });

        assert_eq!(cam.state().rotation_y, 3.0);
        assert_eq!(cam.state().rotation_x, -2.0);
        assert_eq!(cam.drag(), DragState::Rotating { last_x: 13, last_y: 8 });
    }

    #[test]
    fn drag_disables_auto_rotate_and_freezes_angle() {
        let mut cam = camera();
        cam.tick();
        cam.tick();
        assert_eq!(cam.state().current_angle, 2.0);

        cam.handle(press(PointerButton::Primary, 0, 0));
        cam.handle(PointerEvent::Motion { x: 1, y: 0 });
        cam.handle(PointerEvent::Release { button: PointerButton::Primary, x: 1, y: 0 });
        assert!(!cam.state().auto_rotate);
        cam.tick();
        cam.tick();
        assert_eq!(cam.state().current_angle, 2.0);

        cam.toggle_auto_rotate();
        cam.tick();
        assert_eq!(cam.state().current_angle, 3.0);
    }

    #[test]
    fn pan_drag_moves_target() {
        let mut cam = camera();
        cam.handle(press(PointerButton::Secondary, 5, 5));
        cam.handle(PointerEvent::Motion { x: 10, y: 15 });

        assert!((cam.state().pan_x - 0.1).abs() < 1e-6);
        assert!((cam.state().pan_y + 0.2).abs() < 1e-6);
        assert!(cam.state().auto_rotate);
    }

    #[test]
    fn drags_are_mutually_exclusive() {
        let mut cam = camera();
        cam.handle(press(PointerButton::Primary, 0, 0));
        cam.handle(press(PointerButton::Secondary, 0, 0));
        assert!(matches!(cam.drag(), DragState::Rotating { .. }));

        cam.handle(PointerEvent::Release { button: PointerButton::Secondary, x: 0, y: 0 });
        assert!(matches!(cam.drag(), DragState::Rotating { .. }));

        cam.handle(PointerEvent::Release { button: PointerButton::Primary, x: 0, y: 0 });
        assert_eq!(cam.drag(), DragState::Idle);
    }

    #[test]
    fn idle_motion_changes_nothing() {
        let mut cam = camera();
        cam.handle(PointerEvent::Motion { x: 40, y: 40 });
        assert_eq!(cam.state(), &CameraState::default());
    }

    #[test]
    fn wheel_down_never_goes_below_floor() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.handle(PointerEvent::WheelDown { x: 1, y: 1 });
        }
        assert_eq!(cam.state().distance, MIN_DISTANCE);

        cam.handle(PointerEvent::WheelUp { x: 1, y: 1 });
        assert!((cam.state().distance - 1.3).abs() < 1e-6);
    }

    #[test]
    fn events_past_the_pane_are_unhandled() {
        let mut cam = camera();
        assert_eq!(
            cam.handle(press(PointerButton::Primary, 80, 3)),
            EventOutcome::Unhandled
        );
        assert_eq!(cam.drag(), DragState::Idle);
        assert_eq!(
            cam.handle(press(PointerButton::Primary, 79, 3)),
            EventOutcome::Handled
        );
    }

    #[test]
    fn auto_rotate_wraps_at_full_turn() {
        let mut cam = OrbitCamera::new(
            CameraState {
                current_angle: 359.5,
                ..CameraState::default()
            },
            2.0,
            80,
        );
        assert_eq!(cam.tick(), 0.5);

        // Far past the point where f32 would stop advancing unwrapped.
        let mut cam = OrbitCamera::new(
            CameraState {
                current_angle: 16_777_216.0,
                ..CameraState::default()
            },
            2.0,
            80,
        );
        let first = cam.tick();
        assert!((0.0..360.0).contains(&first));
        assert_eq!(cam.tick(), first + 1.0);
    }

    #[test]
    fn view_matrix_backs_off_by_distance() {
        let state = CameraState {
            distance: 4.0,
            ..CameraState::default()
        };
        let eye_space = state.view_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(eye_space, Vec3::new(0.0, 0.0, -4.0));
    }
}
