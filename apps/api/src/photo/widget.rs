//! Photo placement widget. Drag to reposition, drag a corner handle to resize.
//!
//! Interaction is an explicit state machine `Idle | Dragging | Resizing`,
//! independent of any GUI event API. Callers feed pointer events in device
//! pixels. Press on the container and press on the handle are distinct
//! gesture origins, so the two gestures can never overlap.
//!
//! A container press that is released without ever leaving the 3px dead-zone
//! is a click: the caller opens the upload flow and margins are left as they
//! were at press time.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: f64 = 151.0;
pub const DEFAULT_HEIGHT: f64 = 189.0;
pub const MIN_DIMENSION: f64 = 50.0;
/// Movement on either axis beyond this turns a press into a drag.
pub const DEAD_ZONE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size and offset of the photo box, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotoPlacement {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
}

impl Default for PhotoPlacement {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin_top: 0.0,
            margin_right: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    Dragging {
        origin: Point,
        start_top: f64,
        start_right: f64,
        moved: bool,
    },
    Resizing {
        origin: Point,
        start_width: f64,
        start_height: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Idle,
    Dragging,
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// Press/release inside the dead-zone: open the upload flow.
    Click,
    Dragged,
    Resized,
    /// Release with no gesture in progress.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    PressContainer,
    PressHandle,
    Move,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoWidget {
    placement: PhotoPlacement,
    interaction: Interaction,
}

impl Default for PhotoWidget {
    fn default() -> Self {
        Self {
            placement: PhotoPlacement::default(),
            interaction: Interaction::Idle,
        }
    }
}

impl PhotoWidget {
    pub fn placement(&self) -> PhotoPlacement {
        self.placement
    }

    pub fn mode(&self) -> InteractionMode {
        match self.interaction {
            Interaction::Idle => InteractionMode::Idle,
            Interaction::Dragging { .. } => InteractionMode::Dragging,
            Interaction::Resizing { .. } => InteractionMode::Resizing,
        }
    }

    /// Begins a drag-or-click gesture. Ignored unless idle.
    pub fn press_container(&mut self, at: Point) {
        if self.interaction != Interaction::Idle {
            return;
        }
        self.interaction = Interaction::Dragging {
            origin: at,
            start_top: self.placement.margin_top,
            start_right: self.placement.margin_right,
            moved: false,
        };
    }

    /// Begins a resize gesture. Ignored unless idle.
    pub fn press_handle(&mut self, at: Point) {
        if self.interaction != Interaction::Idle {
            return;
        }
        self.interaction = Interaction::Resizing {
            origin: at,
            start_width: self.placement.width,
            start_height: self.placement.height,
        };
    }

    pub fn pointer_move(&mut self, at: Point) {
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Dragging {
                origin,
                start_top,
                start_right,
                moved,
            } => {
                let dx = at.x - origin.x;
                let dy = at.y - origin.y;
                if dx.abs() > DEAD_ZONE || dy.abs() > DEAD_ZONE {
                    *moved = true;
                }
                self.placement.margin_top = *start_top + dy;
                self.placement.margin_right = *start_right - dx;
            }
            Interaction::Resizing {
                origin,
                start_width,
                start_height,
            } => {
                let dx = at.x - origin.x;
                let dy = at.y - origin.y;
                self.placement.width = (*start_width + dx).max(MIN_DIMENSION);
                self.placement.height = (*start_height + dy).max(MIN_DIMENSION);
            }
        }
    }

    /// Ends the current gesture and returns to idle.
    pub fn release(&mut self) -> ReleaseOutcome {
        let outcome = match self.interaction {
            Interaction::Idle => ReleaseOutcome::Ignored,
            Interaction::Dragging {
                start_top,
                start_right,
                moved,
                ..
            } => {
                if moved {
                    ReleaseOutcome::Dragged
                } else {
                    self.placement.margin_top = start_top;
                    self.placement.margin_right = start_right;
                    ReleaseOutcome::Click
                }
            }
            Interaction::Resizing { .. } => ReleaseOutcome::Resized,
        };
        self.interaction = Interaction::Idle;
        outcome
    }

    /// Restores default size and offsets, whatever the current state.
    pub fn reset(&mut self) {
        self.placement = PhotoPlacement::default();
        self.interaction = Interaction::Idle;
    }

    /// Dispatches a pointer event. Only a release produces an outcome.
    pub fn apply(&mut self, event: PointerEvent) -> Option<ReleaseOutcome> {
        let at = Point::new(event.x, event.y);
        match event.kind {
            PointerKind::PressContainer => {
                self.press_container(at);
                None
            }
            PointerKind::PressHandle => {
                self.press_handle(at);
                None
            }
            PointerKind::Move => {
                self.pointer_move(at);
                None
            }
            PointerKind::Release => Some(self.release()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_press_release_is_click_without_margin_change() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(100.0, 100.0));
        w.pointer_move(Point::new(102.0, 101.0));
        assert_eq!(w.release(), ReleaseOutcome::Click);
        assert_eq!(w.placement(), PhotoPlacement::default());
        assert_eq!(w.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_click_fires_once_per_gesture() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(0.0, 0.0));
        assert_eq!(w.release(), ReleaseOutcome::Click);
        assert_eq!(w.release(), ReleaseOutcome::Ignored);
    }

    #[test]
    fn test_drag_updates_margins() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(50.0, 50.0));
        w.pointer_move(Point::new(60.0, 60.0));
        assert_eq!(w.mode(), InteractionMode::Dragging);
        assert_eq!(w.release(), ReleaseOutcome::Dragged);
        let p = w.placement();
        assert_eq!(p.margin_top, 10.0);
        assert_eq!(p.margin_right, -10.0);
        assert_eq!(p.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_drag_that_returns_inside_dead_zone_is_still_a_drag() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(0.0, 0.0));
        w.pointer_move(Point::new(20.0, 0.0));
        w.pointer_move(Point::new(1.0, 0.0));
        assert_eq!(w.release(), ReleaseOutcome::Dragged);
        assert_eq!(w.placement().margin_right, -1.0);
    }

    #[test]
    fn test_drags_accumulate_from_press_time_margins() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(0.0, 0.0));
        w.pointer_move(Point::new(-5.0, 5.0));
        w.release();
        w.press_container(Point::new(0.0, 0.0));
        w.pointer_move(Point::new(-5.0, 5.0));
        w.release();
        assert_eq!(w.placement().margin_top, 10.0);
        assert_eq!(w.placement().margin_right, 10.0);
    }

    #[test]
    fn test_resize_tracks_delta() {
        let mut w = PhotoWidget::default();
        w.press_handle(Point::new(0.0, 0.0));
        w.pointer_move(Point::new(49.0, 11.0));
        assert_eq!(w.release(), ReleaseOutcome::Resized);
        assert_eq!(w.placement().width, 200.0);
        assert_eq!(w.placement().height, 200.0);
    }

    #[test]
    fn test_resize_clamps_at_floor() {
        let mut w = PhotoWidget::default();
        w.press_handle(Point::new(300.0, 300.0));
        w.pointer_move(Point::new(0.0, 0.0));
        assert_eq!(w.placement().width, MIN_DIMENSION);
        assert_eq!(w.placement().height, MIN_DIMENSION);
        w.release();
        assert_eq!(w.placement().width, 50.0);
    }

    #[test]
    fn test_gestures_are_mutually_exclusive() {
        let mut w = PhotoWidget::default();
        w.press_container(Point::new(0.0, 0.0));
        w.press_handle(Point::new(0.0, 0.0));
        assert_eq!(w.mode(), InteractionMode::Dragging);
        w.pointer_move(Point::new(30.0, 30.0));
        assert_eq!(w.placement().width, DEFAULT_WIDTH);
        w.release();

        w.press_handle(Point::new(0.0, 0.0));
        w.press_container(Point::new(0.0, 0.0));
        assert_eq!(w.mode(), InteractionMode::Resizing);
    }

    #[test]
    fn test_move_while_idle_is_ignored() {
        let mut w = PhotoWidget::default();
        w.pointer_move(Point::new(500.0, 500.0));
        assert_eq!(w.placement(), PhotoPlacement::default());
    }

    #[test]
    fn test_reset_restores_defaults_mid_gesture() {
        let mut w = PhotoWidget::default();
        w.press_handle(Point::new(0.0, 0.0));
        w.pointer_move(Point::new(80.0, 80.0));
        w.reset();
        assert_eq!(w.placement(), PhotoPlacement::default());
        assert_eq!(w.mode(), InteractionMode::Idle);
    }

    #[test]
    fn test_apply_dispatches_events() {
        let mut w = PhotoWidget::default();
        let ev = |kind, x, y| PointerEvent { kind, x, y };
        assert_eq!(w.apply(ev(PointerKind::PressContainer, 10.0, 10.0)), None);
        assert_eq!(w.apply(ev(PointerKind::Move, 20.0, 20.0)), None);
        assert_eq!(
            w.apply(ev(PointerKind::Release, 20.0, 20.0)),
            Some(ReleaseOutcome::Dragged)
        );
    }
}
