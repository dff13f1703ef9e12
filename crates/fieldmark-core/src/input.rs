//! Input normalization for mouse and touch events.
//!
//! Hosts report raw device events in client (page) coordinates together
//! with the surface element's on-screen box. The [`InputAdapter`] turns
//! them into a single stream of canonical pointer events for the tool
//! state machine.

use crate::viewport::Viewport;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Phase of a pointer or touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One finger of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Host identifier, stable for the lifetime of the touch.
    pub id: u64,
    /// Client coordinates.
    pub position: Point,
}

/// Raw event from the host, in client coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceEvent {
    Mouse {
        phase: PointerPhase,
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Touch {
        phase: PointerPhase,
        /// Touches that changed in this event.
        touches: Vec<TouchPoint>,
    },
}

/// On-screen box of the drawing surface in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Element box displayed exactly at the surface's pixel size at the page origin.
    pub fn at_surface_size(viewport: &Viewport) -> Self {
        Self::new(Point::ZERO, viewport.surface_size())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Convert client coordinates to element-relative coordinates.
    pub fn local(&self, client: Point) -> Point {
        Point::new(client.x - self.x, client.y - self.y)
    }
}

/// Normalized pointer event in canonical surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanonicalEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
}

/// Which device currently owns the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActivePointer {
    Mouse,
    Touch(u64),
}

/// Turns mouse and touch events into one canonical pointer stream.
///
/// Only one pointer drives a gesture at a time: extra fingers and
/// non-primary mouse buttons are ignored until the active one lifts.
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    active: Option<ActivePointer>,
    last_position: Option<Point>,
}

impl InputAdapter {
    /// Create a new input adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any gesture in progress.
    pub fn reset(&mut self) {
        self.active = None;
        self.last_position = None;
    }

    /// Check whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Normalize a device event. Returns `None` for events that do not
    /// affect the gesture in progress.
    pub fn normalize(
        &mut self,
        event: &DeviceEvent,
        element: &ElementRect,
        viewport: &Viewport,
    ) -> Option<CanonicalEvent> {
        let to_canonical =
            |client: Point| viewport.to_canonical(element.local(client), element.size());

        match event {
            DeviceEvent::Mouse {
                phase,
                position,
                button,
            } => {
                let owns = self.active == Some(ActivePointer::Mouse);
                match phase {
                    PointerPhase::Down if *button == MouseButton::Left && self.active.is_none() => {
                        self.begin(ActivePointer::Mouse, to_canonical(*position))
                    }
                    PointerPhase::Move if owns => self.track(to_canonical(*position)),
                    PointerPhase::Up if owns && *button == MouseButton::Left => {
                        self.finish(Some(to_canonical(*position)))
                    }
                    PointerPhase::Cancel if owns => self.abort(),
                    _ => None,
                }
            }
            DeviceEvent::Touch { phase, touches } => {
                let active_touch = touches.iter().find(|t| match self.active {
                    Some(ActivePointer::Touch(id)) => t.id == id,
                    _ => false,
                });
                match phase {
                    PointerPhase::Down if self.active.is_none() => {
                        let first = touches.first()?;
                        self.begin(ActivePointer::Touch(first.id), to_canonical(first.position))
                    }
                    PointerPhase::Move => {
                        let touch = active_touch?;
                        self.track(to_canonical(touch.position))
                    }
                    PointerPhase::Up => match (self.active, active_touch) {
                        (_, Some(touch)) => self.finish(Some(to_canonical(touch.position))),
                        // Some hosts send touchend without the lifted finger.
                        (Some(ActivePointer::Touch(_)), None) if touches.is_empty() => self.finish(None),
                        _ => None,
                    },
                    PointerPhase::Cancel if matches!(self.active, Some(ActivePointer::Touch(_))) => {
                        self.abort()
                    }
                    _ => None,
                }
            }
        }
    }

    fn begin(&mut self, pointer: ActivePointer, point: Point) -> Option<CanonicalEvent> {
        self.active = Some(pointer);
        self.last_position = Some(point);
        Some(CanonicalEvent::Down(point))
    }

    fn track(&mut self, point: Point) -> Option<CanonicalEvent> {
        self.last_position = Some(point);
        Some(CanonicalEvent::Move(point))
    }

    fn finish(&mut self, point: Option<Point>) -> Option<CanonicalEvent> {
        let point = point.or(self.last_position)?;
        self.reset();
        Some(CanonicalEvent::Up(point))
    }

    fn abort(&mut self) -> Option<CanonicalEvent> {
        self.reset();
        Some(CanonicalEvent::Cancel)
    }
}
