//! Tool system for photo markup.

mod prompt;

pub use prompt::TextPrompt;

use crate::annotations::{Annotation, AnnotationStyle, Arrow, Circle, PointMark, Rectangle, TextLabel};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Point,
    Rectangle,
    Circle,
    Arrow,
    Text,
}

impl ToolKind {
    /// Canonical tool name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Point => "point",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Arrow => "arrow",
            ToolKind::Text => "text",
        }
    }

    /// Whether the tool builds its annotation over a press-drag-release gesture.
    pub fn is_drag_tool(self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle | ToolKind::Arrow)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a tool name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(ToolKind::Point),
            "rect" | "rectangle" => Ok(ToolKind::Rectangle),
            "circle" => Ok(ToolKind::Circle),
            "arrow" => Ok(ToolKind::Arrow),
            "text" => Ok(ToolKind::Text),
            _ => Err(UnknownTool(name.to_string())),
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    /// Waiting for a press.
    #[default]
    Idle,
    /// A drag tool is being dragged.
    Drawing {
        /// Where the press happened.
        start: Point,
        /// Uncommitted shape shown as live preview.
        candidate: Annotation,
    },
}

/// What a single pointer step did to the tool state.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing changed; no redraw needed.
    Ignored,
    /// A drag started or its candidate changed.
    Updated,
    /// A gesture produced an annotation to append.
    Committed(Annotation),
    /// A gesture ended without producing an annotation.
    Discarded,
}

impl GestureOutcome {
    /// Whether the surface must be redrawn after this step.
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, GestureOutcome::Ignored)
    }
}

/// Manages the current tool, its state and the style for new annotations.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    current_tool: ToolKind,
    /// Current state of the tool.
    state: ToolState,
    /// Style applied to new annotations.
    pub style: AnnotationStyle,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new(style: AnnotationStyle) -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::Idle,
            style,
        }
    }

    pub fn current_tool(&self) -> ToolKind {
        self.current_tool
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    /// Set the current tool. Any shape in progress is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    /// Handle a press at a canonical point.
    ///
    /// Point and text tools commit immediately; drag tools enter `Drawing`
    /// with a zero-extent candidate. A press while already drawing restarts
    /// the gesture.
    pub fn pointer_down(&mut self, point: Point, prompt: Option<&mut dyn TextPrompt>) -> GestureOutcome {
        self.state = ToolState::Idle;

        match self.current_tool {
            ToolKind::Point => GestureOutcome::Committed(Annotation::Point(PointMark::new(
                point,
                self.style.color,
            ))),
            ToolKind::Text => {
                let Some(prompt) = prompt else {
                    log::warn!("Text tool used without a text prompt; no label created");
                    return GestureOutcome::Discarded;
                };
                match prompt.request_label(point) {
                    Some(text) if !text.trim().is_empty() => GestureOutcome::Committed(
                        Annotation::TextLabel(TextLabel::new(point, text, &self.style)),
                    ),
                    _ => {
                        log::debug!("Text label cancelled at ({:.1}, {:.1})", point.x, point.y);
                        GestureOutcome::Discarded
                    }
                }
            }
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Arrow => {
                let candidate = self.zero_extent_candidate(point);
                self.state = ToolState::Drawing {
                    start: point,
                    candidate,
                };
                GestureOutcome::Updated
            }
        }
    }

    /// Update the candidate's extent while drawing.
    pub fn pointer_move(&mut self, point: Point) -> GestureOutcome {
        match &mut self.state {
            ToolState::Drawing { start, candidate } => {
                update_extent(candidate, *start, point);
                GestureOutcome::Updated
            }
            ToolState::Idle => GestureOutcome::Ignored,
        }
    }

    /// Finish the drag: the candidate is committed if it meets the minimum size.
    pub fn pointer_up(&mut self, point: Point) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing { start, mut candidate } => {
                update_extent(&mut candidate, start, point);
                if candidate.meets_minimum_size() {
                    GestureOutcome::Committed(candidate)
                } else {
                    log::debug!("Discarding undersized {}", candidate.kind_name());
                    GestureOutcome::Discarded
                }
            }
            ToolState::Idle => GestureOutcome::Ignored,
        }
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            ToolState::Drawing { .. } => GestureOutcome::Discarded,
            ToolState::Idle => GestureOutcome::Ignored,
        }
    }

    /// Check if a drag is in progress.
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, ToolState::Drawing { .. })
    }

    /// Get the uncommitted shape, if any.
    pub fn candidate(&self) -> Option<&Annotation> {
        match &self.state {
            ToolState::Drawing { candidate, .. } => Some(candidate),
            ToolState::Idle => None,
        }
    }

    fn zero_extent_candidate(&self, point: Point) -> Annotation {
        match self.current_tool {
            ToolKind::Rectangle => Annotation::Rectangle(Rectangle::from_corners(point, point, &self.style)),
            ToolKind::Circle => Annotation::Circle(Circle::new(point, 0.0, &self.style)),
            _ => Annotation::Arrow(Arrow::new(point, point, &self.style)),
        }
    }
}

/// Stretch a candidate from `start` towards `current`.
fn update_extent(candidate: &mut Annotation, start: Point, current: Point) {
    match candidate {
        Annotation::Rectangle(rect) => rect.set_corners(start, current),
        Annotation::Circle(circle) => circle.set_edge(current),
        Annotation::Arrow(arrow) => arrow.set_end(current),
        Annotation::Point(_) | Annotation::TextLabel(_) => {}
    }
}
