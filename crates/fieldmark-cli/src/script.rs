//! Recorded gesture scripts.

use fieldmark_core::{
    DeviceEvent, ElementRect, GestureOutcome, MarkupSession, MouseButton, PointerPhase,
    SerializableColor, TouchPoint,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

/// One recorded host action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Tool { name: String },
    /// `#rrggbb` or `#rrggbbaa`.
    Color { value: String },
    StrokeWidth { value: f64 },
    Font {
        size: f64,
        #[serde(default)]
        family: Option<String>,
    },
    /// Answer for the next text prompt.
    Label { text: String },
    Mouse {
        phase: PointerPhase,
        x: f64,
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    Touch {
        phase: PointerPhase,
        touches: Vec<TouchPoint>,
    },
    Undo,
    Clear,
    ZoomIn,
    ZoomOut,
    PanX { delta: f64 },
    PanY { delta: f64 },
    ResetView,
}

/// A gesture script: either a bare list of steps or an object that also
/// describes where the surface sat on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// On-screen box of the surface. Defaults to the surface's own size at the origin.
    #[serde(default)]
    pub element: Option<ElementRect>,
    /// Answers queued for the text prompt before the first step.
    #[serde(default)]
    pub labels: Vec<String>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Steps(Vec<Step>),
    Full(Script),
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            ScriptFile::Steps(steps) => Script {
                steps,
                ..Script::default()
            },
            ScriptFile::Full(script) => script,
        })
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json(&json).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}

/// Text prompt answers shared between the script and the session.
#[derive(Debug, Clone, Default)]
pub struct LabelQueue(Rc<RefCell<VecDeque<String>>>);

impl LabelQueue {
    pub fn push(&self, text: String) {
        self.0.borrow_mut().push_back(text);
    }

    /// Install this queue as the session's text prompt.
    pub fn attach(&self, session: &mut MarkupSession) {
        let answers = Rc::clone(&self.0);
        session.set_text_prompt(move |_at: Point| -> Option<String> { answers.borrow_mut().pop_front() });
    }
}

/// Apply one step to a session.
pub fn apply(step: &Step, session: &mut MarkupSession, element: &ElementRect, labels: &LabelQueue) -> GestureOutcome {
    match step {
        Step::Tool { name } => {
            session.set_tool(name);
        }
        Step::Color { value } => match SerializableColor::from_hex(value) {
            Some(color) => session.set_color(color),
            None => log::warn!("Ignoring invalid color {:?}", value),
        },
        Step::StrokeWidth { value } => session.set_stroke_width(*value),
        Step::Font { size, family } => {
            let mut font = session.style().font.clone();
            font.size = *size;
            if let Some(family) = family {
                font.family = family.clone();
            }
            session.set_label_font(font);
        }
        Step::Label { text } => labels.push(text.clone()),
        Step::Mouse { phase, x, y, button } => {
            let event = DeviceEvent::Mouse {
                phase: *phase,
                position: Point::new(*x, *y),
                button: *button,
            };
            return session.handle_device_event(&event, element);
        }
        Step::Touch { phase, touches } => {
            let event = DeviceEvent::Touch {
                phase: *phase,
                touches: touches.clone(),
            };
            return session.handle_device_event(&event, element);
        }
        Step::Undo => {
            session.undo();
        }
        Step::Clear => session.clear(),
        Step::ZoomIn => session.zoom_in(),
        Step::ZoomOut => session.zoom_out(),
        Step::PanX { delta } => session.pan_x(*delta),
        Step::PanY { delta } => session.pan_y(*delta),
        Step::ResetView => session.reset_view(),
    }
    GestureOutcome::Ignored
}
