//! Fieldmark Core Library
//!
//! Platform-agnostic state and logic for marking up a single survey photo:
//! the fixed viewport, the annotation model, the tool state machine and
//! pointer/touch normalization.

pub mod annotations;
pub mod config;
pub mod photo;
pub mod input;
pub mod record;
pub mod session;
pub mod tools;
pub mod viewport;

pub use annotations::{
    Annotation, AnnotationList, AnnotationStyle, Arrow, Circle, LabelFont, PointMark, Rectangle,
    SerializableColor, TextLabel,
};
pub use config::{ConfigError, ExportSettings, MarkupConfig, RasterFormat};
pub use photo::{ImageError, ImageFormat, SourceImage};
pub use input::{CanonicalEvent, DeviceEvent, ElementRect, InputAdapter, MouseButton, PointerPhase, TouchPoint};
pub use record::{PhotoRecord, RecordError};
pub use session::MarkupSession;
pub use tools::{GestureOutcome, TextPrompt, ToolKind, ToolManager, ToolState, UnknownTool};
pub use viewport::Viewport;
