//! Per-photo markup session state.

use crate::annotations::{Annotation, AnnotationList, AnnotationStyle, LabelFont, SerializableColor};
use crate::config::MarkupConfig;
use crate::input::{CanonicalEvent, DeviceEvent, ElementRect, InputAdapter};
use crate::photo::SourceImage;
use crate::tools::{GestureOutcome, TextPrompt, ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use std::fmt;

/// Everything needed to mark up one photo.
///
/// A session owns its image, viewport, annotations and tool state. Nothing
/// is shared between sessions, so several editors can live side by side.
pub struct MarkupSession {
    config: MarkupConfig,
    image: Option<SourceImage>,
    viewport: Option<Viewport>,
    annotations: AnnotationList,
    tools: ToolManager,
    input: InputAdapter,
    prompt: Option<Box<dyn TextPrompt>>,
    redraw_requested: bool,
}

impl fmt::Debug for MarkupSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupSession")
            .field("viewport", &self.viewport)
            .field("annotations", &self.annotations.len())
            .field("tool", &self.tools.current_tool())
            .field("has_prompt", &self.prompt.is_some())
            .finish()
    }
}

impl Default for MarkupSession {
    fn default() -> Self {
        Self::new(MarkupConfig::default())
    }
}

impl MarkupSession {
    /// Create an empty session. No image is loaded yet.
    pub fn new(config: MarkupConfig) -> Self {
        let tools = ToolManager::new(config.initial_style());
        Self {
            config,
            image: None,
            viewport: None,
            annotations: AnnotationList::new(),
            tools,
            input: InputAdapter::new(),
            prompt: None,
            redraw_requested: false,
        }
    }

    /// Builder-style variant of [`set_text_prompt`](Self::set_text_prompt).
    pub fn with_text_prompt(mut self, prompt: impl TextPrompt + 'static) -> Self {
        self.set_text_prompt(prompt);
        self
    }

    /// Install the capability used by the text tool.
    pub fn set_text_prompt(&mut self, prompt: impl TextPrompt + 'static) {
        self.prompt = Some(Box::new(prompt));
    }

    pub fn config(&self) -> &MarkupConfig {
        &self.config
    }

    /// Load an image using the configured maximum surface width.
    pub fn initialize(&mut self, image: SourceImage) -> bool {
        let max_width = self.config.max_surface_width;
        self.initialize_with_width(image, max_width)
    }

    /// Load an image, fit it into `max_surface_width` and reset all state.
    ///
    /// Returns `false` (leaving the session untouched) if the image has no
    /// pixels or the width is unusable.
    pub fn initialize_with_width(&mut self, image: SourceImage, max_surface_width: f64) -> bool {
        let (width, height) = (image.natural_width(), image.natural_height());
        let Some(viewport) = Viewport::fit(width, height, max_surface_width) else {
            log::warn!(
                "Cannot initialize markup: image {}x{}, max surface width {}",
                width,
                height,
                max_surface_width
            );
            return false;
        };

        log::info!(
            "Loaded {}x{} image into {}x{} surface (scale {:.4})",
            width,
            height,
            viewport.surface_width,
            viewport.surface_height,
            viewport.scale
        );

        self.image = Some(image);
        self.viewport = Some(viewport);
        self.annotations.clear();
        self.tools.set_tool(self.tools.current_tool());
        self.input.reset();
        self.redraw_requested = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Map an element-relative device coordinate into canonical space.
    pub fn to_canonical(&self, device: Point, displayed: Size) -> Option<Point> {
        self.viewport.map(|v| v.to_canonical(device, displayed))
    }

    /// Select a tool by name. Unknown names leave the current tool in place.
    pub fn set_tool(&mut self, name: &str) -> bool {
        match name.parse::<ToolKind>() {
            Ok(tool) => {
                self.set_tool_kind(tool);
                true
            }
            Err(e) => {
                log::warn!("{}; keeping {}", e, self.tools.current_tool());
                false
            }
        }
    }

    pub fn set_tool_kind(&mut self, tool: ToolKind) {
        if self.tools.is_drawing() {
            self.redraw_requested = true;
        }
        self.tools.set_tool(tool);
        self.input.reset();
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool()
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.tools.style.color = color;
    }

    /// Set the stroke width for new shapes. Non-positive values are ignored.
    pub fn set_stroke_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.tools.style.stroke_width = width;
        } else {
            log::warn!("Ignoring invalid stroke width {}", width);
        }
    }

    /// Set the font for new labels. Non-positive sizes are ignored.
    pub fn set_label_font(&mut self, font: LabelFont) {
        if font.is_usable() {
            self.tools.style.font = font;
        } else {
            log::warn!("Ignoring invalid label font size {}", font.size);
        }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.tools.style
    }

    /// Press at a canonical point.
    pub fn pointer_down(&mut self, point: Point) -> GestureOutcome {
        if !self.ensure_initialized("pointer down") {
            return GestureOutcome::Ignored;
        }
        let prompt = self.prompt.as_mut().map(|p| &mut **p as &mut dyn TextPrompt);
        let outcome = self.tools.pointer_down(point, prompt);
        self.apply(outcome)
    }

    /// Drag to a canonical point.
    pub fn pointer_move(&mut self, point: Point) -> GestureOutcome {
        if !self.ensure_initialized("pointer move") {
            return GestureOutcome::Ignored;
        }
        let outcome = self.tools.pointer_move(point);
        self.apply(outcome)
    }

    /// Release at a canonical point.
    pub fn pointer_up(&mut self, point: Point) -> GestureOutcome {
        if !self.ensure_initialized("pointer up") {
            return GestureOutcome::Ignored;
        }
        let outcome = self.tools.pointer_up(point);
        self.apply(outcome)
    }

    /// Abandon the gesture in progress.
    pub fn cancel_gesture(&mut self) -> GestureOutcome {
        if !self.ensure_initialized("cancel gesture") {
            return GestureOutcome::Ignored;
        }
        self.input.reset();
        let outcome = self.tools.cancel();
        self.apply(outcome)
    }

    /// Feed a raw mouse or touch event from the host.
    pub fn handle_device_event(&mut self, event: &DeviceEvent, element: &ElementRect) -> GestureOutcome {
        let Some(viewport) = self.viewport else {
            log::warn!("Ignoring device event: no image loaded");
            return GestureOutcome::Ignored;
        };
        match self.input.normalize(event, element, &viewport) {
            Some(CanonicalEvent::Down(p)) => self.pointer_down(p),
            Some(CanonicalEvent::Move(p)) => self.pointer_move(p),
            Some(CanonicalEvent::Up(p)) => self.pointer_up(p),
            Some(CanonicalEvent::Cancel) => self.cancel_gesture(),
            None => GestureOutcome::Ignored,
        }
    }

    /// Remove the most recent annotation.
    pub fn undo(&mut self) -> Option<Annotation> {
        if !self.ensure_initialized("undo") {
            return None;
        }
        let removed = self.annotations.undo();
        if removed.is_some() {
            self.redraw_requested = true;
        }
        removed
    }

    /// Remove every annotation.
    pub fn clear(&mut self) {
        if !self.ensure_initialized("clear") {
            return;
        }
        self.annotations.clear();
        self.redraw_requested = true;
    }

    pub fn annotations(&self) -> &AnnotationList {
        &self.annotations
    }

    /// Owned copy of the committed annotations.
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.as_slice().to_vec()
    }

    /// Replace the annotations with a saved set. Degenerate entries are
    /// dropped. Returns how many were kept.
    pub fn restore_annotations(&mut self, annotations: Vec<Annotation>) -> usize {
        if !self.ensure_initialized("restore annotations") {
            return 0;
        }
        let total = annotations.len();
        self.annotations.clear();
        for annotation in annotations {
            if annotation.meets_minimum_size() {
                self.annotations.push(annotation);
            }
        }
        let kept = self.annotations.len();
        if kept < total {
            log::warn!("Dropped {} degenerate annotations on restore", total - kept);
        }
        self.redraw_requested = true;
        kept
    }

    /// Uncommitted shape being dragged, if any.
    pub fn candidate(&self) -> Option<&Annotation> {
        self.tools.candidate()
    }

    pub fn is_drawing(&self) -> bool {
        self.tools.is_drawing()
    }

    // The view is fixed at the fit scale; these exist for hosts that still
    // wire zoom and pan controls.

    pub fn zoom_in(&mut self) {
        self.request_redraw("zoom in");
    }

    pub fn zoom_out(&mut self) {
        self.request_redraw("zoom out");
    }

    pub fn pan_x(&mut self, _delta: f64) {
        self.request_redraw("pan x");
    }

    pub fn pan_y(&mut self, _delta: f64) {
        self.request_redraw("pan y");
    }

    pub fn reset_view(&mut self) {
        self.request_redraw("reset view");
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_requested
    }

    /// Return and clear the pending redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    fn request_redraw(&mut self, reason: &str) {
        log::debug!("Redraw requested ({})", reason);
        self.redraw_requested = true;
    }

    fn ensure_initialized(&self, operation: &str) -> bool {
        if self.viewport.is_none() {
            log::warn!("Ignoring {}: no image loaded", operation);
            return false;
        }
        true
    }

    fn apply(&mut self, outcome: GestureOutcome) -> GestureOutcome {
        if let GestureOutcome::Committed(annotation) = &outcome {
            log::debug!("Committed {}", annotation.kind_name());
            self.annotations.push(annotation.clone());
        }
        if outcome.needs_redraw() {
            self.redraw_requested = true;
        }
        outcome
    }
}
