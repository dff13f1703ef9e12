//! Injected capability for acquiring label text.

use kurbo::Point;
use std::collections::VecDeque;

/// Synchronous source of text for new labels.
///
/// Returns `None` when the user cancels. Hosts plug in whatever modal
/// mechanism they have; the tool state machine only sees this trait.
pub trait TextPrompt {
    /// Ask for the text of a label placed at `at` (canonical coordinates).
    fn request_label(&mut self, at: Point) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(Point) -> Option<String>,
{
    fn request_label(&mut self, at: Point) -> Option<String> {
        self(at)
    }
}

/// Pre-recorded answers, consumed in order. Runs dry as cancellations.
impl TextPrompt for VecDeque<String> {
    fn request_label(&mut self, _at: Point) -> Option<String> {
        self.pop_front()
    }
}
