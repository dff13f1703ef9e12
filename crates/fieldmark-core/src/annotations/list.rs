//! Append-only annotation list with linear undo.

use super::Annotation;
use serde::{Deserialize, Serialize};

/// Ordered sequence of committed annotations.
///
/// Insertion order is render (z-) order. The only removals are `undo`,
/// which drops the most recent entry, and `clear`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationList {
    items: Vec<Annotation>,
}

impl AnnotationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a committed annotation.
    pub fn push(&mut self, annotation: Annotation) {
        self.items.push(annotation);
    }

    /// Remove and return the most recently appended annotation.
    pub fn undo(&mut self) -> Option<Annotation> {
        self.items.pop()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&Annotation> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{PointMark, SerializableColor};
    use kurbo::Point;

    fn point(x: f64) -> Annotation {
        Annotation::Point(PointMark::new(Point::new(x, x), SerializableColor::black()))
    }

    #[test]
    fn test_undo_removes_most_recent() {
        let mut list = AnnotationList::new();
        list.push(point(1.0));
        list.push(point(2.0));
        list.push(point(3.0));

        assert_eq!(list.undo(), Some(point(3.0)));
        assert_eq!(list.as_slice(), &[point(1.0), point(2.0)]);

        list.undo();
        assert_eq!(list.as_slice(), &[point(1.0)]);
    }

    #[test]
    fn test_undo_on_empty() {
        let mut list = AnnotationList::new();
        assert!(list.undo().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut list = AnnotationList::new();
        list.push(point(1.0));
        list.push(point(2.0));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut list = AnnotationList::new();
        list.push(point(5.0));
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["type"], "point");
    }
}
