//! Interactive resize gesture of a block.
//!
//! The gesture only tracks the preview size. Nothing is committed until
//! [`ResizeController::end`] hands the final size back to the owner, so a
//! gesture that is never ended leaves the block untouched.

use log::trace;

use weft_core::geometry::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeGesture {
    start: Point,
    initial: Size,
    current: Size,
}

/// Converts pointer positions of a resize drag into block sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeController {
    handle_size: f32,
    min_size: Size,
    gesture: Option<ResizeGesture>,
}

impl ResizeController {
    /// Creates a controller with a square handle of `handle_size` and the
    /// smallest size a gesture may produce.
    pub fn new(handle_size: f32, min_size: Size) -> Self {
        Self {
            handle_size,
            min_size,
            gesture: None,
        }
    }

    pub fn handle_size(&self) -> f32 {
        self.handle_size
    }

    /// Returns `true` if block-local `pos` lies on the handle in the
    /// bottom-right corner of a block of `size`.
    pub fn hit_test(&self, pos: Point, size: Size) -> bool {
        let (width, height) = (size.width(), size.height());
        (width - self.handle_size..=width).contains(&pos.x())
            && (height - self.handle_size..=height).contains(&pos.y())
    }

    /// Starts a gesture at `pos` on a block currently of `size`.
    pub fn begin(&mut self, pos: Point, size: Size) {
        trace!(x = pos.x(), y = pos.y(); "Resize gesture started");
        self.gesture = Some(ResizeGesture {
            start: pos,
            initial: size,
            current: size,
        });
    }

    /// Updates the preview for the pointer at `pos` and returns it.
    ///
    /// Returns `None` when no gesture is active.
    pub fn update(&mut self, pos: Point) -> Option<Size> {
        let min_size = self.min_size;
        let gesture = self.gesture.as_mut()?;
        let delta = pos.sub_point(gesture.start);
        gesture.current = Size::new(
            gesture.initial.width() + delta.x(),
            gesture.initial.height() + delta.y(),
        )
        .max(min_size);
        Some(gesture.current)
    }

    /// Finishes the gesture and returns the size to commit, if one was active.
    pub fn end(&mut self) -> Option<Size> {
        self.gesture.take().map(|gesture| gesture.current)
    }

    /// Drops the gesture without producing a size.
    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Current preview size, while a gesture is active.
    pub fn preview(&self) -> Option<Size> {
        self.gesture.map(|gesture| gesture.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ResizeController {
        ResizeController::new(10.0, Size::new(40.0, 30.0))
    }

    #[test]
    fn test_hit_test_handle_square() {
        let resize = controller();
        let size = Size::new(120.0, 80.0);
        assert!(resize.hit_test(Point::new(115.0, 75.0), size));
        assert!(resize.hit_test(Point::new(110.0, 70.0), size));
        assert!(resize.hit_test(Point::new(120.0, 80.0), size));
        assert!(!resize.hit_test(Point::new(109.0, 75.0), size));
        assert!(!resize.hit_test(Point::new(115.0, 81.0), size));
        assert!(!resize.hit_test(Point::new(60.0, 40.0), size));
    }

    #[test]
    fn test_update_before_begin_is_noop() {
        let mut resize = controller();
        assert_eq!(resize.update(Point::new(10.0, 10.0)), None);
        assert_eq!(resize.end(), None);
        assert!(!resize.is_active());
    }

    #[test]
    fn test_update_adds_pointer_delta() {
        let mut resize = controller();
        resize.begin(Point::new(115.0, 75.0), Size::new(120.0, 80.0));
        assert_eq!(
            resize.update(Point::new(135.0, 155.0)),
            Some(Size::new(140.0, 160.0))
        );
        assert_eq!(resize.preview(), Some(Size::new(140.0, 160.0)));
        assert_eq!(resize.end(), Some(Size::new(140.0, 160.0)));
        assert!(!resize.is_active());
    }

    #[test]
    fn test_update_clamps_to_minimum() {
        let mut resize = controller();
        resize.begin(Point::new(115.0, 75.0), Size::new(120.0, 80.0));
        assert_eq!(
            resize.update(Point::new(0.0, 0.0)),
            Some(Size::new(40.0, 30.0))
        );
    }

    #[test]
    fn test_end_without_update_returns_initial() {
        let mut resize = controller();
        resize.begin(Point::new(0.0, 0.0), Size::new(120.0, 80.0));
        assert_eq!(resize.end(), Some(Size::new(120.0, 80.0)));
    }

    #[test]
    fn test_cancel_discards_gesture() {
        let mut resize = controller();
        resize.begin(Point::new(115.0, 75.0), Size::new(120.0, 80.0));
        resize.update(Point::new(200.0, 200.0));
        resize.cancel();
        assert_eq!(resize.end(), None);
    }
}
