use crate::router::RenderSurface;
use crate::viewport::{Point, SurfaceTransform};

/// Scroll area backing the window: it keeps offsets inside the scrollable
/// extent and centres content that is smaller than the viewport.
#[derive(Debug, Clone)]
pub struct ScrollSurface {
    viewport_w: f64,
    viewport_h: f64,
    display_w: f64,
    display_h: f64,
    scroll_x: f64,
    scroll_y: f64,
    captured: bool,
}

impl ScrollSurface {
    pub fn new(viewport_w: u32, viewport_h: u32) -> Self {
        Self {
            viewport_w: viewport_w.max(1) as f64,
            viewport_h: viewport_h.max(1) as f64,
            display_w: 0.0,
            display_h: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            captured: false,
        }
    }

    pub fn resize(&mut self, viewport_w: u32, viewport_h: u32) {
        self.viewport_w = viewport_w.max(1) as f64;
        self.viewport_h = viewport_h.max(1) as f64;
        self.clamp();
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Gap left and above the content when it is smaller than the viewport.
    fn inset(&self) -> (f64, f64) {
        (
            ((self.viewport_w - self.display_w) / 2.0).max(0.0),
            ((self.viewport_h - self.display_h) / 2.0).max(0.0),
        )
    }

    fn clamp(&mut self) {
        let max_x = (self.display_w - self.viewport_w).max(0.0);
        let max_y = (self.display_h - self.viewport_h).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Window position of the content's top-left corner.
    pub fn content_origin(&self) -> (f64, f64) {
        let (ix, iy) = self.inset();
        (ix - self.scroll_x, iy - self.scroll_y)
    }
}

impl RenderSurface for ScrollSurface {
    fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_w, self.viewport_h)
    }

    fn present(&mut self, transform: SurfaceTransform) {
        self.display_w = transform.display_width;
        self.display_h = transform.display_height;
        self.scroll_x = transform.scroll_x;
        self.scroll_y = transform.scroll_y;
        self.clamp();
    }

    fn scroll_offset(&self) -> Point {
        Point::new(self.scroll_x, self.scroll_y)
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll_x += dx;
        self.scroll_y += dy;
        self.clamp();
    }

    fn to_local(&self, window_pos: Point) -> Point {
        let (ix, iy) = self.inset();
        Point::new(window_pos.x - ix, window_pos.y - iy)
    }

    fn set_pointer_capture(&mut self, captured: bool) {
        self.captured = captured;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(w: f64, h: f64, x: f64, y: f64) -> SurfaceTransform {
        SurfaceTransform { display_width: w, display_height: h, scroll_x: x, scroll_y: y }
    }

    #[test]
    fn offsets_clamp_to_scrollable_extent() {
        let mut s = ScrollSurface::new(800, 600);
        s.present(transform(1000.0, 700.0, -20.0, 500.0));
        assert_eq!(s.scroll_offset(), Point::new(0.0, 100.0));

        s.scroll_by(5000.0, -5000.0);
        assert_eq!(s.scroll_offset(), Point::new(200.0, 0.0));
    }

    #[test]
    fn small_content_is_centered_and_cannot_scroll() {
        let mut s = ScrollSurface::new(800, 600);
        s.present(transform(400.0, 600.0, 30.0, 30.0));
        assert_eq!(s.scroll_offset(), Point::new(0.0, 0.0));
        assert_eq!(s.content_origin(), (200.0, 0.0));
        assert_eq!(s.to_local(Point::new(250.0, 10.0)), Point::new(50.0, 10.0));
    }

    #[test]
    fn growing_the_window_reclamps_offset() {
        let mut s = ScrollSurface::new(800, 600);
        s.present(transform(1600.0, 1200.0, 800.0, 600.0));
        s.resize(1200, 1000);
        assert_eq!(s.scroll_offset(), Point::new(400.0, 200.0));
        assert_eq!(s.content_origin(), (-400.0, -200.0));
    }

    #[test]
    fn capture_flag_round_trip() {
        let mut s = ScrollSurface::new(10, 10);
        s.set_pointer_capture(true);
        assert!(s.is_captured());
        s.set_pointer_capture(false);
        assert!(!s.is_captured());
    }
}
