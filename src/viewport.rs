//! Zoom and pan state for the image currently on screen.
//!
//! Coordinates handed to the controller are viewport-local: `(0, 0)` is the
//! top-left corner of the visible window. Scroll offsets are expressed in
//! scaled display pixels, so the natural-image coordinate under a viewport
//! point `p` is `(scroll + p) / zoom`.

use crate::error::{Result, ViewerError};

/// Multiplier applied per wheel notch towards the viewer.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
/// Multiplier applied per wheel notch away from the viewer.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Multiplier for one keyboard zoom step.
pub const KEY_ZOOM_STEP: f64 = 1.2;

/// Zoom changes smaller than this are treated as no change.
const ZOOM_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// The controller handled the wheel; the surface must not scroll.
    Consumed,
    /// The surface should apply its native scroll.
    PassThrough,
}

/// What the render surface needs to draw the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    pub display_width: f64,
    pub display_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    pub active: bool,
    pub anchor: Point,
}

// ---------------------------------------------------------------------------
// Viewport controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Viewport {
    image_width: u32,
    image_height: u32,
    zoom: f64,
    min_zoom: f64,
    scroll_x: f64,
    scroll_y: f64,
    drag: DragState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            image_width: 0,
            image_height: 0,
            zoom: 1.0,
            min_zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            drag: DragState::default(),
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on a freshly decoded image: zoom to fit and scroll home.
    ///
    /// A zero-sized image leaves the previous state untouched.
    pub fn on_image_loaded(
        &mut self,
        width: u32,
        height: u32,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidImage { width, height });
        }
        let vw = viewport_width.max(1.0);
        let vh = viewport_height.max(1.0);

        self.image_width = width;
        self.image_height = height;
        self.min_zoom = (vw / width as f64).min(vh / height as f64);
        self.zoom = self.min_zoom;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        Ok(())
    }

    pub fn on_wheel(&mut self, pointer: Point, wheel_delta: f64, has_zoom_modifier: bool) -> WheelOutcome {
        if !has_zoom_modifier {
            return WheelOutcome::PassThrough;
        }
        let scale = if wheel_delta > 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
        self.zoom_at(pointer, scale);
        WheelOutcome::Consumed
    }

    /// Scale by `scale`, keeping the image pixel under `anchor` where it is on
    /// screen. Returns whether the zoom actually changed.
    pub fn zoom_at(&mut self, anchor: Point, scale: f64) -> bool {
        let new_zoom = (self.zoom * scale).max(self.min_zoom);
        if (new_zoom - self.zoom).abs() < ZOOM_EPSILON {
            return false;
        }

        let rel_x = (self.scroll_x + anchor.x) / self.zoom;
        let rel_y = (self.scroll_y + anchor.y) / self.zoom;
        self.zoom = new_zoom;
        self.scroll_x = rel_x * self.zoom - anchor.x;
        self.scroll_y = rel_y * self.zoom - anchor.y;
        true
    }

    /// Back to the fit scale with the view scrolled home.
    pub fn reset_to_fit(&mut self) {
        self.zoom = self.min_zoom;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
    }

    /// Returns true when the caller should capture the pointer.
    pub fn on_pointer_down(&mut self, button: PointerButton, pos: Point) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        self.drag = DragState { active: true, anchor: pos };
        true
    }

    /// Returns true when the scroll offset moved.
    pub fn on_pointer_move(&mut self, pos: Point) -> bool {
        if !self.drag.active {
            return false;
        }
        let dx = pos.x - self.drag.anchor.x;
        let dy = pos.y - self.drag.anchor.y;
        self.scroll_x -= dx;
        self.scroll_y -= dy;
        self.drag.anchor = pos;
        true
    }

    /// Returns true when the caller should release pointer capture.
    pub fn on_pointer_up(&mut self, button: PointerButton) -> bool {
        if button != PointerButton::Primary || !self.drag.active {
            return false;
        }
        self.drag.active = false;
        true
    }

    /// Capture went away without a button release (focus loss, grab stolen).
    pub fn on_capture_lost(&mut self) -> bool {
        std::mem::replace(&mut self.drag.active, false)
    }

    /// Adopt offsets the surface settled on after native scrolling or clamping.
    pub fn sync_scroll(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    pub fn transform(&self) -> SurfaceTransform {
        SurfaceTransform {
            display_width: self.image_width as f64 * self.zoom,
            display_height: self.image_height as f64 * self.zoom,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn scroll(&self) -> Point {
        Point::new(self.scroll_x, self.scroll_y)
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-9;

    fn loaded(w: u32, h: u32, vw: f64, vh: f64) -> Viewport {
        let mut v = Viewport::new();
        v.on_image_loaded(w, h, vw, vh).unwrap();
        v
    }

    fn natural_under(v: &Viewport, p: Point) -> (f64, f64) {
        let s = v.scroll();
        ((s.x + p.x) / v.zoom(), (s.y + p.y) / v.zoom())
    }

    #[test]
    fn load_sets_fit_zoom() {
        let v = loaded(4000, 3000, 800.0, 600.0);
        assert_abs_diff_eq!(v.min_zoom(), 0.2, epsilon = TOL);
        assert_abs_diff_eq!(v.zoom(), v.min_zoom(), epsilon = TOL);
        assert_eq!(v.scroll(), Point::new(0.0, 0.0));
    }

    #[test]
    fn load_picks_tighter_axis() {
        let v = loaded(1000, 4000, 800.0, 600.0);
        assert_abs_diff_eq!(v.min_zoom(), 0.15, epsilon = TOL);
    }

    #[test]
    fn zero_sized_image_is_rejected_without_state_change() {
        let mut v = loaded(400, 300, 800.0, 600.0);
        v.zoom_at(Point::new(10.0, 10.0), 1.5);
        let before = v.transform();

        let err = v.on_image_loaded(0, 300, 800.0, 600.0).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidImage { width: 0, height: 300 }));
        assert_eq!(v.transform(), before);
    }

    #[test]
    fn wheel_scenario_from_fit() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        let p = Point::new(400.0, 300.0);

        assert_eq!(v.on_wheel(p, 120.0, true), WheelOutcome::Consumed);
        assert_abs_diff_eq!(v.zoom(), 0.22, epsilon = TOL);

        assert_eq!(v.on_wheel(p, -120.0, true), WheelOutcome::Consumed);
        assert_abs_diff_eq!(v.zoom(), 0.2, epsilon = TOL);
        assert_abs_diff_eq!(v.scroll().x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.scroll().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn wheel_out_at_floor_changes_nothing() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        let before = v.transform();
        assert_eq!(v.on_wheel(Point::new(100.0, 50.0), -1.0, true), WheelOutcome::Consumed);
        assert_eq!(v.transform(), before);
    }

    #[test]
    fn wheel_without_modifier_passes_through() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.zoom_at(Point::new(200.0, 200.0), 2.0);
        let before = v.transform();
        for delta in [1.0, -1.0, 3.0] {
            assert_eq!(v.on_wheel(Point::new(10.0, 20.0), delta, false), WheelOutcome::PassThrough);
        }
        assert_eq!(v.transform(), before);
    }

    #[test]
    fn zoom_never_drops_below_floor() {
        let mut v = loaded(2000, 1000, 640.0, 480.0);
        let deltas = [1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, -1.0];
        for (i, d) in deltas.iter().enumerate() {
            v.on_wheel(Point::new(37.0 * i as f64, 11.0 * i as f64), *d, true);
            assert!(v.zoom() >= v.min_zoom(), "step {i}: {} < {}", v.zoom(), v.min_zoom());
        }
    }

    #[test]
    fn anchor_point_stays_under_pointer() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        let pointers = [
            Point::new(400.0, 300.0),
            Point::new(12.0, 580.0),
            Point::new(799.0, 0.0),
            Point::new(250.5, 123.25),
        ];
        for p in pointers {
            for delta in [1.0, 1.0, -1.0] {
                let before = natural_under(&v, p);
                v.on_wheel(p, delta, true);
                let after = natural_under(&v, p);
                assert_abs_diff_eq!(before.0, after.0, epsilon = 1e-6);
                assert_abs_diff_eq!(before.1, after.1, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn zoom_in_then_inverse_restores_state() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.zoom_at(Point::new(400.0, 300.0), 3.0);
        let before = v.transform();
        let zoom_before = v.zoom();

        let p = Point::new(123.0, 456.0);
        assert!(v.zoom_at(p, 1.1));
        assert!(v.zoom_at(p, 1.0 / 1.1));

        let after = v.transform();
        assert_abs_diff_eq!(v.zoom(), zoom_before, epsilon = 1e-9);
        assert_abs_diff_eq!(after.scroll_x, before.scroll_x, epsilon = 1e-6);
        assert_abs_diff_eq!(after.scroll_y, before.scroll_y, epsilon = 1e-6);
    }

    #[test]
    fn repeated_small_steps_do_not_drift() {
        let mut v = loaded(3000, 2000, 1024.0, 768.0);
        let p = Point::new(700.0, 210.0);
        let start = natural_under(&v, p);
        for _ in 0..40 {
            v.on_wheel(p, 1.0, true);
        }
        for _ in 0..15 {
            v.on_wheel(p, -1.0, true);
        }
        let end = natural_under(&v, p);
        assert_abs_diff_eq!(start.0, end.0, epsilon = 1e-6);
        assert_abs_diff_eq!(start.1, end.1, epsilon = 1e-6);
    }

    #[test]
    fn display_size_tracks_zoom() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.on_wheel(Point::new(0.0, 0.0), 1.0, true);
        let t = v.transform();
        assert_abs_diff_eq!(t.display_width, 4000.0 * v.zoom(), epsilon = TOL);
        assert_abs_diff_eq!(t.display_height, 3000.0 * v.zoom(), epsilon = TOL);
    }

    #[test]
    fn drag_scrolls_against_pointer_motion() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.sync_scroll(500.0, 400.0);

        assert!(v.on_pointer_down(PointerButton::Primary, Point::new(100.0, 100.0)));
        assert!(v.on_pointer_move(Point::new(130.0, 90.0)));
        assert_eq!(v.scroll(), Point::new(470.0, 410.0));
        assert!(v.on_pointer_move(Point::new(160.0, 140.0)));
        assert_eq!(v.scroll(), Point::new(440.0, 360.0));

        assert!(v.on_pointer_up(PointerButton::Primary));
        assert!(!v.on_pointer_move(Point::new(0.0, 0.0)));
        assert_eq!(v.scroll(), Point::new(440.0, 360.0));
    }

    #[test]
    fn secondary_button_does_not_drag() {
        let mut v = loaded(100, 100, 50.0, 50.0);
        assert!(!v.on_pointer_down(PointerButton::Secondary, Point::new(5.0, 5.0)));
        assert!(!v.drag().active);
        assert!(!v.on_pointer_move(Point::new(50.0, 50.0)));
    }

    #[test]
    fn secondary_release_keeps_drag_alive() {
        let mut v = loaded(100, 100, 50.0, 50.0);
        v.on_pointer_down(PointerButton::Primary, Point::new(5.0, 5.0));
        assert!(!v.on_pointer_up(PointerButton::Secondary));
        assert!(v.drag().active);
    }

    #[test]
    fn capture_loss_ends_drag() {
        let mut v = loaded(100, 100, 50.0, 50.0);
        v.on_pointer_down(PointerButton::Primary, Point::new(5.0, 5.0));
        assert!(v.on_capture_lost());
        assert!(!v.drag().active);
        assert!(!v.on_capture_lost());
    }

    #[test]
    fn wheel_zoom_mid_drag_keeps_anchor() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.on_pointer_down(PointerButton::Primary, Point::new(200.0, 150.0));
        v.on_wheel(Point::new(600.0, 500.0), 1.0, true);
        assert_eq!(v.drag().anchor, Point::new(200.0, 150.0));

        let scroll = v.scroll();
        v.on_pointer_move(Point::new(210.0, 160.0));
        assert_abs_diff_eq!(v.scroll().x, scroll.x - 10.0, epsilon = TOL);
        assert_abs_diff_eq!(v.scroll().y, scroll.y - 10.0, epsilon = TOL);
    }

    #[test]
    fn reset_returns_to_fit() {
        let mut v = loaded(4000, 3000, 800.0, 600.0);
        v.zoom_at(Point::new(300.0, 300.0), 4.0);
        v.reset_to_fit();
        assert_abs_diff_eq!(v.zoom(), 0.2, epsilon = TOL);
        assert_eq!(v.scroll(), Point::new(0.0, 0.0));
    }

    #[test]
    fn minimised_viewport_keeps_positive_floor() {
        let v = loaded(800, 600, 0.0, 0.0);
        assert!(v.min_zoom() > 0.0);
    }
}
