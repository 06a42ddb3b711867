//! Turns raw input into gallery navigation and viewport updates, and keeps
//! the render surface in step with the viewport.

use std::path::PathBuf;
use std::sync::Arc;

use crate::diag::Diagnostics;
use crate::gallery::Gallery;
use crate::loader::{DecodedImage, ImageSource, LoadPoll};
use crate::viewport::{KEY_ZOOM_STEP, Point, PointerButton, SurfaceTransform, Viewport, WheelOutcome};

/// Scrollable, clipping display driven by the viewport.
pub trait RenderSurface {
    /// Size of the visible window in physical pixels.
    fn viewport_size(&self) -> (f64, f64);
    /// Apply the display size and scroll offset. The surface may clamp the offset.
    fn present(&mut self, transform: SurfaceTransform);
    fn scroll_offset(&self) -> Point;
    /// Native scrolling, used for wheel input the viewport does not consume.
    fn scroll_by(&mut self, dx: f64, dy: f64);
    /// Map a window position to the coordinate frame the scroll offset lives in.
    fn to_local(&self, window_pos: Point) -> Point;
    fn set_pointer_capture(&mut self, captured: bool);
}

/// Wheel motion in pixels; positive `y` rolls away from the user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Left,
    Right,
    Home,
    End,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

pub struct Router<S, D> {
    gallery: Gallery,
    viewport: Viewport,
    source: S,
    diag: D,
    /// Image on screen, if any.
    current: Option<Arc<DecodedImage>>,
    /// Gallery index of `current`.
    displayed_index: Option<usize>,
    /// The one load still allowed to complete.
    pending: Option<usize>,
    error_message: Option<String>,
}

impl<S: ImageSource, D: Diagnostics> Router<S, D> {
    pub fn new(source: S, diag: D) -> Self {
        Self {
            gallery: Gallery::new(),
            viewport: Viewport::new(),
            source,
            diag,
            current: None,
            displayed_index: None,
            pending: None,
            error_message: None,
        }
    }

    pub fn load_gallery(&mut self, paths: Vec<PathBuf>, surface: &mut impl RenderSurface) {
        self.diag.info(&format!("gallery loaded with {} images", paths.len()));
        self.source.replace_files(&paths);
        self.gallery.load(paths);
        self.current = None;
        self.displayed_index = None;
        self.request_current(surface);
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    fn request_current(&mut self, surface: &mut impl RenderSurface) {
        self.error_message = None;
        self.pending = None;
        match self.gallery.current() {
            Ok(path) => log::debug!("[load] {:?}", path),
            Err(e) => {
                self.diag.warn(&format!("nothing to show: {}", e));
                return;
            }
        }
        self.pending = self.gallery.index();
        self.poll_pending(surface);
    }

    fn poll_pending(&mut self, surface: &mut impl RenderSurface) {
        let Some(index) = self.pending else { return };
        match self.source.poll(index) {
            LoadPoll::Ready(img) => {
                self.pending = None;
                self.show(index, img, surface);
            }
            LoadPoll::Failed(msg) => {
                self.pending = None;
                self.diag.warn(&format!("cannot show {}: {}", self.path_name(index), msg));
                self.fail(index, msg);
            }
            LoadPoll::Pending => {}
        }
    }

    /// A decode finished somewhere in the pool. Only the pending index matters.
    pub fn on_image_ready(&mut self, index: usize, surface: &mut impl RenderSurface) {
        if self.pending != Some(index) {
            return;
        }
        self.poll_pending(surface);
    }

    fn show(&mut self, index: usize, img: Arc<DecodedImage>, surface: &mut impl RenderSurface) {
        let (vw, vh) = surface.viewport_size();
        match self.viewport.on_image_loaded(img.width, img.height, vw, vh) {
            Ok(()) => {
                self.current = Some(img);
                self.displayed_index = Some(index);
                self.error_message = None;
                self.present(surface);
            }
            Err(e) => {
                self.diag.error(&format!("cannot show {}: {}", self.path_name(index), e));
                self.fail(index, e.to_string());
            }
        }
    }

    fn path_name(&self, index: usize) -> String {
        self.gallery
            .paths()
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    /// Leave the viewport as it was and show `msg` instead of an image.
    fn fail(&mut self, index: usize, msg: String) {
        self.current = None;
        self.displayed_index = Some(index);
        self.error_message = Some(format!("Could not load: {}", msg));
    }

    fn present(&mut self, surface: &mut impl RenderSurface) {
        surface.present(self.viewport.transform());
        let settled = surface.scroll_offset();
        self.viewport.sync_scroll(settled.x, settled.y);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn on_key_up(&mut self, key: KeyInput, surface: &mut impl RenderSurface) {
        match key {
            KeyInput::Left => self.navigate(surface, |g| g.advance(-1)),
            KeyInput::Right => self.navigate(surface, |g| g.advance(1)),
            KeyInput::Home => self.navigate(surface, Gallery::jump_to_first),
            KeyInput::End => self.navigate(surface, Gallery::jump_to_last),
            KeyInput::ZoomIn => self.zoom_centered(KEY_ZOOM_STEP, surface),
            KeyInput::ZoomOut => self.zoom_centered(1.0 / KEY_ZOOM_STEP, surface),
            KeyInput::ResetZoom => {
                if self.current.is_some() {
                    self.viewport.reset_to_fit();
                    self.present(surface);
                }
            }
        }
    }

    fn navigate(&mut self, surface: &mut impl RenderSurface, step: impl FnOnce(&mut Gallery)) {
        if self.gallery.is_empty() {
            return;
        }
        let from = self.gallery.index();
        step(&mut self.gallery);
        if self.gallery.index() == from && self.pending.is_none() && self.error_message.is_none() {
            return;
        }
        log::debug!("[nav] move {:?} -> {:?}", from, self.gallery.index());
        self.request_current(surface);
    }

    fn zoom_centered(&mut self, scale: f64, surface: &mut impl RenderSurface) {
        if self.current.is_none() {
            return;
        }
        let (vw, vh) = surface.viewport_size();
        let anchor = surface.to_local(Point::new(vw / 2.0, vh / 2.0));
        if self.viewport.zoom_at(anchor, scale) {
            self.present(surface);
        }
    }

    pub fn on_wheel(
        &mut self,
        window_pos: Point,
        delta: WheelDelta,
        has_zoom_modifier: bool,
        surface: &mut impl RenderSurface,
    ) -> WheelOutcome {
        // Horizontal-only motion never zooms.
        let zooming = has_zoom_modifier && delta.y != 0.0;
        if self.current.is_none() {
            // Nothing on screen: the surface still holds the last image's extent.
            return if zooming { WheelOutcome::Consumed } else { WheelOutcome::PassThrough };
        }

        let pointer = surface.to_local(window_pos);
        let outcome = self.viewport.on_wheel(pointer, delta.y, zooming);
        match outcome {
            WheelOutcome::Consumed => self.present(surface),
            WheelOutcome::PassThrough => {
                surface.scroll_by(-delta.x, -delta.y);
                let settled = surface.scroll_offset();
                self.viewport.sync_scroll(settled.x, settled.y);
            }
        }
        outcome
    }

    pub fn on_pointer_down(&mut self, button: PointerButton, window_pos: Point, surface: &mut impl RenderSurface) {
        if self.current.is_none() {
            return;
        }
        let pos = surface.to_local(window_pos);
        if self.viewport.on_pointer_down(button, pos) {
            surface.set_pointer_capture(true);
        }
    }

    pub fn on_pointer_move(&mut self, window_pos: Point, surface: &mut impl RenderSurface) -> bool {
        if self.current.is_none() {
            return false;
        }
        let pos = surface.to_local(window_pos);
        if !self.viewport.on_pointer_move(pos) {
            return false;
        }
        self.present(surface);
        true
    }

    pub fn on_pointer_up(&mut self, button: PointerButton, surface: &mut impl RenderSurface) {
        if self.viewport.on_pointer_up(button) {
            surface.set_pointer_capture(false);
        }
    }

    /// Capture loss or window deactivation.
    pub fn on_capture_lost(&mut self, surface: &mut impl RenderSurface) {
        if self.viewport.on_capture_lost() {
            self.diag.info("drag cancelled: pointer capture lost");
            surface.set_pointer_capture(false);
        }
    }

    pub fn on_resize(&mut self, surface: &mut impl RenderSurface) {
        if self.current.is_some() {
            self.present(surface);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn current_image(&self) -> Option<&Arc<DecodedImage>> {
        self.current.as_ref()
    }

    pub fn displayed_index(&self) -> Option<usize> {
        self.displayed_index
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
