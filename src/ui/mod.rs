use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{CursorIcon, Window, WindowId};
use softbuffer::Surface;

use crate::diag::LogDiagnostics;
use crate::loader::{DecodeCache, UserEvent};
use crate::router::{Router, WheelDelta};
use crate::ui::render::Frame;
use crate::ui::state::{Command, ViewerState, map_key};
use crate::ui::surface::ScrollSurface;
use crate::viewport::{Point, PointerButton};

pub mod render;
pub mod state;
pub mod surface;

/// Pixels scrolled per wheel line.
const LINE_SCROLL_PX: f64 = 48.0;

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub router: Router<DecodeCache, LogDiagnostics>,
    pub state: ViewerState,
    pub scroll: ScrollSurface,
    pub initial_size: (u32, u32),
    /// Paths waiting for the window to exist before the gallery loads.
    pub startup_paths: Option<Vec<PathBuf>>,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(
        router: Router<DecodeCache, LogDiagnostics>,
        state: ViewerState,
        paths: Vec<PathBuf>,
        initial_size: (u32, u32),
    ) -> Self {
        Self {
            router,
            state,
            scroll: ScrollSurface::new(initial_size.0, initial_size.1),
            initial_size,
            startup_paths: Some(paths),
            window: None,
            context: None,
            surface: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn sync_cursor(&self) {
        if let Some(ref window) = self.window {
            let icon = if self.scroll.is_captured() { CursorIcon::Grabbing } else { CursorIcon::Default };
            window.set_cursor(icon);
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let attrs = Window::default_attributes()
            .with_title("glance")
            .with_inner_size(LogicalSize::new(self.initial_size.0, self.initial_size.1));
        let window = Arc::new(event_loop.create_window(attrs).map_err(|e| e.to_string())?);
        let context = softbuffer::Context::new(Arc::clone(&window)).map_err(|e| e.to_string())?;
        let surface = Surface::new(&context, Arc::clone(&window)).map_err(|e| e.to_string())?;

        let size = window.inner_size();
        self.scroll.resize(size.width, size.height);
        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("Could not open the viewer window: {}", e);
            event_loop.exit();
            return;
        }
        if let Some(paths) = self.startup_paths.take() {
            self.router.load_gallery(paths, &mut self.scroll);
        }
        self.request_redraw();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::ImageReady(idx) => {
                let was_loading = self.router.is_loading();
                self.router.on_image_ready(idx, &mut self.scroll);
                if was_loading && !self.router.is_loading() {
                    self.request_redraw();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let w = width.max(1);
                let h = height.max(1);
                if let (Some(surface), Some(nw), Some(nh)) =
                    (self.surface.as_mut(), NonZeroU32::new(w), NonZeroU32::new(h))
                {
                    let _ = surface.resize(nw, nh);
                }
                self.scroll.resize(w, h);
                self.router.on_resize(&mut self.scroll);
                self.request_redraw();
            }

            WindowEvent::Focused(false) => {
                self.router.on_capture_lost(&mut self.scroll);
                self.sync_cursor();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.state.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Released {
                    return;
                }
                match map_key(&event.logical_key) {
                    Some(Command::Quit) => event_loop.exit(),
                    Some(Command::ToggleInfo) => self.state.show_info = !self.state.show_info,
                    Some(Command::ToggleHelp) => self.state.show_help = !self.state.show_help,
                    Some(Command::Route(key)) => self.router.on_key_up(key, &mut self.scroll),
                    None => return,
                }
                self.request_redraw();
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(button);
                match state {
                    ElementState::Pressed => {
                        self.router.on_pointer_down(button, self.state.cursor, &mut self.scroll)
                    }
                    ElementState::Released => self.router.on_pointer_up(button, &mut self.scroll),
                }
                self.sync_cursor();
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                self.state.cursor = Point::new(x, y);
                if self.router.on_pointer_move(self.state.cursor, &mut self.scroll) {
                    self.request_redraw();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => WheelDelta {
                        x: x as f64 * LINE_SCROLL_PX,
                        y: y as f64 * LINE_SCROLL_PX,
                    },
                    MouseScrollDelta::PixelDelta(PhysicalPosition { x, y }) => WheelDelta { x, y },
                };
                let modifier = self.state.zoom_modifier_held();
                self.router.on_wheel(self.state.cursor, delta, modifier, &mut self.scroll);
                self.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                let Some(window) = self.window.as_ref() else { return };
                let size = window.inner_size();
                let fb_w = size.width.max(1);
                let fb_h = size.height.max(1);
                if let Some(ref mut surface) = self.surface {
                    if let Ok(mut buffer) = surface.buffer_mut() {
                        if buffer.len() == (fb_w * fb_h) as usize {
                            let mut frame = Frame::new(&mut buffer, fb_w, fb_h);
                            self.state.render(&self.router, &self.scroll, &mut frame);
                        }
                        let _ = buffer.present();
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);
    }
}
