use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::cli::{HELP_KEYS, ZoomModifier};
use crate::diag::Diagnostics;
use crate::loader::DecodeCache;
use crate::router::{KeyInput, Router};
use crate::ui::render::{BG_COLOR, Frame};
use crate::ui::surface::ScrollSurface;
use crate::viewport::Point;

const WHITE: (u8, u8, u8, u8) = (255, 255, 255, 255);

/// What a released key asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Route(KeyInput),
    ToggleInfo,
    ToggleHelp,
    Quit,
}

pub fn map_key(key: &Key) -> Option<Command> {
    match key {
        Key::Named(NamedKey::ArrowLeft) => Some(Command::Route(KeyInput::Left)),
        Key::Named(NamedKey::ArrowRight) => Some(Command::Route(KeyInput::Right)),
        Key::Named(NamedKey::Home) => Some(Command::Route(KeyInput::Home)),
        Key::Named(NamedKey::End) => Some(Command::Route(KeyInput::End)),
        Key::Named(NamedKey::Escape) => Some(Command::Quit),
        Key::Character(s) => match s.as_str() {
            "+" | "=" => Some(Command::Route(KeyInput::ZoomIn)),
            "-" => Some(Command::Route(KeyInput::ZoomOut)),
            "0" => Some(Command::Route(KeyInput::ResetZoom)),
            "i" | "I" => Some(Command::ToggleInfo),
            "?" => Some(Command::ToggleHelp),
            "q" | "Q" => Some(Command::Quit),
            _ => None,
        },
        _ => None,
    }
}

pub fn modifier_held(modifier: ZoomModifier, state: ModifiersState) -> bool {
    match modifier {
        ZoomModifier::Ctrl => state.control_key(),
        ZoomModifier::Shift => state.shift_key(),
        ZoomModifier::Alt => state.alt_key(),
        ZoomModifier::Super => state.super_key(),
    }
}

// ---------------------------------------------------------------------------
// Viewer state (adapter-side: overlays and raw input bookkeeping)
// ---------------------------------------------------------------------------

pub struct ViewerState {
    pub zoom_modifier: ZoomModifier,
    pub modifiers: ModifiersState,
    pub cursor: Point,
    pub show_info: bool,
    pub show_help: bool,
}

impl ViewerState {
    pub fn new(zoom_modifier: ZoomModifier) -> Self {
        Self {
            zoom_modifier,
            modifiers: ModifiersState::empty(),
            cursor: Point::default(),
            show_info: false,
            show_help: false,
        }
    }

    pub fn zoom_modifier_held(&self) -> bool {
        modifier_held(self.zoom_modifier, self.modifiers)
    }

    /// Render into the softbuffer framebuffer (u32 per pixel, 0x00RRGGBB).
    pub fn render<D: Diagnostics>(
        &self,
        router: &Router<DecodeCache, D>,
        surface: &ScrollSurface,
        frame: &mut Frame<'_>,
    ) {
        frame.clear(BG_COLOR);
        let (fb_w, fb_h) = (frame.width, frame.height as i32);

        if let Some(img) = router.current_image() {
            let (x0, y0) = surface.content_origin();
            let scale = router.viewport().zoom();
            frame.blit_scaled(&img.rgba_bytes, img.width, img.height, x0, y0, scale);

            if self.show_info {
                let gallery = router.gallery();
                let index = router.displayed_index().unwrap_or(0);
                let filename = gallery
                    .paths()
                    .get(index)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let (cached, used, budget) = router.source().stats();
                let mb = |b: u64| b as f64 / (1024.0 * 1024.0);
                let viewport = router.viewport();
                let offset = viewport.scroll();
                let grab = if viewport.drag().active { " | grab" } else { "" };

                let lines = [
                    format!("[{}/{}]", index + 1, gallery.len()),
                    filename,
                    format!(
                        "{}x{} | {} | {:.1} KB | zoom {:.0}%",
                        img.width,
                        img.height,
                        img.format_name,
                        img.file_size as f64 / 1024.0,
                        scale * 100.0,
                    ),
                    format!(
                        "fit {:.0}% | offset {:.0},{:.0}{}",
                        viewport.min_zoom() * 100.0,
                        offset.x,
                        offset.y,
                        grab
                    ),
                    format!("cache: {} images | {:.0}/{:.0} MB", cached, mb(used), mb(budget)),
                ];
                let text_scale: u32 = 2;
                let line_h = (7 * text_scale + 4) as i32;
                let bar_h = (line_h * lines.len() as i32 + 8) as u32;
                frame.fill_rect(0, 0, fb_w, bar_h, (0, 0, 0, 178));
                for (i, line) in lines.iter().enumerate() {
                    frame.draw_text(line, 10, 4 + line_h * i as i32, text_scale, WHITE);
                }
            }
        }

        if let Some(err) = router.error_message() {
            frame.draw_text(err, 20, fb_h / 2, 2, (255, 80, 80, 255));
        } else if router.is_loading() {
            let tx = fb_w as i32 / 2 - 30;
            if router.current_image().is_some() {
                frame.fill_rect(tx - 10, fb_h / 2 - 10, 140, 40, (0, 0, 0, 128));
            }
            frame.draw_text("Loading...", tx, fb_h / 2, 2, WHITE);
        }

        if self.show_help {
            frame.fill_rect(0, 0, fb_w, fb_h as u32, (0, 0, 0, 200));
            let mut y = 20;
            for line in HELP_KEYS.lines() {
                frame.draw_text(line, 20, y, 2, WHITE);
                y += 24;
            }
        }
    }
}
