mod cli;
mod diag;
mod error;
mod files;
mod gallery;
mod loader;
mod router;
mod ui;
mod viewport;

use clap::Parser;
use std::process::ExitCode;
use std::sync::{Arc, Condvar, Mutex};
use winit::event_loop::EventLoop;

use crate::cli::{Cli, default_memory_budget, parse_memory_budget};
use crate::diag::LogDiagnostics;
use crate::files::scan_folder;
use crate::loader::{CacheState, DecodeCache, SharedState, UserEvent, spawn_decode_workers};
use crate::router::Router;
use crate::ui::App;
use crate::ui::state::ViewerState;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let budget = match &cli.memory {
        Some(s) => parse_memory_budget(s),
        None => default_memory_budget(),
    };

    let files = match scan_folder(&cli.folder, cli.follow_links) {
        Ok(files) => files,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let shared: SharedState = Arc::new((Mutex::new(CacheState::new(budget)), Condvar::new()));

    let num_threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(2, 8);

    let event_loop = match EventLoop::<UserEvent>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Could not create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let proxy = event_loop.create_proxy();

    // Workers sleep until the gallery hands them a file list
    spawn_decode_workers(Arc::clone(&shared), proxy, num_threads);

    let router = Router::new(DecodeCache::new(shared), LogDiagnostics::default());
    let state = ViewerState::new(cli.zoom_modifier);
    let mut app = App::new(router, state, files, (cli.width, cli.height));

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
