use image::GenericImageView;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use winit::event_loop::EventLoopProxy;

use crate::error::{Result, ViewerError};

/// How many neighbours on each side of the current image get decoded ahead.
const PREFETCH_RADIUS: usize = 2;

// ---------------------------------------------------------------------------
// Decoded image data
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub format_name: String,
}

impl DecodedImage {
    pub fn mem_size(&self) -> u64 {
        self.rgba_bytes.len() as u64
    }
}

pub fn decode_image(path: &Path) -> Result<DecodedImage> {
    let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let img = image::open(path).map_err(|e| ViewerError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let format_name = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("unknown")
        .to_uppercase();
    let (width, height) = img.dimensions();

    Ok(DecodedImage {
        rgba_bytes: img.to_rgba8().into_raw(),
        width,
        height,
        file_size,
        format_name,
    })
}

// ---------------------------------------------------------------------------
// Image source seen by the router
// ---------------------------------------------------------------------------

pub enum LoadPoll {
    Ready(Arc<DecodedImage>),
    Failed(String),
    Pending,
}

pub trait ImageSource {
    /// Forget everything decoded so far and serve `files` from now on.
    fn replace_files(&mut self, files: &[PathBuf]);

    /// Make `index` the image of interest and report whether it is decoded.
    fn poll(&mut self, index: usize) -> LoadPoll;
}

// ---------------------------------------------------------------------------
// Cache state (shared between UI and worker threads via Mutex + Condvar)
// ---------------------------------------------------------------------------

pub struct CacheState {
    pub current_idx: usize,
    pub files: Arc<[PathBuf]>,
    /// Bumped whenever the file list is replaced; older results are dropped.
    pub epoch: u64,

    pub images: HashMap<usize, Arc<DecodedImage>>,
    pub in_progress: HashSet<usize>,
    pub errors: HashMap<usize, String>,

    pub used_bytes: u64,
    pub budget: u64,

    /// Indices that were decoded but couldn't be kept (cache full, too far).
    pub saturated: HashSet<usize>,
}

pub type SharedState = Arc<(Mutex<CacheState>, Condvar)>;

impl CacheState {
    pub fn new(budget: u64) -> Self {
        Self {
            current_idx: 0,
            files: Arc::from(Vec::new()),
            epoch: 0,
            images: HashMap::new(),
            in_progress: HashSet::new(),
            errors: HashMap::new(),
            used_bytes: 0,
            budget,
            saturated: HashSet::new(),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn reset(&mut self, files: &[PathBuf]) {
        self.files = Arc::from(files);
        self.epoch += 1;
        self.current_idx = 0;
        self.images.clear();
        self.in_progress.clear();
        self.errors.clear();
        self.saturated.clear();
        self.used_bytes = 0;
    }

    pub fn set_current_idx(&mut self, idx: usize) {
        if idx != self.current_idx {
            self.current_idx = idx;
            self.saturated.clear();
        }
    }

    pub fn get(&self, idx: usize) -> Option<Arc<DecodedImage>> {
        self.images.get(&idx).cloned()
    }

    /// Distance to the current index going around the gallery either way.
    fn distance(&self, idx: usize) -> usize {
        let n = self.file_count();
        let d = idx.abs_diff(self.current_idx);
        d.min(n.saturating_sub(d))
    }

    /// Average decoded image size in bytes (fallback: ~8 MB).
    fn avg_image_size(&self) -> u64 {
        if self.images.is_empty() {
            8 * 1024 * 1024
        } else {
            self.used_bytes.max(1) / self.images.len() as u64
        }
    }

    fn farthest_cached(&self) -> Option<(usize, usize)> {
        self.images
            .keys()
            .filter(|&&i| i != self.current_idx)
            .map(|&i| (i, self.distance(i)))
            .max_by_key(|&(_, d)| d)
    }

    pub fn is_available(&self, idx: usize) -> bool {
        idx < self.file_count()
            && !self.in_progress.contains(&idx)
            && !self.images.contains_key(&idx)
            && !self.errors.contains_key(&idx)
            && !self.saturated.contains(&idx)
    }

    /// The current image first, then its neighbours by distance (forward
    /// before backward), as long as the budget has room for them.
    pub fn find_work(&self) -> Option<usize> {
        let n = self.file_count();
        if n == 0 {
            return None;
        }
        if self.is_available(self.current_idx) {
            return Some(self.current_idx);
        }

        let avg = self.avg_image_size();
        let pending_bytes = self.in_progress.len() as u64 * avg;
        let over_budget = self.used_bytes + pending_bytes + avg > self.budget;
        let farthest_dist = if over_budget {
            self.farthest_cached().map(|(_, d)| d).unwrap_or(0)
        } else {
            usize::MAX
        };

        for dist in 1..=PREFETCH_RADIUS.min(n / 2) {
            let fwd = (self.current_idx + dist) % n;
            let bwd = (self.current_idx + n - dist) % n;
            for idx in [fwd, bwd] {
                if self.is_available(idx) && dist < farthest_dist {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Insert a decoded image. Returns false when the result was dropped.
    pub fn insert(&mut self, epoch: u64, idx: usize, decoded: DecodedImage) -> bool {
        if epoch != self.epoch {
            return false;
        }
        if idx != self.current_idx && self.used_bytes + decoded.mem_size() > self.budget {
            let my_dist = self.distance(idx);
            let farthest_dist = self.farthest_cached().map(|(_, d)| d).unwrap_or(0);
            if my_dist >= farthest_dist {
                self.saturated.insert(idx);
                return false;
            }
        }

        if let Some(old) = self.images.remove(&idx) {
            self.used_bytes -= old.mem_size();
        }
        self.used_bytes += decoded.mem_size();
        self.images.insert(idx, Arc::new(decoded));
        self.evict_distant();
        true
    }

    fn evict_distant(&mut self) {
        while self.used_bytes > self.budget && self.images.len() > 1 {
            let Some((evict_idx, _)) = self.farthest_cached() else { break };
            if let Some(img) = self.images.remove(&evict_idx) {
                log::debug!("[cache] evict {}", evict_idx);
                self.used_bytes -= img.mem_size();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// User event for waking the UI from worker threads
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum UserEvent {
    ImageReady(usize),
}

// ---------------------------------------------------------------------------
// Background decode workers
// ---------------------------------------------------------------------------

fn lock(shared: &SharedState) -> MutexGuard<'_, CacheState> {
    shared.0.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn spawn_decode_workers(shared: SharedState, proxy: EventLoopProxy<UserEvent>, num_threads: usize) {
    for _ in 0..num_threads {
        let shared = Arc::clone(&shared);
        let proxy = proxy.clone();
        thread::spawn(move || loop {
            let (idx, epoch, path) = {
                let mut state = lock(&shared);
                loop {
                    if let Some(idx) = state.find_work() {
                        state.in_progress.insert(idx);
                        break (idx, state.epoch, state.files[idx].clone());
                    }
                    state = shared.1.wait(state).unwrap_or_else(|e| e.into_inner());
                }
            };

            let result = decode_image(&path);

            let delivered = {
                let mut state = lock(&shared);
                let delivered = if epoch != state.epoch {
                    false
                } else {
                    state.in_progress.remove(&idx);
                    match result {
                        Ok(decoded) => state.insert(epoch, idx, decoded),
                        Err(e) => {
                            log::warn!("{}", e);
                            state.errors.insert(idx, e.to_string());
                            true
                        }
                    }
                };
                shared.1.notify_all();
                delivered
            };

            if delivered {
                let _ = proxy.send_event(UserEvent::ImageReady(idx));
            }
        });
    }
}

/// Handle the router uses to talk to the worker pool.
pub struct DecodeCache {
    shared: SharedState,
}

impl DecodeCache {
    pub fn new(shared: SharedState) -> Self {
        Self { shared }
    }

    /// (cached images, used bytes, budget bytes)
    pub fn stats(&self) -> (usize, u64, u64) {
        let state = lock(&self.shared);
        (state.images.len(), state.used_bytes, state.budget)
    }
}

impl ImageSource for DecodeCache {
    fn replace_files(&mut self, files: &[PathBuf]) {
        let mut state = lock(&self.shared);
        state.reset(files);
        self.shared.1.notify_all();
    }

    fn poll(&mut self, index: usize) -> LoadPoll {
        let mut state = lock(&self.shared);
        state.set_current_idx(index);
        let poll = if let Some(img) = state.get(index) {
            LoadPoll::Ready(img)
        } else if let Some(err) = state.errors.get(&index) {
            LoadPoll::Failed(err.clone())
        } else {
            LoadPoll::Pending
        };
        self.shared.1.notify_all();
        poll
    }
}
