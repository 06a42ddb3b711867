use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

// ---------------------------------------------------------------------------
// Gallery: ordered image paths with a wrapping cursor
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Gallery {
    paths: Vec<PathBuf>,
    current: usize,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole path list and move the cursor back to the first entry.
    pub fn load(&mut self, paths: Vec<PathBuf>) {
        self.paths = paths;
        self.current = 0;
    }

    pub fn current(&self) -> Result<&Path> {
        self.paths
            .get(self.current)
            .map(PathBuf::as_path)
            .ok_or(ViewerError::EmptyGallery)
    }

    /// Cursor position, `None` while the gallery is empty.
    pub fn index(&self) -> Option<usize> {
        if self.paths.is_empty() {
            None
        } else {
            Some(self.current)
        }
    }

    pub fn advance(&mut self, delta: isize) {
        let n = self.paths.len() as isize;
        if n == 0 {
            return;
        }
        self.current = ((self.current as isize + delta) % n + n) as usize % n as usize;
    }

    pub fn jump_to_first(&mut self) {
        self.current = 0;
    }

    pub fn jump_to_last(&mut self) {
        self.current = self.paths.len().saturating_sub(1);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery_of(n: usize) -> Gallery {
        let mut g = Gallery::new();
        g.load((0..n).map(|i| PathBuf::from(format!("/pics/{i}.png"))).collect());
        g
    }

    #[test]
    fn empty_gallery_has_no_current() {
        let g = Gallery::new();
        assert!(matches!(g.current(), Err(ViewerError::EmptyGallery)));
        assert_eq!(g.index(), None);
    }

    #[test]
    fn advance_on_empty_gallery_is_noop() {
        let mut g = Gallery::new();
        g.advance(1);
        g.advance(-5);
        g.jump_to_last();
        assert_eq!(g.index(), None);
        assert!(g.is_empty());
    }

    #[test]
    fn load_resets_cursor() {
        let mut g = gallery_of(4);
        g.advance(2);
        g.load(vec![PathBuf::from("/other/a.jpg"), PathBuf::from("/other/b.jpg")]);
        assert_eq!(g.index(), Some(0));
        assert_eq!(g.current().unwrap(), Path::new("/other/a.jpg"));
    }

    #[test]
    fn three_steps_forward_wrap_to_start() {
        let mut g = gallery_of(3);
        for _ in 0..3 {
            g.advance(1);
        }
        assert_eq!(g.index(), Some(0));
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let mut g = gallery_of(3);
        g.advance(-1);
        assert_eq!(g.index(), Some(2));
        assert_eq!(g.current().unwrap(), Path::new("/pics/2.png"));
    }

    #[test]
    fn forward_then_back_restores_index() {
        let mut g = gallery_of(5);
        for start in 0..5 {
            g.load(g.paths().to_vec());
            g.advance(start as isize);
            g.advance(1);
            g.advance(-1);
            assert_eq!(g.index(), Some(start));
        }
    }

    #[test]
    fn index_stays_in_range_under_large_deltas() {
        let mut g = gallery_of(7);
        for delta in [-100isize, 13, -1, 6, 1000, -999] {
            g.advance(delta);
            let i = g.index().unwrap();
            assert!(i < 7, "index {i} escaped after delta {delta}");
        }
    }

    #[test]
    fn home_and_end() {
        let mut g = gallery_of(4);
        g.jump_to_last();
        assert_eq!(g.index(), Some(3));
        g.jump_to_first();
        assert_eq!(g.index(), Some(0));
    }
}
