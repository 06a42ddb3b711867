use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Result, ViewerError};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "ico"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively collect the images under `dir` as absolute paths.
///
/// Files of a directory come sorted and before the contents of its
/// subdirectories. A missing directory, or one without any image, is
/// reported as `FolderInvalid`.
pub fn scan_folder(dir: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ViewerError::FolderInvalid {
            path: dir.to_path_buf(),
            reason: "not a directory".into(),
        });
    }
    let root = fs::canonicalize(dir)?;

    log::info!("Scanning {:?}...", root);
    let start_time = Instant::now();
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    scan_dir(&root, follow_links, &mut visited, &mut found);

    log::info!(
        "Scan complete in {:.2}s. Found {} images.",
        start_time.elapsed().as_secs_f64(),
        found.len()
    );

    if found.is_empty() {
        return Err(ViewerError::FolderInvalid {
            path: root,
            reason: "no image files found".into(),
        });
    }
    Ok(found)
}

/// `visited` holds canonical directory paths so linked cycles are walked once.
fn scan_dir(dir: &Path, follow_links: bool, visited: &mut HashSet<PathBuf>, dest: &mut Vec<PathBuf>) {
    match fs::canonicalize(dir) {
        Ok(real) => {
            if !visited.insert(real) {
                log::debug!("Already scanned {:?}, skipping", dir);
                return;
            }
        }
        Err(e) => {
            log::warn!("Skipping {:?}: {}", dir, e);
            return;
        }
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Skipping {:?}: {}", dir, e);
            return;
        }
    };
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(ft) = entry.file_type() else { continue };
        if ft.is_symlink() && !follow_links {
            continue;
        }

        let p = entry.path();
        if p.is_file() && is_image_file(&p) {
            files.push(p);
        } else if p.is_dir() {
            subdirs.push(p);
        }
    }

    files.sort();
    if !files.is_empty() {
        log::debug!("{:?}: {} images", dir, files.len());
    }
    dest.extend(files);

    subdirs.sort();
    for sub in subdirs {
        scan_dir(&sub, follow_links, visited, dest);
    }
}
