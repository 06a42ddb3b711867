use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("gallery is empty")]
    EmptyGallery,

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    #[error("could not decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("cannot browse {}: {reason}", path.display())]
    FolderInvalid { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
