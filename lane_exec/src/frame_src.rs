//! # Frame sources
//!
//! A frame source supplies the encoded camera frames processed by the main
//! loop, one per call, until it runs out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use comms_if::eqpt::cam::{CamFrame, ImageFormat};
use log::{debug, info};
use thiserror::Error;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A supplier of camera frames.
pub trait FrameSource {
    /// Get the next frame, blocking until it is available.
    ///
    /// `Ok(None)` means the source has no more frames, which is not an error.
    fn next_frame(&mut self) -> Result<Option<CamFrame>, FrameSourceError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reads the image files in a directory as frames, in file name order.
///
/// Files are identified by extension (png, jpg, jpeg or bmp), anything else
/// in the directory is ignored. Files are only decoded by the consumer.
pub struct ImageDirSource {
    files: Vec<(PathBuf, ImageFormat)>,
    next: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("Cannot read the frame directory {0:?}: {1}")]
    DirReadError(PathBuf, std::io::Error),

    #[error("Cannot read the frame file {0:?}: {1}")]
    FileReadError(PathBuf, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ImageDirSource {
    /// Index the image files in the directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, FrameSourceError> {
        let dir = dir.as_ref();
        let read_err = |e| FrameSourceError::DirReadError(dir.to_path_buf(), e);

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if !path.is_file() {
                continue;
            }

            let format = path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension);

            match format {
                Some(f) => files.push((path, f)),
                None => debug!("Ignoring non-image file {:?}", path)
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));

        info!("Found {} frames in {:?}", files.len(), dir);

        Ok(Self { files, next: 0 })
    }

    /// Number of frames not yet supplied.
    pub fn remaining(&self) -> usize {
        self.files.len() - self.next
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<CamFrame>, FrameSourceError> {
        let (path, format) = match self.files.get(self.next) {
            Some(f) => f,
            None => return Ok(None)
        };
        self.next += 1;

        let data = fs::read(path)
            .map_err(|e| FrameSourceError::FileReadError(path.clone(), e))?;

        debug!("Frame {} from {:?}", self.next, path);

        Ok(Some(CamFrame {
            timestamp: Utc::now(),
            format: *format,
            data
        }))
    }
}
