//! Error types for the `shotbit` crate.
//!
//! This module defines [`ShotbitError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the path they concern
//! and, where one exists, the underlying I/O error.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `shotbit` operations.
///
/// Nothing is retried internally. Every failure surfaces to the caller of
/// the resolution or invalidation entry point that triggered it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShotbitError {
    /// The storage root or a cache directory could not be listed.
    #[error("Failed to list directory {path}: {source}")]
    StorageList {
        /// Directory whose listing failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// A cache directory with the canonical name already exists.
    #[error("Cache directory already exists at {path}")]
    AllocationConflict {
        /// The canonical cache directory path.
        path: PathBuf,
    },

    /// A file in a cache directory has no numeric component in its name.
    #[error("Cannot determine frame order: no frame number in {path}")]
    FrameParse {
        /// The offending file.
        path: PathBuf,
    },

    /// A cache directory could not be removed.
    #[error("Failed to remove cache directory {path}: {source}")]
    Removal {
        /// Directory that was being removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// A directory could not be created.
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// The video path has no file name to derive a cache key from.
    #[error("Cannot derive a video identity from {0}")]
    InvalidVideoPath(PathBuf),

    /// The decoding engine could not open the video.
    #[error("Failed to open video at {path}: {reason}")]
    VideoOpen {
        /// Video path handed to the engine.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The video does not contain a video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Video path handed to the engine.
        path: PathBuf,
    },

    /// The decoding engine failed while producing frames.
    #[error("Extraction engine error: {0}")]
    Engine(String),

    /// A decoded frame could not be written as an image.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// Extraction was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl ShotbitError {
    /// Returns `true` if the error came from the frame extraction engine.
    ///
    /// A resolution that fails this way leaves no cache entry behind.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            ShotbitError::VideoOpen { .. }
                | ShotbitError::NoVideoStream { .. }
                | ShotbitError::Engine(_)
                | ShotbitError::ImageError(_)
                | ShotbitError::Cancelled
        )
    }
}

impl From<FfmpegError> for ShotbitError {
    fn from(error: FfmpegError) -> Self {
        ShotbitError::Engine(error.to_string())
    }
}
