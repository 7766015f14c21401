//! Shared filesystem helpers.
//!
//! These do not belong to the cache itself; the store, the extractor, and
//! the CLI all use them.

use std::{
    fs,
    io::{Error as IoError, ErrorKind},
    path::Path,
};

use crate::error::ShotbitError;

/// Create a directory, succeeding if it already exists.
///
/// Only the final component is created; the parent must exist. An existing
/// non-directory at `path` is an error.
///
/// # Errors
///
/// Returns [`ShotbitError::CreateDirectory`] for any failure other than
/// the directory already existing (e.g. permission denied, missing parent).
///
/// # Example
///
/// ```no_run
/// shotbit::ensure_directory("frames")?;
/// shotbit::ensure_directory("frames")?; // still fine
/// # Ok::<(), shotbit::ShotbitError>(())
/// ```
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<(), ShotbitError> {
    let path = path.as_ref();
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            if path.is_dir() {
                Ok(())
            } else {
                Err(ShotbitError::CreateDirectory {
                    path: path.to_path_buf(),
                    source: IoError::new(
                        ErrorKind::AlreadyExists,
                        "path exists but is not a directory",
                    ),
                })
            }
        }
        Err(source) => Err(ShotbitError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove a directory tree, treating an already-absent directory as removed.
pub(crate) fn remove_directory_tree(path: &Path) -> Result<bool, ShotbitError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ShotbitError::Removal {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Copy pixel data from an FFmpeg RGB24 frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3).
/// The result can be handed straight to [`image::RgbImage::from_raw`].
pub(crate) fn packed_rgb_buffer(
    video_frame: &ffmpeg_next::frame::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}
