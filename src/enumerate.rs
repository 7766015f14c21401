//! Listing a cache directory as an ordered frame sequence.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::ShotbitError,
    ordering::{FrameOrdering, SortKey},
};

/// List `directory` (non-recursively) and return the full path of every
/// entry, ordered by the key `ordering` extracts from each base name.
///
/// The sort is stable: entries with equal keys keep their listing order,
/// which is filesystem-dependent. An empty directory yields an empty
/// sequence.
///
/// # Errors
///
/// - [`ShotbitError::StorageList`] if the directory cannot be listed.
/// - [`ShotbitError::FrameParse`] if any entry's name yields no sort key.
///
/// # Example
///
/// ```no_run
/// use shotbit::{FirstNumber, enumerate_frames};
///
/// let frames = enumerate_frames("/tmp/shotbit-holiday", &FirstNumber)?;
/// for frame in &frames {
///     println!("{}", frame.display());
/// }
/// # Ok::<(), shotbit::ShotbitError>(())
/// ```
pub fn enumerate_frames<P, O>(directory: P, ordering: &O) -> Result<Vec<PathBuf>, ShotbitError>
where
    P: AsRef<Path>,
    O: FrameOrdering + ?Sized,
{
    let directory = directory.as_ref();
    let list_error = |source: std::io::Error| ShotbitError::StorageList {
        path: directory.to_path_buf(),
        source,
    };

    let mut keyed: Vec<(SortKey, PathBuf)> = Vec::new();
    for dirent in fs::read_dir(directory).map_err(list_error)? {
        let dirent = dirent.map_err(list_error)?;
        let path = directory.join(dirent.file_name());
        let key = ordering
            .sort_key(&dirent.file_name().to_string_lossy())
            .ok_or_else(|| ShotbitError::FrameParse { path: path.clone() })?;
        keyed.push((key, path));
    }

    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    log::debug!("Enumerated {} frame(s) in {}", keyed.len(), directory.display());

    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}
