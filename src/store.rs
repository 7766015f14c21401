//! Cache entry storage.
//!
//! [`FrameStore`] is the keyed store the resolver talks to: look an entry
//! up, reserve a staging area for a new one, publish it, delete it.
//! [`DirectoryStore`] backs it with plain directories in a storage root,
//! named by [`CacheNaming`].
//!
//! New entries are extracted into a hidden staging directory and renamed
//! onto the canonical name only once extraction has succeeded, so a
//! crashed or failed extraction never leaves a half-populated entry that a
//! later lookup would mistake for a hit.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{
    config::CacheConfig,
    error::ShotbitError,
    naming::{CacheNaming, VideoIdentity},
    utilities::{ensure_directory, remove_directory_tree},
};

/// Infix of every staging directory name, `.<canonical>.staging-XXXXXX`.
const STAGING_MARKER: &str = ".staging-";

/// Staging directories are never entries, whatever the naming scheme.
fn is_staging_name(name: &str) -> bool {
    name.starts_with('.') && name.contains(STAGING_MARKER)
}

/// A published cache entry: one directory of extracted frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    identity: VideoIdentity,
    directory: PathBuf,
}

impl CacheEntry {
    /// An entry for `identity` stored in `directory`.
    pub fn new<P: Into<PathBuf>>(identity: VideoIdentity, directory: P) -> Self {
        Self {
            identity,
            directory: directory.into(),
        }
    }

    /// The video identity this entry caches frames for.
    pub fn identity(&self) -> &VideoIdentity {
        &self.identity
    }

    /// The directory holding the frames.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Consume the entry, returning its directory.
    pub fn into_directory(self) -> PathBuf {
        self.directory
    }
}

/// A reserved, not yet published cache entry.
///
/// The extractor writes into [`path`](StagedEntry::path). Dropping a staged
/// entry without publishing it removes the staging directory and
/// everything in it.
#[derive(Debug)]
pub struct StagedEntry {
    identity: VideoIdentity,
    target: PathBuf,
    staging: TempDir,
}

impl StagedEntry {
    /// Stage `identity` in `staging`, to be published at `target`.
    pub fn new<P: Into<PathBuf>>(identity: VideoIdentity, target: P, staging: TempDir) -> Self {
        Self {
            identity,
            target: target.into(),
            staging,
        }
    }

    /// Split into identity, target, and the staging directory guard.
    pub fn into_parts(self) -> (VideoIdentity, PathBuf, TempDir) {
        (self.identity, self.target, self.staging)
    }

    /// The identity being staged.
    pub fn identity(&self) -> &VideoIdentity {
        &self.identity
    }

    /// The (empty, on creation) directory the extractor should write into.
    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    /// Where the entry will live once published.
    pub fn target(&self) -> &Path {
        &self.target
    }
}

/// Keyed storage of extracted-frame directories.
///
/// Implementations must be [`Send`] and [`Sync`] so a
/// [`FrameResolver`](crate::FrameResolver) can be shared across threads.
pub trait FrameStore: Send + Sync {
    /// Look up the entry for `identity`.
    fn get(&self, identity: &VideoIdentity) -> Result<Option<CacheEntry>, ShotbitError>;

    /// Reserve a staging area for a new entry for `identity`.
    ///
    /// Fails with [`ShotbitError::AllocationConflict`] if an entry already
    /// exists under the canonical name.
    fn reserve(&self, identity: &VideoIdentity) -> Result<StagedEntry, ShotbitError>;

    /// Publish a populated staging area under its canonical name.
    fn put(&self, staged: StagedEntry) -> Result<CacheEntry, ShotbitError>;

    /// Remove every entry for `identity`. Removing nothing is not an error.
    fn delete(&self, identity: &VideoIdentity) -> Result<(), ShotbitError>;

    /// Every entry currently in the store.
    fn entries(&self) -> Result<Vec<CacheEntry>, ShotbitError>;
}

/// A [`FrameStore`] made of directories inside a storage root.
///
/// # Example
///
/// ```no_run
/// use shotbit::{CacheConfig, DirectoryStore, VideoIdentity};
///
/// let store = DirectoryStore::open(&CacheConfig::new())?;
/// if let Some(directory) = store.locate(&VideoIdentity::new("holiday"))? {
///     println!("cached at {}", directory.display());
/// }
/// # Ok::<(), shotbit::ShotbitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    naming: CacheNaming,
}

impl DirectoryStore {
    /// Open the store described by `config`, creating the storage root if
    /// it does not exist yet (its parent must). A relative root is made
    /// absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ShotbitError::CreateDirectory`] if the root cannot be
    /// created.
    pub fn open(config: &CacheConfig) -> Result<Self, ShotbitError> {
        let root = std::path::absolute(config.storage_root())?;
        ensure_directory(&root)?;
        Ok(Self::new(root, CacheNaming::from_config(config)))
    }

    /// A store over an existing root, without touching the filesystem.
    pub fn new<P: Into<PathBuf>>(root: P, naming: CacheNaming) -> Self {
        Self {
            root: root.into(),
            naming,
        }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The naming scheme used to recognise entries.
    pub fn naming(&self) -> &CacheNaming {
        &self.naming
    }

    /// Find the cache directory for `identity`, if any.
    ///
    /// Returns the first matching directory in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`ShotbitError::StorageList`] if the storage root cannot be
    /// listed.
    pub fn locate(&self, identity: &VideoIdentity) -> Result<Option<PathBuf>, ShotbitError> {
        let found = self
            .cache_directories()?
            .into_iter()
            .find(|entry| entry.identity == *identity)
            .map(CacheEntry::into_directory);

        match &found {
            Some(directory) => log::debug!("Cache hit for {identity}: {}", directory.display()),
            None => log::debug!("Cache miss for {identity}"),
        }

        Ok(found)
    }

    /// Reserve the canonical name for `identity` and create an empty
    /// staging directory to extract into.
    ///
    /// # Errors
    ///
    /// - [`ShotbitError::AllocationConflict`] if the canonical directory
    ///   already exists.
    /// - [`ShotbitError::CreateDirectory`] if the staging directory cannot
    ///   be created.
    pub fn allocate(&self, identity: &VideoIdentity) -> Result<StagedEntry, ShotbitError> {
        let directory_name = self.naming.directory_name(identity);
        let target = self.root.join(&directory_name);

        if fs::symlink_metadata(&target).is_ok() {
            return Err(ShotbitError::AllocationConflict { path: target });
        }

        let staging = tempfile::Builder::new()
            .prefix(&format!(".{directory_name}{STAGING_MARKER}"))
            .tempdir_in(&self.root)
            .map_err(|source| ShotbitError::CreateDirectory {
                path: self.root.clone(),
                source,
            })?;

        log::debug!(
            "Allocated {} (staging in {})",
            target.display(),
            staging.path().display()
        );

        Ok(StagedEntry {
            identity: identity.clone(),
            target,
            staging,
        })
    }

    /// Move a populated staging directory onto its canonical name.
    ///
    /// On failure the staging directory is discarded.
    ///
    /// # Errors
    ///
    /// - [`ShotbitError::AllocationConflict`] if the canonical directory
    ///   appeared since [`allocate`](DirectoryStore::allocate).
    /// - [`ShotbitError::IoError`] if the rename fails for another reason.
    pub fn publish(&self, staged: StagedEntry) -> Result<CacheEntry, ShotbitError> {
        let (identity, target, staging) = staged.into_parts();

        // rename(2) silently replaces an empty directory, so check first.
        if fs::symlink_metadata(&target).is_ok() {
            return Err(ShotbitError::AllocationConflict { path: target });
        }

        match fs::rename(staging.path(), &target) {
            Ok(()) => {}
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::AlreadyExists | ErrorKind::DirectoryNotEmpty
                ) =>
            {
                return Err(ShotbitError::AllocationConflict { path: target });
            }
            Err(error) => return Err(error.into()),
        }

        // The staging path no longer exists; stop the guard from removing it.
        let _ = staging.keep();

        log::debug!("Published cache entry {}", target.display());

        Ok(CacheEntry {
            identity,
            directory: target,
        })
    }

    /// Remove every cache directory for `identity`.
    ///
    /// Directories that vanish before they can be removed are ignored.
    ///
    /// # Errors
    ///
    /// - [`ShotbitError::StorageList`] if the storage root cannot be listed.
    /// - [`ShotbitError::Removal`] if a directory exists but cannot be
    ///   removed.
    pub fn invalidate(&self, identity: &VideoIdentity) -> Result<(), ShotbitError> {
        let matching: Vec<PathBuf> = self
            .cache_directories()?
            .into_iter()
            .filter(|entry| entry.identity == *identity)
            .map(CacheEntry::into_directory)
            .collect();

        for directory in matching {
            if remove_directory_tree(&directory)? {
                log::info!("Removed cache directory {}", directory.display());
            }
        }

        Ok(())
    }

    /// List every directory in the root whose name decodes to an identity.
    fn cache_directories(&self) -> Result<Vec<CacheEntry>, ShotbitError> {
        let list_error = |source: std::io::Error| ShotbitError::StorageList {
            path: self.root.clone(),
            source,
        };

        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.root).map_err(list_error)? {
            let dirent = dirent.map_err(list_error)?;
            if !dirent.file_type().map_err(list_error)?.is_dir() {
                continue;
            }

            let file_name = dirent.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if is_staging_name(name) {
                continue;
            }

            if let Some(identity) = self.naming.identity_of(name) {
                entries.push(CacheEntry {
                    identity: VideoIdentity::new(identity),
                    directory: dirent.path(),
                });
            }
        }

        Ok(entries)
    }
}

impl FrameStore for DirectoryStore {
    fn get(&self, identity: &VideoIdentity) -> Result<Option<CacheEntry>, ShotbitError> {
        Ok(self.locate(identity)?.map(|directory| CacheEntry {
            identity: identity.clone(),
            directory,
        }))
    }

    fn reserve(&self, identity: &VideoIdentity) -> Result<StagedEntry, ShotbitError> {
        self.allocate(identity)
    }

    fn put(&self, staged: StagedEntry) -> Result<CacheEntry, ShotbitError> {
        self.publish(staged)
    }

    fn delete(&self, identity: &VideoIdentity) -> Result<(), ShotbitError> {
        self.invalidate(identity)
    }

    fn entries(&self) -> Result<Vec<CacheEntry>, ShotbitError> {
        self.cache_directories()
    }
}
