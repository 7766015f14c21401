//! Resolution workflow.
//!
//! [`FrameResolver`] turns a video path into its ordered frame paths:
//!
//! 1. With `no_cache`, every cache entry for the video is removed first.
//! 2. The store is asked for an existing entry (a hit skips to step 4).
//! 3. On a miss, a staging area is reserved, the extractor fills it, and
//!    the store publishes it under the canonical name.
//! 4. The entry's directory is enumerated in frame order.
//!
//! Each step depends on the filesystem state the previous one left, so
//! they always run strictly in this order. Nothing is retried; a failed
//! extraction fails the whole resolution and publishes nothing.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    config::{CacheConfig, ResolveOptions},
    enumerate::enumerate_frames,
    error::ShotbitError,
    extract::{FfmpegExtractor, FrameExtractor},
    naming::VideoIdentity,
    ordering::{FirstNumber, FrameOrdering},
    store::{DirectoryStore, FrameStore},
};

/// How a resolution obtained its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// An existing cache entry was reused; nothing was extracted.
    Hit,
    /// No entry existed; frames were extracted into a new one.
    Miss,
    /// The cache was bypassed: entries were removed and frames extracted
    /// again.
    ForceMiss,
}

impl CacheOutcome {
    /// Whether the extractor ran for this resolution.
    pub fn extracted(self) -> bool {
        !matches!(self, CacheOutcome::Hit)
    }
}

/// The full result of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The cache directory backing the frames.
    pub directory: PathBuf,
    /// Frame paths in ascending frame order.
    pub frames: Vec<PathBuf>,
    /// Whether the cache was hit, missed, or bypassed.
    pub outcome: CacheOutcome,
}

/// Resolves videos to ordered frame paths through a frame cache.
///
/// The store, extractor, and ordering are shared behind [`Arc`], so
/// cloning a resolver is cheap and clones use the same cache.
///
/// # Example
///
/// ```no_run
/// use shotbit::{CacheConfig, FrameResolver, ResolveOptions, ShotbitError};
///
/// let resolver = FrameResolver::open(CacheConfig::new())?;
///
/// // First call extracts, second call is a cache hit.
/// let frames = resolver.resolve("clips/holiday.mp4", &ResolveOptions::new())?;
/// let again = resolver.resolve("clips/holiday.mp4", &ResolveOptions::new())?;
/// assert_eq!(frames, again);
///
/// resolver.invalidate("clips/holiday.mp4")?;
/// # Ok::<(), ShotbitError>(())
/// ```
#[derive(Clone)]
pub struct FrameResolver {
    store: Arc<dyn FrameStore>,
    extractor: Arc<dyn FrameExtractor>,
    ordering: Arc<dyn FrameOrdering>,
}

impl Debug for FrameResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameResolver").finish_non_exhaustive()
    }
}

impl FrameResolver {
    /// A resolver over the directory store described by `config`, using
    /// [`FfmpegExtractor`] and [`FirstNumber`] ordering.
    ///
    /// # Errors
    ///
    /// Returns [`ShotbitError::CreateDirectory`] if the storage root does
    /// not exist and cannot be created.
    pub fn open(config: CacheConfig) -> Result<Self, ShotbitError> {
        Ok(Self::with_store(DirectoryStore::open(&config)?))
    }

    /// A resolver over any [`FrameStore`], using [`FfmpegExtractor`] and
    /// [`FirstNumber`] ordering.
    pub fn with_store<S: FrameStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
            extractor: Arc::new(FfmpegExtractor::new()),
            ordering: Arc::new(FirstNumber),
        }
    }

    /// Replace the extraction engine.
    #[must_use]
    pub fn with_extractor<E: FrameExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Replace the frame ordering strategy.
    #[must_use]
    pub fn with_ordering<O: FrameOrdering + 'static>(mut self, ordering: O) -> Self {
        self.ordering = Arc::new(ordering);
        self
    }

    /// The backing store.
    pub fn store(&self) -> &dyn FrameStore {
        self.store.as_ref()
    }

    /// Resolve `video_path` to its frame paths, in frame order.
    ///
    /// # Errors
    ///
    /// - [`ShotbitError::InvalidVideoPath`] if no identity can be derived.
    /// - [`ShotbitError::StorageList`] if the storage root or the resolved
    ///   directory cannot be listed.
    /// - [`ShotbitError::AllocationConflict`] if a cache directory appears
    ///   under the canonical name while this resolution is extracting.
    /// - Any extractor error, unchanged.
    /// - [`ShotbitError::FrameParse`] if a cached file has no frame number.
    pub fn resolve<P: AsRef<Path>>(
        &self,
        video_path: P,
        options: &ResolveOptions,
    ) -> Result<Vec<PathBuf>, ShotbitError> {
        Ok(self.resolve_detailed(video_path, options)?.frames)
    }

    /// Like [`resolve`](FrameResolver::resolve), also reporting the backing
    /// directory and whether the cache was used.
    pub fn resolve_detailed<P: AsRef<Path>>(
        &self,
        video_path: P,
        options: &ResolveOptions,
    ) -> Result<Resolution, ShotbitError> {
        let video_path = video_path.as_ref();
        let identity = VideoIdentity::from_video_path(video_path)?;

        let cached = if options.no_cache() {
            self.store.delete(&identity)?;
            None
        } else {
            self.store.get(&identity)?
        };

        let (entry, outcome) = match cached {
            Some(entry) => (entry, CacheOutcome::Hit),
            None => {
                let staged = self.store.reserve(&identity)?;
                self.extractor.extract(video_path, staged.path())?;
                let entry = self.store.put(staged)?;
                let outcome = if options.no_cache() {
                    CacheOutcome::ForceMiss
                } else {
                    CacheOutcome::Miss
                };
                (entry, outcome)
            }
        };

        let frames = enumerate_frames(entry.directory(), self.ordering.as_ref())?;

        log::debug!(
            "Resolved {} to {} frame(s) ({outcome:?})",
            video_path.display(),
            frames.len()
        );

        Ok(Resolution {
            directory: entry.into_directory(),
            frames,
            outcome,
        })
    }

    /// Remove every cache entry for `video_path`.
    ///
    /// A video with no cache entry is not an error.
    ///
    /// # Errors
    ///
    /// - [`ShotbitError::InvalidVideoPath`] if no identity can be derived.
    /// - [`ShotbitError::StorageList`] if the storage root cannot be listed.
    /// - [`ShotbitError::Removal`] if an entry exists but cannot be removed.
    pub fn invalidate<P: AsRef<Path>>(&self, video_path: P) -> Result<(), ShotbitError> {
        let identity = VideoIdentity::from_video_path(video_path)?;
        self.store.delete(&identity)
    }
}

/// Resolve `video_path` using the default cache in the system temporary
/// directory and the FFmpeg extractor.
///
/// ```no_run
/// use shotbit::ResolveOptions;
///
/// let frames = shotbit::resolve("input.mp4", &ResolveOptions::new())?;
/// # Ok::<(), shotbit::ShotbitError>(())
/// ```
pub fn resolve<P: AsRef<Path>>(
    video_path: P,
    options: &ResolveOptions,
) -> Result<Vec<PathBuf>, ShotbitError> {
    FrameResolver::open(CacheConfig::new())?.resolve(video_path, options)
}

/// Remove the default cache's entries for `video_path`.
pub fn invalidate_by_video_path<P: AsRef<Path>>(video_path: P) -> Result<(), ShotbitError> {
    FrameResolver::open(CacheConfig::new())?.invalidate(video_path)
}
