//! Cache, resolution, and extraction configuration.
//!
//! [`CacheConfig`] fixes where cache directories live and how they are
//! named. [`ResolveOptions`] controls a single resolution.
//! [`ExtractOptions`] threads progress callbacks and cancellation tokens
//! into the FFmpeg extractor without polluting every signature.
//!
//! # Example
//!
//! ```no_run
//! use shotbit::{CacheConfig, FrameResolver, ResolveOptions, ShotbitError};
//!
//! let config = CacheConfig::new().with_storage_root("/var/cache/frames");
//! let resolver = FrameResolver::open(config)?;
//!
//! // Bypass (and replace) any cached extraction.
//! let frames = resolver.resolve("input.mp4", &ResolveOptions::new().with_no_cache(true))?;
//! # Ok::<(), ShotbitError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Namespace prefix of every cache directory name.
///
/// Part of the on-disk contract: external tools looking for cache entries
/// must use the same prefix and [`DEFAULT_SEPARATOR`].
pub const DEFAULT_PREFIX: &str = "shotbit";

/// Separator between the namespace prefix and the video identity.
pub const DEFAULT_SEPARATOR: &str = "-";

/// Where cache directories live and how their names are encoded.
///
/// The storage root is an explicit parameter rather than an ambient global,
/// so independent resolvers (and test runs) can use isolated roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub(crate) storage_root: PathBuf,
    pub(crate) prefix: String,
    pub(crate) separator: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfig {
    /// Create a configuration rooted at the system temporary directory,
    /// using [`DEFAULT_PREFIX`] and [`DEFAULT_SEPARATOR`].
    pub fn new() -> Self {
        Self {
            storage_root: std::env::temp_dir(),
            prefix: DEFAULT_PREFIX.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Set the directory cache entries are created in.
    #[must_use]
    pub fn with_storage_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Set the namespace prefix.
    #[must_use]
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the prefix/identity separator. An empty separator is replaced by
    /// [`DEFAULT_SEPARATOR`].
    #[must_use]
    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        let separator = separator.into();
        self.separator = if separator.is_empty() {
            DEFAULT_SEPARATOR.to_string()
        } else {
            separator
        };
        self
    }

    /// The directory cache entries are created in.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The prefix/identity separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

/// Options for a single resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub(crate) no_cache: bool,
}

impl ResolveOptions {
    /// Default options: reuse a cached extraction when one exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every cache entry for the video is removed first and
    /// the frames are extracted again.
    #[must_use]
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Whether this resolution bypasses the cache.
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }
}

/// Operational settings for [`FfmpegExtractor`](crate::FfmpegExtractor).
///
/// A default-constructed value reports no progress and is never cancelled.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames).
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: no progress callback, no cancellation, batch size 1.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// Once cancelled, extraction stops before the next frame and returns
    /// [`ShotbitError::Cancelled`](crate::ShotbitError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
