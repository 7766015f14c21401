//! Cache keys and the directory-name encoding that stores them.
//!
//! A cache directory is named `<prefix><separator><identity>`, e.g.
//! `shotbit-holiday` for `/videos/holiday.mp4`. A directory is recognised
//! as a cache entry when its name starts with the prefix followed by the
//! separator; everything after that first separator is the identity, and
//! must equal the requested identity exactly.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

use crate::config::CacheConfig;
use crate::error::ShotbitError;

/// The cache key of a video: its file name without the extension.
///
/// Videos with the same base name in different directories share an
/// identity, and therefore share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoIdentity(String);

impl VideoIdentity {
    /// Derive the identity of a video from its path.
    ///
    /// # Errors
    ///
    /// Returns [`ShotbitError::InvalidVideoPath`] if the path has no file
    /// name (e.g. `/` or `..`).
    ///
    /// # Example
    ///
    /// ```
    /// use shotbit::VideoIdentity;
    ///
    /// let identity = VideoIdentity::from_video_path("/videos/holiday.final.mp4")?;
    /// assert_eq!(identity.as_str(), "holiday.final");
    /// # Ok::<(), shotbit::ShotbitError>(())
    /// ```
    pub fn from_video_path<P: AsRef<Path>>(path: P) -> Result<Self, ShotbitError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| ShotbitError::InvalidVideoPath(path.to_path_buf()))?;
        let stem = Path::new(file_name).file_stem().unwrap_or(file_name);
        Ok(Self(stem.to_string_lossy().into_owned()))
    }

    /// Wrap an already-derived identity string.
    pub fn new<S: Into<String>>(identity: S) -> Self {
        Self(identity.into())
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Encodes identities into directory names and decodes them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNaming {
    prefix: String,
    separator: String,
}

impl CacheNaming {
    /// Naming scheme for the given prefix and separator.
    pub fn new<P: Into<String>, S: Into<String>>(prefix: P, separator: S) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    /// Naming scheme taken from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.prefix(), config.separator())
    }

    /// The canonical directory name for `identity`.
    ///
    /// ```
    /// use shotbit::{CacheNaming, VideoIdentity};
    ///
    /// let naming = CacheNaming::new("shotbit", "-");
    /// assert_eq!(naming.directory_name(&VideoIdentity::new("movie")), "shotbit-movie");
    /// ```
    pub fn directory_name(&self, identity: &VideoIdentity) -> String {
        format!("{}{}{}", self.prefix, self.separator, identity.as_str())
    }

    /// Whether `name` belongs to this namespace at all.
    pub fn is_cache_name(&self, name: &str) -> bool {
        self.identity_of(name).is_some()
    }

    /// The identity encoded in a directory name, or `None` when the name is
    /// not a cache directory name.
    ///
    /// ```
    /// use shotbit::CacheNaming;
    ///
    /// let naming = CacheNaming::new("shotbit", "-");
    /// assert_eq!(naming.identity_of("shotbit-movie-2"), Some("movie-2"));
    /// assert_eq!(naming.identity_of("shotbitmovie"), None);
    /// assert_eq!(naming.identity_of("other-movie"), None);
    /// ```
    pub fn identity_of<'n>(&self, name: &'n str) -> Option<&'n str> {
        name.strip_prefix(self.prefix.as_str())?
            .strip_prefix(self.separator.as_str())
    }

    /// Whether `name` is the cache directory name of exactly `identity`.
    pub fn matches(&self, name: &str, identity: &VideoIdentity) -> bool {
        self.identity_of(name) == Some(identity.as_str())
    }
}
