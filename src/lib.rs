//! # shotbit
//!
//! Resolve a video file to the ordered paths of its still frames, reusing a
//! previous extraction instead of decoding the video again.
//!
//! Frames are cached as directories named `<prefix>-<video name>` inside a
//! storage root (the system temporary directory by default). A resolution
//! looks for such a directory first; only on a miss does it run the
//! extraction engine, which writes one image per frame. Either way the
//! frames come back sorted by the frame number in their file names, so
//! `frame-2.png` precedes `frame-10.png`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shotbit::{CacheConfig, FrameResolver, ResolveOptions};
//!
//! let resolver = FrameResolver::open(CacheConfig::new())?;
//! let frames = resolver.resolve("input.mp4", &ResolveOptions::new())?;
//! println!("first frame: {}", frames[0].display());
//!
//! // Throw the cached frames away.
//! resolver.invalidate("input.mp4")?;
//! # Ok::<(), shotbit::ShotbitError>(())
//! ```
//!
//! ## Pieces
//!
//! - [`FrameStore`] / [`DirectoryStore`]: locating, allocating, publishing,
//!   and invalidating cache entries
//! - [`FrameExtractor`] / [`FfmpegExtractor`]: filling a new entry with
//!   frames
//! - [`FrameOrdering`] / [`FirstNumber`] and [`enumerate_frames`]: listing
//!   an entry in frame order
//! - [`FrameResolver`]: the workflow tying them together
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `FrameResolver::resolve_async` via Tokio's blocking pool |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! The default extractor links against the FFmpeg development libraries.

pub mod config;
pub mod enumerate;
pub mod error;
pub mod extract;
#[cfg(feature = "async")]
pub mod future;
pub mod naming;
pub mod ordering;
pub mod progress;
pub mod resolver;
pub mod store;
mod utilities;

pub use config::{CacheConfig, DEFAULT_PREFIX, DEFAULT_SEPARATOR, ExtractOptions, ResolveOptions};
pub use enumerate::enumerate_frames;
pub use error::ShotbitError;
pub use extract::{
    EngineLogLevel, FfmpegExtractor, FrameExtractor, frame_file_name, set_engine_log_level,
};
#[cfg(feature = "async")]
pub use future::ResolveFuture;
pub use naming::{CacheNaming, VideoIdentity};
pub use ordering::{FirstNumber, FrameOrdering, SortKey};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use resolver::{CacheOutcome, FrameResolver, Resolution, invalidate_by_video_path, resolve};
pub use store::{CacheEntry, DirectoryStore, FrameStore, StagedEntry};
pub use utilities::ensure_directory;
