//! Async resolution.
//!
//! Every step of a resolution is blocking filesystem or decoding work, so
//! [`FrameResolver::resolve_async`] runs the whole workflow on
//! `tokio::task::spawn_blocking` and hands back a [`ResolveFuture`]. The
//! steps still run strictly in order on that one thread.
//!
//! # Example
//!
//! ```no_run
//! use shotbit::{CacheConfig, FrameResolver, ResolveOptions, ShotbitError};
//!
//! # async fn example() -> Result<(), ShotbitError> {
//! let resolver = FrameResolver::open(CacheConfig::new())?;
//! let resolution = resolver
//!     .resolve_async("input.mp4", ResolveOptions::new())
//!     .await?;
//! println!("{} frames in {}", resolution.frames.len(), resolution.directory.display());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::config::ResolveOptions;
use crate::error::ShotbitError;
use crate::resolver::{FrameResolver, Resolution};

/// A future resolving to a [`Resolution`], driven by a blocking thread.
///
/// If the background task does not complete, the future yields
/// [`ShotbitError::Cancelled`]. This covers the runtime shutting down and
/// also a panic inside the extractor or store: the panic payload is not
/// propagated and shows up only as `Cancelled`.
pub struct ResolveFuture {
    handle: JoinHandle<Result<Resolution, ShotbitError>>,
}

impl Future for ResolveFuture {
    type Output = Result<Resolution, ShotbitError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(ShotbitError::Cancelled)))
    }
}

impl FrameResolver {
    /// Run [`resolve_detailed`](FrameResolver::resolve_detailed) on a
    /// blocking Tokio thread.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn resolve_async<P: Into<PathBuf>>(
        &self,
        video_path: P,
        options: ResolveOptions,
    ) -> ResolveFuture {
        let resolver = self.clone();
        let video_path = video_path.into();

        let handle =
            tokio::task::spawn_blocking(move || resolver.resolve_detailed(&video_path, &options));

        ResolveFuture { handle }
    }
}
