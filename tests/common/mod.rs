//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use shotbit::{CacheConfig, FrameExtractor, FrameResolver, ShotbitError};
use tempfile::TempDir;

/// A fake extraction engine that writes fixed file names and counts calls.
#[derive(Clone, Default)]
pub struct RecordingExtractor {
    frames: Vec<String>,
    calls: Arc<AtomicUsize>,
    videos: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingExtractor {
    pub fn with_frames(frames: &[&str]) -> Self {
        Self {
            frames: frames.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn videos(&self) -> Vec<PathBuf> {
        self.videos.lock().unwrap().clone()
    }
}

impl FrameExtractor for RecordingExtractor {
    fn extract(&self, video_path: &Path, target_directory: &Path) -> Result<(), ShotbitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.videos.lock().unwrap().push(video_path.to_path_buf());

        assert!(target_directory.is_dir(), "target directory must exist");
        assert_eq!(
            fs::read_dir(target_directory)?.count(),
            0,
            "target directory must be empty",
        );

        for name in &self.frames {
            fs::write(target_directory.join(name), b"frame")?;
        }
        Ok(())
    }
}

/// An isolated storage root and a resolver over it.
pub fn resolver_with(extractor: RecordingExtractor) -> (TempDir, FrameResolver) {
    let root = tempfile::tempdir().expect("Failed to create temp dir");
    let resolver = FrameResolver::open(CacheConfig::new().with_storage_root(root.path()))
        .expect("Failed to open resolver")
        .with_extractor(extractor);
    (root, resolver)
}

/// Base names of `paths`, in order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Names of everything directly inside `directory`, sorted.
pub fn listing(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(directory)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
