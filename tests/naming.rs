//! Video identity and cache directory naming tests.

mod common;

use shotbit::{
    CacheConfig, CacheNaming, DEFAULT_PREFIX, DEFAULT_SEPARATOR, FrameResolver, ResolveOptions,
    ShotbitError, VideoIdentity,
};

use common::{RecordingExtractor, listing, resolver_with};

#[test]
fn identity_strips_directory_and_extension() {
    let identity = VideoIdentity::from_video_path("/videos/2024/holiday.mp4").unwrap();
    assert_eq!(identity.as_str(), "holiday");
    assert_eq!(identity.to_string(), "holiday");
}

#[test]
fn identity_strips_only_the_last_extension() {
    let identity = VideoIdentity::from_video_path("clip.final.mkv").unwrap();
    assert_eq!(identity.as_str(), "clip.final");
}

#[test]
fn identity_without_extension() {
    assert_eq!(VideoIdentity::from_video_path("raw").unwrap().as_str(), "raw");
    assert_eq!(
        VideoIdentity::from_video_path(".hidden").unwrap().as_str(),
        ".hidden",
    );
}

#[test]
fn identity_requires_a_file_name() {
    for path in ["/", "..", ""] {
        let result = VideoIdentity::from_video_path(path);
        assert!(
            matches!(result, Err(ShotbitError::InvalidVideoPath(_))),
            "expected InvalidVideoPath for {path:?}",
        );
    }
}

#[test]
fn default_naming_scheme() {
    assert_eq!(DEFAULT_PREFIX, "shotbit");
    assert_eq!(DEFAULT_SEPARATOR, "-");

    let naming = CacheNaming::from_config(&CacheConfig::new());
    assert_eq!(naming.directory_name(&VideoIdentity::new("movie")), "shotbit-movie");
}

#[test]
fn identity_is_the_whole_remainder() {
    let naming = CacheNaming::new("shotbit", "-");

    assert_eq!(naming.identity_of("shotbit-movie"), Some("movie"));
    assert_eq!(naming.identity_of("shotbit-movie-shotbit-2"), Some("movie-shotbit-2"));
    assert_eq!(naming.identity_of("shotbit-"), Some(""));
    assert_eq!(naming.identity_of("shotbit"), None);
    assert_eq!(naming.identity_of("shotbits-movie"), None);
    assert_eq!(naming.identity_of("xshotbit-movie"), None);

    assert!(naming.is_cache_name("shotbit-anything"));
    assert!(!naming.is_cache_name(".shotbit-movie.staging-abc"));
}

#[test]
fn similar_identities_never_match() {
    let naming = CacheNaming::new("shotbit", "-");
    let movie = VideoIdentity::new("movie");

    assert!(naming.matches("shotbit-movie", &movie));
    assert!(!naming.matches("shotbit-movie2", &movie));
    assert!(!naming.matches("shotbit-mov", &movie));
}

#[test]
fn similar_identities_get_separate_entries() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png"]);
    let (root, resolver) = resolver_with(extractor.clone());

    let movie = resolver
        .resolve_detailed("movie.mp4", &ResolveOptions::new())
        .unwrap();
    let movie2 = resolver
        .resolve_detailed("movie2.mp4", &ResolveOptions::new())
        .unwrap();

    assert_ne!(movie.directory, movie2.directory);
    assert_eq!(extractor.calls(), 2);
    assert_eq!(listing(root.path()), ["shotbit-movie", "shotbit-movie2"]);
}

#[test]
fn custom_prefix_and_separator() {
    let root = tempfile::tempdir().unwrap();
    let config = CacheConfig::new()
        .with_storage_root(root.path())
        .with_prefix("frames")
        .with_separator("__");
    let resolver = FrameResolver::open(config)
        .unwrap()
        .with_extractor(RecordingExtractor::with_frames(&["frame-1.png"]));

    let resolution = resolver
        .resolve_detailed("talk.webm", &ResolveOptions::new())
        .unwrap();

    assert_eq!(resolution.directory, root.path().join("frames__talk"));
}

#[test]
fn empty_separator_falls_back_to_default() {
    let config = CacheConfig::new().with_separator("");
    assert_eq!(config.separator(), DEFAULT_SEPARATOR);
}
