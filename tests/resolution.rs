//! Resolution workflow integration tests.
//!
//! These use a recording fake extractor, so no FFmpeg fixtures are needed.

mod common;

use std::{fs, path::Path};

use shotbit::{CacheOutcome, FirstNumber, FrameOrdering, ResolveOptions, ShotbitError, SortKey};

use common::{RecordingExtractor, file_names, listing, resolver_with};

#[test]
fn second_resolve_is_a_cache_hit() {
    let extractor =
        RecordingExtractor::with_frames(&["frame-1.png", "frame-2.png", "frame-3.png"]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let first = resolver
        .resolve_detailed("videos/movie.mp4", &ResolveOptions::new())
        .expect("Failed to resolve");
    assert_eq!(first.outcome, CacheOutcome::Miss);
    assert_eq!(extractor.calls(), 1);

    let second = resolver
        .resolve_detailed("videos/movie.mp4", &ResolveOptions::new())
        .expect("Failed to resolve");
    assert_eq!(second.outcome, CacheOutcome::Hit);
    assert_eq!(extractor.calls(), 1, "cache hit must not extract again");

    assert_eq!(first.frames, second.frames);
    assert_eq!(first.directory, second.directory);
}

#[test]
fn same_base_name_shares_an_entry() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png"]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let a = resolver
        .resolve("/season1/pilot.mp4", &ResolveOptions::new())
        .unwrap();
    let b = resolver
        .resolve("/season2/pilot.mkv", &ResolveOptions::new())
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(extractor.calls(), 1);
    assert_eq!(extractor.videos(), vec![Path::new("/season1/pilot.mp4")]);
}

#[test]
fn no_cache_always_extracts_into_a_fresh_directory() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png", "frame-2.png"]);
    let (root, resolver) = resolver_with(extractor.clone());

    let first = resolver
        .resolve_detailed("movie.mp4", &ResolveOptions::new())
        .unwrap();
    fs::write(first.directory.join("frame-99.png"), b"stale").unwrap();

    let forced = resolver
        .resolve_detailed("movie.mp4", &ResolveOptions::new().with_no_cache(true))
        .unwrap();

    assert_eq!(forced.outcome, CacheOutcome::ForceMiss);
    assert!(forced.outcome.extracted());
    assert_eq!(extractor.calls(), 2);
    assert_eq!(file_names(&forced.frames), ["frame-1.png", "frame-2.png"]);
    assert_eq!(forced.directory, root.path().join("shotbit-movie"));
    assert_eq!(listing(root.path()), ["shotbit-movie"]);
}

#[test]
fn no_cache_without_existing_entry() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png"]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let resolution = resolver
        .resolve_detailed("movie.mp4", &ResolveOptions::new().with_no_cache(true))
        .unwrap();

    assert_eq!(resolution.outcome, CacheOutcome::ForceMiss);
    assert_eq!(resolution.frames.len(), 1);
    assert_eq!(extractor.calls(), 1);
}

#[test]
fn frames_are_ordered_numerically() {
    let extractor = RecordingExtractor::with_frames(&["f-2.png", "f-10.png", "f-1.png"]);
    let (_root, resolver) = resolver_with(extractor);

    let frames = resolver.resolve("clip.mp4", &ResolveOptions::new()).unwrap();

    assert_eq!(file_names(&frames), ["f-1.png", "f-2.png", "f-10.png"]);
}

#[test]
fn frames_are_absolute_paths_inside_the_cache_directory() {
    let extractor = RecordingExtractor::with_frames(&["frame-000001.png", "frame-000002.png"]);
    let (root, resolver) = resolver_with(extractor);

    let resolution = resolver
        .resolve_detailed("/media/holiday.final.mov", &ResolveOptions::new())
        .unwrap();

    assert_eq!(resolution.directory, root.path().join("shotbit-holiday.final"));
    for frame in &resolution.frames {
        assert!(frame.is_absolute(), "{} is not absolute", frame.display());
        assert_eq!(frame.parent(), Some(resolution.directory.as_path()));
        assert!(frame.is_file());
    }
}

#[test]
fn empty_extraction_yields_empty_sequence() {
    let extractor = RecordingExtractor::with_frames(&[]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let frames = resolver.resolve("silent.mp4", &ResolveOptions::new()).unwrap();
    assert!(frames.is_empty());

    // An empty entry is still an entry.
    let again = resolver
        .resolve_detailed("silent.mp4", &ResolveOptions::new())
        .unwrap();
    assert_eq!(again.outcome, CacheOutcome::Hit);
    assert_eq!(extractor.calls(), 1);
}

#[test]
fn failed_extraction_surfaces_error_and_leaves_no_entry() {
    let (root, resolver) = resolver_with(RecordingExtractor::default());
    let resolver = resolver.with_extractor(
        |_video: &Path, target: &Path| -> Result<(), ShotbitError> {
            fs::write(target.join("frame-1.png"), b"partial")?;
            Err(ShotbitError::Engine("unsupported codec".to_string()))
        },
    );

    let error = resolver
        .resolve("broken.mp4", &ResolveOptions::new())
        .unwrap_err();

    assert!(
        matches!(&error, ShotbitError::Engine(message) if message == "unsupported codec"),
        "unexpected error: {error}",
    );
    assert!(error.is_extraction_error());
    assert!(resolver.store().entries().unwrap().is_empty());
    assert!(
        listing(root.path()).is_empty(),
        "staging directory must be discarded",
    );
}

#[test]
fn cancelled_extraction_discards_written_frames() {
    let (root, resolver) = resolver_with(RecordingExtractor::default());
    let resolver = resolver.with_extractor(
        |_video: &Path, target: &Path| -> Result<(), ShotbitError> {
            fs::write(target.join("frame-000001.png"), b"frame")?;
            Err(ShotbitError::Cancelled)
        },
    );

    let error = resolver
        .resolve("movie.mp4", &ResolveOptions::new())
        .unwrap_err();

    assert!(matches!(error, ShotbitError::Cancelled));
    assert!(error.is_extraction_error());
    assert!(resolver.store().entries().unwrap().is_empty());
    assert!(listing(root.path()).is_empty(), "no staging directory may remain");
}

#[test]
fn resolve_after_failed_extraction_is_a_miss() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png"]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let failing = resolver.clone().with_extractor(
        |_video: &Path, _target: &Path| -> Result<(), ShotbitError> {
            Err(ShotbitError::Engine("engine crashed".to_string()))
        },
    );
    assert!(failing.resolve("movie.mp4", &ResolveOptions::new()).is_err());

    let resolution = resolver
        .resolve_detailed("movie.mp4", &ResolveOptions::new())
        .unwrap();
    assert_eq!(resolution.outcome, CacheOutcome::Miss);
    assert_eq!(resolution.frames.len(), 1);
    assert_eq!(extractor.calls(), 1);
}

#[test]
fn unnumbered_file_fails_ordering() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png", "cover.png"]);
    let (_root, resolver) = resolver_with(extractor);

    let error = resolver
        .resolve("movie.mp4", &ResolveOptions::new())
        .unwrap_err();

    match error {
        ShotbitError::FrameParse { path } => {
            assert_eq!(path.file_name().unwrap(), "cover.png");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn path_without_file_name_is_rejected() {
    let extractor = RecordingExtractor::with_frames(&["frame-1.png"]);
    let (_root, resolver) = resolver_with(extractor.clone());

    let error = resolver.resolve("/", &ResolveOptions::new()).unwrap_err();

    assert!(matches!(error, ShotbitError::InvalidVideoPath(_)));
    assert_eq!(extractor.calls(), 0);
}

#[test]
fn entry_created_during_extraction_is_a_conflict() {
    let (root, resolver) = resolver_with(RecordingExtractor::default());
    let resolver = resolver.with_extractor(
        |_video: &Path, target: &Path| -> Result<(), ShotbitError> {
            // Another process publishes the same identity mid-extraction.
            let canonical = target.parent().unwrap().join("shotbit-movie");
            fs::create_dir(&canonical)?;
            fs::write(canonical.join("frame-1.png"), b"theirs")?;
            fs::write(target.join("frame-1.png"), b"ours")?;
            Ok(())
        },
    );

    let error = resolver
        .resolve("movie.mp4", &ResolveOptions::new())
        .unwrap_err();

    assert!(matches!(error, ShotbitError::AllocationConflict { .. }));
    assert_eq!(listing(root.path()), ["shotbit-movie"]);
    assert_eq!(
        fs::read(root.path().join("shotbit-movie").join("frame-1.png")).unwrap(),
        b"theirs",
    );
}

#[test]
fn custom_ordering_strategy() {
    let extractor =
        RecordingExtractor::with_frames(&["2_shot-10.png", "1_shot-30.png", "3_shot-20.png"]);
    let (_root, resolver) = resolver_with(extractor);

    // Order by the last number in the name instead of the first.
    let resolver = resolver.with_ordering(|name: &str| {
        name.rsplit(|c: char| !c.is_ascii_digit())
            .find(|run| !run.is_empty())
            .and_then(SortKey::from_digits)
    });

    let frames = resolver.resolve("movie.mp4", &ResolveOptions::new()).unwrap();
    assert_eq!(
        file_names(&frames),
        ["2_shot-10.png", "3_shot-20.png", "1_shot-30.png"],
    );

    // The default strategy would have used the leading number.
    assert_eq!(FirstNumber.sort_key("2_shot-10.png"), Some(SortKey::from_number(2)));
}
