//! Frame extraction gateway.
//!
//! [`FrameExtractor`] is the seam between the cache and whatever actually
//! decodes video. It is handed a video path and an existing, empty
//! directory, and must fill that directory with one image file per frame.
//! It never decides whether extraction is necessary; the resolver does.
//!
//! [`FfmpegExtractor`] is the default engine: it decodes every frame of the
//! best video stream with FFmpeg and writes each as
//! `frame-NNNNNN.png` (1-based).

use std::{path::Path, str::FromStr};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::log::Level,
};
use image::RgbImage;

use crate::{
    config::ExtractOptions,
    error::ShotbitError,
    progress::ProgressTracker,
    utilities::packed_rgb_buffer,
};

/// Populates a directory with the frames of a video.
///
/// Implementations must be [`Send`] and [`Sync`]. Any error returned is
/// surfaced unchanged to the caller of the resolution; the resolver
/// discards whatever was written.
pub trait FrameExtractor: Send + Sync {
    /// Decode `video_path` and write its frames into `target_directory`.
    fn extract(&self, video_path: &Path, target_directory: &Path) -> Result<(), ShotbitError>;
}

impl<F> FrameExtractor for F
where
    F: Fn(&Path, &Path) -> Result<(), ShotbitError> + Send + Sync,
{
    fn extract(&self, video_path: &Path, target_directory: &Path) -> Result<(), ShotbitError> {
        self(video_path, target_directory)
    }
}

/// File name the FFmpeg extractor gives the frame at 1-based `index`.
///
/// ```
/// assert_eq!(shotbit::frame_file_name(7), "frame-000007.png");
/// ```
pub fn frame_file_name(index: u64) -> String {
    format!("frame-{index:06}.png")
}

/// Extracts every frame with FFmpeg and saves them as PNG files.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use shotbit::{FfmpegExtractor, FrameExtractor};
///
/// std::fs::create_dir("frames")?;
/// FfmpegExtractor::new().extract(Path::new("input.mp4"), Path::new("frames"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FfmpegExtractor {
    options: ExtractOptions,
}

impl FfmpegExtractor {
    /// An extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor that reports progress and honours cancellation as
    /// configured in `options`.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }
}

impl FrameExtractor for FfmpegExtractor {
    fn extract(&self, video_path: &Path, target_directory: &Path) -> Result<(), ShotbitError> {
        log::debug!(
            "Extracting frames from {} into {}",
            video_path.display(),
            target_directory.display()
        );

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| ShotbitError::VideoOpen {
            path: video_path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let mut input_context =
            ffmpeg_next::format::input(video_path).map_err(|error| ShotbitError::VideoOpen {
                path: video_path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let (video_stream_index, frame_count, mut decoder) = {
            let stream = input_context.streams().best(Type::Video).ok_or_else(|| {
                ShotbitError::NoVideoStream {
                    path: video_path.to_path_buf(),
                }
            })?;
            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            (stream.index(), stream.frames(), decoder_context.decoder().video()?)
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let total = u64::try_from(frame_count).ok().filter(|&count| count > 0);
        let mut writer = FrameWriter {
            directory: target_directory,
            options: &self.options,
            scaler,
            rgb_frame: VideoFrame::empty(),
            width,
            height,
            tracker: ProgressTracker::new(
                self.options.progress.clone(),
                video_path.to_path_buf(),
                total,
                self.options.batch_size,
            ),
        };

        let mut decoded_frame = VideoFrame::empty();

        for (stream, packet) in input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                writer.write(&decoded_frame)?;
            }
        }

        // Flush the decoder.
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            writer.write(&decoded_frame)?;
        }

        writer.tracker.finish();
        log::info!(
            "Extracted {} frame(s) from {}",
            writer.tracker.current(),
            video_path.display()
        );

        Ok(())
    }
}

/// Converts decoded frames to RGB and writes them as numbered PNGs.
struct FrameWriter<'a> {
    directory: &'a Path,
    options: &'a ExtractOptions,
    scaler: ScalingContext,
    rgb_frame: VideoFrame,
    width: u32,
    height: u32,
    tracker: ProgressTracker,
}

impl FrameWriter<'_> {
    fn write(&mut self, decoded_frame: &VideoFrame) -> Result<(), ShotbitError> {
        if self.options.is_cancelled() {
            return Err(ShotbitError::Cancelled);
        }

        self.scaler.run(decoded_frame, &mut self.rgb_frame)?;
        let buffer = packed_rgb_buffer(&self.rgb_frame, self.width, self.height);
        let image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            ShotbitError::Engine(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;

        let index = self.tracker.current() + 1;
        image.save(self.directory.join(frame_file_name(index)))?;
        self.tracker.advance();

        Ok(())
    }
}

/// Verbosity of FFmpeg's own console output.
///
/// FFmpeg logs to stderr independently of the `log` facade this crate uses
/// for its own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineLogLevel {
    /// No output at all.
    Quiet,
    /// Errors only.
    Error,
    /// Warnings and errors (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
}

impl From<EngineLogLevel> for Level {
    fn from(level: EngineLogLevel) -> Self {
        match level {
            EngineLogLevel::Quiet => Level::Quiet,
            EngineLogLevel::Error => Level::Error,
            EngineLogLevel::Warning => Level::Warning,
            EngineLogLevel::Info => Level::Info,
            EngineLogLevel::Verbose => Level::Verbose,
            EngineLogLevel::Debug => Level::Debug,
        }
    }
}

impl FromStr for EngineLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(EngineLogLevel::Quiet),
            "error" => Ok(EngineLogLevel::Error),
            "warning" | "warn" => Ok(EngineLogLevel::Warning),
            "info" => Ok(EngineLogLevel::Info),
            "verbose" => Ok(EngineLogLevel::Verbose),
            "debug" => Ok(EngineLogLevel::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// Set FFmpeg's console log level.
///
/// ```no_run
/// shotbit::set_engine_log_level(shotbit::EngineLogLevel::Error);
/// ```
pub fn set_engine_log_level(level: EngineLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}
