use std::{io, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use shotbit::{
    CacheConfig, CacheOutcome, EngineLogLevel, ExtractOptions, FfmpegExtractor, FrameResolver,
    ProgressCallback, ProgressInfo, ResolveOptions,
};

const CLI_AFTER_HELP: &str = "Examples:\n  shotbit frames input.mp4\n  shotbit frames input.mp4 --no-cache --progress --json\n  shotbit invalidate input.mp4\n  shotbit list --cache-root /var/cache/frames\n  shotbit completions zsh > _shotbit";

#[derive(Debug, Parser)]
#[command(
    name = "shotbit",
    version,
    about = "Resolve videos to cached, ordered still frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Directory holding cache entries (defaults to the system temp dir).
    #[arg(long, global = true)]
    cache_root: Option<PathBuf>,

    /// Show additional output on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while extracting.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, error, warning, info, verbose, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the frame paths of a video, extracting them if not cached.
    #[command(
        about = "Resolve a video to its frame paths",
        after_help = "Examples:\n  shotbit frames input.mp4\n  shotbit frames input.mp4 --no-cache --json"
    )]
    Frames {
        /// Input video path.
        video: PathBuf,
        /// Discard any cached frames and extract again.
        #[arg(long)]
        no_cache: bool,
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove the cached frames of a video.
    #[command(about = "Invalidate a video's cache entries")]
    Invalidate {
        /// Input video path.
        video: PathBuf,
    },

    /// List every cache entry.
    #[command(about = "List cache entries")]
    List {
        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn cache_config(global: &GlobalOptions) -> CacheConfig {
    match &global.cache_root {
        Some(root) => CacheConfig::new().with_storage_root(root),
        None => CacheConfig::new(),
    }
}

fn outcome_label(outcome: CacheOutcome) -> &'static str {
    match outcome {
        CacheOutcome::Hit => "hit",
        CacheOutcome::Miss => "miss",
        CacheOutcome::ForceMiss => "forced",
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new_spinner();
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(level) = &cli.global.log_level {
        let parsed: EngineLogLevel = level.parse()?;
        shotbit::set_engine_log_level(parsed);
    }

    match cli.command {
        Commands::Frames {
            video,
            no_cache,
            json,
        } => {
            let progress = if cli.global.progress {
                Some(Arc::new(TerminalProgress::new()?))
            } else {
                None
            };

            let mut extract_options = ExtractOptions::new();
            if let Some(progress) = &progress {
                extract_options = extract_options.with_progress(progress.clone());
            }

            let resolver = FrameResolver::open(cache_config(&cli.global))?
                .with_extractor(FfmpegExtractor::with_options(extract_options));
            let resolution = resolver
                .resolve_detailed(&video, &ResolveOptions::new().with_no_cache(no_cache))?;

            if let Some(progress) = progress {
                progress.bar.finish_and_clear();
            }

            if json {
                let payload = json!({
                    "video": video.display().to_string(),
                    "directory": resolution.directory.display().to_string(),
                    "cache": outcome_label(resolution.outcome),
                    "frames": resolution
                        .frames
                        .iter()
                        .map(|frame| frame.display().to_string())
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for frame in &resolution.frames {
                    println!("{}", frame.display());
                }
            }

            if cli.global.verbose {
                eprintln!(
                    "{} {}",
                    format!("cache {}:", outcome_label(resolution.outcome))
                        .cyan()
                        .bold(),
                    format!(
                        "{} frame(s) in {}",
                        resolution.frames.len(),
                        resolution.directory.display()
                    )
                    .cyan()
                );
            }
        }

        Commands::Invalidate { video } => {
            let resolver = FrameResolver::open(cache_config(&cli.global))?;
            resolver.invalidate(&video)?;
            println!(
                "{} {}",
                "invalidated".green().bold(),
                video.display()
            );
        }

        Commands::List { json } => {
            let resolver = FrameResolver::open(cache_config(&cli.global))?;
            let entries = resolver.store().entries()?;

            if json {
                let payload: Vec<_> = entries
                    .iter()
                    .map(|entry| {
                        json!({
                            "identity": entry.identity().as_str(),
                            "directory": entry.directory().display().to_string(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if entries.is_empty() {
                if cli.global.verbose {
                    eprintln!("{}", "no cache entries".yellow());
                }
            } else {
                for entry in &entries {
                    println!(
                        "{}\t{}",
                        entry.identity().as_str().bold(),
                        entry.directory().display()
                    );
                }
            }
        }

        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "shotbit", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
