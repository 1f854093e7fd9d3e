use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use stillframe::{
    CancellationToken, ExtractOptions, OutputFormat, ProgressReporter, StillframeError,
    VideoSource, layout,
};

const CLI_AFTER_HELP: &str = "Examples:\n  stillframe extract upload/cat.mp4 --progress\n  stillframe extract upload/cat.mp4 --out frames --ext png\n  stillframe probe upload/cat.mp4 --json\n  stillframe completions zsh > _stillframe";

#[derive(Debug, Parser)]
#[command(
    name = "stillframe",
    version,
    about = "Split a video into one image per frame",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show debug logging from stillframe and informational FFmpeg output.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write every frame of a video to an output directory.
    #[command(
        about = "Extract every frame",
        after_help = "Examples:\n  stillframe extract clip.mov\n  stillframe extract clip.mov --out frames --ext png --progress"
    )]
    Extract {
        /// Video to split (avi, mp4, mov, 3gp).
        input: PathBuf,
        /// Output directory. Defaults to a directory named after the video, next to it.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output image extension (jpg, png, bmp, tiff).
        #[arg(long, default_value = "jpg")]
        ext: String,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = stillframe::DEFAULT_JPEG_QUALITY)]
        quality: u8,
        /// Show a progress bar.
        #[arg(long)]
        progress: bool,
        /// How often the progress bar polls, in milliseconds.
        #[arg(long, default_value_t = 100)]
        poll_interval_ms: u64,
    },

    /// Print the frame count and stream details of a video.
    #[command(about = "Print video metadata", visible_alias = "info")]
    Probe {
        /// Video to inspect.
        input: PathBuf,
        /// Output as JSON.
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

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    stillframe::ffmpeg::sync_log_level(ffmpeg_filter_for(log::max_level()));
}

/// FFmpeg runs one level quieter than the Rust side, and never below errors
/// unless logging is off entirely.
fn ffmpeg_filter_for(rust_filter: log::LevelFilter) -> log::LevelFilter {
    use log::LevelFilter;

    match rust_filter {
        LevelFilter::Off => LevelFilter::Off,
        LevelFilter::Error | LevelFilter::Warn => LevelFilter::Error,
        LevelFilter::Info => LevelFilter::Warn,
        LevelFilter::Debug => LevelFilter::Info,
        LevelFilter::Trace => LevelFilter::Debug,
    }
}

fn check_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !layout::is_supported_video(input) {
        return Err(format!(
            "unsupported video type: {} (expected one of: {})",
            input.display(),
            layout::SUPPORTED_VIDEO_EXTENSIONS.join(", ")
        )
        .into());
    }
    Ok(())
}

fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    if let Err(error) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Cannot install Ctrl-C handler: {error}");
    }
    token
}

fn progress_bar() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {msg}")?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

/// Run the extraction on a worker thread and poll the reporter until it ends.
fn extract_with_bar(
    input: &Path,
    out: &Path,
    options: &ExtractOptions,
    poll_interval: Duration,
) -> Result<u64, Box<dyn std::error::Error>> {
    let reporter: &ProgressReporter = options.progress();
    let bar = progress_bar()?;

    let outcome = thread::scope(|scope| {
        let worker = scope.spawn(|| stillframe::extract_video(input, out, options));
        while !worker.is_finished() {
            bar.set_position(u64::from(reporter.get()));
            bar.set_message(reporter.label());
            thread::sleep(poll_interval);
        }
        worker.join()
    });

    bar.set_position(u64::from(reporter.get()));
    bar.set_message(reporter.label());

    match outcome {
        Ok(Ok(written)) => {
            bar.finish_with_message(format!("{} done", reporter.label()));
            Ok(written)
        }
        Ok(Err(error)) => {
            bar.abandon();
            Err(error.into())
        }
        Err(_) => {
            bar.abandon();
            Err("extraction thread panicked".into())
        }
    }
}

fn describe_failure(error: &StillframeError, out: &Path) {
    if let Some(frames_written) = error.frames_written() {
        eprintln!(
            "{} {}",
            "note:".yellow().bold(),
            format!("{frames_written} frame(s) were left in {}", out.display()).yellow()
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            out,
            ext,
            quality,
            progress,
            poll_interval_ms,
        } => {
            check_input(&input)?;
            let format = OutputFormat::from_extension(&ext)?;
            let out = match out {
                Some(out) => out,
                None => layout::output_directory_for(&input, None)?,
            };

            let options = ExtractOptions::new()
                .with_output_format(format)
                .with_jpeg_quality(quality)
                .with_cancellation(cancel_on_interrupt());

            let result = if progress {
                extract_with_bar(
                    &input,
                    &out,
                    &options,
                    Duration::from_millis(poll_interval_ms.max(1)),
                )
            } else {
                stillframe::extract_video(&input, &out, &options).map_err(Into::into)
            };

            let written = match result {
                Ok(written) => written,
                Err(error) => {
                    if let Some(error) = error.downcast_ref::<StillframeError>() {
                        describe_failure(error, &out);
                    }
                    return Err(error);
                }
            };

            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Extracted {written} frame(s) to {}", out.display()).green()
            );
        }
        Commands::Probe { input, json } => {
            let source = VideoSource::open(&input)?;
            let metadata = source.metadata();
            if json {
                let payload = json!({
                    "path": input.display().to_string(),
                    "container": metadata.container,
                    "codec": metadata.codec,
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "frame_count": metadata.frame_count,
                    "frame_count_estimated": metadata.frame_count_estimated,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Container: {}", metadata.container);
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec
                );
                println!("Duration: {:?}", metadata.duration);
                let suffix = if metadata.frame_count_estimated { " (estimated)" } else { "" };
                println!("Total frames: {}{suffix}", metadata.frame_count);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "stillframe", &mut std::io::stdout());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_defaults() {
        let cli = Cli::try_parse_from(["stillframe", "extract", "clip.mp4"]).unwrap();
        match cli.command {
            Commands::Extract {
                input,
                out,
                ext,
                quality,
                progress,
                poll_interval_ms,
            } => {
                assert_eq!(input, PathBuf::from("clip.mp4"));
                assert!(out.is_none());
                assert_eq!(ext, "jpg");
                assert_eq!(quality, 95);
                assert!(!progress);
                assert_eq!(poll_interval_ms, 100);
            }
            other => panic!("Expected Extract, got: {other:?}"),
        }
    }

    #[test]
    fn ffmpeg_follows_rust_log_level() {
        use log::LevelFilter;

        // Default `warn` and `--verbose` (`debug`).
        assert_eq!(ffmpeg_filter_for(LevelFilter::Warn), LevelFilter::Error);
        assert_eq!(ffmpeg_filter_for(LevelFilter::Debug), LevelFilter::Info);
        // RUST_LOG overrides.
        assert_eq!(ffmpeg_filter_for(LevelFilter::Off), LevelFilter::Off);
        assert_eq!(ffmpeg_filter_for(LevelFilter::Error), LevelFilter::Error);
        assert_eq!(ffmpeg_filter_for(LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(ffmpeg_filter_for(LevelFilter::Trace), LevelFilter::Debug);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["stillframe", "probe", "clip.mp4", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn check_input_rejects_unknown_containers() {
        assert!(check_input(Path::new("clip.avi")).is_ok());
        assert!(check_input(Path::new("clip.MOV")).is_ok());
        assert!(check_input(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
