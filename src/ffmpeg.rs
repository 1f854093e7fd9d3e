//! FFmpeg initialisation and log verbosity.
//!
//! FFmpeg prints to stderr on its own, independently of the Rust
//! [`log`](https://crates.io/crates/log) facade. [`sync_log_level`] keeps the
//! two roughly in step so that `RUST_LOG=debug` also surfaces FFmpeg's
//! informational output, while the default stays quiet.

use std::sync::Once;

use ffmpeg_next::util::log::Level;
use log::LevelFilter;

use crate::error::StillframeError;

static QUIET_BY_DEFAULT: Once = Once::new();

/// Initialise FFmpeg. Safe to call any number of times.
///
/// The first call also lowers FFmpeg's own verbosity to errors only, unless
/// [`sync_log_level`] has already been used.
pub fn init() -> Result<(), StillframeError> {
    ffmpeg_next::init()?;
    QUIET_BY_DEFAULT.call_once(|| ffmpeg_next::util::log::set_level(Level::Error));
    Ok(())
}

/// Map a Rust log filter onto FFmpeg's log level and apply it.
pub fn sync_log_level(filter: LevelFilter) {
    QUIET_BY_DEFAULT.call_once(|| {});
    ffmpeg_next::util::log::set_level(ffmpeg_level_for(filter));
}

fn ffmpeg_level_for(filter: LevelFilter) -> Level {
    match filter {
        LevelFilter::Off => Level::Quiet,
        LevelFilter::Error => Level::Error,
        LevelFilter::Warn => Level::Warning,
        LevelFilter::Info => Level::Info,
        LevelFilter::Debug => Level::Verbose,
        LevelFilter::Trace => Level::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffmpeg_level_follows_rust_filter() {
        assert!(matches!(ffmpeg_level_for(LevelFilter::Off), Level::Quiet));
        assert!(matches!(ffmpeg_level_for(LevelFilter::Warn), Level::Warning));
        assert!(matches!(ffmpeg_level_for(LevelFilter::Trace), Level::Debug));
    }
}
