//! Progress reporting and cancellation support.
//!
//! [`ProgressReporter`] is a single shared percentage slot. The extraction
//! run writes to it after every frame; any number of pollers read it on
//! their own schedule. Reads never block writes and vice versa, and a
//! reader may see a value that is one update behind. The value is advisory
//! only.
//!
//! [`CancellationToken`] lets a poller stop a run between frames.
//!
//! # Example
//!
//! ```no_run
//! use std::{thread, time::Duration};
//!
//! use stillframe::{ExtractOptions, ProgressReporter, StillframeError};
//!
//! let reporter = ProgressReporter::new();
//! let options = ExtractOptions::new().with_progress(reporter.clone());
//!
//! thread::scope(|scope| {
//!     let run = scope.spawn(|| stillframe::extract_video("input.mp4", "frames", &options));
//!     while !run.is_finished() {
//!         println!("{}", reporter.label());
//!         thread::sleep(Duration::from_millis(200));
//!     }
//!     run.join().unwrap().map(|_| ())
//! })?;
//! # Ok::<(), StillframeError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

/// Percentages below this are rendered as an empty label.
pub const LABEL_THRESHOLD: u8 = 5;

/// Shared, last-write-wins completion percentage in `0..=100`.
///
/// Cloning yields another handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    percentage: Arc<AtomicU8>,
}

impl ProgressReporter {
    /// Create a reporter at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current value. Anything above 100 is stored as 100.
    pub fn set(&self, percentage: u8) {
        self.percentage
            .store(percentage.min(100), Ordering::Relaxed);
    }

    /// The last value set, or 0 if nothing has been set since the last reset.
    pub fn get(&self) -> u8 {
        self.percentage.load(Ordering::Relaxed)
    }

    /// Return to 0. Each extraction run calls this before its first frame.
    pub fn reset(&self) {
        self.set(0);
    }

    /// User-facing label: `"<n>%"`, or empty while below [`LABEL_THRESHOLD`].
    ///
    /// ```
    /// use stillframe::ProgressReporter;
    ///
    /// let reporter = ProgressReporter::new();
    /// reporter.set(4);
    /// assert_eq!(reporter.label(), "");
    /// reporter.set(42);
    /// assert_eq!(reporter.label(), "42%");
    /// ```
    pub fn label(&self) -> String {
        format_label(self.get())
    }
}

/// Render a percentage the way [`ProgressReporter::label`] does.
pub fn format_label(percentage: u8) -> String {
    if percentage < LABEL_THRESHOLD {
        String::new()
    } else {
        format!("{}%", percentage.min(100))
    }
}

/// Percentage after `written` of `total` frames, rounded to nearest.
///
/// `None` when `total` is zero: an unknown frame count yields no estimate.
pub(crate) fn completion_percentage(written: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let percentage = (written as f64 / total as f64 * 100.0).round();
    Some(percentage.clamp(0.0, 100.0) as u8)
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone it and hand a copy to whoever may want to stop the run. The
/// extractor checks it before decoding each frame, so a frame that is
/// already being written always completes.
///
/// ```
/// use stillframe::CancellationToken;
///
/// let token = CancellationToken::new();
/// let remote = token.clone();
/// remote.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
