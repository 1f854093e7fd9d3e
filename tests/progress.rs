//! ProgressReporter and CancellationToken tests.

use std::thread;

use stillframe::{CancellationToken, ExtractOptions, ProgressReporter};

// ── ProgressReporter ───────────────────────────────────────────────

#[test]
fn reporter_starts_at_zero() {
    let reporter = ProgressReporter::new();
    assert_eq!(reporter.get(), 0);
    assert_eq!(reporter.label(), "");
}

#[test]
fn reporter_last_write_wins() {
    let reporter = ProgressReporter::new();
    reporter.set(40);
    reporter.set(12);
    assert_eq!(reporter.get(), 12);
}

#[test]
fn reporter_clamps_above_hundred() {
    let reporter = ProgressReporter::new();
    reporter.set(250);
    assert_eq!(reporter.get(), 100);
}

#[test]
fn reporter_reset() {
    let reporter = ProgressReporter::new();
    reporter.set(100);
    reporter.reset();
    assert_eq!(reporter.get(), 0);
}

#[test]
fn reporter_clone_shares_slot() {
    let reporter = ProgressReporter::new();
    let reader = reporter.clone();
    reporter.set(73);
    assert_eq!(reader.get(), 73);
}

#[test]
fn reporter_readable_from_other_thread() {
    let reporter = ProgressReporter::new();
    reporter.set(64);
    let reader = reporter.clone();
    let seen = thread::spawn(move || reader.get()).join().unwrap();
    assert_eq!(seen, 64);
}

#[test]
fn label_hidden_below_five() {
    let reporter = ProgressReporter::new();
    for value in 0..5 {
        reporter.set(value);
        assert_eq!(reporter.label(), "", "value {value} should be hidden");
    }
    reporter.set(5);
    assert_eq!(reporter.label(), "5%");
    reporter.set(100);
    assert_eq!(reporter.label(), "100%");
}

#[test]
fn options_expose_their_reporter() {
    let reporter = ProgressReporter::new();
    let options = ExtractOptions::new().with_progress(reporter.clone());
    reporter.set(9);
    assert_eq!(options.progress().get(), 9);
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    assert!(!CancellationToken::new().is_cancelled());
    assert!(!CancellationToken::default().is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}
