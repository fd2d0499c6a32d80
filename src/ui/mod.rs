//! UI/Progress presentation layer
//!
//! This module handles:
//! - Progress reporting for install, uninstall and quick fix transactions
//! - Interactive progress bars using indicatif
//! - Silent progress when verbose logging owns the terminal
//! - Bundle display for `list` and `show`

pub mod display;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for one transaction
///
/// Fed from [`bms::receiver::ChannelReceiver::wait_with`] while the
/// transaction runs on an installer worker.
pub trait ProgressReporter {
    /// Progress in percent
    fn set_progress(&mut self, progress: i32);

    /// Transaction finished successfully
    fn finish(&mut self);

    /// Abandon on error
    fn abandon(&mut self);
}

/// Interactive progress reporter with a visual progress bar
pub struct InteractiveProgressReporter {
    bar: ProgressBar,
}

impl InteractiveProgressReporter {
    /// Create a reporter showing `message` next to the bar
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new(100);
        if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(message.into());
        Self { bar }
    }
}

impl ProgressReporter for InteractiveProgressReporter {
    fn set_progress(&mut self, progress: i32) {
        self.bar
            .set_position(u64::try_from(progress.clamp(0, 100)).unwrap_or_default());
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }

    fn abandon(&mut self) {
        self.bar.abandon();
    }
}

/// Silent progress reporter
///
/// No-op implementation used with `--verbose`, where log lines would
/// interleave with the bar.
#[derive(Default)]
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn set_progress(&mut self, _progress: i32) {}

    fn finish(&mut self) {}

    fn abandon(&mut self) {}
}

/// Pick the reporter for the current verbosity
pub fn reporter(verbose: bool, message: impl Into<String>) -> Box<dyn ProgressReporter> {
    if verbose {
        Box::new(SilentProgressReporter)
    } else {
        Box::new(InteractiveProgressReporter::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_progress_reporter_no_ops() {
        let mut reporter = SilentProgressReporter;
        reporter.set_progress(40);
        reporter.finish();
        reporter.abandon();
    }

    #[test]
    fn test_interactive_progress_reporter_clamps() {
        let mut reporter = InteractiveProgressReporter::new("com.x");
        reporter.set_progress(40);
        assert_eq!(reporter.bar.position(), 40);
        reporter.set_progress(250);
        assert_eq!(reporter.bar.position(), 100);
        reporter.set_progress(-5);
        assert_eq!(reporter.bar.position(), 0);
        reporter.finish();
    }
}
